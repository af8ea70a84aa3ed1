//! Appointment booking and the approve/decline/complete/cancel lifecycle.
//!
//! The `(doctor_id, date, time)` slot is unique at the storage layer, so two
//! racing bookings cannot both land; the loser gets a `Conflict`.

use auth_policy::{AppointmentAction, AppointmentOrigin, Identity, ResourceKind};
use chrono::{NaiveDate, NaiveTime, Utc};
use database_layer::models::{Appointment, AppointmentStatus, Role};
use database_layer::{Column, Page, RecordFilter};
use serde::Deserialize;
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::scope::{self, list_visible};
use super::{parse_filter, require_doctor, require_patient};
use crate::error::{ApiError, ApiResult};
use crate::server::ClinicServer;
use crate::types::pagination::Paginated;

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateAppointmentRequest {
    /// Ignored for patients, who always book for themselves.
    pub patient_id: Option<Uuid>,
    pub doctor_id: Uuid,
    #[schema(value_type = String, format = Date, example = "2026-03-14")]
    pub date: NaiveDate,
    #[schema(value_type = String, example = "09:30:00")]
    pub time: NaiveTime,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// Desk edits: move the slot or change the notes.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct UpdateAppointmentRequest {
    pub doctor_id: Option<Uuid>,
    #[schema(value_type = Option<String>, format = Date)]
    pub date: Option<NaiveDate>,
    #[schema(value_type = Option<String>)]
    pub time: Option<NaiveTime>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// Filters only narrow what the caller can already see.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct AppointmentFilters {
    pub patient: Option<Uuid>,
    pub doctor: Option<Uuid>,
    pub status: Option<String>,
    /// Only appointments where the caller is the doctor or the patient.
    pub mine: Option<bool>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

pub async fn list_appointments(
    server: &ClinicServer,
    identity: &Identity,
    filters: AppointmentFilters,
) -> ApiResult<Paginated<Appointment>> {
    let page = Page::new(filters.page, filters.page_size);
    let status = parse_filter::<AppointmentStatus>("status", filters.status.as_deref())?;

    let mut narrowing = RecordFilter::all()
        .and_eq_opt(Column::PatientId, filters.patient)
        .and_eq_opt(Column::DoctorId, filters.doctor)
        .and_status(status.map(AppointmentStatus::as_str));

    if filters.mine.unwrap_or(false) {
        narrowing = match identity.role {
            Role::Patient => match server.repos.patient_for_user(identity.user_id).await? {
                Some(profile) => narrowing.and_eq(Column::PatientId, profile.id),
                None => return Ok(Paginated::empty(page)),
            },
            _ => narrowing.and_eq(Column::DoctorId, identity.user_id),
        };
    }

    list_visible::<Appointment>(server, identity, narrowing, page).await
}

pub async fn get_appointment(
    server: &ClinicServer,
    identity: &Identity,
    id: Uuid,
) -> ApiResult<Appointment> {
    let (appointment, _) = scope::load_visible::<Appointment>(server, identity, id).await?;
    Ok(appointment)
}

pub async fn create_appointment(
    server: &ClinicServer,
    identity: &Identity,
    req: CreateAppointmentRequest,
) -> ApiResult<Appointment> {
    let own_profile = if identity.is(Role::Patient) {
        server.repos.patient_for_user(identity.user_id).await?
    } else {
        None
    };
    let origin = server
        .policy
        .authorize_create_appointment(identity, own_profile.as_ref())?;
    req.validate()?;

    let patient_id = match origin {
        AppointmentOrigin::Patient { patient_id } => patient_id,
        AppointmentOrigin::Staff => {
            let patient_id = req.patient_id.ok_or_else(|| {
                ApiError::field("patient_id", "Patient ID is required to create an appointment.")
            })?;
            require_patient(&server.repos, patient_id).await?.id
        }
    };
    require_doctor(&server.repos, req.doctor_id).await?;

    let now = Utc::now();
    let appointment = Appointment {
        id: Uuid::new_v4(),
        patient_id,
        doctor_id: req.doctor_id,
        date: req.date,
        time: req.time,
        status: AppointmentStatus::Requested,
        requested_by_patient: origin.requested_by_patient(),
        notes: req.notes,
        created_at: now,
        updated_at: now,
    };
    let appointment = server.repos.appointments.insert(appointment).await?;

    info!(
        appointment_id = %appointment.id,
        patient_id = %patient_id,
        doctor_id = %appointment.doctor_id,
        requested_by_patient = appointment.requested_by_patient,
        by = %identity.user_id,
        "Appointment booked"
    );
    Ok(appointment)
}

pub async fn update_appointment(
    server: &ClinicServer,
    identity: &Identity,
    id: Uuid,
    req: UpdateAppointmentRequest,
) -> ApiResult<Appointment> {
    let (mut appointment, _) = scope::load_authorized::<Appointment>(server, identity, id, |facts| {
        server.policy.authorize_update(identity, ResourceKind::Appointment, facts)
    })
    .await?;
    req.validate()?;

    if let Some(doctor_id) = req.doctor_id {
        require_doctor(&server.repos, doctor_id).await?;
        appointment.doctor_id = doctor_id;
    }
    if let Some(date) = req.date {
        appointment.date = date;
    }
    if let Some(time) = req.time {
        appointment.time = time;
    }
    if req.notes.is_some() {
        appointment.notes = req.notes;
    }
    appointment.updated_at = Utc::now();

    // A moved slot is checked against the same constraint as a new booking.
    let appointment = server.repos.appointments.update(appointment).await?;
    info!(appointment_id = %id, by = %identity.user_id, "Appointment updated");
    Ok(appointment)
}

pub async fn delete_appointment(server: &ClinicServer, identity: &Identity, id: Uuid) -> ApiResult<()> {
    scope::load_authorized::<Appointment>(server, identity, id, |facts| {
        server.policy.authorize_delete(identity, ResourceKind::Appointment, facts)
    })
    .await?;

    server.repos.delete_appointment(id).await?;
    info!(appointment_id = %id, by = %identity.user_id, "Appointment deleted");
    Ok(())
}

/// Run a named lifecycle action. Patients may only cancel their own visits.
pub async fn transition(
    server: &ClinicServer,
    identity: &Identity,
    id: Uuid,
    action: AppointmentAction,
) -> ApiResult<Appointment> {
    let (mut appointment, facts) = scope::load_scoped::<Appointment>(server, identity, id).await?;

    let previous = appointment.status;
    appointment.status = server
        .policy
        .authorize_appointment_transition(identity, &appointment, &facts, action)?;
    appointment.updated_at = Utc::now();

    let appointment = server.repos.appointments.update(appointment).await?;
    info!(
        appointment_id = %id,
        action = action.verb(),
        from = %previous,
        to = %appointment.status,
        by = %identity.user_id,
        "Appointment status changed"
    );
    Ok(appointment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClinicConfig;
    use database_layer::models::{Patient, Specialization, User};

    struct Clinic {
        server: ClinicServer,
        desk: Identity,
        doctor: Identity,
        patient_user: Identity,
        patient: Patient,
    }

    async fn clinic() -> Clinic {
        let server = ClinicServer::in_memory(ClinicConfig::default());
        let repos = &server.repos;

        let desk = repos.users.insert(User::new("desk", Role::Receptionist)).await.unwrap();
        let mut doctor = User::new("dr-wekesa", Role::Doctor);
        doctor.specialization = Some(Specialization::Dermatologist);
        let doctor = repos.users.insert(doctor).await.unwrap();
        let patient_user = repos.users.insert(User::new("halima", Role::Patient)).await.unwrap();
        let patient = repos.patients.insert(Patient::new(patient_user.id)).await.unwrap();

        Clinic {
            desk: Identity::from_user(&desk),
            doctor: Identity::from_user(&doctor),
            patient_user: Identity::from_user(&patient_user),
            patient,
            server,
        }
    }

    fn booking(patient_id: Option<Uuid>, doctor_id: Uuid, hour: u32) -> CreateAppointmentRequest {
        CreateAppointmentRequest {
            patient_id,
            doctor_id,
            date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
            notes: None,
        }
    }

    #[tokio::test]
    async fn patients_always_book_for_their_own_profile() {
        let c = clinic().await;
        let other = c.server.repos.patients.insert(Patient::new(Uuid::new_v4())).await.unwrap();

        let booked = create_appointment(&c.server, &c.patient_user, booking(Some(other.id), c.doctor.user_id, 9))
            .await
            .unwrap();

        assert_eq!(booked.patient_id, c.patient.id);
        assert!(booked.requested_by_patient);
    }

    #[tokio::test]
    async fn desk_bookings_need_a_patient() {
        let c = clinic().await;
        let missing = create_appointment(&c.server, &c.desk, booking(None, c.doctor.user_id, 9)).await;
        assert!(matches!(missing, Err(ApiError::Validation { .. })));

        let booked = create_appointment(&c.server, &c.desk, booking(Some(c.patient.id), c.doctor.user_id, 9))
            .await
            .unwrap();
        assert!(!booked.requested_by_patient);
    }

    #[tokio::test]
    async fn a_taken_slot_is_a_conflict() {
        let c = clinic().await;
        create_appointment(&c.server, &c.desk, booking(Some(c.patient.id), c.doctor.user_id, 10))
            .await
            .unwrap();

        let again = create_appointment(&c.server, &c.patient_user, booking(None, c.doctor.user_id, 10)).await;
        match again {
            Err(ApiError::Conflict { message }) => assert_eq!(message, "timeslot already booked"),
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn rescheduling_onto_a_taken_slot_is_a_conflict() {
        let c = clinic().await;
        create_appointment(&c.server, &c.desk, booking(Some(c.patient.id), c.doctor.user_id, 11))
            .await
            .unwrap();
        let second = create_appointment(&c.server, &c.desk, booking(Some(c.patient.id), c.doctor.user_id, 12))
            .await
            .unwrap();

        let moved = update_appointment(
            &c.server,
            &c.desk,
            second.id,
            UpdateAppointmentRequest {
                time: NaiveTime::from_hms_opt(11, 0, 0),
                ..UpdateAppointmentRequest::default()
            },
        )
        .await;
        assert!(matches!(moved, Err(ApiError::Conflict { .. })));
    }

    #[tokio::test]
    async fn doctor_approves_then_completes() {
        let c = clinic().await;
        let booked = create_appointment(&c.server, &c.patient_user, booking(None, c.doctor.user_id, 13))
            .await
            .unwrap();

        let approved = transition(&c.server, &c.doctor, booked.id, AppointmentAction::Approve)
            .await
            .unwrap();
        assert_eq!(approved.status, AppointmentStatus::Accepted);

        let completed = transition(&c.server, &c.doctor, booked.id, AppointmentAction::Complete)
            .await
            .unwrap();
        assert_eq!(completed.status, AppointmentStatus::Completed);

        let cancel = transition(&c.server, &c.patient_user, booked.id, AppointmentAction::Cancel).await;
        assert!(matches!(cancel, Err(ApiError::Conflict { .. })));
    }

    #[tokio::test]
    async fn mine_narrows_to_the_caller() {
        let c = clinic().await;
        create_appointment(&c.server, &c.desk, booking(Some(c.patient.id), c.doctor.user_id, 14))
            .await
            .unwrap();

        let mine = list_appointments(
            &c.server,
            &c.patient_user,
            AppointmentFilters {
                mine: Some(true),
                ..AppointmentFilters::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(mine.total, 1);

        let desk_mine = list_appointments(
            &c.server,
            &c.desk,
            AppointmentFilters {
                mine: Some(true),
                ..AppointmentFilters::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(desk_mine.total, 0);
    }
}
