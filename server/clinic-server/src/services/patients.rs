use auth_policy::{Identity, PatientWardAction, ResourceKind, RowFacts};
use chrono::NaiveDate;
use database_layer::models::{Gender, Patient, PatientStatus, Role, User};
use database_layer::{Page, RecordFilter};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::scope::{self, list_visible};
use super::{assign, parse_filter, require_doctor};
use crate::error::ApiResult;
use crate::server::ClinicServer;
use crate::types::pagination::Paginated;

/// Desk registration: creates the patient account and its profile together.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreatePatientRequest {
    #[validate(length(min = 1, max = 150, message = "Username must be 1-150 characters."))]
    pub username: String,
    #[validate(email(message = "Enter a valid email address."))]
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    /// M or F
    pub gender: Option<String>,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    pub address: Option<String>,
    pub next_of_kin_name: Option<String>,
    #[validate(length(max = 20))]
    pub next_of_kin_phone: Option<String>,
    pub notes_for_doctor: Option<String>,
    pub assigned_doctor_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct UpdatePatientRequest {
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    pub address: Option<String>,
    pub next_of_kin_name: Option<String>,
    #[validate(length(max = 20))]
    pub next_of_kin_phone: Option<String>,
    pub notes_for_doctor: Option<String>,
    /// Desk only.
    pub assigned_doctor_id: Option<Uuid>,
}

/// Ward observations recorded alongside admit, attend and discharge.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct WardActionRequest {
    pub ward_room: Option<String>,
    pub admission_type: Option<String>,
    pub signs_symptoms: Option<String>,
    pub temperature: Option<String>,
    pub blood_pressure: Option<String>,
    pub heart_rate: Option<String>,
    pub respiratory_rate: Option<String>,
    pub ward_notes: Option<String>,
    pub discharge_destination: Option<String>,
    pub discharge_summary: Option<String>,
    pub medications_on_discharge: Option<String>,
    pub follow_up_instructions: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisteredPatient {
    pub user: User,
    pub patient: Patient,
}

pub async fn list_patients(
    server: &ClinicServer,
    identity: &Identity,
    status: Option<&str>,
    page: Page,
) -> ApiResult<Paginated<Patient>> {
    let status = parse_filter::<PatientStatus>("status", status)?;
    let narrowing = RecordFilter::all().and_status(status.map(PatientStatus::as_str));
    list_visible::<Patient>(server, identity, narrowing, page).await
}

pub async fn get_patient(server: &ClinicServer, identity: &Identity, id: Uuid) -> ApiResult<Patient> {
    let (patient, _) = scope::load_visible::<Patient>(server, identity, id).await?;
    Ok(patient)
}

pub async fn create_patient(
    server: &ClinicServer,
    identity: &Identity,
    req: CreatePatientRequest,
) -> ApiResult<RegisteredPatient> {
    server
        .policy
        .authorize_create(identity, ResourceKind::Patient, &RowFacts::default())
        .into_result(ResourceKind::Patient)?;
    req.validate()?;

    let gender = parse_filter::<Gender>("gender", req.gender.as_deref())?;
    if let Some(doctor_id) = req.assigned_doctor_id {
        require_doctor(&server.repos, doctor_id).await?;
    }

    let mut user = User::new(req.username.trim(), Role::Patient);
    user.email = req.email.unwrap_or_default();
    user.first_name = req.first_name.unwrap_or_default();
    user.last_name = req.last_name.unwrap_or_default();
    let user = server.repos.users.insert(user).await?;

    let mut profile = Patient::new(user.id);
    profile.date_of_birth = req.date_of_birth;
    profile.gender = gender;
    profile.phone = req.phone.unwrap_or_default();
    profile.address = req.address.unwrap_or_default();
    profile.next_of_kin_name = req.next_of_kin_name.unwrap_or_default();
    profile.next_of_kin_phone = req.next_of_kin_phone.unwrap_or_default();
    profile.notes_for_doctor = req.notes_for_doctor;
    profile.assigned_doctor_id = req.assigned_doctor_id;
    let patient = server.repos.patients.insert(profile).await?;

    info!(patient_id = %patient.id, by = %identity.user_id, "Patient registered");
    Ok(RegisteredPatient { user, patient })
}

pub async fn update_patient(
    server: &ClinicServer,
    identity: &Identity,
    id: Uuid,
    req: UpdatePatientRequest,
) -> ApiResult<Patient> {
    let (mut patient, _) = scope::load_authorized::<Patient>(server, identity, id, |facts| {
        server.policy.authorize_update(identity, ResourceKind::Patient, facts)
    })
    .await?;
    req.validate()?;

    if let Some(doctor_id) = req.assigned_doctor_id {
        if patient.assigned_doctor_id != Some(doctor_id) {
            server
                .policy
                .authorize_doctor_assignment(identity)
                .into_result(ResourceKind::Patient)?;
            require_doctor(&server.repos, doctor_id).await?;
            info!(patient_id = %id, doctor_id = %doctor_id, by = %identity.user_id, "Doctor assigned");
            patient.assigned_doctor_id = Some(doctor_id);
        }
    }

    if let Some(gender) = parse_filter::<Gender>("gender", req.gender.as_deref())? {
        patient.gender = Some(gender);
    }
    if req.date_of_birth.is_some() {
        patient.date_of_birth = req.date_of_birth;
    }
    assign(&mut patient.phone, req.phone);
    assign(&mut patient.address, req.address);
    assign(&mut patient.next_of_kin_name, req.next_of_kin_name);
    assign(&mut patient.next_of_kin_phone, req.next_of_kin_phone);
    if req.notes_for_doctor.is_some() {
        patient.notes_for_doctor = req.notes_for_doctor;
    }

    Ok(server.repos.patients.update(patient).await?)
}

/// Removes the profile, its account and every record describing it.
pub async fn delete_patient(server: &ClinicServer, identity: &Identity, id: Uuid) -> ApiResult<()> {
    let (patient, _) = scope::load_authorized::<Patient>(server, identity, id, |facts| {
        server.policy.authorize_delete(identity, ResourceKind::Patient, facts)
    })
    .await?;

    server.repos.delete_user_cascade(patient.user_id).await?;
    // Profiles whose account is already gone.
    server.repos.delete_patient_cascade(patient.id).await?;

    info!(patient_id = %id, by = %identity.user_id, "Patient deleted");
    Ok(())
}

/// Admit, attend or discharge. The current status is not consulted.
pub async fn ward_action(
    server: &ClinicServer,
    identity: &Identity,
    id: Uuid,
    action: PatientWardAction,
    req: WardActionRequest,
) -> ApiResult<Patient> {
    let (mut patient, facts) = scope::load_scoped::<Patient>(server, identity, id).await?;
    let previous = patient.status;
    patient.status = server.policy.authorize_ward_action(identity, &facts, action)?;

    let fields = [
        (&mut patient.ward_room, req.ward_room),
        (&mut patient.admission_type, req.admission_type),
        (&mut patient.signs_symptoms, req.signs_symptoms),
        (&mut patient.temperature, req.temperature),
        (&mut patient.blood_pressure, req.blood_pressure),
        (&mut patient.heart_rate, req.heart_rate),
        (&mut patient.respiratory_rate, req.respiratory_rate),
        (&mut patient.ward_notes, req.ward_notes),
        (&mut patient.discharge_destination, req.discharge_destination),
        (&mut patient.discharge_summary, req.discharge_summary),
        (&mut patient.medications_on_discharge, req.medications_on_discharge),
        (&mut patient.follow_up_instructions, req.follow_up_instructions),
    ];
    for (field, value) in fields {
        if value.is_some() {
            *field = value;
        }
    }

    let patient = server.repos.patients.update(patient).await?;
    info!(
        patient_id = %id,
        action = action.verb(),
        from = %previous,
        to = %patient.status,
        by = %identity.user_id,
        "Ward status changed"
    );
    Ok(patient)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClinicConfig;
    use crate::error::ApiError;
    use database_layer::models::Specialization;

    struct Clinic {
        server: ClinicServer,
        desk: Identity,
        doctor: Identity,
    }

    async fn clinic() -> Clinic {
        let server = ClinicServer::in_memory(ClinicConfig::default());
        let desk = server
            .repos
            .users
            .insert(User::new("desk", Role::Receptionist))
            .await
            .unwrap();
        let mut doctor = User::new("dr-kamau", Role::Doctor);
        doctor.specialization = Some(Specialization::GeneralPractitioner);
        let doctor = server.repos.users.insert(doctor).await.unwrap();
        Clinic {
            desk: Identity::from_user(&desk),
            doctor: Identity::from_user(&doctor),
            server,
        }
    }

    fn registration(username: &str, doctor: Option<Uuid>) -> CreatePatientRequest {
        CreatePatientRequest {
            username: username.to_string(),
            email: None,
            first_name: Some("Wanjiru".to_string()),
            last_name: Some("Mwangi".to_string()),
            date_of_birth: None,
            gender: Some("f".to_string()),
            phone: Some("0712345678".to_string()),
            address: None,
            next_of_kin_name: None,
            next_of_kin_phone: None,
            notes_for_doctor: None,
            assigned_doctor_id: doctor,
        }
    }

    #[tokio::test]
    async fn desk_registers_account_and_profile_together() {
        let c = clinic().await;
        let registered = create_patient(&c.server, &c.desk, registration("wanjiru", Some(c.doctor.user_id)))
            .await
            .unwrap();

        assert_eq!(registered.user.role, Role::Patient);
        assert_eq!(registered.patient.user_id, registered.user.id);
        assert_eq!(registered.patient.status, PatientStatus::Pending);

        let visible = list_patients(&c.server, &c.doctor, None, Page::default()).await.unwrap();
        assert_eq!(visible.total, 1);
    }

    #[tokio::test]
    async fn doctors_cannot_reassign_patients() {
        let c = clinic().await;
        let registered = create_patient(&c.server, &c.desk, registration("juma", Some(c.doctor.user_id)))
            .await
            .unwrap();

        let result = update_patient(
            &c.server,
            &c.doctor,
            registered.patient.id,
            UpdatePatientRequest {
                assigned_doctor_id: Some(Uuid::new_v4()),
                ..UpdatePatientRequest::default()
            },
        )
        .await;
        assert!(matches!(result, Err(ApiError::Authorization { .. })));
    }

    #[tokio::test]
    async fn assignment_must_name_a_doctor() {
        let c = clinic().await;
        let result = create_patient(&c.server, &c.desk, registration("akinyi", Some(c.desk.user_id))).await;
        assert!(matches!(result, Err(ApiError::Validation { .. })));
    }

    #[tokio::test]
    async fn discharged_patients_can_be_readmitted() {
        let c = clinic().await;
        let nurse = c.server.repos.users.insert(User::new("nurse", Role::Nurse)).await.unwrap();
        let nurse = Identity::from_user(&nurse);
        let registered = create_patient(&c.server, &c.desk, registration("otieno", None))
            .await
            .unwrap();
        let id = registered.patient.id;

        let discharged = ward_action(
            &c.server,
            &nurse,
            id,
            PatientWardAction::Discharge,
            WardActionRequest {
                discharge_summary: Some("Stable".to_string()),
                ..WardActionRequest::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(discharged.status, PatientStatus::Discharged);
        assert_eq!(discharged.discharge_summary.as_deref(), Some("Stable"));

        let admitted = ward_action(
            &c.server,
            &nurse,
            id,
            PatientWardAction::Admit,
            WardActionRequest {
                ward_room: Some("B12".to_string()),
                ..WardActionRequest::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(admitted.status, PatientStatus::Admitted);
        assert_eq!(admitted.discharge_summary.as_deref(), Some("Stable"));
    }

    #[tokio::test]
    async fn deleting_a_patient_removes_the_account() {
        let c = clinic().await;
        let registered = create_patient(&c.server, &c.desk, registration("kiptoo", None))
            .await
            .unwrap();

        delete_patient(&c.server, &c.desk, registered.patient.id).await.unwrap();

        assert!(c.server.repos.patients.get(registered.patient.id).await.unwrap().is_none());
        assert!(c.server.repos.users.get(registered.user.id).await.unwrap().is_none());
    }
}
