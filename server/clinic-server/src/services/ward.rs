//! Nursing ward records: tasks, alerts, beds, medication rounds, handover
//! notes, pending admissions and planned discharges.
//!
//! Each record has a flag-plus-timestamp lifecycle. Tasks and handover notes
//! belong to the nurse who wrote them; everything else is ward-wide.

use auth_policy::{Identity, PatientWardAction, ResourceKind, RowFacts};
use chrono::{DateTime, NaiveDate, Utc};
use database_layer::models::{
    AlertSeverity, BedStatus, HandoverLog, MedicationSchedule, NurseTask, PendingAdmission,
    PlannedDischarge, WardAlert,
};
use database_layer::{Column, Page, RecordFilter};
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::scope::{self, list_visible, Scoped};
use super::{assign, parse_filter, require_patient};
use crate::error::{ApiError, ApiResult};
use crate::server::ClinicServer;
use crate::types::pagination::Paginated;

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateTaskRequest {
    pub patient_id: Option<Uuid>,
    #[validate(length(min = 1, max = 500, message = "Description is required."))]
    pub description: String,
    pub due_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 500))]
    pub description: Option<String>,
    pub due_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RaiseAlertRequest {
    pub patient_id: Option<Uuid>,
    #[validate(length(min = 1, max = 1000, message = "Message is required."))]
    pub message: String,
    /// LOW, MEDIUM, HIGH or CRITICAL. Defaults to MEDIUM.
    pub severity: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateBedRequest {
    #[validate(length(min = 1, max = 50, message = "Ward is required."))]
    pub ward: String,
    #[validate(length(min = 1, max = 20, message = "Bed number is required."))]
    pub bed_number: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignBedRequest {
    pub patient_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ScheduleMedicationRequest {
    pub patient_id: Uuid,
    pub prescription_id: Option<Uuid>,
    #[validate(length(min = 1, max = 200, message = "Medication name is required."))]
    pub name: String,
    #[validate(length(min = 1, max = 100, message = "Dosage is required."))]
    pub dosage: String,
    pub scheduled_for: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct HandoverRequest {
    pub patient_id: Option<Uuid>,
    #[validate(length(min = 1, message = "Note is required."))]
    pub note: String,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateHandoverRequest {
    #[validate(length(min = 1, message = "Note is required."))]
    pub note: String,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateAdmissionRequest {
    pub patient_id: Uuid,
    pub ward: Option<String>,
    #[validate(length(min = 1, message = "Reason is required."))]
    pub reason: String,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct PlanDischargeRequest {
    pub patient_id: Uuid,
    #[schema(value_type = String, format = Date)]
    pub planned_for: NaiveDate,
    #[serde(default)]
    pub notes: String,
}

// =============================================================================
// Shared operations
// =============================================================================

/// Visible rows of one ward table, optionally for a single patient.
pub async fn list<T: Scoped>(
    server: &ClinicServer,
    identity: &Identity,
    patient: Option<Uuid>,
    page: Page,
) -> ApiResult<Paginated<T>> {
    let narrowing = RecordFilter::all().and_eq_opt(Column::PatientId, patient);
    list_visible::<T>(server, identity, narrowing, page).await
}

pub async fn get<T: Scoped>(server: &ClinicServer, identity: &Identity, id: Uuid) -> ApiResult<T> {
    let (row, _) = scope::load_visible::<T>(server, identity, id).await?;
    Ok(row)
}

pub async fn delete<T: Scoped>(server: &ClinicServer, identity: &Identity, id: Uuid) -> ApiResult<()> {
    scope::load_authorized::<T>(server, identity, id, |facts| {
        server.policy.authorize_delete(identity, T::KIND, facts)
    })
    .await?;

    T::store(&server.repos).delete(id).await?;
    info!(kind = %T::KIND, id = %id, by = %identity.user_id, "Ward record deleted");
    Ok(())
}

/// Role check for a new row; a referenced patient must exist.
async fn authorize_new<T: Scoped>(
    server: &ClinicServer,
    identity: &Identity,
    patient_id: Option<Uuid>,
) -> ApiResult<()> {
    let facts = match patient_id {
        Some(patient_id) => scope::facts_of_patient(&require_patient(&server.repos, patient_id).await?),
        None => RowFacts::default(),
    };
    server
        .policy
        .authorize_create(identity, T::KIND, &facts)
        .into_result(T::KIND)?;
    Ok(())
}

/// Load, authorize an update, apply `change` and persist.
async fn modify<T: Scoped>(
    server: &ClinicServer,
    identity: &Identity,
    id: Uuid,
    change: impl FnOnce(&mut T) -> ApiResult<()>,
) -> ApiResult<T> {
    let (mut row, _) = scope::load_authorized::<T>(server, identity, id, |facts| {
        server.policy.authorize_update(identity, T::KIND, facts)
    })
    .await?;
    change(&mut row)?;
    Ok(T::store(&server.repos).update(row).await?)
}

async fn insert<T: Scoped>(server: &ClinicServer, identity: &Identity, row: T) -> ApiResult<T> {
    let row = T::store(&server.repos).insert(row).await?;
    info!(kind = %T::KIND, id = %row.id(), by = %identity.user_id, "Ward record created");
    Ok(row)
}

// =============================================================================
// Tasks
// =============================================================================

/// The owning nurse is always the caller.
pub async fn create_task(
    server: &ClinicServer,
    identity: &Identity,
    req: CreateTaskRequest,
) -> ApiResult<NurseTask> {
    authorize_new::<NurseTask>(server, identity, req.patient_id).await?;
    req.validate()?;

    let task = NurseTask {
        id: Uuid::new_v4(),
        nurse_id: identity.user_id,
        patient_id: req.patient_id,
        description: req.description,
        due_at: req.due_at,
        completed: false,
        completed_at: None,
        created_at: Utc::now(),
    };
    insert(server, identity, task).await
}

pub async fn update_task(
    server: &ClinicServer,
    identity: &Identity,
    id: Uuid,
    req: UpdateTaskRequest,
) -> ApiResult<NurseTask> {
    req.validate()?;
    modify::<NurseTask>(server, identity, id, |task| {
        assign(&mut task.description, req.description);
        if req.due_at.is_some() {
            task.due_at = req.due_at;
        }
        Ok(())
    })
    .await
}

pub async fn complete_task(server: &ClinicServer, identity: &Identity, id: Uuid) -> ApiResult<NurseTask> {
    modify::<NurseTask>(server, identity, id, |task| {
        if !task.completed {
            task.completed = true;
            task.completed_at = Some(Utc::now());
        }
        Ok(())
    })
    .await
}

// =============================================================================
// Alerts
// =============================================================================

pub async fn raise_alert(
    server: &ClinicServer,
    identity: &Identity,
    req: RaiseAlertRequest,
) -> ApiResult<WardAlert> {
    authorize_new::<WardAlert>(server, identity, req.patient_id).await?;
    req.validate()?;
    let severity = parse_filter::<AlertSeverity>("severity", req.severity.as_deref())?
        .unwrap_or(AlertSeverity::Medium);

    let alert = WardAlert {
        id: Uuid::new_v4(),
        patient_id: req.patient_id,
        message: req.message,
        severity,
        raised_by: Some(identity.user_id),
        acknowledged: false,
        acknowledged_by: None,
        acknowledged_at: None,
        created_at: Utc::now(),
    };
    insert(server, identity, alert).await
}

/// Acknowledging twice keeps the first acknowledgement.
pub async fn acknowledge_alert(
    server: &ClinicServer,
    identity: &Identity,
    id: Uuid,
) -> ApiResult<WardAlert> {
    modify::<WardAlert>(server, identity, id, |alert| {
        if !alert.acknowledged {
            alert.acknowledged = true;
            alert.acknowledged_by = Some(identity.user_id);
            alert.acknowledged_at = Some(Utc::now());
        }
        Ok(())
    })
    .await
}

// =============================================================================
// Beds
// =============================================================================

pub async fn create_bed(
    server: &ClinicServer,
    identity: &Identity,
    req: CreateBedRequest,
) -> ApiResult<BedStatus> {
    authorize_new::<BedStatus>(server, identity, None).await?;
    req.validate()?;

    let now = Utc::now();
    let bed = BedStatus {
        id: Uuid::new_v4(),
        ward: req.ward.trim().to_string(),
        bed_number: req.bed_number.trim().to_string(),
        patient_id: None,
        occupied: false,
        updated_by: Some(identity.user_id),
        created_at: now,
        updated_at: now,
    };
    insert(server, identity, bed).await
}

pub async fn assign_bed(
    server: &ClinicServer,
    identity: &Identity,
    id: Uuid,
    req: AssignBedRequest,
) -> ApiResult<BedStatus> {
    let (mut bed, _) = scope::load_authorized::<BedStatus>(server, identity, id, |facts| {
        server.policy.authorize_update(identity, ResourceKind::BedStatus, facts)
    })
    .await?;

    require_patient(&server.repos, req.patient_id).await?;
    let occupied_elsewhere = server
        .repos
        .beds
        .find_one(&RecordFilter::eq(Column::PatientId, req.patient_id))
        .await?
        .filter(|other| other.id != id);
    if let Some(other) = occupied_elsewhere {
        return Err(ApiError::conflict(format!(
            "Patient already occupies bed {} in {}.",
            other.bed_number, other.ward
        )));
    }
    if bed.occupied && bed.patient_id != Some(req.patient_id) {
        return Err(ApiError::conflict("Bed is already occupied."));
    }

    bed.patient_id = Some(req.patient_id);
    bed.occupied = true;
    bed.updated_by = Some(identity.user_id);
    bed.updated_at = Utc::now();
    let bed = server.repos.beds.update(bed).await?;

    info!(bed_id = %id, patient_id = %req.patient_id, by = %identity.user_id, "Bed assigned");
    Ok(bed)
}

pub async fn release_bed(server: &ClinicServer, identity: &Identity, id: Uuid) -> ApiResult<BedStatus> {
    modify::<BedStatus>(server, identity, id, |bed| {
        bed.patient_id = None;
        bed.occupied = false;
        bed.updated_by = Some(identity.user_id);
        bed.updated_at = Utc::now();
        Ok(())
    })
    .await
}

// =============================================================================
// Medication rounds
// =============================================================================

pub async fn schedule_medication(
    server: &ClinicServer,
    identity: &Identity,
    req: ScheduleMedicationRequest,
) -> ApiResult<MedicationSchedule> {
    authorize_new::<MedicationSchedule>(server, identity, Some(req.patient_id)).await?;
    req.validate()?;

    if let Some(prescription_id) = req.prescription_id {
        server
            .repos
            .prescriptions
            .get(prescription_id)
            .await?
            .filter(|p| p.patient_id == req.patient_id)
            .ok_or_else(|| {
                ApiError::field("prescription_id", "Prescription does not belong to this patient.")
            })?;
    }

    let medication = MedicationSchedule {
        id: Uuid::new_v4(),
        patient_id: req.patient_id,
        prescription_id: req.prescription_id,
        name: req.name,
        dosage: req.dosage,
        scheduled_for: req.scheduled_for,
        administered: false,
        administered_by: None,
        administered_at: None,
        created_by: Some(identity.user_id),
        created_at: Utc::now(),
    };
    insert(server, identity, medication).await
}

pub async fn administer_medication(
    server: &ClinicServer,
    identity: &Identity,
    id: Uuid,
) -> ApiResult<MedicationSchedule> {
    modify::<MedicationSchedule>(server, identity, id, |dose| {
        if dose.administered {
            return Err(ApiError::conflict("Medication has already been administered."));
        }
        dose.administered = true;
        dose.administered_by = Some(identity.user_id);
        dose.administered_at = Some(Utc::now());
        Ok(())
    })
    .await
}

// =============================================================================
// Handover notes
// =============================================================================

pub async fn create_handover(
    server: &ClinicServer,
    identity: &Identity,
    req: HandoverRequest,
) -> ApiResult<HandoverLog> {
    authorize_new::<HandoverLog>(server, identity, req.patient_id).await?;
    req.validate()?;

    let now = Utc::now();
    let log = HandoverLog {
        id: Uuid::new_v4(),
        nurse_id: identity.user_id,
        patient_id: req.patient_id,
        note: req.note,
        created_at: now,
        updated_at: now,
    };
    insert(server, identity, log).await
}

pub async fn update_handover(
    server: &ClinicServer,
    identity: &Identity,
    id: Uuid,
    req: UpdateHandoverRequest,
) -> ApiResult<HandoverLog> {
    req.validate()?;
    modify::<HandoverLog>(server, identity, id, |log| {
        log.note = req.note;
        log.updated_at = Utc::now();
        Ok(())
    })
    .await
}

// =============================================================================
// Admissions and discharges
// =============================================================================

pub async fn request_admission(
    server: &ClinicServer,
    identity: &Identity,
    req: CreateAdmissionRequest,
) -> ApiResult<PendingAdmission> {
    authorize_new::<PendingAdmission>(server, identity, Some(req.patient_id)).await?;
    req.validate()?;

    let admission = PendingAdmission {
        id: Uuid::new_v4(),
        patient_id: req.patient_id,
        requested_by: Some(identity.user_id),
        ward: req.ward,
        reason: req.reason,
        admitted: false,
        admitted_at: None,
        created_at: Utc::now(),
    };
    insert(server, identity, admission).await
}

/// Mark a pending admission as done and admit the patient.
pub async fn resolve_admission(
    server: &ClinicServer,
    identity: &Identity,
    id: Uuid,
) -> ApiResult<PendingAdmission> {
    let admission = modify::<PendingAdmission>(server, identity, id, |admission| {
        if admission.admitted {
            return Err(ApiError::conflict("Admission has already been resolved."));
        }
        admission.admitted = true;
        admission.admitted_at = Some(Utc::now());
        Ok(())
    })
    .await?;

    apply_ward_status(server, identity, admission.patient_id, PatientWardAction::Admit, admission.ward.clone())
        .await?;
    Ok(admission)
}

pub async fn plan_discharge(
    server: &ClinicServer,
    identity: &Identity,
    req: PlanDischargeRequest,
) -> ApiResult<PlannedDischarge> {
    authorize_new::<PlannedDischarge>(server, identity, Some(req.patient_id)).await?;
    req.validate()?;

    let discharge = PlannedDischarge {
        id: Uuid::new_v4(),
        patient_id: req.patient_id,
        planned_by: Some(identity.user_id),
        planned_for: req.planned_for,
        notes: req.notes,
        completed: false,
        completed_at: None,
        created_at: Utc::now(),
    };
    insert(server, identity, discharge).await
}

/// Mark a planned discharge as done and discharge the patient.
pub async fn complete_discharge(
    server: &ClinicServer,
    identity: &Identity,
    id: Uuid,
) -> ApiResult<PlannedDischarge> {
    let discharge = modify::<PlannedDischarge>(server, identity, id, |discharge| {
        if discharge.completed {
            return Err(ApiError::conflict("Discharge has already been completed."));
        }
        discharge.completed = true;
        discharge.completed_at = Some(Utc::now());
        Ok(())
    })
    .await?;

    apply_ward_status(server, identity, discharge.patient_id, PatientWardAction::Discharge, None).await?;
    Ok(discharge)
}

async fn apply_ward_status(
    server: &ClinicServer,
    identity: &Identity,
    patient_id: Uuid,
    action: PatientWardAction,
    ward_room: Option<String>,
) -> ApiResult<()> {
    // The profile may have been removed after the ward record was written.
    let Some(mut patient) = server.repos.patients.get(patient_id).await? else {
        return Ok(());
    };
    let facts = scope::facts_of_patient(&patient);
    patient.status = server.policy.authorize_ward_action(identity, &facts, action)?;
    if ward_room.is_some() {
        patient.ward_room = ward_room;
    }
    server.repos.patients.update(patient).await?;

    info!(patient_id = %patient_id, action = action.verb(), by = %identity.user_id, "Ward status changed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClinicConfig;
    use database_layer::models::{Patient, PatientStatus, Role};

    fn nurse() -> Identity {
        Identity::new(Uuid::new_v4(), Role::Nurse)
    }

    async fn patient(server: &ClinicServer) -> Patient {
        server.repos.patients.insert(Patient::new(Uuid::new_v4())).await.unwrap()
    }

    #[tokio::test]
    async fn tasks_belong_to_their_nurse() {
        let server = ClinicServer::in_memory(ClinicConfig::default());
        let owner = nurse();
        let colleague = nurse();

        let task = create_task(
            &server,
            &owner,
            CreateTaskRequest {
                patient_id: None,
                description: "Check drip in bay 4".to_string(),
                due_at: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(task.nurse_id, owner.user_id);

        assert_eq!(list::<NurseTask>(&server, &colleague, None, Page::default()).await.unwrap().total, 0);
        let refused = complete_task(&server, &colleague, task.id).await;
        assert!(matches!(refused, Err(ApiError::NotFound { .. })));

        let done = complete_task(&server, &owner, task.id).await.unwrap();
        assert!(done.completed);
        assert!(done.completed_at.is_some());
    }

    #[tokio::test]
    async fn handover_notes_are_edited_by_their_author_only() {
        let server = ClinicServer::in_memory(ClinicConfig::default());
        let author = nurse();
        let colleague = nurse();

        let log = create_handover(
            &server,
            &author,
            HandoverRequest {
                patient_id: None,
                note: "Bed 3 restless overnight".to_string(),
            },
        )
        .await
        .unwrap();

        assert_eq!(list::<HandoverLog>(&server, &colleague, None, Page::default()).await.unwrap().total, 1);
        let refused = update_handover(
            &server,
            &colleague,
            log.id,
            UpdateHandoverRequest {
                note: "Edited".to_string(),
            },
        )
        .await;
        assert!(matches!(refused, Err(ApiError::Authorization { .. })));
    }

    #[tokio::test]
    async fn a_bed_holds_one_patient() {
        let server = ClinicServer::in_memory(ClinicConfig::default());
        let nurse = nurse();
        let first = patient(&server).await;
        let second = patient(&server).await;
        let bed = create_bed(
            &server,
            &nurse,
            CreateBedRequest {
                ward: "Maternity".to_string(),
                bed_number: "7".to_string(),
            },
        )
        .await
        .unwrap();

        let assigned = assign_bed(&server, &nurse, bed.id, AssignBedRequest { patient_id: first.id })
            .await
            .unwrap();
        assert!(assigned.occupied);

        let taken = assign_bed(&server, &nurse, bed.id, AssignBedRequest { patient_id: second.id }).await;
        assert!(matches!(taken, Err(ApiError::Conflict { .. })));

        let released = release_bed(&server, &nurse, bed.id).await.unwrap();
        assert!(!released.occupied);
        assert_eq!(released.patient_id, None);
    }

    #[tokio::test]
    async fn doses_are_administered_once() {
        let server = ClinicServer::in_memory(ClinicConfig::default());
        let nurse = nurse();
        let patient = patient(&server).await;
        let dose = schedule_medication(
            &server,
            &nurse,
            ScheduleMedicationRequest {
                patient_id: patient.id,
                prescription_id: None,
                name: "Paracetamol".to_string(),
                dosage: "1g".to_string(),
                scheduled_for: Utc::now(),
            },
        )
        .await
        .unwrap();

        let given = administer_medication(&server, &nurse, dose.id).await.unwrap();
        assert_eq!(given.administered_by, Some(nurse.user_id));
        assert!(matches!(
            administer_medication(&server, &nurse, dose.id).await,
            Err(ApiError::Conflict { .. })
        ));
    }

    #[tokio::test]
    async fn resolving_an_admission_admits_the_patient() {
        let server = ClinicServer::in_memory(ClinicConfig::default());
        let nurse = nurse();
        let patient = patient(&server).await;

        let admission = request_admission(
            &server,
            &nurse,
            CreateAdmissionRequest {
                patient_id: patient.id,
                ward: Some("Ward 2".to_string()),
                reason: "Observation".to_string(),
            },
        )
        .await
        .unwrap();
        resolve_admission(&server, &nurse, admission.id).await.unwrap();

        let patient = server.repos.patients.get(patient.id).await.unwrap().unwrap();
        assert_eq!(patient.status, PatientStatus::Admitted);
        assert_eq!(patient.ward_room.as_deref(), Some("Ward 2"));
    }

    #[tokio::test]
    async fn ward_records_are_closed_to_other_roles() {
        let server = ClinicServer::in_memory(ClinicConfig::default());
        let desk = Identity::new(Uuid::new_v4(), Role::Receptionist);

        let listing = list::<WardAlert>(&server, &desk, None, Page::default()).await;
        assert!(matches!(listing, Err(ApiError::Authorization { .. })));
    }
}
