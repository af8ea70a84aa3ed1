use auth_policy::{Identity, ResourceKind};
use chrono::Utc;
use database_layer::models::{Prescription, PrescriptionStatus};
use database_layer::{Column, Page, RecordFilter};
use serde::Deserialize;
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::scope::{self, list_visible};
use super::{assign, parse_field, parse_filter, require_appointment_of, require_patient};
use crate::error::{ApiError, ApiResult};
use crate::server::ClinicServer;
use crate::types::pagination::Paginated;

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreatePrescriptionRequest {
    pub patient_id: Uuid,
    /// Must describe the same patient.
    pub medical_record_id: Uuid,
    pub appointment_id: Option<Uuid>,
    #[validate(length(min = 1, max = 200, message = "Medication name is required."))]
    pub medication_name: String,
    #[validate(length(min = 1, max = 100, message = "Dosage is required."))]
    pub dosage: String,
    #[validate(length(min = 1, max = 100, message = "Duration is required."))]
    pub duration: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct UpdatePrescriptionRequest {
    #[validate(length(min = 1, max = 200))]
    pub medication_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub dosage: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub duration: Option<String>,
    pub notes: Option<String>,
    /// PENDING, DISPENSED or CANCELLED. Assigned freely.
    pub status: Option<String>,
}

impl UpdatePrescriptionRequest {
    fn changes_clinical_fields(&self) -> bool {
        self.medication_name.is_some()
            || self.dosage.is_some()
            || self.duration.is_some()
            || self.notes.is_some()
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PrescriptionFilters {
    pub patient: Option<Uuid>,
    pub status: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

pub async fn list_prescriptions(
    server: &ClinicServer,
    identity: &Identity,
    filters: PrescriptionFilters,
) -> ApiResult<Paginated<Prescription>> {
    let status = parse_filter::<PrescriptionStatus>("status", filters.status.as_deref())?;
    let narrowing = RecordFilter::all()
        .and_eq_opt(Column::PatientId, filters.patient)
        .and_status(status.map(PrescriptionStatus::as_str));
    let page = Page::new(filters.page, filters.page_size);
    list_visible::<Prescription>(server, identity, narrowing, page).await
}

pub async fn get_prescription(
    server: &ClinicServer,
    identity: &Identity,
    id: Uuid,
) -> ApiResult<Prescription> {
    let (prescription, _) = scope::load_visible::<Prescription>(server, identity, id).await?;
    Ok(prescription)
}

/// Doctors only; the prescribing doctor is the caller.
pub async fn create_prescription(
    server: &ClinicServer,
    identity: &Identity,
    req: CreatePrescriptionRequest,
) -> ApiResult<Prescription> {
    req.validate()?;
    let patient = require_patient(&server.repos, req.patient_id).await?;
    server
        .policy
        .authorize_create(identity, ResourceKind::Prescription, &scope::facts_of_patient(&patient))
        .into_result(ResourceKind::Prescription)?;

    server
        .repos
        .medical_records
        .get(req.medical_record_id)
        .await?
        .filter(|r| r.patient_id == patient.id)
        .ok_or_else(|| {
            ApiError::field("medical_record_id", "Medical record does not belong to this patient.")
        })?;
    if let Some(appointment_id) = req.appointment_id {
        require_appointment_of(&server.repos, appointment_id, patient.id).await?;
    }

    let now = Utc::now();
    let prescription = Prescription {
        id: Uuid::new_v4(),
        patient_id: patient.id,
        medical_record_id: req.medical_record_id,
        prescribed_by: Some(identity.user_id),
        appointment_id: req.appointment_id,
        medication_name: req.medication_name,
        dosage: req.dosage,
        duration: req.duration,
        notes: req.notes,
        status: PrescriptionStatus::Pending,
        created_at: now,
        updated_at: now,
    };
    let prescription = server.repos.prescriptions.insert(prescription).await?;

    info!(prescription_id = %prescription.id, patient_id = %patient.id, by = %identity.user_id, "Prescription written");
    Ok(prescription)
}

/// Doctors change any field; pharmacists only the status.
pub async fn update_prescription(
    server: &ClinicServer,
    identity: &Identity,
    id: Uuid,
    req: UpdatePrescriptionRequest,
) -> ApiResult<Prescription> {
    let clinical = req.changes_clinical_fields();
    let (mut prescription, _) = scope::load_authorized::<Prescription>(server, identity, id, |facts| {
        server.policy.authorize_prescription_update(identity, facts, clinical)
    })
    .await?;
    req.validate()?;

    if let Some(status) = req.status.as_deref() {
        let status: PrescriptionStatus = parse_field("status", status)?;
        if status != prescription.status {
            info!(prescription_id = %id, from = %prescription.status, to = %status, by = %identity.user_id, "Prescription status changed");
        }
        prescription.status = status;
    }
    assign(&mut prescription.medication_name, req.medication_name);
    assign(&mut prescription.dosage, req.dosage);
    assign(&mut prescription.duration, req.duration);
    assign(&mut prescription.notes, req.notes);
    prescription.updated_at = Utc::now();

    Ok(server.repos.prescriptions.update(prescription).await?)
}

pub async fn delete_prescription(server: &ClinicServer, identity: &Identity, id: Uuid) -> ApiResult<()> {
    scope::load_authorized::<Prescription>(server, identity, id, |facts| {
        server.policy.authorize_delete(identity, ResourceKind::Prescription, facts)
    })
    .await?;

    server.repos.delete_prescription(id).await?;
    info!(prescription_id = %id, by = %identity.user_id, "Prescription deleted");
    Ok(())
}
