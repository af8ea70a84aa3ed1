use auth_policy::{Identity, ResourceKind};
use chrono::Utc;
use database_layer::models::{MedicalRecord, Patient};
use database_layer::{Column, Page, RecordFilter};
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::scope::{self, list_visible};
use super::{require_appointment_of, require_patient};
use crate::error::ApiResult;
use crate::server::ClinicServer;
use crate::types::pagination::Paginated;

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateMedicalRecordRequest {
    pub patient_id: Uuid,
    pub appointment_id: Option<Uuid>,
    #[validate(length(min = 1, message = "Symptoms are required."))]
    pub symptoms: String,
    #[validate(length(min = 1, message = "Diagnosis is required."))]
    pub diagnosis: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct UpdateMedicalRecordRequest {
    #[validate(length(min = 1, message = "Symptoms cannot be blank."))]
    pub symptoms: Option<String>,
    #[validate(length(min = 1, message = "Diagnosis cannot be blank."))]
    pub diagnosis: Option<String>,
    pub notes: Option<String>,
}

pub async fn list_records(
    server: &ClinicServer,
    identity: &Identity,
    patient: Option<Uuid>,
    page: Page,
) -> ApiResult<Paginated<MedicalRecord>> {
    let narrowing = RecordFilter::all().and_eq_opt(Column::PatientId, patient);
    list_visible::<MedicalRecord>(server, identity, narrowing, page).await
}

/// Records nested under one patient, filtered like the flat list.
pub async fn list_patient_records(
    server: &ClinicServer,
    identity: &Identity,
    patient_id: Uuid,
    page: Page,
) -> ApiResult<Paginated<MedicalRecord>> {
    scope::load::<Patient>(&server.repos, patient_id).await?;
    list_records(server, identity, Some(patient_id), page).await
}

pub async fn get_record(
    server: &ClinicServer,
    identity: &Identity,
    id: Uuid,
) -> ApiResult<MedicalRecord> {
    let (record, _) = scope::load_visible::<MedicalRecord>(server, identity, id).await?;
    Ok(record)
}

/// The creator is always the caller, whatever the body says.
pub async fn create_record(
    server: &ClinicServer,
    identity: &Identity,
    req: CreateMedicalRecordRequest,
) -> ApiResult<MedicalRecord> {
    req.validate()?;
    let patient = require_patient(&server.repos, req.patient_id).await?;
    let facts = scope::facts_of_patient(&patient);
    server
        .policy
        .authorize_create(identity, ResourceKind::MedicalRecord, &facts)
        .into_result(ResourceKind::MedicalRecord)?;

    if let Some(appointment_id) = req.appointment_id {
        require_appointment_of(&server.repos, appointment_id, patient.id).await?;
    }

    let now = Utc::now();
    let record = MedicalRecord {
        id: Uuid::new_v4(),
        patient_id: patient.id,
        appointment_id: req.appointment_id,
        created_by: Some(identity.user_id),
        symptoms: req.symptoms,
        diagnosis: req.diagnosis,
        notes: req.notes,
        created_at: now,
        updated_at: now,
    };
    let record = server.repos.medical_records.insert(record).await?;

    info!(record_id = %record.id, patient_id = %patient.id, role = %identity.role, by = %identity.user_id, "Medical record created");
    Ok(record)
}

/// Clinical fields only; the patient and creator never change.
pub async fn update_record(
    server: &ClinicServer,
    identity: &Identity,
    id: Uuid,
    req: UpdateMedicalRecordRequest,
) -> ApiResult<MedicalRecord> {
    let (mut record, _) = scope::load_authorized::<MedicalRecord>(server, identity, id, |facts| {
        server.policy.authorize_update(identity, ResourceKind::MedicalRecord, facts)
    })
    .await?;
    req.validate()?;

    super::assign(&mut record.symptoms, req.symptoms);
    super::assign(&mut record.diagnosis, req.diagnosis);
    super::assign(&mut record.notes, req.notes);
    record.updated_at = Utc::now();

    let record = server.repos.medical_records.update(record).await?;
    info!(record_id = %id, role = %identity.role, by = %identity.user_id, "Medical record updated");
    Ok(record)
}

/// Removes the record together with the prescriptions written against it.
pub async fn delete_record(server: &ClinicServer, identity: &Identity, id: Uuid) -> ApiResult<()> {
    scope::load_authorized::<MedicalRecord>(server, identity, id, |facts| {
        server.policy.authorize_delete(identity, ResourceKind::MedicalRecord, facts)
    })
    .await?;

    server.repos.delete_medical_record(id).await?;
    info!(record_id = %id, by = %identity.user_id, "Medical record deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClinicConfig;
    use crate::error::ApiError;
    use database_layer::models::{Role, Specialization, User};

    async fn doctor(server: &ClinicServer, name: &str) -> Identity {
        let mut user = User::new(name, Role::Doctor);
        user.specialization = Some(Specialization::Pediatrician);
        Identity::from_user(&server.repos.users.insert(user).await.unwrap())
    }

    async fn patient_of(server: &ClinicServer, doctor: &Identity) -> Patient {
        let mut patient = Patient::new(Uuid::new_v4());
        patient.assigned_doctor_id = Some(doctor.user_id);
        server.repos.patients.insert(patient).await.unwrap()
    }

    fn request(patient_id: Uuid) -> CreateMedicalRecordRequest {
        CreateMedicalRecordRequest {
            patient_id,
            appointment_id: None,
            symptoms: "Fever".to_string(),
            diagnosis: "Malaria".to_string(),
            notes: String::new(),
        }
    }

    #[tokio::test]
    async fn creator_is_stamped_from_the_caller() {
        let server = ClinicServer::in_memory(ClinicConfig::default());
        let doctor = doctor(&server, "dr-a").await;
        let patient = patient_of(&server, &doctor).await;

        let record = create_record(&server, &doctor, request(patient.id)).await.unwrap();
        assert_eq!(record.created_by, Some(doctor.user_id));
    }

    #[tokio::test]
    async fn doctors_write_only_for_assigned_patients() {
        let server = ClinicServer::in_memory(ClinicConfig::default());
        let mine = doctor(&server, "dr-mine").await;
        let other = doctor(&server, "dr-other").await;
        let patient = patient_of(&server, &mine).await;

        let refused = create_record(&server, &other, request(patient.id)).await;
        assert!(matches!(refused, Err(ApiError::Authorization { .. })));

        let record = create_record(&server, &mine, request(patient.id)).await.unwrap();
        let refused = update_record(&server, &other, record.id, UpdateMedicalRecordRequest::default()).await;
        assert!(matches!(refused, Err(ApiError::Authorization { .. })));
    }

    #[tokio::test]
    async fn lab_technicians_write_for_anyone() {
        let server = ClinicServer::in_memory(ClinicConfig::default());
        let doctor = doctor(&server, "dr-b").await;
        let patient = patient_of(&server, &doctor).await;
        let lab = Identity::new(Uuid::new_v4(), Role::Lab);

        let record = create_record(&server, &lab, request(patient.id)).await.unwrap();
        assert_eq!(record.created_by, Some(lab.user_id));

        let listed = list_records(&server, &lab, None, Page::default()).await.unwrap();
        assert_eq!(listed.total, 1);
    }

    #[tokio::test]
    async fn receptionists_see_an_empty_list() {
        let server = ClinicServer::in_memory(ClinicConfig::default());
        let doctor = doctor(&server, "dr-c").await;
        let patient = patient_of(&server, &doctor).await;
        create_record(&server, &doctor, request(patient.id)).await.unwrap();

        let desk = Identity::new(Uuid::new_v4(), Role::Receptionist);
        let listed = list_records(&server, &desk, None, Page::default()).await.unwrap();
        assert_eq!(listed.total, 0);
    }
}
