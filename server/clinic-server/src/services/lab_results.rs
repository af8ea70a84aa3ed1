use auth_policy::{Identity, ResourceKind};
use chrono::Utc;
use database_layer::models::LabResult;
use database_layer::{Column, Page, RecordFilter};
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::scope::{self, list_visible};
use super::{assign, require_appointment_of, require_patient};
use crate::error::ApiResult;
use crate::server::ClinicServer;
use crate::types::pagination::Paginated;

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateLabResultRequest {
    pub patient_id: Uuid,
    pub appointment_id: Option<Uuid>,
    #[validate(length(min = 1, max = 200, message = "Test name is required."))]
    pub test_name: String,
    #[validate(length(min = 1, message = "Result is required."))]
    pub result: String,
}

#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct UpdateLabResultRequest {
    #[validate(length(min = 1, max = 200))]
    pub test_name: Option<String>,
    #[validate(length(min = 1))]
    pub result: Option<String>,
}

pub async fn list_results(
    server: &ClinicServer,
    identity: &Identity,
    patient: Option<Uuid>,
    page: Page,
) -> ApiResult<Paginated<LabResult>> {
    let narrowing = RecordFilter::all().and_eq_opt(Column::PatientId, patient);
    list_visible::<LabResult>(server, identity, narrowing, page).await
}

pub async fn get_result(server: &ClinicServer, identity: &Identity, id: Uuid) -> ApiResult<LabResult> {
    let (result, _) = scope::load_visible::<LabResult>(server, identity, id).await?;
    Ok(result)
}

pub async fn create_result(
    server: &ClinicServer,
    identity: &Identity,
    req: CreateLabResultRequest,
) -> ApiResult<LabResult> {
    req.validate()?;
    let patient = require_patient(&server.repos, req.patient_id).await?;
    server
        .policy
        .authorize_create(identity, ResourceKind::LabResult, &scope::facts_of_patient(&patient))
        .into_result(ResourceKind::LabResult)?;
    if let Some(appointment_id) = req.appointment_id {
        require_appointment_of(&server.repos, appointment_id, patient.id).await?;
    }

    let result = LabResult {
        id: Uuid::new_v4(),
        patient_id: patient.id,
        appointment_id: req.appointment_id,
        test_name: req.test_name,
        result: req.result,
        created_by: Some(identity.user_id),
        created_at: Utc::now(),
    };
    let result = server.repos.lab_results.insert(result).await?;

    info!(lab_result_id = %result.id, patient_id = %patient.id, by = %identity.user_id, "Lab result recorded");
    Ok(result)
}

pub async fn update_result(
    server: &ClinicServer,
    identity: &Identity,
    id: Uuid,
    req: UpdateLabResultRequest,
) -> ApiResult<LabResult> {
    let (mut result, _) = scope::load_authorized::<LabResult>(server, identity, id, |facts| {
        server.policy.authorize_update(identity, ResourceKind::LabResult, facts)
    })
    .await?;
    req.validate()?;

    assign(&mut result.test_name, req.test_name);
    assign(&mut result.result, req.result);

    let result = server.repos.lab_results.update(result).await?;
    info!(lab_result_id = %id, by = %identity.user_id, "Lab result updated");
    Ok(result)
}

pub async fn delete_result(server: &ClinicServer, identity: &Identity, id: Uuid) -> ApiResult<()> {
    scope::load_authorized::<LabResult>(server, identity, id, |facts| {
        server.policy.authorize_delete(identity, ResourceKind::LabResult, facts)
    })
    .await?;

    server.repos.lab_results.delete(id).await?;
    info!(lab_result_id = %id, by = %identity.user_id, "Lab result deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClinicConfig;
    use crate::error::ApiError;
    use database_layer::models::{Patient, Role};

    fn request(patient_id: Uuid) -> CreateLabResultRequest {
        CreateLabResultRequest {
            patient_id,
            appointment_id: None,
            test_name: "Full blood count".to_string(),
            result: "Normal".to_string(),
        }
    }

    #[tokio::test]
    async fn technicians_see_and_edit_only_their_own_results() {
        let server = ClinicServer::in_memory(ClinicConfig::default());
        let patient = server.repos.patients.insert(Patient::new(Uuid::new_v4())).await.unwrap();
        let author = Identity::new(Uuid::new_v4(), Role::Lab);
        let colleague = Identity::new(Uuid::new_v4(), Role::Lab);

        let result = create_result(&server, &author, request(patient.id)).await.unwrap();
        assert_eq!(result.created_by, Some(author.user_id));

        assert_eq!(list_results(&server, &colleague, None, Page::default()).await.unwrap().total, 0);
        let hidden = get_result(&server, &colleague, result.id).await;
        assert!(matches!(hidden, Err(ApiError::NotFound { .. })));

        let edit = update_result(&server, &colleague, result.id, UpdateLabResultRequest::default()).await;
        assert!(matches!(edit, Err(ApiError::NotFound { .. })));
    }

    #[tokio::test]
    async fn only_technicians_record_results() {
        let server = ClinicServer::in_memory(ClinicConfig::default());
        let patient = server.repos.patients.insert(Patient::new(Uuid::new_v4())).await.unwrap();
        let nurse = Identity::new(Uuid::new_v4(), Role::Nurse);

        let refused = create_result(&server, &nurse, request(patient.id)).await;
        assert!(matches!(refused, Err(ApiError::Authorization { .. })));
    }
}
