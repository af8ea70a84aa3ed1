//! Medical records, prescriptions and lab results.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use database_layer::models::{LabResult, MedicalRecord, Prescription};
use uuid::Uuid;

use crate::error::{api_success, ApiError, ApiResponse};
use crate::middleware::AuthContext;
use crate::server::ClinicServer;
use crate::services::lab_results::{self, CreateLabResultRequest, UpdateLabResultRequest};
use crate::services::medical_records::{
    self, CreateMedicalRecordRequest, UpdateMedicalRecordRequest,
};
use crate::services::prescriptions::{
    self, CreatePrescriptionRequest, PrescriptionFilters, UpdatePrescriptionRequest,
};
use crate::types::filters::PatientFilter;

// =============================================================================
// Medical records
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/v1/medical-records",
    params(PatientFilter),
    responses(
        (status = 200, description = "Records visible to the caller", body = [MedicalRecord]),
        (status = 401, description = "Unauthorized")
    ),
    tag = "medical-records",
    security(("bearer_auth" = []))
)]
pub async fn list_medical_records(
    State(server): State<ClinicServer>,
    auth: AuthContext,
    Query(filter): Query<PatientFilter>,
) -> Result<Json<ApiResponse<Vec<MedicalRecord>>>, ApiError> {
    let page = medical_records::list_records(&server, &auth.identity, filter.patient, filter.page()).await?;
    Ok(Json(page.into_response()))
}

#[utoipa::path(
    get,
    path = "/api/v1/medical-records/{id}",
    params(("id" = Uuid, Path, description = "Medical record ID")),
    responses(
        (status = 200, description = "Medical record", body = MedicalRecord),
        (status = 404, description = "Medical record not found")
    ),
    tag = "medical-records",
    security(("bearer_auth" = []))
)]
pub async fn get_medical_record(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<MedicalRecord>>, ApiError> {
    let record = medical_records::get_record(&server, &auth.identity, id).await?;
    Ok(Json(api_success(record)))
}

#[utoipa::path(
    post,
    path = "/api/v1/medical-records",
    request_body = CreateMedicalRecordRequest,
    responses(
        (status = 201, description = "Medical record created", body = MedicalRecord),
        (status = 400, description = "Invalid patient or appointment"),
        (status = 403, description = "Assigned doctor or lab technician only")
    ),
    tag = "medical-records",
    security(("bearer_auth" = []))
)]
pub async fn create_medical_record(
    State(server): State<ClinicServer>,
    auth: AuthContext,
    Json(req): Json<CreateMedicalRecordRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MedicalRecord>>), ApiError> {
    let record = medical_records::create_record(&server, &auth.identity, req).await?;
    Ok((StatusCode::CREATED, Json(api_success(record))))
}

#[utoipa::path(
    put,
    path = "/api/v1/medical-records/{id}",
    params(("id" = Uuid, Path, description = "Medical record ID")),
    request_body = UpdateMedicalRecordRequest,
    responses(
        (status = 200, description = "Medical record updated", body = MedicalRecord),
        (status = 403, description = "Not the creator or assigned doctor"),
        (status = 404, description = "Medical record not found")
    ),
    tag = "medical-records",
    security(("bearer_auth" = []))
)]
pub async fn update_medical_record(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
    Json(req): Json<UpdateMedicalRecordRequest>,
) -> Result<Json<ApiResponse<MedicalRecord>>, ApiError> {
    let record = medical_records::update_record(&server, &auth.identity, id, req).await?;
    Ok(Json(api_success(record)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/medical-records/{id}",
    params(("id" = Uuid, Path, description = "Medical record ID")),
    responses(
        (status = 204, description = "Medical record and its prescriptions deleted"),
        (status = 403, description = "Admins only"),
        (status = 404, description = "Medical record not found")
    ),
    tag = "medical-records",
    security(("bearer_auth" = []))
)]
pub async fn delete_medical_record(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
) -> Result<StatusCode, ApiError> {
    medical_records::delete_record(&server, &auth.identity, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Prescriptions
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/v1/prescriptions",
    params(PrescriptionFilters),
    responses(
        (status = 200, description = "Prescriptions visible to the caller", body = [Prescription]),
        (status = 400, description = "Unknown status filter")
    ),
    tag = "prescriptions",
    security(("bearer_auth" = []))
)]
pub async fn list_prescriptions(
    State(server): State<ClinicServer>,
    auth: AuthContext,
    Query(filters): Query<PrescriptionFilters>,
) -> Result<Json<ApiResponse<Vec<Prescription>>>, ApiError> {
    let page = prescriptions::list_prescriptions(&server, &auth.identity, filters).await?;
    Ok(Json(page.into_response()))
}

#[utoipa::path(
    get,
    path = "/api/v1/prescriptions/{id}",
    params(("id" = Uuid, Path, description = "Prescription ID")),
    responses(
        (status = 200, description = "Prescription", body = Prescription),
        (status = 404, description = "Prescription not found")
    ),
    tag = "prescriptions",
    security(("bearer_auth" = []))
)]
pub async fn get_prescription(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<Prescription>>, ApiError> {
    let prescription = prescriptions::get_prescription(&server, &auth.identity, id).await?;
    Ok(Json(api_success(prescription)))
}

#[utoipa::path(
    post,
    path = "/api/v1/prescriptions",
    request_body = CreatePrescriptionRequest,
    responses(
        (status = 201, description = "Prescription written", body = Prescription),
        (status = 400, description = "Record does not belong to the patient"),
        (status = 403, description = "Assigned doctor only")
    ),
    tag = "prescriptions",
    security(("bearer_auth" = []))
)]
pub async fn create_prescription(
    State(server): State<ClinicServer>,
    auth: AuthContext,
    Json(req): Json<CreatePrescriptionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Prescription>>), ApiError> {
    let prescription = prescriptions::create_prescription(&server, &auth.identity, req).await?;
    Ok((StatusCode::CREATED, Json(api_success(prescription))))
}

#[utoipa::path(
    put,
    path = "/api/v1/prescriptions/{id}",
    params(("id" = Uuid, Path, description = "Prescription ID")),
    request_body = UpdatePrescriptionRequest,
    responses(
        (status = 200, description = "Prescription updated", body = Prescription),
        (status = 403, description = "Pharmacists may only change the status"),
        (status = 404, description = "Prescription not found")
    ),
    tag = "prescriptions",
    security(("bearer_auth" = []))
)]
pub async fn update_prescription(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
    Json(req): Json<UpdatePrescriptionRequest>,
) -> Result<Json<ApiResponse<Prescription>>, ApiError> {
    let prescription = prescriptions::update_prescription(&server, &auth.identity, id, req).await?;
    Ok(Json(api_success(prescription)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/prescriptions/{id}",
    params(("id" = Uuid, Path, description = "Prescription ID")),
    responses(
        (status = 204, description = "Prescription deleted"),
        (status = 403, description = "Not allowed to delete prescriptions"),
        (status = 404, description = "Prescription not found")
    ),
    tag = "prescriptions",
    security(("bearer_auth" = []))
)]
pub async fn delete_prescription(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
) -> Result<StatusCode, ApiError> {
    prescriptions::delete_prescription(&server, &auth.identity, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Lab results
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/v1/lab-results",
    params(PatientFilter),
    responses(
        (status = 200, description = "Lab results visible to the caller", body = [LabResult])
    ),
    tag = "lab-results",
    security(("bearer_auth" = []))
)]
pub async fn list_lab_results(
    State(server): State<ClinicServer>,
    auth: AuthContext,
    Query(filter): Query<PatientFilter>,
) -> Result<Json<ApiResponse<Vec<LabResult>>>, ApiError> {
    let page = lab_results::list_results(&server, &auth.identity, filter.patient, filter.page()).await?;
    Ok(Json(page.into_response()))
}

#[utoipa::path(
    get,
    path = "/api/v1/lab-results/{id}",
    params(("id" = Uuid, Path, description = "Lab result ID")),
    responses(
        (status = 200, description = "Lab result", body = LabResult),
        (status = 404, description = "Lab result not found")
    ),
    tag = "lab-results",
    security(("bearer_auth" = []))
)]
pub async fn get_lab_result(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<LabResult>>, ApiError> {
    let result = lab_results::get_result(&server, &auth.identity, id).await?;
    Ok(Json(api_success(result)))
}

#[utoipa::path(
    post,
    path = "/api/v1/lab-results",
    request_body = CreateLabResultRequest,
    responses(
        (status = 201, description = "Lab result recorded", body = LabResult),
        (status = 400, description = "Invalid patient or appointment"),
        (status = 403, description = "Lab technicians only")
    ),
    tag = "lab-results",
    security(("bearer_auth" = []))
)]
pub async fn create_lab_result(
    State(server): State<ClinicServer>,
    auth: AuthContext,
    Json(req): Json<CreateLabResultRequest>,
) -> Result<(StatusCode, Json<ApiResponse<LabResult>>), ApiError> {
    let result = lab_results::create_result(&server, &auth.identity, req).await?;
    Ok((StatusCode::CREATED, Json(api_success(result))))
}

#[utoipa::path(
    put,
    path = "/api/v1/lab-results/{id}",
    params(("id" = Uuid, Path, description = "Lab result ID")),
    request_body = UpdateLabResultRequest,
    responses(
        (status = 200, description = "Lab result updated", body = LabResult),
        (status = 404, description = "Lab result not found")
    ),
    tag = "lab-results",
    security(("bearer_auth" = []))
)]
pub async fn update_lab_result(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
    Json(req): Json<UpdateLabResultRequest>,
) -> Result<Json<ApiResponse<LabResult>>, ApiError> {
    let result = lab_results::update_result(&server, &auth.identity, id, req).await?;
    Ok(Json(api_success(result)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/lab-results/{id}",
    params(("id" = Uuid, Path, description = "Lab result ID")),
    responses(
        (status = 204, description = "Lab result deleted"),
        (status = 404, description = "Lab result not found")
    ),
    tag = "lab-results",
    security(("bearer_auth" = []))
)]
pub async fn delete_lab_result(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
) -> Result<StatusCode, ApiError> {
    lab_results::delete_result(&server, &auth.identity, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
