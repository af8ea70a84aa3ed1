use auth_policy::PatientWardAction;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use database_layer::models::{MedicalRecord, Patient};
use uuid::Uuid;

use crate::error::{api_success, ApiError, ApiResponse};
use crate::middleware::AuthContext;
use crate::server::ClinicServer;
use crate::services::medical_records;
use crate::services::patients::{
    self, CreatePatientRequest, RegisteredPatient, UpdatePatientRequest, WardActionRequest,
};
use crate::types::filters::StatusFilter;
use crate::types::pagination::PaginationParams;

#[utoipa::path(
    get,
    path = "/api/v1/patients",
    params(StatusFilter),
    responses(
        (status = 200, description = "Patients visible to the caller", body = [Patient]),
        (status = 400, description = "Unknown status filter"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "patients",
    security(("bearer_auth" = []))
)]
pub async fn list_patients(
    State(server): State<ClinicServer>,
    auth: AuthContext,
    Query(filter): Query<StatusFilter>,
) -> Result<Json<ApiResponse<Vec<Patient>>>, ApiError> {
    let page =
        patients::list_patients(&server, &auth.identity, filter.status.as_deref(), filter.page()).await?;
    Ok(Json(page.into_response()))
}

#[utoipa::path(
    get,
    path = "/api/v1/patients/{id}",
    params(("id" = Uuid, Path, description = "Patient profile ID")),
    responses(
        (status = 200, description = "Patient profile", body = Patient),
        (status = 404, description = "Patient not found")
    ),
    tag = "patients",
    security(("bearer_auth" = []))
)]
pub async fn get_patient(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<Patient>>, ApiError> {
    let patient = patients::get_patient(&server, &auth.identity, id).await?;
    Ok(Json(api_success(patient)))
}

/// Desk registration of a new patient
#[utoipa::path(
    post,
    path = "/api/v1/patients",
    request_body = CreatePatientRequest,
    responses(
        (status = 201, description = "Patient account and profile created", body = RegisteredPatient),
        (status = 400, description = "Invalid request"),
        (status = 403, description = "Receptionist or Admin only"),
        (status = 409, description = "Username already taken")
    ),
    tag = "patients",
    security(("bearer_auth" = []))
)]
pub async fn create_patient(
    State(server): State<ClinicServer>,
    auth: AuthContext,
    Json(req): Json<CreatePatientRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RegisteredPatient>>), ApiError> {
    let registered = patients::create_patient(&server, &auth.identity, req).await?;
    Ok((StatusCode::CREATED, Json(api_success(registered))))
}

#[utoipa::path(
    put,
    path = "/api/v1/patients/{id}",
    params(("id" = Uuid, Path, description = "Patient profile ID")),
    request_body = UpdatePatientRequest,
    responses(
        (status = 200, description = "Patient updated", body = Patient),
        (status = 400, description = "Invalid request"),
        (status = 403, description = "Not allowed to change this profile"),
        (status = 404, description = "Patient not found")
    ),
    tag = "patients",
    security(("bearer_auth" = []))
)]
pub async fn update_patient(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
    Json(req): Json<UpdatePatientRequest>,
) -> Result<Json<ApiResponse<Patient>>, ApiError> {
    let patient = patients::update_patient(&server, &auth.identity, id, req).await?;
    Ok(Json(api_success(patient)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/patients/{id}",
    params(("id" = Uuid, Path, description = "Patient profile ID")),
    responses(
        (status = 204, description = "Patient and account deleted"),
        (status = 403, description = "Receptionist or Admin only"),
        (status = 404, description = "Patient not found")
    ),
    tag = "patients",
    security(("bearer_auth" = []))
)]
pub async fn delete_patient(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
) -> Result<StatusCode, ApiError> {
    patients::delete_patient(&server, &auth.identity, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn ward_action(
    server: ClinicServer,
    auth: AuthContext,
    id: Uuid,
    action: PatientWardAction,
    req: Option<Json<WardActionRequest>>,
) -> Result<Json<ApiResponse<Patient>>, ApiError> {
    let req = req.map(|Json(r)| r).unwrap_or_default();
    let patient = patients::ward_action(&server, &auth.identity, id, action, req).await?;
    Ok(Json(api_success(patient)))
}

#[utoipa::path(
    post,
    path = "/api/v1/patients/{id}/admit",
    params(("id" = Uuid, Path, description = "Patient profile ID")),
    request_body(content = WardActionRequest, description = "Optional ward observations"),
    responses(
        (status = 200, description = "Patient admitted", body = Patient),
        (status = 403, description = "Nurse, Admin or assigned Doctor only"),
        (status = 404, description = "Patient not found")
    ),
    tag = "patients",
    security(("bearer_auth" = []))
)]
pub async fn admit(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
    req: Option<Json<WardActionRequest>>,
) -> Result<Json<ApiResponse<Patient>>, ApiError> {
    ward_action(server, auth, id, PatientWardAction::Admit, req).await
}

#[utoipa::path(
    post,
    path = "/api/v1/patients/{id}/attend",
    params(("id" = Uuid, Path, description = "Patient profile ID")),
    request_body(content = WardActionRequest, description = "Optional ward observations"),
    responses(
        (status = 200, description = "Patient attended", body = Patient),
        (status = 403, description = "Nurse, Admin or assigned Doctor only"),
        (status = 404, description = "Patient not found")
    ),
    tag = "patients",
    security(("bearer_auth" = []))
)]
pub async fn attend(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
    req: Option<Json<WardActionRequest>>,
) -> Result<Json<ApiResponse<Patient>>, ApiError> {
    ward_action(server, auth, id, PatientWardAction::Attend, req).await
}

#[utoipa::path(
    post,
    path = "/api/v1/patients/{id}/discharge",
    params(("id" = Uuid, Path, description = "Patient profile ID")),
    request_body(content = WardActionRequest, description = "Optional ward observations"),
    responses(
        (status = 200, description = "Patient discharged", body = Patient),
        (status = 403, description = "Nurse, Admin or assigned Doctor only"),
        (status = 404, description = "Patient not found")
    ),
    tag = "patients",
    security(("bearer_auth" = []))
)]
pub async fn discharge(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
    req: Option<Json<WardActionRequest>>,
) -> Result<Json<ApiResponse<Patient>>, ApiError> {
    ward_action(server, auth, id, PatientWardAction::Discharge, req).await
}

/// Medical records of one patient, filtered like the flat list
#[utoipa::path(
    get,
    path = "/api/v1/patients/{id}/medical-records",
    params(("id" = Uuid, Path, description = "Patient profile ID"), PaginationParams),
    responses(
        (status = 200, description = "Visible records of the patient", body = [MedicalRecord]),
        (status = 404, description = "Patient not found")
    ),
    tag = "medical-records",
    security(("bearer_auth" = []))
)]
pub async fn patient_medical_records(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<Vec<MedicalRecord>>>, ApiError> {
    let page = medical_records::list_patient_records(&server, &auth.identity, id, params.page()).await?;
    Ok(Json(page.into_response()))
}
