//! Nursing ward endpoints. Nurse and Admin only.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use database_layer::models::{
    BedStatus, HandoverLog, MedicationSchedule, NurseTask, PendingAdmission, PlannedDischarge,
    WardAlert,
};
use uuid::Uuid;

use crate::error::{api_success, ApiError, ApiResponse};
use crate::middleware::AuthContext;
use crate::server::ClinicServer;
use crate::services::scope::Scoped;
use crate::services::ward::{
    self, AssignBedRequest, CreateAdmissionRequest, CreateBedRequest, CreateTaskRequest,
    HandoverRequest, PlanDischargeRequest, RaiseAlertRequest, ScheduleMedicationRequest,
    UpdateHandoverRequest, UpdateTaskRequest,
};
use crate::types::filters::PatientFilter;

type Listed<T> = Result<Json<ApiResponse<Vec<T>>>, ApiError>;
type One<T> = Result<Json<ApiResponse<T>>, ApiError>;
type Created<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

async fn list<T: Scoped>(server: &ClinicServer, auth: &AuthContext, filter: &PatientFilter) -> Listed<T> {
    let page = ward::list::<T>(server, &auth.identity, filter.patient, filter.page()).await?;
    Ok(Json(page.into_response()))
}

async fn get<T: Scoped>(server: &ClinicServer, auth: &AuthContext, id: Uuid) -> One<T> {
    Ok(Json(api_success(ward::get::<T>(server, &auth.identity, id).await?)))
}

async fn delete<T: Scoped>(server: &ClinicServer, auth: &AuthContext, id: Uuid) -> Result<StatusCode, ApiError> {
    ward::delete::<T>(server, &auth.identity, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn created<T>(row: T) -> (StatusCode, Json<ApiResponse<T>>) {
    (StatusCode::CREATED, Json(api_success(row)))
}

// =============================================================================
// Tasks
// =============================================================================

/// The caller's own tasks (all tasks for Admin)
#[utoipa::path(
    get,
    path = "/api/v1/ward/tasks",
    params(PatientFilter),
    responses((status = 200, description = "Tasks", body = [NurseTask]), (status = 403, description = "Nurse or Admin only")),
    tag = "ward",
    security(("bearer_auth" = []))
)]
pub async fn list_tasks(
    State(server): State<ClinicServer>,
    auth: AuthContext,
    Query(filter): Query<PatientFilter>,
) -> Listed<NurseTask> {
    list(&server, &auth, &filter).await
}

#[utoipa::path(
    post,
    path = "/api/v1/ward/tasks",
    request_body = CreateTaskRequest,
    responses((status = 201, description = "Task created", body = NurseTask), (status = 403, description = "Nurse or Admin only")),
    tag = "ward",
    security(("bearer_auth" = []))
)]
pub async fn create_task(
    State(server): State<ClinicServer>,
    auth: AuthContext,
    Json(req): Json<CreateTaskRequest>,
) -> Created<NurseTask> {
    Ok(created(ward::create_task(&server, &auth.identity, req).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/ward/tasks/{id}",
    params(("id" = Uuid, Path, description = "Task ID")),
    responses((status = 200, description = "Task", body = NurseTask), (status = 404, description = "Task not found")),
    tag = "ward",
    security(("bearer_auth" = []))
)]
pub async fn get_task(State(server): State<ClinicServer>, Path(id): Path<Uuid>, auth: AuthContext) -> One<NurseTask> {
    get(&server, &auth, id).await
}

#[utoipa::path(
    put,
    path = "/api/v1/ward/tasks/{id}",
    params(("id" = Uuid, Path, description = "Task ID")),
    request_body = UpdateTaskRequest,
    responses((status = 200, description = "Task updated", body = NurseTask), (status = 404, description = "Task not found")),
    tag = "ward",
    security(("bearer_auth" = []))
)]
pub async fn update_task(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
    Json(req): Json<UpdateTaskRequest>,
) -> One<NurseTask> {
    Ok(Json(api_success(ward::update_task(&server, &auth.identity, id, req).await?)))
}

#[utoipa::path(
    post,
    path = "/api/v1/ward/tasks/{id}/complete",
    params(("id" = Uuid, Path, description = "Task ID")),
    responses((status = 200, description = "Task completed", body = NurseTask), (status = 404, description = "Task not found")),
    tag = "ward",
    security(("bearer_auth" = []))
)]
pub async fn complete_task(State(server): State<ClinicServer>, Path(id): Path<Uuid>, auth: AuthContext) -> One<NurseTask> {
    Ok(Json(api_success(ward::complete_task(&server, &auth.identity, id).await?)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/ward/tasks/{id}",
    params(("id" = Uuid, Path, description = "Task ID")),
    responses((status = 204, description = "Task deleted"), (status = 404, description = "Task not found")),
    tag = "ward",
    security(("bearer_auth" = []))
)]
pub async fn delete_task(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
) -> Result<StatusCode, ApiError> {
    delete::<NurseTask>(&server, &auth, id).await
}

// =============================================================================
// Alerts
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/v1/ward/alerts",
    params(PatientFilter),
    responses((status = 200, description = "Alerts", body = [WardAlert])),
    tag = "ward",
    security(("bearer_auth" = []))
)]
pub async fn list_alerts(
    State(server): State<ClinicServer>,
    auth: AuthContext,
    Query(filter): Query<PatientFilter>,
) -> Listed<WardAlert> {
    list(&server, &auth, &filter).await
}

#[utoipa::path(
    post,
    path = "/api/v1/ward/alerts",
    request_body = RaiseAlertRequest,
    responses((status = 201, description = "Alert raised", body = WardAlert), (status = 400, description = "Unknown severity")),
    tag = "ward",
    security(("bearer_auth" = []))
)]
pub async fn raise_alert(
    State(server): State<ClinicServer>,
    auth: AuthContext,
    Json(req): Json<RaiseAlertRequest>,
) -> Created<WardAlert> {
    Ok(created(ward::raise_alert(&server, &auth.identity, req).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/ward/alerts/{id}",
    params(("id" = Uuid, Path, description = "Alert ID")),
    responses((status = 200, description = "Alert", body = WardAlert), (status = 404, description = "Alert not found")),
    tag = "ward",
    security(("bearer_auth" = []))
)]
pub async fn get_alert(State(server): State<ClinicServer>, Path(id): Path<Uuid>, auth: AuthContext) -> One<WardAlert> {
    get(&server, &auth, id).await
}

#[utoipa::path(
    post,
    path = "/api/v1/ward/alerts/{id}/acknowledge",
    params(("id" = Uuid, Path, description = "Alert ID")),
    responses((status = 200, description = "Alert acknowledged", body = WardAlert), (status = 404, description = "Alert not found")),
    tag = "ward",
    security(("bearer_auth" = []))
)]
pub async fn acknowledge_alert(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
) -> One<WardAlert> {
    Ok(Json(api_success(ward::acknowledge_alert(&server, &auth.identity, id).await?)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/ward/alerts/{id}",
    params(("id" = Uuid, Path, description = "Alert ID")),
    responses((status = 204, description = "Alert deleted"), (status = 404, description = "Alert not found")),
    tag = "ward",
    security(("bearer_auth" = []))
)]
pub async fn delete_alert(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
) -> Result<StatusCode, ApiError> {
    delete::<WardAlert>(&server, &auth, id).await
}

// =============================================================================
// Beds
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/v1/ward/beds",
    params(PatientFilter),
    responses((status = 200, description = "Beds", body = [BedStatus])),
    tag = "ward",
    security(("bearer_auth" = []))
)]
pub async fn list_beds(
    State(server): State<ClinicServer>,
    auth: AuthContext,
    Query(filter): Query<PatientFilter>,
) -> Listed<BedStatus> {
    list(&server, &auth, &filter).await
}

#[utoipa::path(
    post,
    path = "/api/v1/ward/beds",
    request_body = CreateBedRequest,
    responses((status = 201, description = "Bed added", body = BedStatus), (status = 409, description = "Bed already exists in this ward")),
    tag = "ward",
    security(("bearer_auth" = []))
)]
pub async fn create_bed(
    State(server): State<ClinicServer>,
    auth: AuthContext,
    Json(req): Json<CreateBedRequest>,
) -> Created<BedStatus> {
    Ok(created(ward::create_bed(&server, &auth.identity, req).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/ward/beds/{id}",
    params(("id" = Uuid, Path, description = "Bed ID")),
    responses((status = 200, description = "Bed", body = BedStatus), (status = 404, description = "Bed not found")),
    tag = "ward",
    security(("bearer_auth" = []))
)]
pub async fn get_bed(State(server): State<ClinicServer>, Path(id): Path<Uuid>, auth: AuthContext) -> One<BedStatus> {
    get(&server, &auth, id).await
}

#[utoipa::path(
    post,
    path = "/api/v1/ward/beds/{id}/assign",
    params(("id" = Uuid, Path, description = "Bed ID")),
    request_body = AssignBedRequest,
    responses((status = 200, description = "Patient placed in bed", body = BedStatus), (status = 409, description = "Bed or patient already placed")),
    tag = "ward",
    security(("bearer_auth" = []))
)]
pub async fn assign_bed(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
    Json(req): Json<AssignBedRequest>,
) -> One<BedStatus> {
    Ok(Json(api_success(ward::assign_bed(&server, &auth.identity, id, req).await?)))
}

#[utoipa::path(
    post,
    path = "/api/v1/ward/beds/{id}/release",
    params(("id" = Uuid, Path, description = "Bed ID")),
    responses((status = 200, description = "Bed freed", body = BedStatus), (status = 404, description = "Bed not found")),
    tag = "ward",
    security(("bearer_auth" = []))
)]
pub async fn release_bed(State(server): State<ClinicServer>, Path(id): Path<Uuid>, auth: AuthContext) -> One<BedStatus> {
    Ok(Json(api_success(ward::release_bed(&server, &auth.identity, id).await?)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/ward/beds/{id}",
    params(("id" = Uuid, Path, description = "Bed ID")),
    responses((status = 204, description = "Bed removed"), (status = 404, description = "Bed not found")),
    tag = "ward",
    security(("bearer_auth" = []))
)]
pub async fn delete_bed(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
) -> Result<StatusCode, ApiError> {
    delete::<BedStatus>(&server, &auth, id).await
}

// =============================================================================
// Medication rounds
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/v1/ward/medications",
    params(PatientFilter),
    responses((status = 200, description = "Scheduled doses", body = [MedicationSchedule])),
    tag = "ward",
    security(("bearer_auth" = []))
)]
pub async fn list_medications(
    State(server): State<ClinicServer>,
    auth: AuthContext,
    Query(filter): Query<PatientFilter>,
) -> Listed<MedicationSchedule> {
    list(&server, &auth, &filter).await
}

#[utoipa::path(
    post,
    path = "/api/v1/ward/medications",
    request_body = ScheduleMedicationRequest,
    responses((status = 201, description = "Dose scheduled", body = MedicationSchedule), (status = 400, description = "Invalid patient or prescription")),
    tag = "ward",
    security(("bearer_auth" = []))
)]
pub async fn schedule_medication(
    State(server): State<ClinicServer>,
    auth: AuthContext,
    Json(req): Json<ScheduleMedicationRequest>,
) -> Created<MedicationSchedule> {
    Ok(created(ward::schedule_medication(&server, &auth.identity, req).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/ward/medications/{id}",
    params(("id" = Uuid, Path, description = "Scheduled dose ID")),
    responses((status = 200, description = "Scheduled dose", body = MedicationSchedule), (status = 404, description = "Dose not found")),
    tag = "ward",
    security(("bearer_auth" = []))
)]
pub async fn get_medication(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
) -> One<MedicationSchedule> {
    get(&server, &auth, id).await
}

#[utoipa::path(
    post,
    path = "/api/v1/ward/medications/{id}/administer",
    params(("id" = Uuid, Path, description = "Scheduled dose ID")),
    responses((status = 200, description = "Dose given", body = MedicationSchedule), (status = 409, description = "Dose already given")),
    tag = "ward",
    security(("bearer_auth" = []))
)]
pub async fn administer_medication(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
) -> One<MedicationSchedule> {
    Ok(Json(api_success(ward::administer_medication(&server, &auth.identity, id).await?)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/ward/medications/{id}",
    params(("id" = Uuid, Path, description = "Scheduled dose ID")),
    responses((status = 204, description = "Dose removed"), (status = 404, description = "Dose not found")),
    tag = "ward",
    security(("bearer_auth" = []))
)]
pub async fn delete_medication(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
) -> Result<StatusCode, ApiError> {
    delete::<MedicationSchedule>(&server, &auth, id).await
}

// =============================================================================
// Handover notes
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/v1/ward/handovers",
    params(PatientFilter),
    responses((status = 200, description = "Handover notes", body = [HandoverLog])),
    tag = "ward",
    security(("bearer_auth" = []))
)]
pub async fn list_handovers(
    State(server): State<ClinicServer>,
    auth: AuthContext,
    Query(filter): Query<PatientFilter>,
) -> Listed<HandoverLog> {
    list(&server, &auth, &filter).await
}

#[utoipa::path(
    post,
    path = "/api/v1/ward/handovers",
    request_body = HandoverRequest,
    responses((status = 201, description = "Handover note written", body = HandoverLog)),
    tag = "ward",
    security(("bearer_auth" = []))
)]
pub async fn create_handover(
    State(server): State<ClinicServer>,
    auth: AuthContext,
    Json(req): Json<HandoverRequest>,
) -> Created<HandoverLog> {
    Ok(created(ward::create_handover(&server, &auth.identity, req).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/ward/handovers/{id}",
    params(("id" = Uuid, Path, description = "Handover note ID")),
    responses((status = 200, description = "Handover note", body = HandoverLog), (status = 404, description = "Note not found")),
    tag = "ward",
    security(("bearer_auth" = []))
)]
pub async fn get_handover(State(server): State<ClinicServer>, Path(id): Path<Uuid>, auth: AuthContext) -> One<HandoverLog> {
    get(&server, &auth, id).await
}

#[utoipa::path(
    put,
    path = "/api/v1/ward/handovers/{id}",
    params(("id" = Uuid, Path, description = "Handover note ID")),
    request_body = UpdateHandoverRequest,
    responses((status = 200, description = "Note updated", body = HandoverLog), (status = 403, description = "Author only")),
    tag = "ward",
    security(("bearer_auth" = []))
)]
pub async fn update_handover(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
    Json(req): Json<UpdateHandoverRequest>,
) -> One<HandoverLog> {
    Ok(Json(api_success(ward::update_handover(&server, &auth.identity, id, req).await?)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/ward/handovers/{id}",
    params(("id" = Uuid, Path, description = "Handover note ID")),
    responses((status = 204, description = "Note deleted"), (status = 403, description = "Author only")),
    tag = "ward",
    security(("bearer_auth" = []))
)]
pub async fn delete_handover(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
) -> Result<StatusCode, ApiError> {
    delete::<HandoverLog>(&server, &auth, id).await
}

// =============================================================================
// Admissions and discharges
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/v1/ward/admissions",
    params(PatientFilter),
    responses((status = 200, description = "Pending admissions", body = [PendingAdmission])),
    tag = "ward",
    security(("bearer_auth" = []))
)]
pub async fn list_admissions(
    State(server): State<ClinicServer>,
    auth: AuthContext,
    Query(filter): Query<PatientFilter>,
) -> Listed<PendingAdmission> {
    list(&server, &auth, &filter).await
}

#[utoipa::path(
    post,
    path = "/api/v1/ward/admissions",
    request_body = CreateAdmissionRequest,
    responses((status = 201, description = "Admission requested", body = PendingAdmission)),
    tag = "ward",
    security(("bearer_auth" = []))
)]
pub async fn request_admission(
    State(server): State<ClinicServer>,
    auth: AuthContext,
    Json(req): Json<CreateAdmissionRequest>,
) -> Created<PendingAdmission> {
    Ok(created(ward::request_admission(&server, &auth.identity, req).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/ward/admissions/{id}",
    params(("id" = Uuid, Path, description = "Admission ID")),
    responses((status = 200, description = "Admission", body = PendingAdmission), (status = 404, description = "Admission not found")),
    tag = "ward",
    security(("bearer_auth" = []))
)]
pub async fn get_admission(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
) -> One<PendingAdmission> {
    get(&server, &auth, id).await
}

/// Admit the patient and close the request
#[utoipa::path(
    post,
    path = "/api/v1/ward/admissions/{id}/resolve",
    params(("id" = Uuid, Path, description = "Admission ID")),
    responses((status = 200, description = "Patient admitted", body = PendingAdmission), (status = 409, description = "Already resolved")),
    tag = "ward",
    security(("bearer_auth" = []))
)]
pub async fn resolve_admission(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
) -> One<PendingAdmission> {
    Ok(Json(api_success(ward::resolve_admission(&server, &auth.identity, id).await?)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/ward/admissions/{id}",
    params(("id" = Uuid, Path, description = "Admission ID")),
    responses((status = 204, description = "Admission request removed")),
    tag = "ward",
    security(("bearer_auth" = []))
)]
pub async fn delete_admission(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
) -> Result<StatusCode, ApiError> {
    delete::<PendingAdmission>(&server, &auth, id).await
}

#[utoipa::path(
    get,
    path = "/api/v1/ward/discharges",
    params(PatientFilter),
    responses((status = 200, description = "Planned discharges", body = [PlannedDischarge])),
    tag = "ward",
    security(("bearer_auth" = []))
)]
pub async fn list_discharges(
    State(server): State<ClinicServer>,
    auth: AuthContext,
    Query(filter): Query<PatientFilter>,
) -> Listed<PlannedDischarge> {
    list(&server, &auth, &filter).await
}

#[utoipa::path(
    post,
    path = "/api/v1/ward/discharges",
    request_body = PlanDischargeRequest,
    responses((status = 201, description = "Discharge planned", body = PlannedDischarge)),
    tag = "ward",
    security(("bearer_auth" = []))
)]
pub async fn plan_discharge(
    State(server): State<ClinicServer>,
    auth: AuthContext,
    Json(req): Json<PlanDischargeRequest>,
) -> Created<PlannedDischarge> {
    Ok(created(ward::plan_discharge(&server, &auth.identity, req).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/ward/discharges/{id}",
    params(("id" = Uuid, Path, description = "Discharge ID")),
    responses((status = 200, description = "Planned discharge", body = PlannedDischarge), (status = 404, description = "Discharge not found")),
    tag = "ward",
    security(("bearer_auth" = []))
)]
pub async fn get_discharge(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
) -> One<PlannedDischarge> {
    get(&server, &auth, id).await
}

/// Discharge the patient and close the plan
#[utoipa::path(
    post,
    path = "/api/v1/ward/discharges/{id}/complete",
    params(("id" = Uuid, Path, description = "Discharge ID")),
    responses((status = 200, description = "Patient discharged", body = PlannedDischarge), (status = 409, description = "Already completed")),
    tag = "ward",
    security(("bearer_auth" = []))
)]
pub async fn complete_discharge(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
) -> One<PlannedDischarge> {
    Ok(Json(api_success(ward::complete_discharge(&server, &auth.identity, id).await?)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/ward/discharges/{id}",
    params(("id" = Uuid, Path, description = "Discharge ID")),
    responses((status = 204, description = "Plan removed")),
    tag = "ward",
    security(("bearer_auth" = []))
)]
pub async fn delete_discharge(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
) -> Result<StatusCode, ApiError> {
    delete::<PlannedDischarge>(&server, &auth, id).await
}
