use auth_policy::AppointmentAction;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use database_layer::models::Appointment;
use uuid::Uuid;

use crate::error::{api_success, ApiError, ApiResponse};
use crate::middleware::AuthContext;
use crate::server::ClinicServer;
use crate::services::appointments::{
    self, AppointmentFilters, CreateAppointmentRequest, UpdateAppointmentRequest,
};

#[utoipa::path(
    get,
    path = "/api/v1/appointments",
    params(AppointmentFilters),
    responses(
        (status = 200, description = "Appointments visible to the caller", body = [Appointment]),
        (status = 400, description = "Unknown status filter"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "appointments",
    security(("bearer_auth" = []))
)]
pub async fn list_appointments(
    State(server): State<ClinicServer>,
    auth: AuthContext,
    Query(filters): Query<AppointmentFilters>,
) -> Result<Json<ApiResponse<Vec<Appointment>>>, ApiError> {
    let page = appointments::list_appointments(&server, &auth.identity, filters).await?;
    Ok(Json(page.into_response()))
}

#[utoipa::path(
    get,
    path = "/api/v1/appointments/{id}",
    params(("id" = Uuid, Path, description = "Appointment ID")),
    responses(
        (status = 200, description = "Appointment", body = Appointment),
        (status = 404, description = "Appointment not found")
    ),
    tag = "appointments",
    security(("bearer_auth" = []))
)]
pub async fn get_appointment(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<Appointment>>, ApiError> {
    let appointment = appointments::get_appointment(&server, &auth.identity, id).await?;
    Ok(Json(api_success(appointment)))
}

/// Book a slot. Patients always book for their own profile.
#[utoipa::path(
    post,
    path = "/api/v1/appointments",
    request_body = CreateAppointmentRequest,
    responses(
        (status = 201, description = "Appointment requested", body = Appointment),
        (status = 400, description = "Invalid patient, doctor or slot"),
        (status = 403, description = "Role may not book appointments"),
        (status = 409, description = "timeslot already booked")
    ),
    tag = "appointments",
    security(("bearer_auth" = []))
)]
pub async fn create_appointment(
    State(server): State<ClinicServer>,
    auth: AuthContext,
    Json(req): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Appointment>>), ApiError> {
    let appointment = appointments::create_appointment(&server, &auth.identity, req).await?;
    Ok((StatusCode::CREATED, Json(api_success(appointment))))
}

#[utoipa::path(
    put,
    path = "/api/v1/appointments/{id}",
    params(("id" = Uuid, Path, description = "Appointment ID")),
    request_body = UpdateAppointmentRequest,
    responses(
        (status = 200, description = "Appointment updated", body = Appointment),
        (status = 403, description = "Receptionist or Admin only"),
        (status = 404, description = "Appointment not found"),
        (status = 409, description = "timeslot already booked")
    ),
    tag = "appointments",
    security(("bearer_auth" = []))
)]
pub async fn update_appointment(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
    Json(req): Json<UpdateAppointmentRequest>,
) -> Result<Json<ApiResponse<Appointment>>, ApiError> {
    let appointment = appointments::update_appointment(&server, &auth.identity, id, req).await?;
    Ok(Json(api_success(appointment)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/appointments/{id}",
    params(("id" = Uuid, Path, description = "Appointment ID")),
    responses(
        (status = 204, description = "Appointment deleted"),
        (status = 403, description = "Receptionist or Admin only"),
        (status = 404, description = "Appointment not found")
    ),
    tag = "appointments",
    security(("bearer_auth" = []))
)]
pub async fn delete_appointment(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
) -> Result<StatusCode, ApiError> {
    appointments::delete_appointment(&server, &auth.identity, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn transition(
    server: ClinicServer,
    auth: AuthContext,
    id: Uuid,
    action: AppointmentAction,
) -> Result<Json<ApiResponse<Appointment>>, ApiError> {
    let appointment = appointments::transition(&server, &auth.identity, id, action).await?;
    Ok(Json(api_success(appointment)))
}

#[utoipa::path(
    post,
    path = "/api/v1/appointments/{id}/approve",
    params(("id" = Uuid, Path, description = "Appointment ID")),
    responses(
        (status = 200, description = "Appointment accepted", body = Appointment),
        (status = 403, description = "Attending doctor only"),
        (status = 404, description = "Appointment not found"),
        (status = 409, description = "Appointment is not awaiting a decision")
    ),
    tag = "appointments",
    security(("bearer_auth" = []))
)]
pub async fn approve(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<Appointment>>, ApiError> {
    transition(server, auth, id, AppointmentAction::Approve).await
}

#[utoipa::path(
    post,
    path = "/api/v1/appointments/{id}/decline",
    params(("id" = Uuid, Path, description = "Appointment ID")),
    responses(
        (status = 200, description = "Appointment declined", body = Appointment),
        (status = 403, description = "Attending doctor only"),
        (status = 404, description = "Appointment not found"),
        (status = 409, description = "Appointment is not awaiting a decision")
    ),
    tag = "appointments",
    security(("bearer_auth" = []))
)]
pub async fn decline(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<Appointment>>, ApiError> {
    transition(server, auth, id, AppointmentAction::Decline).await
}

#[utoipa::path(
    post,
    path = "/api/v1/appointments/{id}/complete",
    params(("id" = Uuid, Path, description = "Appointment ID")),
    responses(
        (status = 200, description = "Appointment completed", body = Appointment),
        (status = 403, description = "Attending doctor only"),
        (status = 404, description = "Appointment not found"),
        (status = 409, description = "Appointment was never accepted")
    ),
    tag = "appointments",
    security(("bearer_auth" = []))
)]
pub async fn complete(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<Appointment>>, ApiError> {
    transition(server, auth, id, AppointmentAction::Complete).await
}

#[utoipa::path(
    post,
    path = "/api/v1/appointments/{id}/cancel",
    params(("id" = Uuid, Path, description = "Appointment ID")),
    responses(
        (status = 200, description = "Appointment cancelled", body = Appointment),
        (status = 403, description = "Owning patient or the desk only"),
        (status = 404, description = "Appointment not found"),
        (status = 409, description = "Appointment already closed")
    ),
    tag = "appointments",
    security(("bearer_auth" = []))
)]
pub async fn cancel(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<Appointment>>, ApiError> {
    transition(server, auth, id, AppointmentAction::Cancel).await
}
