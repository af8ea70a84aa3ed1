//! Accounts, the doctor directory and per-user settings.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use database_layer::models::{Appointment, Patient, User, UserSettings};
use uuid::Uuid;

use crate::error::{api_success, ApiError, ApiResponse};
use crate::middleware::AuthContext;
use crate::server::ClinicServer;
use crate::services::users::{
    self, CreateUserRequest, DoctorDashboard, SettingsPatch, SettingsRequest, SignupRequest,
    SignupResponse, UpdateUserRequest,
};
use crate::types::filters::RoleFilter;
use crate::types::pagination::PaginationParams;

/// Public patient registration
#[utoipa::path(
    post,
    path = "/api/v1/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Patient account and profile created", body = SignupResponse),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Username already taken")
    ),
    tag = "authentication"
)]
pub async fn signup(
    State(server): State<ClinicServer>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SignupResponse>>), ApiError> {
    let registered = users::signup(&server.repos, req).await?;
    Ok((StatusCode::CREATED, Json(api_success(registered))))
}

/// The caller's own account
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Unauthorized")
    ),
    tag = "users",
    security(("bearer_auth" = []))
)]
pub async fn me(auth: AuthContext) -> Json<ApiResponse<User>> {
    Json(api_success(users::me(&auth.user)))
}

#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(RoleFilter),
    responses(
        (status = 200, description = "Users visible to the caller", body = [User]),
        (status = 400, description = "Unknown role filter"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "users",
    security(("bearer_auth" = []))
)]
pub async fn list_users(
    State(server): State<ClinicServer>,
    auth: AuthContext,
    Query(filter): Query<RoleFilter>,
) -> Result<Json<ApiResponse<Vec<User>>>, ApiError> {
    let page = users::list_users(&server, &auth.identity, filter.role.as_deref(), filter.page()).await?;
    Ok(Json(page.into_response()))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User", body = User),
        (status = 404, description = "User not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "users",
    security(("bearer_auth" = []))
)]
pub async fn get_user(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = users::get_user(&server, &auth.identity, id).await?;
    Ok(Json(api_success(user)))
}

/// Admin account creation
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Invalid role or specialization"),
        (status = 403, description = "Admins only"),
        (status = 409, description = "Username already taken")
    ),
    tag = "users",
    security(("bearer_auth" = []))
)]
pub async fn create_user(
    State(server): State<ClinicServer>,
    auth: AuthContext,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<User>>), ApiError> {
    let user = users::create_user(&server, &auth.identity, req).await?;
    Ok((StatusCode::CREATED, Json(api_success(user))))
}

#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 400, description = "Invalid role or specialization"),
        (status = 403, description = "Admins only"),
        (status = 404, description = "User not found")
    ),
    tag = "users",
    security(("bearer_auth" = []))
)]
pub async fn update_user(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = users::update_user(&server, &auth.identity, id, req).await?;
    Ok(Json(api_success(user)))
}

/// Delete an account with everything it owns
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 403, description = "Admins only"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Cannot delete your own account")
    ),
    tag = "users",
    security(("bearer_auth" = []))
)]
pub async fn delete_user(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
) -> Result<StatusCode, ApiError> {
    users::delete_user(&server, &auth.identity, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Doctors
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/v1/doctors",
    params(PaginationParams),
    responses(
        (status = 200, description = "Doctors visible to the caller", body = [User]),
        (status = 401, description = "Unauthorized")
    ),
    tag = "doctors",
    security(("bearer_auth" = []))
)]
pub async fn list_doctors(
    State(server): State<ClinicServer>,
    auth: AuthContext,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<Vec<User>>>, ApiError> {
    let page = users::list_doctors(&server, &auth.identity, params.page()).await?;
    Ok(Json(page.into_response()))
}

#[utoipa::path(
    get,
    path = "/api/v1/doctors/{id}",
    params(("id" = Uuid, Path, description = "Doctor's user ID")),
    responses(
        (status = 200, description = "Doctor", body = User),
        (status = 404, description = "Doctor not found")
    ),
    tag = "doctors",
    security(("bearer_auth" = []))
)]
pub async fn get_doctor(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let doctor = users::get_doctor(&server, &auth.identity, id).await?;
    Ok(Json(api_success(doctor)))
}

/// Counts for the calling doctor
#[utoipa::path(
    get,
    path = "/api/v1/doctors/dashboard",
    responses(
        (status = 200, description = "Dashboard counts", body = DoctorDashboard),
        (status = 403, description = "Doctors only")
    ),
    tag = "doctors",
    security(("bearer_auth" = []))
)]
pub async fn dashboard(
    State(server): State<ClinicServer>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<DoctorDashboard>>, ApiError> {
    let counts = users::doctor_dashboard(&server.repos, &auth.identity).await?;
    Ok(Json(api_success(counts)))
}

#[utoipa::path(
    get,
    path = "/api/v1/doctors/patients",
    params(PaginationParams),
    responses(
        (status = 200, description = "Patients assigned to the caller", body = [Patient]),
        (status = 403, description = "Doctors only")
    ),
    tag = "doctors",
    security(("bearer_auth" = []))
)]
pub async fn my_patients(
    State(server): State<ClinicServer>,
    auth: AuthContext,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<Vec<Patient>>>, ApiError> {
    let page = users::doctor_patients(&server.repos, &auth.identity, params.page()).await?;
    Ok(Json(page.into_response()))
}

#[utoipa::path(
    get,
    path = "/api/v1/doctors/appointments",
    params(PaginationParams),
    responses(
        (status = 200, description = "Appointments booked with the caller", body = [Appointment]),
        (status = 403, description = "Doctors only")
    ),
    tag = "doctors",
    security(("bearer_auth" = []))
)]
pub async fn my_appointments(
    State(server): State<ClinicServer>,
    auth: AuthContext,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<Vec<Appointment>>>, ApiError> {
    let page = users::doctor_appointments(&server.repos, &auth.identity, params.page()).await?;
    Ok(Json(page.into_response()))
}

// =============================================================================
// Settings
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/v1/settings",
    responses(
        (status = 200, description = "Caller's settings, created with defaults on first read", body = UserSettings)
    ),
    tag = "settings",
    security(("bearer_auth" = []))
)]
pub async fn get_settings(
    State(server): State<ClinicServer>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<UserSettings>>, ApiError> {
    let settings = users::get_settings(&server.repos, &auth.identity).await?;
    Ok(Json(api_success(settings)))
}

#[utoipa::path(
    put,
    path = "/api/v1/settings",
    request_body = SettingsRequest,
    responses(
        (status = 200, description = "Settings replaced", body = UserSettings),
        (status = 400, description = "Invalid settings")
    ),
    tag = "settings",
    security(("bearer_auth" = []))
)]
pub async fn replace_settings(
    State(server): State<ClinicServer>,
    auth: AuthContext,
    Json(req): Json<SettingsRequest>,
) -> Result<Json<ApiResponse<UserSettings>>, ApiError> {
    let settings = users::replace_settings(&server.repos, &auth.identity, req).await?;
    Ok(Json(api_success(settings)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/settings",
    request_body = SettingsPatch,
    responses(
        (status = 200, description = "Settings updated", body = UserSettings),
        (status = 400, description = "Invalid settings")
    ),
    tag = "settings",
    security(("bearer_auth" = []))
)]
pub async fn patch_settings(
    State(server): State<ClinicServer>,
    auth: AuthContext,
    Json(patch): Json<SettingsPatch>,
) -> Result<Json<ApiResponse<UserSettings>>, ApiError> {
    let settings = users::patch_settings(&server.repos, &auth.identity, patch).await?;
    Ok(Json(api_success(settings)))
}
