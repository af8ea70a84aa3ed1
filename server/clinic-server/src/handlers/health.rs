use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;

use crate::error::{api_success, ApiResponse};
use crate::server::ClinicServer;

/// Health check response
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// "healthy" or "degraded"
    #[schema(example = "healthy")]
    pub status: String,
    /// RFC3339
    #[schema(example = "2026-03-14T10:30:00Z")]
    pub timestamp: String,
    #[schema(example = "0.1.0")]
    pub version: String,
    /// Seconds since start
    #[schema(example = 3600)]
    pub uptime: u64,
    pub checks: HashMap<String, String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VersionResponse {
    #[schema(example = "AfyaCare Clinic Server")]
    pub name: String,
    #[schema(example = "0.1.0")]
    pub version: String,
    /// "postgres" or "memory"
    pub storage: String,
}

/// Health check handler
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Server and storage are healthy", body = HealthResponse),
        (status = 503, description = "Storage is unreachable", body = HealthResponse)
    )
)]
pub async fn health_check(
    State(server): State<ClinicServer>,
) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    let mut checks = HashMap::new();
    let database_ok = match &server.database {
        Some(pool) => pool.is_healthy().await,
        None => true,
    };
    let storage = if server.database.is_some() { "postgres" } else { "memory" };
    checks.insert(
        storage.to_string(),
        if database_ok { "healthy" } else { "unreachable" }.to_string(),
    );

    let (status, code) = if database_ok {
        ("healthy", StatusCode::OK)
    } else {
        ("degraded", StatusCode::SERVICE_UNAVAILABLE)
    };
    let response = HealthResponse {
        status: status.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: server.uptime_seconds(),
        checks,
    };

    (code, Json(api_success(response)))
}

#[utoipa::path(
    get,
    path = "/version",
    tag = "health",
    responses(
        (status = 200, description = "Version information", body = VersionResponse)
    )
)]
pub async fn version_info(State(server): State<ClinicServer>) -> Json<ApiResponse<VersionResponse>> {
    Json(api_success(VersionResponse {
        name: format!("{} Clinic Server", server.clinic_name()),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage: if server.database.is_some() { "postgres" } else { "memory" }.to_string(),
    }))
}
