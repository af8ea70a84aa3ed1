use auth_policy::PolicyError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use database_layer::DatabaseError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, error, warn};
use uuid::Uuid;

/// JSON body of every non-2xx response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Logged alongside the failure so support can find it
    pub error_id: String,
    /// Error type/code
    pub error_type: String,
    pub message: String,
    /// Per-field messages for validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<HashMap<String, Vec<String>>>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Envelope for successful responses
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResponseMetadata>,
}

/// Response metadata for pagination
#[derive(Debug, Serialize, Deserialize)]
pub struct ResponseMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaginationInfo {
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_previous: bool,
}

/// Every failure a handler can return
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{message}")]
    Validation {
        message: String,
        field_errors: Option<HashMap<String, Vec<String>>>,
    },

    #[error("Authentication required: {message}")]
    Authentication { message: String },

    /// The reason is logged, never returned to the client.
    #[error("You do not have permission to perform this action.")]
    Authorization { reason: String },

    #[error("{resource_type} not found")]
    NotFound { resource_type: String },

    #[error("{message}")]
    Conflict { message: String },

    #[error("Database error: {0}")]
    Database(DatabaseError),

    #[error("Internal server error: {message}")]
    Internal { message: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },
}

impl ApiError {
    /// Validation error attached to one request field
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut field_errors = HashMap::new();
        field_errors.insert(field.to_string(), vec![message.clone()]);
        Self::Validation {
            message,
            field_errors: Some(field_errors),
        }
    }

    /// Validation failure not tied to one field
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field_errors: None,
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    pub fn authorization(reason: impl Into<String>) -> Self {
        Self::Authorization {
            reason: reason.into(),
        }
    }

    pub fn not_found(resource_type: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } | ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Authentication { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Authorization { .. } => StatusCode::FORBIDDEN,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Database(DatabaseError::ConnectionFailed(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Database(_) | ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code for `error_type`
    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "validation_error",
            ApiError::Authentication { .. } => "authentication_error",
            ApiError::Authorization { .. } => "authorization_error",
            ApiError::NotFound { .. } => "not_found",
            ApiError::Conflict { .. } => "conflict",
            ApiError::Database(_) => "database_error",
            ApiError::Internal { .. } => "internal_error",
            ApiError::BadRequest { .. } => "bad_request",
        }
    }

    /// Client-facing message. Storage details never leave the server.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Database(DatabaseError::ConnectionFailed(_)) => {
                "The database is unavailable. Try again in a few moments.".to_string()
            }
            ApiError::Database(_) | ApiError::Internal { .. } => {
                "An unexpected error occurred.".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4().to_string();
        let status_code = self.status_code();

        if status_code.is_server_error() {
            error!(
                error_id = %error_id,
                error_type = %self.error_type(),
                status_code = %status_code.as_u16(),
                error = %self,
                "API error occurred"
            );
        } else {
            debug!(
                error_id = %error_id,
                error_type = %self.error_type(),
                status_code = %status_code.as_u16(),
                "Request rejected"
            );
        }

        let field_errors = match &self {
            ApiError::Validation { field_errors, .. } => field_errors.clone(),
            _ => None,
        };

        let error_response = ApiErrorResponse {
            error_id,
            error_type: self.error_type().to_string(),
            message: self.public_message(),
            field_errors,
            timestamp: chrono::Utc::now(),
        };

        (status_code, Json(error_response)).into_response()
    }
}

impl From<PolicyError> for ApiError {
    fn from(err: PolicyError) -> Self {
        match err {
            PolicyError::AuthenticationRequired => {
                ApiError::authentication("Missing or invalid credentials")
            }
            PolicyError::Forbidden(reason) => ApiError::authorization(reason),
            PolicyError::NotFound(kind) => ApiError::not_found(kind.label()),
            PolicyError::Conflict(message) => ApiError::conflict(message),
            PolicyError::Validation {
                field: Some(field),
                message,
            } => ApiError::field(&field, message),
            PolicyError::Validation { field: None, message } => ApiError::validation(message),
        }
    }
}

/// Uniqueness constraints that are user mistakes rather than server faults.
const CONFLICT_MESSAGES: &[(&str, &str)] = &[
    ("unique_doctor_timeslot", "timeslot already booked"),
    ("users_username_key", "A user with that username already exists."),
    ("patients_user_id_key", "This user already has a patient profile."),
    ("unique_ward_bed", "That bed already exists in this ward."),
];

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::UniqueViolation(constraint) => {
                let message = CONFLICT_MESSAGES
                    .iter()
                    .find(|(name, _)| *name == constraint)
                    .map_or("A record with these details already exists.", |(_, m)| *m);
                warn!(constraint = %constraint, "Unique constraint rejected write");
                ApiError::conflict(message)
            }
            DatabaseError::RecordNotFound { table, .. } => ApiError::not_found(table),
            other => ApiError::Database(other),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut field_errors: HashMap<String, Vec<String>> = HashMap::new();
        for (field, problems) in errors.field_errors() {
            let messages = problems
                .iter()
                .map(|p| {
                    p.message
                        .as_ref()
                        .map_or_else(|| format!("{field} is invalid"), ToString::to_string)
                })
                .collect();
            field_errors.insert(field.to_string(), messages);
        }

        let mut fields: Vec<&String> = field_errors.keys().collect();
        fields.sort();
        let message = match fields.as_slice() {
            [only] => field_errors
                .get(*only)
                .and_then(|m| m.first())
                .cloned()
                .unwrap_or_else(|| "Invalid request".to_string()),
            _ => format!(
                "Invalid fields: {}",
                fields.iter().map(|f| f.as_str()).collect::<Vec<_>>().join(", ")
            ),
        };

        ApiError::Validation {
            message,
            field_errors: Some(field_errors),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        ApiError::Internal {
            message: error.to_string(),
        }
    }
}

pub fn api_success<T>(data: T) -> ApiResponse<T> {
    ApiResponse {
        success: true,
        data,
        metadata: None,
    }
}

/// Success envelope carrying pagination metadata
pub fn api_success_with_meta<T>(data: T, metadata: ResponseMetadata) -> ApiResponse<T> {
    ApiResponse {
        success: true,
        data,
        metadata: Some(metadata),
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
