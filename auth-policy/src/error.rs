use thiserror::Error;

use crate::models::ResourceKind;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("Authentication required")]
    AuthenticationRequired,

    /// Carries the internal reason; callers must not echo it to clients.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(ResourceKind),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation failed: {message}")]
    Validation {
        field: Option<String>,
        message: String,
    },
}

impl PolicyError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            field: Some(field.to_string()),
            message: message.into(),
        }
    }
}

pub type PolicyResult<T> = Result<T, PolicyError>;
