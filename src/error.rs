//! Failure taxonomy shared by the auth and lifecycle code.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use thiserror::Error;
use tracing::error;

use crate::auth::CredentialError;
use crate::store::StoreError;

/// Typed failures returned by the core operations. The routing layer maps
/// each variant to a status code; see [`AppError::status`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AppError {
    #[error("Access token required")]
    Unauthenticated,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// The job is missing, inactive or unapproved. The three cases are
    /// deliberately reported the same way.
    #[error("Job not found")]
    JobNotFound,

    #[error("You have already applied to this job")]
    AlreadyApplied,

    #[error("Invalid engagement type")]
    InvalidKind,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal server error")]
    Internal(String),
}

impl AppError {
    pub fn forbidden(msg: impl Into<String>) -> Self {
        AppError::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) | AppError::JobNotFound => StatusCode::NOT_FOUND,
            AppError::AlreadyApplied
            | AppError::InvalidKind
            | AppError::Validation(_)
            | AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Unexpected storage failures are logged here with their detail and then
/// only ever shown to callers as a generic internal error.
impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        error!(error = %e, "Store operation failed");
        AppError::Internal(e.to_string())
    }
}

impl From<CredentialError> for AppError {
    fn from(e: CredentialError) -> Self {
        match e {
            CredentialError::InvalidToken(_) => AppError::forbidden("Invalid or expired token"),
            other => AppError::Internal(other.to_string()),
        }
    }
}

/// A body that isn't JSON, or doesn't match the expected shape, is a
/// validation failure like any other.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}
