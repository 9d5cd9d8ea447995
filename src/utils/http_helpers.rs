use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::error::AppError;

/// A general purpose HTTP error type that can be converted into a response.
/// The body is always `{"error": "<message>"}`.
#[derive(Debug)]
pub struct HTTPError {
    status: StatusCode,
    message: String,
}

impl HTTPError {
    /// Creates a new HTTP error with the given status code and message.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        HTTPError {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Converts our `HTTPError` into an HTTP response.
impl IntoResponse for HTTPError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Internal failures keep their detail in the server log; the caller only
/// sees the generic message.
impl From<AppError> for HTTPError {
    fn from(e: AppError) -> Self {
        if let AppError::Internal(detail) = &e {
            error!(detail = %detail, "Request failed with an internal error");
        }
        HTTPError::new(e.status(), e.to_string())
    }
}

/// Lets handlers take `Result<Json<T>, JsonRejection>` and check the
/// caller's role before the body with a plain `body?`.
impl From<JsonRejection> for HTTPError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::from(rejection).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_conversion() {
        let err = HTTPError::from(AppError::Unauthenticated);
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.message(), "Access token required");

        let err = HTTPError::from(AppError::Internal("mongo timed out".to_string()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "Internal server error");
    }

    #[test]
    fn test_response_status() {
        let response = HTTPError::new(StatusCode::NOT_FOUND, "Job not found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
