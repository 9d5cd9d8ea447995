use std::sync::Arc;

use axum::extract::FromRequestParts;
use http::header::AUTHORIZATION;
use http::request::Parts;
use tracing::{debug, warn};

use super::credentials::Credentials;
use crate::error::AppError;
use crate::metrics::MetricsRecorder;
use crate::models::User;
use crate::state::AppState;
use crate::store::Store;
use crate::utils::http_helpers::HTTPError;

const INVALID_TOKEN: &str = "Invalid or expired token";

/// Turns a bearer token into a live user record.
pub struct Auth {
    pub credentials: Credentials,
    store: Arc<dyn Store>,
}

/// Pulls the credential out of an `Authorization` header value.
///
/// No header, or a scheme with nothing after it, means no credential was
/// presented. Anything else is a presented credential: a non-bearer scheme
/// or trailing garbage is rejected as invalid rather than as absent.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AppError> {
    let mut parts = header.unwrap_or_default().split_whitespace();
    let (Some(scheme), Some(token)) = (parts.next(), parts.next()) else {
        return Err(AppError::Unauthenticated);
    };
    if !scheme.eq_ignore_ascii_case("bearer") || parts.next().is_some() {
        return Err(AppError::forbidden(INVALID_TOKEN));
    }
    Ok(token)
}

impl Auth {
    pub fn new(credentials: Credentials, store: Arc<dyn Store>) -> Self {
        Auth { credentials, store }
    }

    /// Resolves the caller from a raw `Authorization` header value.
    ///
    /// - no token: `Unauthenticated`
    /// - bad signature, malformed or expired token: `Forbidden`
    /// - user missing or deactivated: `Forbidden`
    ///
    /// The user is re-read on every call. Tokens can't be revoked
    /// individually, so this lookup is what makes deactivation take effect.
    pub async fn resolve(&self, auth_header: Option<&str>) -> Result<User, AppError> {
        let token = bearer_token(auth_header)?;

        let user_id = self.credentials.validate(token).map_err(|e| {
            debug!(error = %e, "Rejected bearer token");
            AppError::forbidden(INVALID_TOKEN)
        })?;

        match self.store.find_active_user(&user_id).await? {
            Some(user) => Ok(user),
            None => {
                warn!(user_id = %user_id, "Valid token for missing or inactive user");
                Err(AppError::forbidden("User not found or inactive"))
            }
        }
    }
}

fn outcome_label(result: &Result<User, AppError>) -> &'static str {
    match result {
        Ok(_) => "success",
        Err(AppError::Unauthenticated) => "missing_token",
        Err(AppError::Forbidden(_)) => "forbidden",
        Err(_) => "error",
    }
}

/// Every handler that takes a `User` argument is protected: the extractor
/// resolves the caller before the handler body runs.
impl FromRequestParts<AppState> for User {
    type Rejection = HTTPError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<User, HTTPError> {
        let result = match parts.headers.get(AUTHORIZATION).map(|value| value.to_str()) {
            // Present but not text: a credential was sent, it just can't be valid.
            Some(Err(_)) => Err(AppError::forbidden(INVALID_TOKEN)),
            Some(Ok(value)) => state.auth.resolve(Some(value)).await,
            None => state.auth.resolve(None).await,
        };
        state.metrics.record_auth_attempt(outcome_label(&result));
        result.map_err(HTTPError::from)
    }
}
