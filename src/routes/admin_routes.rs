//! Super-admin moderation endpoints.

use axum::extract::{Path, State};
use axum::routing::put;
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::info;

use crate::auth::authorize;
use crate::error::AppError;
use crate::models::{Role, User};
use crate::state::AppState;
use crate::utils::http_helpers::HTTPError;

/// Registers admin routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/users/{id}/deactivate", put(deactivate_user))
        .route("/api/admin/jobs/{id}/approve", put(approve_job))
}

/// Soft delete. The user's existing tokens stop resolving on their next
/// request.
async fn deactivate_user(
    State(state): State<AppState>,
    user: User,
    Path(id): Path<String>,
) -> Result<Json<Value>, HTTPError> {
    authorize(Some(&user), &[Role::SuperAdmin])?;
    if id == user.id {
        return Err(AppError::validation("Cannot deactivate your own account").into());
    }

    let updated = state
        .store
        .set_user_active(&id, false)
        .await
        .map_err(AppError::from)?;
    if !updated {
        return Err(AppError::not_found("User not found").into());
    }
    info!(user_id = %id, admin_id = %user.id, "User deactivated");
    Ok(Json(json!({ "message": "User deactivated" })))
}

async fn approve_job(
    State(state): State<AppState>,
    user: User,
    Path(id): Path<String>,
) -> Result<Json<Value>, HTTPError> {
    authorize(Some(&user), &[Role::SuperAdmin])?;

    let updated = state
        .store
        .set_job_approved(&id, true)
        .await
        .map_err(AppError::from)?;
    if !updated {
        return Err(AppError::JobNotFound.into());
    }
    info!(job_id = %id, admin_id = %user.id, "Job approved");
    Ok(Json(json!({ "message": "Job approved" })))
}
