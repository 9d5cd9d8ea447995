use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::error::AppError;
use crate::models::{Notification, User};
use crate::state::AppState;
use crate::utils::http_helpers::HTTPError;

/// Registers notification routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/notifications", get(list_notifications))
        .route("/api/notifications/{id}/read", put(mark_read))
}

/// The caller's own notifications, newest first.
async fn list_notifications(
    State(state): State<AppState>,
    user: User,
) -> Result<Json<Vec<Notification>>, HTTPError> {
    let notifications = state
        .store
        .list_notifications(&user.id)
        .await
        .map_err(AppError::from)?;
    Ok(Json(notifications))
}

/// Someone else's notification is reported exactly like a missing one.
async fn mark_read(
    State(state): State<AppState>,
    user: User,
    Path(id): Path<String>,
) -> Result<Json<Value>, HTTPError> {
    let updated = state
        .store
        .mark_notification_read(&id, &user.id)
        .await
        .map_err(AppError::from)?;
    if !updated {
        return Err(AppError::not_found("Notification not found").into());
    }
    Ok(Json(json!({ "message": "Notification marked as read" })))
}
