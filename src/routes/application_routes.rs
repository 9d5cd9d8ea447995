//! Application listing and status transition endpoints.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;

use crate::auth::authorize;
use crate::error::AppError;
use crate::metrics::MetricsRecorder;
use crate::models::{ApplicationStatus, JobApplication, Role, User};
use crate::state::AppState;
use crate::utils::http_helpers::HTTPError;

/// Registers application routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/applications/mine", get(my_applications))
        .route("/api/applications/job/{job_id}", get(job_applications))
        .route("/api/applications/{id}/status", put(update_status))
}

#[derive(Deserialize)]
struct StatusRequest {
    status: String,
}

async fn my_applications(
    State(state): State<AppState>,
    user: User,
) -> Result<Json<Vec<JobApplication>>, HTTPError> {
    authorize(Some(&user), &[Role::JobSeeker])?;
    Ok(Json(state.applications.list_for_seeker(&user.id).await?))
}

async fn job_applications(
    State(state): State<AppState>,
    user: User,
    Path(job_id): Path<String>,
) -> Result<Json<Vec<JobApplication>>, HTTPError> {
    authorize(Some(&user), &[Role::Employer])?;
    Ok(Json(state.applications.list_for_job(&job_id, &user.id).await?))
}

async fn update_status(
    State(state): State<AppState>,
    user: User,
    Path(id): Path<String>,
    body: Result<Json<StatusRequest>, JsonRejection>,
) -> Result<Json<JobApplication>, HTTPError> {
    authorize(Some(&user), &[Role::Employer])?;
    let Json(body) = body?;
    let status: ApplicationStatus = body
        .status
        .parse()
        .map_err(|_| AppError::validation("Invalid status"))?;

    let application = state.applications.transition(&id, &user.id, status).await?;
    state.metrics.record_application_transition(status.as_str());
    Ok(Json(application))
}
