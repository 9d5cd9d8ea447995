//! Job listing, posting, applying and engagement endpoints.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::auth::authorize;
use crate::error::AppError;
use crate::metrics::MetricsRecorder;
use crate::models::{Engagement, Job, JobApplication, Role, User};
use crate::state::AppState;
use crate::utils::http_helpers::HTTPError;

/// Registers job routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/jobs", get(list_jobs).post(create_job))
        .route("/api/jobs/{id}", get(get_job))
        .route("/api/jobs/{id}/apply", post(apply))
        .route("/api/jobs/{id}/engage", post(engage))
}

#[derive(Deserialize)]
struct CreateJobRequest {
    title: String,
    description: String,
    location: Option<String>,
}

#[derive(Deserialize, Default)]
struct ApplyRequest {
    cover_note: Option<String>,
}

/// `type` is kept loose here so a missing or non-string kind is reported
/// as an unknown engagement type rather than a malformed body.
#[derive(Deserialize)]
struct EngageRequest {
    #[serde(rename = "type")]
    kind: Option<Value>,
    content: Option<String>,
}

#[derive(Serialize)]
struct JobDetail {
    #[serde(flatten)]
    job: Job,
    engagements: Vec<Engagement>,
}

async fn list_jobs(State(state): State<AppState>) -> Result<Json<Vec<Job>>, HTTPError> {
    let jobs = state.store.list_visible_jobs().await.map_err(AppError::from)?;
    Ok(Json(jobs))
}

/// New postings stay hidden until an admin approves them.
async fn create_job(
    State(state): State<AppState>,
    user: User,
    body: Result<Json<CreateJobRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Job>), HTTPError> {
    authorize(Some(&user), &[Role::Employer])?;
    let Json(body) = body?;

    let title = body.title.trim();
    let description = body.description.trim();
    if title.is_empty() || description.is_empty() {
        return Err(AppError::validation("Title and description are required").into());
    }
    let location = body.location.filter(|l| !l.trim().is_empty());

    let job = Job::new(&user.id, title.to_string(), description.to_string(), location);
    state.store.insert_job(&job).await.map_err(AppError::from)?;
    info!(job_id = %job.id, employer_id = %user.id, "Job posted");
    Ok((StatusCode::CREATED, Json(job)))
}

async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JobDetail>, HTTPError> {
    let job = match state.store.find_job(&id).await.map_err(AppError::from)? {
        Some(job) if job.is_visible() => job,
        _ => return Err(AppError::JobNotFound.into()),
    };
    let engagements = state.store.list_engagements(&id).await.map_err(AppError::from)?;
    Ok(Json(JobDetail { job, engagements }))
}

async fn apply(
    State(state): State<AppState>,
    user: User,
    Path(id): Path<String>,
    body: Result<Option<Json<ApplyRequest>>, JsonRejection>,
) -> Result<(StatusCode, Json<JobApplication>), HTTPError> {
    authorize(Some(&user), &[Role::JobSeeker])?;
    let Json(body) = body?.unwrap_or_default();

    let result = state.applications.submit(&id, &user.id, body.cover_note).await;
    let label = match &result {
        Ok(_) => "accepted",
        Err(AppError::AlreadyApplied) => "duplicate",
        Err(AppError::JobNotFound) => "job_not_found",
        Err(_) => "error",
    };
    state.metrics.record_application_submitted(label);

    Ok((StatusCode::CREATED, Json(result?)))
}

async fn engage(
    State(state): State<AppState>,
    user: User,
    Path(id): Path<String>,
    body: Result<Json<EngageRequest>, JsonRejection>,
) -> Result<Json<Value>, HTTPError> {
    let Json(body) = body?;
    let kind = body.kind.as_ref().and_then(Value::as_str).unwrap_or_default();

    let outcome = state
        .engagements
        .engage(&id, &user.id, kind, body.content)
        .await?;
    state.metrics.record_engagement(kind, outcome.as_str());

    Ok(Json(json!({
        "type": kind,
        "result": outcome.as_str(),
    })))
}
