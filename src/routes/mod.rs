//! HTTP route definitions and handlers.
//!
//! Endpoints are grouped by resource: auth, jobs, applications,
//! notifications and admin moderation, plus health and metrics.

mod admin_routes;
mod application_routes;
mod auth_routes;
mod health_routes;
mod job_routes;
mod metrics;
mod notification_routes;

use crate::state::AppState;
use axum::Router;

/// Creates the application router with all configured routes.
///
/// Combines all route modules into a single router and attaches
/// the application state for access in handlers.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(auth_routes::routes())
        .merge(job_routes::routes())
        .merge(application_routes::routes())
        .merge(notification_routes::routes())
        .merge(admin_routes::routes())
        .merge(health_routes::routes())
        .merge(metrics::routes())
        .with_state(state)
}
