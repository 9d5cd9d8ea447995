//! Liveness endpoint.

use crate::state::AppState;
use axum::{Router, routing::get};

pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

/// Answers as long as the process is serving; the store is not consulted.
async fn health_check() -> &'static str {
    "OK"
}
