//! Application startup and server initialization.
//!
//! Builds the store, metrics and shared state, then serves the router on
//! the configured bind address.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::ConfigV1;
use crate::metrics::Metrics;
use crate::routes;
use crate::state::AppState;
use crate::store::create_store;

/// Initializes and runs the application server.
///
/// # Errors
///
/// Returns an error if the store cannot be reached, the server fails to
/// bind to the configured address, or it stops with a runtime error.
pub async fn run(config: Arc<ConfigV1>) -> Result<(), Box<dyn std::error::Error>> {
    let store = create_store(&config.store).await?;
    let metrics = Metrics::new()?;
    let state = AppState::new(&config, store, metrics);

    let app = routes::create_router(state);

    let listener = TcpListener::bind(&config.bind_address).await?;
    info!("Starting server on {}", config.bind_address);

    axum::serve(listener, app).await?;
    Ok(())
}
