//! Shared application state.
//!
//! Contains the state that is shared across all request handlers: the
//! identity resolver, the lifecycle services and the store behind them.

use crate::auth::{Auth, Credentials};
use crate::config::ConfigV1;
use crate::lifecycle::{Applications, Engagements};
use crate::metrics::Metrics;
use crate::store::Store;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request; everything inside is reference counted.
#[derive(Clone)]
pub struct AppState {
    /// Credential verifier and bearer-token resolver.
    pub auth: Arc<Auth>,
    pub applications: Arc<Applications>,
    pub engagements: Arc<Engagements>,
    /// Persistence for users, jobs, applications and notifications.
    pub store: Arc<dyn Store>,
    pub metrics: Metrics,
}

impl AppState {
    /// Wires the services around one store. Only the signing and hashing
    /// settings are read from `config`.
    pub fn new(config: &ConfigV1, store: Arc<dyn Store>, metrics: Metrics) -> Self {
        let credentials = Credentials::new(&config.jwt, &config.password);
        AppState {
            auth: Arc::new(Auth::new(credentials, store.clone())),
            applications: Arc::new(Applications::new(store.clone())),
            engagements: Arc::new(Engagements::new(store.clone())),
            store,
            metrics,
        }
    }
}
