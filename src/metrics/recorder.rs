//! Metrics recording implementation using Prometheus.

use prometheus::{
    register_counter_vec_with_registry, CounterVec, Encoder, Opts, Registry, TextEncoder,
};
use std::sync::Arc;
use tracing::error;

/// Trait for recording application metrics.
pub trait MetricsRecorder: Clone + Send + Sync + 'static {
    /// Records the outcome of resolving a caller from a bearer token.
    fn record_auth_attempt(&self, result: &str);

    /// Records an application submission and whether it was accepted.
    fn record_application_submitted(&self, result: &str);

    /// Records an application moving to `status`.
    fn record_application_transition(&self, status: &str);

    /// Records an engagement request and whether it added or removed a row.
    fn record_engagement(&self, kind: &str, result: &str);
}

/// Prometheus metrics collector.
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,

    auth_requests_total: CounterVec,
    applications_submitted_total: CounterVec,
    application_transitions_total: CounterVec,
    engagements_total: CounterVec,
}

impl Metrics {
    /// Creates a new metrics instance with its own Prometheus registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Arc::new(Registry::new());

        let auth_requests_total = register_counter_vec_with_registry!(
            Opts::new(
                "auth_requests_total",
                "Bearer token resolutions by outcome"
            ),
            &["result"],
            registry.clone()
        )?;

        let applications_submitted_total = register_counter_vec_with_registry!(
            Opts::new(
                "applications_submitted_total",
                "Job application submissions by outcome"
            ),
            &["result"],
            registry.clone()
        )?;

        let application_transitions_total = register_counter_vec_with_registry!(
            Opts::new(
                "application_transitions_total",
                "Application status changes by target status"
            ),
            &["status"],
            registry.clone()
        )?;

        let engagements_total = register_counter_vec_with_registry!(
            Opts::new("engagements_total", "Job engagements by kind and outcome"),
            &["kind", "result"],
            registry.clone()
        )?;

        Ok(Metrics {
            registry,
            auth_requests_total,
            applications_submitted_total,
            application_transitions_total,
            engagements_total,
        })
    }

    /// Renders all metrics in Prometheus text format.
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            error!(error = %e, "Failed to encode metrics");
            return String::new();
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

impl MetricsRecorder for Metrics {
    fn record_auth_attempt(&self, result: &str) {
        self.auth_requests_total.with_label_values(&[result]).inc();
    }

    fn record_application_submitted(&self, result: &str) {
        self.applications_submitted_total
            .with_label_values(&[result])
            .inc();
    }

    fn record_application_transition(&self, status: &str) {
        self.application_transitions_total
            .with_label_values(&[status])
            .inc();
    }

    fn record_engagement(&self, kind: &str, result: &str) {
        self.engagements_total
            .with_label_values(&[kind, result])
            .inc();
    }
}
