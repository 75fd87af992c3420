//! Prometheus metrics implementation.
//!
//! Concrete implementation of the `Metrics` trait in Prometheus format. It
//! delegates to utility functions in sibling modules (`counters.rs`,
//! `recorder.rs`) which handle the actual collection via the global
//! `metrics` crate registry.

use crate::domain::Metrics;

/// Prometheus-based metrics implementation.
///
/// Intentionally empty: counters are registered globally on first use via
/// the `metrics` crate macros, and the global PrometheusHandle stored in
/// `recorder.rs` manages collection and rendering.
pub struct PrometheusMetrics {
    // Empty - uses global metrics registry pattern
}

impl PrometheusMetrics {
    pub fn new() -> Self {
        tracing::info!("Creating Prometheus metrics");
        PrometheusMetrics {}
    }
}

impl Metrics for PrometheusMetrics {
    fn render(&self) -> String {
        super::render_metrics()
    }

    fn record_site_created(&self) {
        super::increment_site_created();
    }

    fn record_auth_attempt(&self, success: bool) {
        super::increment_auth_attempt(success);
    }

    fn record_rate_limited(&self) {
        super::increment_rate_limited();
    }

    fn record_tab_saved(&self) {
        super::increment_tab_saved();
    }
}
