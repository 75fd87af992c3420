use crate::domain::Metrics;

/// No-op metrics implementation for testing.
pub struct NoopMetrics;

impl NoopMetrics {
    pub fn new() -> Self {
        NoopMetrics
    }
}

impl Metrics for NoopMetrics {
    // ---
    fn render(&self) -> String {
        String::new()
    }
    fn record_site_created(&self) {}
    fn record_auth_attempt(&self, _: bool) {}
    fn record_rate_limited(&self) {}
    fn record_tab_saved(&self) {}
}
