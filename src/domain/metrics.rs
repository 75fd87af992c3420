use std::sync::Arc;

/// Abstraction for application metrics (counters).
pub trait Metrics: Send + Sync + 'static {
    // ---
    /// Render current metrics in Prometheus text format.
    fn render(&self) -> String;

    /// Record a "site created" event.
    fn record_site_created(&self);

    /// Record an authentication attempt and its outcome.
    fn record_auth_attempt(&self, success: bool);

    /// Record a request rejected by the rate limiter.
    fn record_rate_limited(&self);

    /// Record a tab content save.
    fn record_tab_saved(&self);
}

/// Type alias for any backend that implements Metrics.
pub type MetricsPtr = Arc<dyn Metrics>;
