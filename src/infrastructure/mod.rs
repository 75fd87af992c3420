mod backend;
pub mod metrics;

// Re-export the factory functions for easy access
pub use backend::{create_memory_repository, create_rest_repository};
pub use metrics::{create_noop_metrics, create_prom_metrics};
