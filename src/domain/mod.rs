mod metrics;
mod models;
mod repository;

// Publicly expose the Metrics abstraction
pub use metrics::{Metrics, MetricsPtr};

// Publicly expose the storage abstractions
pub use models::{Site, Tab, TabBody};
pub use repository::{RepositoryPtr, SiteRepository};
