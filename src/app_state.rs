//! Application state management.
//!
//! Defines the shared state passed to all Axum handlers via the `State`
//! extractor: the credential & token core, the data-access collaborator,
//! the metrics implementation, and content limits.
//!
//! The state is built once at startup, never mutated, and cheaply cloneable
//! (heavy resources live behind `Arc`), so Axum can clone it per request
//! without copying anything expensive.

use crate::auth::AuthService;
use crate::domain::{MetricsPtr, RepositoryPtr};
use std::sync::Arc;

/// Shared application state passed to all Axum handlers.
///
/// This struct is the dependency-injection container for the service:
/// handlers depend on the abstractions held here (repository and metrics
/// traits, the auth service), never on concrete backends.
#[derive(Clone)]
pub(crate) struct AppState {
    /// Credential & token core: site creation, authentication, session
    /// token issuance and validation.
    auth: Arc<AuthService>,

    /// Data-access collaborator for sites, tabs, and access logs.
    repository: RepositoryPtr,

    /// Metrics implementation (Prometheus or no-op).
    metrics: MetricsPtr,

    /// Maximum tab content size in bytes.
    max_content_bytes: usize,
}

impl AppState {
    // ---

    pub fn new(
        auth: Arc<AuthService>,
        repository: RepositoryPtr,
        metrics: MetricsPtr,
        max_content_bytes: usize,
    ) -> Self {
        // ---
        AppState {
            auth,
            repository,
            metrics,
            max_content_bytes,
        }
    }

    /// Get a reference to the credential & token core.
    pub(crate) fn auth(&self) -> &AuthService {
        // ---
        &self.auth
    }

    /// Get a reference to the repository implementation.
    pub(crate) fn repository(&self) -> &RepositoryPtr {
        // ---
        &self.repository
    }

    /// Get a reference to the metrics implementation.
    pub(crate) fn metrics(&self) -> &MetricsPtr {
        // ---
        &self.metrics
    }

    /// Get the maximum tab content size in bytes.
    pub(crate) fn max_content_bytes(&self) -> usize {
        // ---
        self.max_content_bytes
    }
}
