// src/lib.rs
use anyhow::Result;
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::env;
use std::sync::Arc;

use handlers::{
    create_site, create_tab, delete_tab, health_check, list_tabs, login, metrics_handler,
    rename_tab, root_handler, save_tab_content, session_info,
};

// Public exports (visible outside this module)
pub mod auth;
pub mod crypto;
pub mod domain;
pub mod error;

// Internal-only exports (sibling access within this module)
mod app_state;
mod config;
mod handlers;
mod infrastructure;

pub(crate) use app_state::AppState;

pub use config::*;
pub use error::VaultError;

// Publicly expose the infrastructure creation functions
pub use infrastructure::{
    create_memory_repository, // ---
    create_noop_metrics,
    create_prom_metrics,
    create_rest_repository,
};

/// Build the HTTP router with backend and metrics implementations
/// determined by environment variables.
pub fn create_router() -> Result<Router> {
    // ---
    // Load all configuration from environment
    let config = AppConfig::from_env()?;

    // Determine metrics implementation from environment
    let metrics_type = env::var("VAULT_METRICS_TYPE").unwrap_or_else(|_| "noop".to_string());
    let metrics = if metrics_type == "prom" {
        create_prom_metrics()?
    } else {
        create_noop_metrics()?
    };

    tracing_subscriber::fmt::try_init().ok(); // Ignores if already initialized

    // Create infrastructure dependencies
    let repository = match &config.backend {
        BackendConfig::Rest { url, api_key } => create_rest_repository(url, api_key)?,
        BackendConfig::Memory => create_memory_repository(),
    };

    let rate_limiter = Arc::new(auth::SlidingWindowLimiter::new(
        std::time::Duration::from_secs(60),
        config.auth.rate_limit_per_minute,
    ));

    let auth_service = Arc::new(auth::AuthService::new(
        repository.clone(),
        rate_limiter,
        config.auth.session_secret.into_bytes(),
        config.auth.bcrypt_cost,
        config.auth.session_ttl,
        config.encryption.enabled,
    ));

    // Build application state with all dependencies
    let app_state = AppState::new(
        auth_service,
        repository,
        metrics,
        config.content.max_content_bytes,
    );

    let router = Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/sites", post(create_site))
        .route("/sites/login", post(login))
        .route("/session", get(session_info))
        .route("/tabs", get(list_tabs))
        .route("/tabs", post(create_tab))
        .route("/tabs/{id}/content", put(save_tab_content))
        .route("/tabs/{id}/name", put(rename_tab))
        .route("/tabs/{id}", delete(delete_tab))
        .with_state(app_state);

    Ok(router)
}
