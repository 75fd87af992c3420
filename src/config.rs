// src/config.rs

//! Application configuration loaded from environment variables.
//!
//! This module defines all startup-time configuration for the service.
//! Configuration is validated eagerly and failures are treated as
//! deployment errors rather than recoverable runtime conditions.

use anyhow::Result;
use std::time::Duration;

// ============================================================
// Local macros (config-only, intentionally explicit)
// ============================================================

/// Reads a required environment variable.
///
/// # Behavior
/// - Fails fast if the variable is missing
/// - Produces a clear, human-readable error message
/// - Intended for startup-time configuration validation
///
/// Missing configuration is treated as a deployment error,
/// not a recoverable runtime condition.
macro_rules! required_env {
    // ---
    ($key:literal) => {
        std::env::var($key)
            .map_err(|_| anyhow::anyhow!(concat!("Missing required configuration: ", $key)))?
    };
}

/// Reads an optional environment variable and attempts to parse it.
///
/// If the variable is missing or cannot be parsed, the provided
/// default value is used. This macro is appropriate for non-critical
/// tuning parameters where fallback behavior is acceptable.
macro_rules! optional_env_parse {
    // ---
    ($key:literal, $ty:ty, $default:expr) => {
        std::env::var($key)
            .ok()
            .and_then(|v| v.parse::<$ty>().ok())
            .unwrap_or($default)
    };
}

#[cfg(test)]
/// Asserts that a configuration constructor fails due to a missing
/// required environment variable.
///
/// This macro is intended for config unit tests only and enforces
/// consistent error messages across failure cases.
macro_rules! assert_missing_config {
    // ---
    ($expr:expr, $key:literal) => {{
        let err = $expr.expect_err("expected configuration error");
        assert!(
            err.to_string()
                .contains(concat!("Missing required configuration: ", $key)),
            "unexpected error: {err}"
        );
    }};
}

// ============================================================
// Public configuration facade
// ============================================================

/// Aggregated application configuration.
///
/// This is the single source of truth for startup configuration.
/// All required configuration is validated eagerly during initialization.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend: backend::BackendConfig,
    pub auth: auth::AuthConfig,
    pub content: content::ContentConfig,
    pub encryption: encryption::EncryptionConfig,
}

impl AppConfig {
    /// Loads and validates all application configuration from the environment.
    ///
    /// # Errors
    /// Returns an error if any required configuration is missing or invalid.
    /// This function is intended to be called exactly once at startup.
    pub fn from_env() -> Result<Self> {
        // ---
        Ok(Self {
            backend: backend::BackendConfig::from_env()?,
            auth: auth::AuthConfig::from_env()?,
            content: content::ContentConfig::from_env()?,
            encryption: encryption::EncryptionConfig::from_env()?,
        })
    }
}

// ============================================================
// Backend (hosted store) configuration
// ============================================================

mod backend {
    // ---
    use super::*;

    /// Connection settings for the hosted relational store.
    ///
    /// The `rest` backend is the production path; the in-memory backend
    /// exists for tests and local development and needs no settings.
    /// Missing connection settings for `rest` fail startup rather than
    /// letting the service operate against an unreachable backend.
    #[derive(Debug, Clone)]
    pub enum BackendConfig {
        Rest {
            /// Base URL of the hosted store's REST endpoint.
            url: String,
            /// API key sent as both `apikey` header and bearer token.
            api_key: String,
        },
        Memory,
    }

    impl BackendConfig {
        /// Builds a [`BackendConfig`] from environment variables.
        ///
        /// # Errors
        /// Returns an error if `VAULT_BACKEND_KIND` is unrecognized or the
        /// `rest` backend is selected without its connection settings.
        pub fn from_env() -> Result<Self> {
            // ---
            let kind =
                std::env::var("VAULT_BACKEND_KIND").unwrap_or_else(|_| "rest".to_string());

            match kind.as_str() {
                "rest" => Ok(Self::Rest {
                    url: required_env!("VAULT_BACKEND_URL"),
                    api_key: required_env!("VAULT_BACKEND_API_KEY"),
                }),
                "memory" => Ok(Self::Memory),
                other => Err(anyhow::anyhow!("Unknown VAULT_BACKEND_KIND: {other}")),
            }
        }
    }
}
pub use backend::BackendConfig;

// ============================================================
// Auth configuration
// ============================================================

mod auth {
    // ---
    use super::*;

    /// Credential & token core configuration.
    #[derive(Debug, Clone)]
    pub struct AuthConfig {
        /// Secret used to sign session tokens. Security-critical and must
        /// be explicitly provided.
        pub session_secret: String,

        /// Bcrypt cost factor. Defaults to 12.
        pub bcrypt_cost: u32,

        /// Session token lifetime. Defaults to 24 hours.
        pub session_ttl: Duration,

        /// Attempts allowed per identifier+action in the 60-second sliding
        /// window. Defaults to 60.
        pub rate_limit_per_minute: usize,
    }

    impl AuthConfig {
        /// Builds an [`AuthConfig`] from environment variables.
        ///
        /// # Errors
        /// Returns an error if the session secret is missing.
        pub fn from_env() -> Result<Self> {
            // ---
            let session_secret = required_env!("VAULT_SESSION_SECRET");
            let bcrypt_cost = optional_env_parse!(
                "VAULT_BCRYPT_COST",
                u32,
                crate::auth::DEFAULT_BCRYPT_COST
            );
            let ttl_hours = optional_env_parse!("VAULT_SESSION_TTL_HOURS", u64, 24);
            let rate_limit_per_minute =
                optional_env_parse!("VAULT_RATE_LIMIT_PER_MINUTE", usize, 60);

            Ok(Self {
                session_secret,
                bcrypt_cost,
                session_ttl: Duration::from_secs(ttl_hours * 3600),
                rate_limit_per_minute,
            })
        }
    }
}
pub use auth::AuthConfig;

// ============================================================
// Content configuration
// ============================================================

mod content {
    // ---
    use super::*;

    /// Limits applied to stored tab content.
    #[derive(Debug, Clone)]
    pub struct ContentConfig {
        /// Maximum plaintext size per tab, in bytes. Defaults to 1 MiB.
        pub max_content_bytes: usize,
    }

    impl ContentConfig {
        /// Builds a [`ContentConfig`] from environment variables.
        pub fn from_env() -> Result<Self> {
            // ---
            let max_mb = optional_env_parse!("VAULT_MAX_CONTENT_SIZE_MB", usize, 1);

            Ok(Self {
                max_content_bytes: max_mb * 1024 * 1024,
            })
        }
    }
}
pub use content::ContentConfig;

// ============================================================
// Encryption configuration
// ============================================================

mod encryption {
    // ---
    use super::*;

    /// At-rest content encryption toggle.
    ///
    /// When enabled, new sites receive a random key-derivation salt and
    /// their tab content is stored as authenticated ciphertext.
    #[derive(Debug, Clone)]
    pub struct EncryptionConfig {
        /// Defaults to false.
        pub enabled: bool,
    }

    impl EncryptionConfig {
        /// Builds an [`EncryptionConfig`] from environment variables.
        pub fn from_env() -> Result<Self> {
            // ---
            let enabled = optional_env_parse!("VAULT_ENCRYPTION_ENABLED", bool, false);

            Ok(Self { enabled })
        }
    }
}
pub use encryption::EncryptionConfig;

// ============================================================
// Tests
// ============================================================
