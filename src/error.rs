// src/error.rs

//! Error taxonomy shared by the credential, encryption, and storage layers.
//!
//! Validation and authentication failures are ordinary values returned to the
//! caller; only backend failures carry an underlying cause. Handlers translate
//! each variant into an HTTP status via [`VaultError::status`].

use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VaultError {
    /// Bad username, password, or tab-name format. The message names what
    /// was wrong and is safe to show to the user.
    #[error("{0}")]
    Validation(String),

    #[error("Username already exists. Please choose a different username or access the existing site.")]
    AlreadyExists,

    #[error("A tab with this name already exists")]
    TabNameExists,

    #[error("Site not found. Please check the username or create a new site.")]
    NotFound,

    #[error("Invalid password. Please try again.")]
    InvalidCredentials,

    #[error("Too many attempts. Please try again later.")]
    RateLimited,

    #[error("Invalid token format")]
    TokenMalformed,

    #[error("Invalid token signature")]
    TokenBadSignature,

    #[error("Your session has expired. Please enter the password again.")]
    TokenExpired,

    #[error("Token username mismatch")]
    TokenMismatch,

    #[error("Failed to encrypt content")]
    Encryption,

    #[error("Content could not be decrypted")]
    Decryption,

    /// Backend/database failure, wrapped with context. Multi-step operations
    /// are not transactional; earlier steps may have persisted (see DESIGN.md).
    #[error("Backend unavailable: {0}")]
    Backend(#[from] anyhow::Error),
}

impl VaultError {
    /// Maps the error to the HTTP status code handlers respond with.
    pub fn status(&self) -> StatusCode {
        // ---
        match self {
            VaultError::Validation(_) => StatusCode::BAD_REQUEST,
            VaultError::AlreadyExists | VaultError::TabNameExists => StatusCode::CONFLICT,
            VaultError::NotFound => StatusCode::NOT_FOUND,
            VaultError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            VaultError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            VaultError::TokenMalformed
            | VaultError::TokenBadSignature
            | VaultError::TokenExpired
            | VaultError::TokenMismatch => StatusCode::UNAUTHORIZED,
            VaultError::Encryption | VaultError::Decryption => StatusCode::INTERNAL_SERVER_ERROR,
            VaultError::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn auth_failures_map_to_unauthorized() {
        // ---
        assert_eq!(VaultError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(VaultError::TokenExpired.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(VaultError::TokenBadSignature.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn rate_limit_maps_to_429() {
        // ---
        assert_eq!(VaultError::RateLimited.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
