//! Site-creation, authentication, and session-validation protocols.
//!
//! `AuthService` owns no storage of its own: the repository and rate limiter
//! are injected at startup, keeping the protocols testable against an
//! in-memory collaborator.

use super::{credentials, rate_limit::RateLimiterPtr, token, token::SessionClaims};
use crate::crypto;
use crate::domain::{RepositoryPtr, Site, TabBody};
use crate::error::VaultError;
use std::time::Duration;

// ---

/// Name of the tab created alongside every new site.
pub const DEFAULT_TAB_NAME: &str = "Main";

/// Credential & token core, wired to the injected data-access collaborator.
pub struct AuthService {
    // ---
    repository: RepositoryPtr,
    rate_limiter: RateLimiterPtr,
    session_secret: Vec<u8>,
    bcrypt_cost: u32,
    session_ttl: Duration,
    encryption_enabled: bool,
}

impl AuthService {
    // ---
    pub fn new(
        repository: RepositoryPtr,
        rate_limiter: RateLimiterPtr,
        session_secret: Vec<u8>,
        bcrypt_cost: u32,
        session_ttl: Duration,
        encryption_enabled: bool,
    ) -> Self {
        // ---
        Self {
            repository,
            rate_limiter,
            session_secret,
            bcrypt_cost,
            session_ttl,
            encryption_enabled,
        }
    }

    /// Creates a new site and its default tab.
    ///
    /// Protocol: rate limit, username format + availability, password
    /// strength, bcrypt hash, optional encryption salt, persist site, persist
    /// default tab. The two inserts are not transactional: if the tab insert
    /// fails the site persists, and a retried call converges because
    /// default-tab creation is idempotent.
    pub async fn create_site(&self, username: &str, password: &str) -> Result<Site, VaultError> {
        // ---
        if !self.rate_limiter.check_and_record(username, "create_site") {
            return Err(VaultError::RateLimited);
        }

        credentials::validate_username_format(username)?;
        if self
            .repository
            .find_site_by_username(username)
            .await?
            .is_some()
        {
            return Err(VaultError::AlreadyExists);
        }
        credentials::validate_password(password)?;

        let password_hash = credentials::hash_password(password, self.bcrypt_cost)?;
        let encryption_salt = self
            .encryption_enabled
            .then(crypto::generate_salt_encoded);

        let site = self
            .repository
            .create_site(username, &password_hash, encryption_salt.as_deref())
            .await?;
        self.ensure_default_tab(&site).await?;

        tracing::info!("Site created: {}", site.username);
        Ok(site)
    }

    /// Creates the default tab unless the site already has tabs, so a retried
    /// create-site call can recover from a partial failure.
    async fn ensure_default_tab(&self, site: &Site) -> Result<(), VaultError> {
        // ---
        let tabs = self.repository.list_tabs(site.id).await?;
        if tabs.is_empty() {
            self.repository
                .create_tab(site.id, DEFAULT_TAB_NAME, 0, TabBody::Plaintext(String::new()))
                .await?;
        }
        Ok(())
    }

    /// Authenticates a username/password pair and returns the site record.
    ///
    /// The last-accessed update is best-effort; its failure never fails the
    /// authentication.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Site, VaultError> {
        // ---
        if !self.rate_limiter.check_and_record(username, "authenticate") {
            return Err(VaultError::RateLimited);
        }

        let mut site = self
            .repository
            .find_site_by_username(username)
            .await?
            .ok_or(VaultError::NotFound)?;

        if !credentials::verify_password(password, &site.password_hash) {
            return Err(VaultError::InvalidCredentials);
        }

        self.touch(&mut site).await;

        Ok(site)
    }

    /// Updates the site's last-accessed timestamp, reflecting the new value
    /// on the record handed back to the caller. Best-effort: on failure the
    /// fetched timestamp stands.
    async fn touch(&self, site: &mut Site) {
        // ---
        if self.repository.touch_site_last_accessed(site.id).await {
            site.last_accessed = Some(chrono::Utc::now());
        } else {
            tracing::warn!("Failed to update last accessed for site {}", site.id);
        }
    }

    /// Issues a signed session token for an authenticated site.
    pub fn issue_session_token(&self, site: &Site) -> Result<String, VaultError> {
        // ---
        token::issue(&self.session_secret, site.id, &site.username, self.session_ttl)
    }

    /// Validates a session token and resolves it to its site record.
    ///
    /// Beyond signature and expiry checks, the payload's username must match
    /// the resolved site's current username; this defends against a site
    /// being re-created with a different identity under the same id.
    pub async fn validate_session_token(&self, raw_token: &str) -> Result<Site, VaultError> {
        // ---
        let claims: SessionClaims = token::verify(&self.session_secret, raw_token)?;

        let mut site = self
            .repository
            .find_site_by_id(claims.site_id)
            .await?
            .ok_or(VaultError::NotFound)?;

        if site.username != claims.username {
            return Err(VaultError::TokenMismatch);
        }

        self.touch(&mut site).await;

        Ok(site)
    }
}
