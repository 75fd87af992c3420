use super::models::{Site, Tab, TabBody};
use anyhow::Result;
use std::sync::Arc;
use uuid::Uuid;

/// Abstraction over the hosted store holding sites, tabs, and access logs.
///
/// Lookups only see active sites. Best-effort operations return `bool`
/// instead of `Result`; their failures must never fail the caller.
#[async_trait::async_trait]
pub trait SiteRepository: Send + Sync {
    // ---
    /// Find an active site by username.
    async fn find_site_by_username(&self, username: &str) -> Result<Option<Site>>;

    /// Find an active site by ID.
    async fn find_site_by_id(&self, site_id: Uuid) -> Result<Option<Site>>;

    /// Persist a new site.
    async fn create_site(
        &self,
        username: &str,
        password_hash: &str,
        encryption_salt: Option<&str>,
    ) -> Result<Site>;

    /// Update the site's last-accessed timestamp (best-effort).
    async fn touch_site_last_accessed(&self, site_id: Uuid) -> bool;

    /// Persist a new tab for a site.
    async fn create_tab(&self, site_id: Uuid, name: &str, order: u32, body: TabBody)
        -> Result<Tab>;

    /// All tabs for a site, ordered by display order.
    async fn list_tabs(&self, site_id: Uuid) -> Result<Vec<Tab>>;

    /// Replace a tab's stored body.
    async fn update_tab_content(&self, tab_id: Uuid, body: TabBody) -> Result<Tab>;

    /// Rename a tab.
    async fn rename_tab(&self, tab_id: Uuid, new_name: &str) -> Result<Tab>;

    /// Delete a tab. Returns whether a row was removed.
    async fn delete_tab(&self, tab_id: Uuid) -> Result<bool>;

    /// Record a site access (best-effort).
    async fn log_access(&self, site_id: Uuid, user_agent: Option<&str>) -> bool;
}

/// Type alias for any backend that implements SiteRepository.
pub type RepositoryPtr = Arc<dyn SiteRepository>;
