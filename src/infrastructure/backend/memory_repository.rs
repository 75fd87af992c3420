//! In-memory repository for tests and local development.
//!
//! Mirrors the hosted store's visible behavior closely enough for the cores:
//! active-only lookups, tab ordering, and best-effort access logging.

use crate::domain::{RepositoryPtr, Site, SiteRepository, Tab, TabBody};
use anyhow::{anyhow, Result};
use chrono::Utc;
use std::sync::{Arc, Mutex, PoisonError};
use uuid::Uuid;

// ---

/// Creates a new in-memory repository.
pub fn create_memory_repository() -> RepositoryPtr {
    // ---
    Arc::new(MemoryRepository::default())
}

#[derive(Default)]
struct Store {
    // ---
    sites: Vec<Site>,
    tabs: Vec<Tab>,
    access_log: Vec<(Uuid, Option<String>)>,
}

#[derive(Default)]
pub struct MemoryRepository {
    // ---
    inner: Mutex<Store>,
}

impl MemoryRepository {
    // ---
    fn store(&self) -> std::sync::MutexGuard<'_, Store> {
        // ---
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait::async_trait]
impl SiteRepository for MemoryRepository {
    // ---
    async fn find_site_by_username(&self, username: &str) -> Result<Option<Site>> {
        // ---
        Ok(self
            .store()
            .sites
            .iter()
            .find(|s| s.is_active && s.username == username)
            .cloned())
    }

    async fn find_site_by_id(&self, site_id: Uuid) -> Result<Option<Site>> {
        // ---
        Ok(self
            .store()
            .sites
            .iter()
            .find(|s| s.is_active && s.id == site_id)
            .cloned())
    }

    async fn create_site(
        &self,
        username: &str,
        password_hash: &str,
        encryption_salt: Option<&str>,
    ) -> Result<Site> {
        // ---
        let site = Site::new(
            username.to_string(),
            password_hash.to_string(),
            encryption_salt.map(|s| s.to_string()),
        );
        self.store().sites.push(site.clone());
        Ok(site)
    }

    async fn touch_site_last_accessed(&self, site_id: Uuid) -> bool {
        // ---
        let mut store = self.store();
        match store.sites.iter_mut().find(|s| s.id == site_id) {
            Some(site) => {
                site.last_accessed = Some(Utc::now());
                true
            }
            None => false,
        }
    }

    async fn create_tab(
        &self,
        site_id: Uuid,
        name: &str,
        order: u32,
        body: TabBody,
    ) -> Result<Tab> {
        // ---
        let tab = Tab::new(site_id, name.to_string(), order, body);
        self.store().tabs.push(tab.clone());
        Ok(tab)
    }

    async fn list_tabs(&self, site_id: Uuid) -> Result<Vec<Tab>> {
        // ---
        let mut tabs: Vec<Tab> = self
            .store()
            .tabs
            .iter()
            .filter(|t| t.site_id == site_id)
            .cloned()
            .collect();
        tabs.sort_by_key(|t| t.order);
        Ok(tabs)
    }

    async fn update_tab_content(&self, tab_id: Uuid, body: TabBody) -> Result<Tab> {
        // ---
        let mut store = self.store();
        let tab = store
            .tabs
            .iter_mut()
            .find(|t| t.id == tab_id)
            .ok_or_else(|| anyhow!("tab {tab_id} not found"))?;
        tab.body = body;
        tab.updated_at = Utc::now();
        Ok(tab.clone())
    }

    async fn rename_tab(&self, tab_id: Uuid, new_name: &str) -> Result<Tab> {
        // ---
        let mut store = self.store();
        let tab = store
            .tabs
            .iter_mut()
            .find(|t| t.id == tab_id)
            .ok_or_else(|| anyhow!("tab {tab_id} not found"))?;
        tab.name = new_name.to_string();
        tab.updated_at = Utc::now();
        Ok(tab.clone())
    }

    async fn delete_tab(&self, tab_id: Uuid) -> Result<bool> {
        // ---
        let mut store = self.store();
        let before = store.tabs.len();
        store.tabs.retain(|t| t.id != tab_id);
        Ok(store.tabs.len() < before)
    }

    async fn log_access(&self, site_id: Uuid, user_agent: Option<&str>) -> bool {
        // ---
        self.store()
            .access_log
            .push((site_id, user_agent.map(|s| s.to_string())));
        true
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[tokio::test]
    async fn site_lookup_sees_only_active_sites() {
        // ---
        let repo = MemoryRepository::default();
        let site = repo.create_site("alice", "$2b$04$hash", None).await.unwrap();

        assert!(repo
            .find_site_by_username("alice")
            .await
            .unwrap()
            .is_some());
        assert!(repo.find_site_by_id(site.id).await.unwrap().is_some());
        assert!(repo.find_site_by_username("bob").await.unwrap().is_none());

        repo.store()
            .sites
            .iter_mut()
            .for_each(|s| s.is_active = false);
        assert!(repo
            .find_site_by_username("alice")
            .await
            .unwrap()
            .is_none());
        assert!(repo.find_site_by_id(site.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn tabs_are_ordered_and_deletable() {
        // ---
        let repo = MemoryRepository::default();
        let site = repo.create_site("alice", "$2b$04$hash", None).await.unwrap();

        let b = repo
            .create_tab(site.id, "B", 1, TabBody::Plaintext("b".into()))
            .await
            .unwrap();
        let _a = repo
            .create_tab(site.id, "A", 0, TabBody::Plaintext("a".into()))
            .await
            .unwrap();

        let tabs = repo.list_tabs(site.id).await.unwrap();
        assert_eq!(
            tabs.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
            vec!["A", "B"]
        );

        assert!(repo.delete_tab(b.id).await.unwrap());
        assert!(!repo.delete_tab(b.id).await.unwrap());
        assert_eq!(repo.list_tabs(site.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn content_update_replaces_body_and_bumps_updated_at() {
        // ---
        let repo = MemoryRepository::default();
        let site = repo.create_site("alice", "$2b$04$hash", None).await.unwrap();
        let tab = repo
            .create_tab(site.id, "Main", 0, TabBody::Plaintext(String::new()))
            .await
            .unwrap();

        let updated = repo
            .update_tab_content(tab.id, TabBody::Ciphertext("gAAAAA...".into()))
            .await
            .unwrap();
        assert!(updated.body.is_encrypted());
        assert!(updated.updated_at >= tab.updated_at);

        assert!(repo
            .update_tab_content(Uuid::new_v4(), TabBody::Plaintext("x".into()))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn touch_is_best_effort() {
        // ---
        let repo = MemoryRepository::default();
        let site = repo.create_site("alice", "$2b$04$hash", None).await.unwrap();

        assert!(repo.touch_site_last_accessed(site.id).await);
        assert!(!repo.touch_site_last_accessed(Uuid::new_v4()).await);

        let site = repo.find_site_by_id(site.id).await.unwrap().unwrap();
        assert!(site.last_accessed.is_some());
    }
}
