//! REST repository for a hosted relational store.
//!
//! Speaks the PostgREST conventions the hosted store exposes: table endpoints
//! under `/rest/v1/`, `?column=eq.value` filters, and
//! `Prefer: return=representation` to get mutated rows back. Tab bodies are
//! stored across the `content` / `encrypted_content` sibling columns; the
//! writer always nulls the opposite column.

use crate::domain::{RepositoryPtr, Site, SiteRepository, Tab, TabBody};
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

// ---

/// Creates a repository backed by the hosted store's REST endpoint.
pub fn create_rest_repository(base_url: &str, api_key: &str) -> Result<RepositoryPtr> {
    // ---
    let http = reqwest::Client::builder()
        .build()
        .context("Failed to build HTTP client for backend")?;

    Ok(Arc::new(RestRepository {
        http,
        base_url: base_url.trim_end_matches('/').to_string(),
        api_key: api_key.to_string(),
    }))
}

pub struct RestRepository {
    // ---
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

// ============================================================================
// Wire rows
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct SiteRow {
    // ---
    id: Uuid,
    username: String,
    password_hash: String,
    #[serde(default)]
    encryption_salt: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    #[serde(default)]
    last_accessed: Option<DateTime<Utc>>,
}

impl From<SiteRow> for Site {
    // ---
    fn from(r: SiteRow) -> Self {
        // ---
        Site {
            id: r.id,
            username: r.username,
            password_hash: r.password_hash,
            encryption_salt: r.encryption_salt,
            is_active: r.is_active,
            created_at: r.created_at,
            last_accessed: r.last_accessed,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct TabRow {
    // ---
    id: Uuid,
    site_id: Uuid,
    tab_name: String,
    tab_order: i32,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encrypted_content: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TabRow> for Tab {
    // ---
    fn from(r: TabRow) -> Self {
        // ---
        // Ciphertext wins if both columns are somehow populated; the writer
        // always nulls the opposite column, so that only arises from
        // out-of-band edits. Both-null rows read as empty plaintext.
        let body = match (r.content, r.encrypted_content) {
            (_, Some(ciphertext)) => TabBody::Ciphertext(ciphertext),
            (Some(plaintext), None) => TabBody::Plaintext(plaintext),
            (None, None) => TabBody::Plaintext(String::new()),
        };

        Tab {
            id: r.id,
            site_id: r.site_id,
            name: r.tab_name,
            order: r.tab_order.max(0) as u32,
            body,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Splits a tab body into the two nullable wire columns.
fn body_columns(body: &TabBody) -> (Option<&str>, Option<&str>) {
    // ---
    match body {
        TabBody::Plaintext(s) => (Some(s.as_str()), None),
        TabBody::Ciphertext(s) => (None, Some(s.as_str())),
    }
}

// ============================================================================
// Request plumbing
// ============================================================================

impl RestRepository {
    // ---
    fn request(&self, method: Method, table: &str, query: &str) -> reqwest::RequestBuilder {
        // ---
        let url = if query.is_empty() {
            format!("{}/rest/v1/{table}", self.base_url)
        } else {
            format!("{}/rest/v1/{table}?{query}", self.base_url)
        };

        self.http
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn fetch_rows<T: for<'de> Deserialize<'de>>(
        &self,
        table: &str,
        query: &str,
    ) -> Result<Vec<T>> {
        // ---
        self.request(Method::GET, table, query)
            .send()
            .await
            .with_context(|| format!("Backend request to {table} failed"))?
            .error_for_status()
            .with_context(|| format!("Backend rejected query on {table}"))?
            .json()
            .await
            .with_context(|| format!("Backend returned malformed rows for {table}"))
    }

    /// Sends a mutation and parses the representation rows it returns.
    async fn mutate_rows<T: for<'de> Deserialize<'de>>(
        &self,
        method: Method,
        table: &str,
        query: &str,
        payload: &serde_json::Value,
    ) -> Result<Vec<T>> {
        // ---
        let mut req = self
            .request(method.clone(), table, query)
            .header("Prefer", "return=representation");
        if method != Method::DELETE {
            req = req.json(payload);
        }

        req.send()
            .await
            .with_context(|| format!("Backend request to {table} failed"))?
            .error_for_status()
            .with_context(|| format!("Backend rejected mutation on {table}"))?
            .json()
            .await
            .with_context(|| format!("Backend returned malformed rows for {table}"))
    }

    async fn mutate_one<T: for<'de> Deserialize<'de>>(
        &self,
        method: Method,
        table: &str,
        query: &str,
        payload: &serde_json::Value,
    ) -> Result<T> {
        // ---
        self.mutate_rows::<T>(method, table, query, payload)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Backend returned no row for mutation on {table}"))
    }
}

// ============================================================================
// SiteRepository implementation
// ============================================================================

#[async_trait::async_trait]
impl SiteRepository for RestRepository {
    // ---
    async fn find_site_by_username(&self, username: &str) -> Result<Option<Site>> {
        // ---
        let rows: Vec<SiteRow> = self
            .fetch_rows(
                "sites",
                &format!("select=*&username=eq.{username}&is_active=eq.true"),
            )
            .await?;
        Ok(rows.into_iter().next().map(Site::from))
    }

    async fn find_site_by_id(&self, site_id: Uuid) -> Result<Option<Site>> {
        // ---
        let rows: Vec<SiteRow> = self
            .fetch_rows(
                "sites",
                &format!("select=*&id=eq.{site_id}&is_active=eq.true"),
            )
            .await?;
        Ok(rows.into_iter().next().map(Site::from))
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

        let payload = json!({
            "id": site.id,
            "username": site.username,
            "password_hash": site.password_hash,
            "encryption_salt": site.encryption_salt,
            "is_active": site.is_active,
            "created_at": site.created_at,
        });

        let row: SiteRow = self
            .mutate_one(Method::POST, "sites", "", &payload)
            .await
            .with_context(|| format!("Failed to create site for username {username}"))?;
        Ok(row.into())
    }

    async fn touch_site_last_accessed(&self, site_id: Uuid) -> bool {
        // ---
        let payload = json!({ "last_accessed": Utc::now() });
        let result = self
            .request(Method::PATCH, "sites", &format!("id=eq.{site_id}"))
            .json(&payload)
            .send()
            .await
            .and_then(|r| r.error_for_status());

        match result {
            Ok(_) => true,
            Err(err) => {
                tracing::warn!("Failed to update last accessed for site {site_id}: {err}");
                false
            }
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
        let (content, encrypted_content) = body_columns(&tab.body);

        let payload = json!({
            "id": tab.id,
            "site_id": tab.site_id,
            "tab_name": tab.name,
            "tab_order": tab.order,
            "content": content,
            "encrypted_content": encrypted_content,
            "created_at": tab.created_at,
            "updated_at": tab.updated_at,
        });

        let row: TabRow = self
            .mutate_one(Method::POST, "tabs", "", &payload)
            .await
            .with_context(|| format!("Failed to create tab '{name}' for site {site_id}"))?;
        Ok(row.into())
    }

    async fn list_tabs(&self, site_id: Uuid) -> Result<Vec<Tab>> {
        // ---
        let rows: Vec<TabRow> = self
            .fetch_rows(
                "tabs",
                &format!("select=*&site_id=eq.{site_id}&order=tab_order.asc"),
            )
            .await?;
        Ok(rows.into_iter().map(Tab::from).collect())
    }

    async fn update_tab_content(&self, tab_id: Uuid, body: TabBody) -> Result<Tab> {
        // ---
        let (content, encrypted_content) = body_columns(&body);
        let payload = json!({
            "content": content,
            "encrypted_content": encrypted_content,
            "updated_at": Utc::now(),
        });

        let row: TabRow = self
            .mutate_one(Method::PATCH, "tabs", &format!("id=eq.{tab_id}"), &payload)
            .await
            .with_context(|| format!("Failed to update content for tab {tab_id}"))?;
        Ok(row.into())
    }

    async fn rename_tab(&self, tab_id: Uuid, new_name: &str) -> Result<Tab> {
        // ---
        let payload = json!({
            "tab_name": new_name,
            "updated_at": Utc::now(),
        });

        let row: TabRow = self
            .mutate_one(Method::PATCH, "tabs", &format!("id=eq.{tab_id}"), &payload)
            .await
            .with_context(|| format!("Failed to rename tab {tab_id}"))?;
        Ok(row.into())
    }

    async fn delete_tab(&self, tab_id: Uuid) -> Result<bool> {
        // ---
        let rows: Vec<TabRow> = self
            .mutate_rows(
                Method::DELETE,
                "tabs",
                &format!("id=eq.{tab_id}"),
                &serde_json::Value::Null,
            )
            .await
            .with_context(|| format!("Failed to delete tab {tab_id}"))?;
        Ok(!rows.is_empty())
    }

    async fn log_access(&self, site_id: Uuid, user_agent: Option<&str>) -> bool {
        // ---
        let payload = json!({
            "site_id": site_id,
            "user_agent": user_agent,
            "accessed_at": Utc::now(),
        });

        let result = self
            .request(Method::POST, "access_logs", "")
            .json(&payload)
            .send()
            .await
            .and_then(|r| r.error_for_status());

        match result {
            Ok(_) => true,
            Err(err) => {
                tracing::warn!("Failed to log access for site {site_id}: {err}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn tab_row_body_mapping() {
        // ---
        let base = || TabRow {
            id: Uuid::new_v4(),
            site_id: Uuid::new_v4(),
            tab_name: "Main".to_string(),
            tab_order: 0,
            content: None,
            encrypted_content: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let mut plain = base();
        plain.content = Some("hello".to_string());
        assert_eq!(Tab::from(plain).body, TabBody::Plaintext("hello".into()));

        let mut encrypted = base();
        encrypted.encrypted_content = Some("gAAAAA".to_string());
        assert_eq!(
            Tab::from(encrypted).body,
            TabBody::Ciphertext("gAAAAA".into())
        );

        // Both null reads as empty plaintext; both set prefers ciphertext.
        assert_eq!(Tab::from(base()).body, TabBody::Plaintext(String::new()));
        let mut both = base();
        both.content = Some("stale".to_string());
        both.encrypted_content = Some("gAAAAA".to_string());
        assert!(Tab::from(both).body.is_encrypted());
    }

    #[test]
    fn body_columns_are_mutually_exclusive() {
        // ---
        let plain = TabBody::Plaintext("x".into());
        let (c, e) = body_columns(&plain);
        assert_eq!((c, e), (Some("x"), None));

        let encrypted = TabBody::Ciphertext("y".into());
        let (c, e) = body_columns(&encrypted);
        assert_eq!((c, e), (None, Some("y")));
    }
}
