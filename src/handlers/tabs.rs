//! Tab CRUD handlers.
//!
//! All routes require a bearer session token. When the owning site was
//! created with encryption enabled, content is encrypted before it reaches
//! the repository and decrypted on the way out; undecryptable content is
//! surfaced as unavailable rather than failing the listing.

use crate::app_state::AppState;
use crate::crypto::ContentCipher;
use crate::domain::{Site, Tab, TabBody};
use crate::error::VaultError;
use crate::handlers::shared_types::{authorize, error_response, ApiResponse, ErrorResponse};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---

pub const MAX_TABS_PER_SITE: usize = 20;
pub const MAX_TAB_NAME_LENGTH: usize = 100;

static TAB_NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9 _\-.,!?()]+$").expect("valid tab name regex"));

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateTabRequest {
    // ---
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct SaveContentRequest {
    // ---
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct SaveContentQuery {
    // ---
    /// Auto-saves are best-effort: backend failures are swallowed.
    #[serde(default)]
    pub autosave: bool,
}

#[derive(Debug, Deserialize)]
pub struct RenameTabRequest {
    // ---
    pub name: String,
}

/// Decrypted view of a tab returned to the client.
#[derive(Debug, Serialize)]
pub struct TabView {
    // ---
    pub id: Uuid,
    pub name: String,
    pub order: u32,

    /// Plaintext content; `None` when stored ciphertext could not be
    /// decrypted (content unavailable).
    pub content: Option<String>,

    /// Whether the stored representation is encrypted.
    pub encrypted: bool,
}

// ============================================================================
// Helpers
// ============================================================================

fn validate_tab_name(name: &str) -> Result<(), VaultError> {
    // ---
    if name.is_empty() {
        return Err(VaultError::Validation("Tab name cannot be empty".to_string()));
    }
    if name.chars().count() > MAX_TAB_NAME_LENGTH {
        return Err(VaultError::Validation(format!(
            "Tab name cannot exceed {MAX_TAB_NAME_LENGTH} characters"
        )));
    }
    if !TAB_NAME_PATTERN.is_match(name) {
        return Err(VaultError::Validation(
            "Tab name contains invalid characters".to_string(),
        ));
    }
    Ok(())
}

/// Builds the content cipher for an encryption-enabled site.
///
/// TODO: derive the key from the login password (held only for the session)
/// instead of the username, once re-keying after a password change is solved.
fn site_cipher(site: &Site) -> Result<Option<ContentCipher>, VaultError> {
    // ---
    site.encryption_salt
        .as_deref()
        .map(|salt| ContentCipher::derive(&site.username, salt))
        .transpose()
}

fn tab_view(tab: &Tab, cipher: Option<&ContentCipher>) -> TabView {
    // ---
    let (content, encrypted) = match &tab.body {
        TabBody::Plaintext(text) => (Some(text.clone()), false),
        TabBody::Ciphertext(token) => {
            let decrypted = cipher.and_then(|c| match c.decrypt(token) {
                Ok(text) => Some(text),
                Err(_) => {
                    tracing::warn!("Undecryptable content in tab {}", tab.id);
                    None
                }
            });
            (decrypted, true)
        }
    };

    TabView {
        id: tab.id,
        name: tab.name.clone(),
        order: tab.order,
        content,
        encrypted,
    }
}

/// Fetches the site's tabs and verifies the addressed tab belongs to it.
async fn owned_tab(
    state: &AppState,
    site: &Site,
    tab_id: Uuid,
) -> Result<(Vec<Tab>, Tab), (StatusCode, Json<ErrorResponse>)> {
    // ---
    let tabs = state
        .repository()
        .list_tabs(site.id)
        .await
        .map_err(|e| error_response(VaultError::Backend(e)))?;

    let tab = tabs
        .iter()
        .find(|t| t.id == tab_id)
        .cloned()
        .ok_or_else(|| error_response(VaultError::NotFound))?;

    Ok((tabs, tab))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /tabs
///
/// Lists the authenticated site's tabs in display order, decrypting content
/// for encryption-enabled sites.
#[tracing::instrument(skip(state, headers))]
pub async fn list_tabs(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<ApiResponse<Vec<TabView>>, (StatusCode, Json<ErrorResponse>)> {
    // ---
    let site = authorize(&state, &headers).await?;
    let cipher = site_cipher(&site).map_err(error_response)?;

    let tabs = state
        .repository()
        .list_tabs(site.id)
        .await
        .map_err(|e| error_response(VaultError::Backend(e)))?;

    Ok(ApiResponse {
        data: tabs.iter().map(|t| tab_view(t, cipher.as_ref())).collect(),
    })
}

/// POST /tabs
///
/// Creates a new, empty tab at the end of the display order.
///
/// # Responses
/// - `201 Created` with the new tab view
/// - `400 Bad Request` for an invalid name or when the tab limit is reached
/// - `409 Conflict` when the name already exists within the site
#[tracing::instrument(skip(state, headers, req))]
pub async fn create_tab(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateTabRequest>,
) -> Result<(StatusCode, Json<TabView>), (StatusCode, Json<ErrorResponse>)> {
    // ---
    let site = authorize(&state, &headers).await?;
    validate_tab_name(&req.name).map_err(error_response)?;

    let tabs = state
        .repository()
        .list_tabs(site.id)
        .await
        .map_err(|e| error_response(VaultError::Backend(e)))?;

    if tabs.len() >= MAX_TABS_PER_SITE {
        return Err(error_response(VaultError::Validation(format!(
            "Cannot have more than {MAX_TABS_PER_SITE} tabs"
        ))));
    }
    if tabs.iter().any(|t| t.name == req.name) {
        return Err(error_response(VaultError::TabNameExists));
    }

    let order = tabs.len() as u32;
    let tab = state
        .repository()
        .create_tab(site.id, &req.name, order, TabBody::Plaintext(String::new()))
        .await
        .map_err(|e| error_response(VaultError::Backend(e)))?;

    tracing::info!("Tab '{}' created for site {}", tab.name, site.id);

    Ok((StatusCode::CREATED, Json(tab_view(&tab, None))))
}

/// PUT /tabs/{id}/content
///
/// Saves tab content, encrypting it first when the site has encryption
/// enabled. With `?autosave=true` a backend failure is swallowed (logged,
/// `204 No Content`); explicit saves surface failures to the caller.
///
/// # Responses
/// - `200 OK` with the updated tab view
/// - `204 No Content` when an autosave could not be persisted
/// - `400 Bad Request` when the content exceeds the size cap
/// - `404 Not Found` when the tab is not owned by the session's site
#[tracing::instrument(skip(state, headers, req))]
pub async fn save_tab_content(
    State(state): State<AppState>,
    Path(tab_id): Path<Uuid>,
    Query(query): Query<SaveContentQuery>,
    headers: HeaderMap,
    Json(req): Json<SaveContentRequest>,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    // ---
    let site = authorize(&state, &headers).await?;

    let size = req.content.len();
    if size > state.max_content_bytes() {
        return Err(error_response(VaultError::Validation(format!(
            "Content exceeds maximum size of {} bytes",
            state.max_content_bytes()
        ))));
    }

    let (_, _tab) = owned_tab(&state, &site, tab_id).await?;

    let cipher = site_cipher(&site).map_err(error_response)?;
    let body = match &cipher {
        Some(cipher) => TabBody::Ciphertext(cipher.encrypt(&req.content)),
        None => TabBody::Plaintext(req.content.clone()),
    };

    match state.repository().update_tab_content(tab_id, body).await {
        Ok(tab) => {
            state.metrics().record_tab_saved();
            tracing::info!("Content saved for tab {tab_id} ({size} bytes)");
            Ok((StatusCode::OK, Json(tab_view(&tab, cipher.as_ref()))).into_response())
        }
        Err(err) if query.autosave => {
            // The user never sees auto-save failures; the next explicit save
            // or retry surfaces persistent problems.
            tracing::warn!("Auto-save failed for tab {tab_id}: {err:#}");
            Ok(StatusCode::NO_CONTENT.into_response())
        }
        Err(err) => Err(error_response(VaultError::Backend(err))),
    }
}

/// PUT /tabs/{id}/name
///
/// Renames a tab. The new name must satisfy the same format rules as
/// creation and stay unique within the site.
#[tracing::instrument(skip(state, headers, req))]
pub async fn rename_tab(
    State(state): State<AppState>,
    Path(tab_id): Path<Uuid>,
    headers: HeaderMap,
    Json(req): Json<RenameTabRequest>,
) -> Result<Json<TabView>, (StatusCode, Json<ErrorResponse>)> {
    // ---
    let site = authorize(&state, &headers).await?;
    validate_tab_name(&req.name).map_err(error_response)?;

    let (tabs, tab) = owned_tab(&state, &site, tab_id).await?;
    if tabs.iter().any(|t| t.id != tab.id && t.name == req.name) {
        return Err(error_response(VaultError::TabNameExists));
    }

    let renamed = state
        .repository()
        .rename_tab(tab_id, &req.name)
        .await
        .map_err(|e| error_response(VaultError::Backend(e)))?;

    tracing::info!("Tab {tab_id} renamed to '{}'", renamed.name);

    let cipher = site_cipher(&site).map_err(error_response)?;
    Ok(Json(tab_view(&renamed, cipher.as_ref())))
}

/// DELETE /tabs/{id}
///
/// Deletes a tab. A site always keeps at least one tab; deleting the last
/// one is refused.
///
/// # Responses
/// - `204 No Content` on success
/// - `400 Bad Request` when attempting to delete the last tab
/// - `404 Not Found` when the tab is not owned by the session's site
#[tracing::instrument(skip(state, headers))]
pub async fn delete_tab(
    State(state): State<AppState>,
    Path(tab_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    // ---
    let site = authorize(&state, &headers).await?;

    let (tabs, _tab) = owned_tab(&state, &site, tab_id).await?;
    if tabs.len() <= 1 {
        return Err(error_response(VaultError::Validation(
            "Cannot delete the last remaining tab".to_string(),
        )));
    }

    let deleted = state
        .repository()
        .delete_tab(tab_id)
        .await
        .map_err(|e| error_response(VaultError::Backend(e)))?;

    if deleted {
        tracing::info!("Tab deleted: {tab_id}");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(error_response(VaultError::NotFound))
    }
}
