//! Site creation, login, and session inspection handlers.
//!
//! These are thin glue over the credential & token core: validation,
//! hashing, rate limiting, and token handling all live in `auth`; the
//! handlers translate results into HTTP.

use crate::app_state::AppState;
use crate::domain::Site;
use crate::error::VaultError;
use crate::handlers::shared_types::{authorize, error_response, ApiResponse, ErrorResponse};
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateSiteRequest {
    // ---
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    // ---
    pub username: String,
    pub password: String,
}

/// Public view of a site; the password hash and salt never leave the server.
#[derive(Debug, Serialize)]
pub struct SiteSummary {
    // ---
    pub id: Uuid,
    pub username: String,
    pub encryption_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub last_accessed: Option<DateTime<Utc>>,
}

impl From<&Site> for SiteSummary {
    // ---
    fn from(site: &Site) -> Self {
        // ---
        SiteSummary {
            id: site.id,
            username: site.username.clone(),
            encryption_enabled: site.encryption_salt.is_some(),
            created_at: site.created_at,
            last_accessed: site.last_accessed,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    // ---
    pub token: String,
    pub site: SiteSummary,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /sites
///
/// Creates a new password-protected site with its default tab and returns
/// a fresh session token.
///
/// # Request Body
/// ```json
/// { "username": "alice", "password": "Str0ng!Pass" }
/// ```
///
/// # Responses
/// - `201 Created` with the session token and site summary
/// - `400 Bad Request` for username/password format failures
/// - `409 Conflict` when the username is taken
/// - `429 Too Many Requests` when rate limited
#[tracing::instrument(skip(state, req))]
pub async fn create_site(
    State(state): State<AppState>,
    Json(req): Json<CreateSiteRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), (StatusCode, Json<ErrorResponse>)> {
    // ---
    let site = state
        .auth()
        .create_site(&req.username, &req.password)
        .await
        .map_err(|err| {
            if matches!(err, VaultError::RateLimited) {
                state.metrics().record_rate_limited();
            }
            error_response(err)
        })?;

    state.metrics().record_site_created();

    let token = state
        .auth()
        .issue_session_token(&site)
        .map_err(error_response)?;

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            token,
            site: (&site).into(),
        }),
    ))
}

/// POST /sites/login
///
/// Authenticates a username/password pair and returns a session token.
/// Access is logged best-effort with the request's user agent; a logging
/// failure never fails the login.
///
/// # Responses
/// - `200 OK` with the session token and site summary
/// - `401 Unauthorized` for a wrong password
/// - `404 Not Found` for an unknown username
/// - `429 Too Many Requests` when rate limited
#[tracing::instrument(skip(state, headers, req))]
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, (StatusCode, Json<ErrorResponse>)> {
    // ---
    let site = match state.auth().authenticate(&req.username, &req.password).await {
        Ok(site) => {
            state.metrics().record_auth_attempt(true);
            site
        }
        Err(err) => {
            match err {
                VaultError::RateLimited => state.metrics().record_rate_limited(),
                _ => state.metrics().record_auth_attempt(false),
            }
            return Err(error_response(err));
        }
    };

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok());
    if !state.repository().log_access(site.id, user_agent).await {
        tracing::warn!("Failed to log access for site {}", site.id);
    }

    let token = state
        .auth()
        .issue_session_token(&site)
        .map_err(error_response)?;

    tracing::info!("Authenticated site: {}", site.username);

    Ok(Json(SessionResponse {
        token,
        site: (&site).into(),
    }))
}

/// GET /session
///
/// Validates the bearer session token and returns the resolved site summary.
///
/// # Responses
/// - `200 OK` with the site summary
/// - `401 Unauthorized` for malformed/forged/expired/mismatched tokens
/// - `404 Not Found` when the token's site no longer exists
#[tracing::instrument(skip(state, headers))]
pub async fn session_info(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<ApiResponse<SiteSummary>, (StatusCode, Json<ErrorResponse>)> {
    // ---
    let site = authorize(&state, &headers).await?;

    Ok(ApiResponse {
        data: (&site).into(),
    })
}
