use crate::app_state::AppState;
use crate::domain::Site;
use crate::error::VaultError;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Wrapper type for successful API responses.
///
/// Encapsulates the data payload and prepares it for JSON serialization.
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T> IntoResponse for ApiResponse<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        axum::Json(self).into_response()
    }
}

/// Error payload returned by every failing endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    // ---
    pub error: String,
}

/// Translates a domain error into the HTTP error shape.
///
/// Backend failures are logged here with their cause; the response body
/// only carries the generic operational message.
pub(crate) fn error_response(err: VaultError) -> (StatusCode, Json<ErrorResponse>) {
    // ---
    if let VaultError::Backend(cause) = &err {
        tracing::error!("Backend failure: {cause:#}");
    }
    (
        err.status(),
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

/// Resolves the request's bearer token to its site record.
///
/// A missing or non-bearer Authorization header is reported the same way as
/// a structurally broken token.
pub(crate) async fn authorize(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Site, (StatusCode, Json<ErrorResponse>)> {
    // ---
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| error_response(VaultError::TokenMalformed))?;

    state
        .auth()
        .validate_session_token(token)
        .await
        .map_err(error_response)
}
