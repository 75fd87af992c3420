//! Self-contained signed session tokens.
//!
//! Tokens are JWT-shaped (`base64url(header).base64url(payload).base64url(sig)`
//! with padding stripped) but deliberately minimal: fixed HS256 semantics, no
//! algorithm negotiation, no key IDs. Nothing is persisted server-side; the
//! payload carries everything needed to resolve the session.

use crate::error::VaultError;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::Duration;
use uuid::Uuid;

// ---

type HmacSha256 = Hmac<Sha256>;

const TOKEN_ALG: &str = "HS256";
const TOKEN_TYP: &str = "JWT";

#[derive(Debug, Serialize, Deserialize)]
struct TokenHeader {
    // ---
    alg: String,
    typ: String,
}

/// Claims carried in the signed payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    // ---
    /// 32 random bytes, hex-encoded. Uniqueness is not verified server-side.
    pub session_id: String,
    pub site_id: Uuid,
    pub username: String,
    /// Issued-at, Unix seconds.
    pub iat: i64,
    /// Expiry, Unix seconds; must be strictly in the future to validate.
    pub exp: i64,
}

// ---

/// Issues a signed session token for the given site identity.
pub fn issue(
    secret: &[u8],
    site_id: Uuid,
    username: &str,
    ttl: Duration,
) -> Result<String, VaultError> {
    // ---
    let now = Utc::now().timestamp();
    let header = TokenHeader {
        alg: TOKEN_ALG.to_string(),
        typ: TOKEN_TYP.to_string(),
    };
    let claims = SessionClaims {
        session_id: new_session_id(),
        site_id,
        username: username.to_string(),
        iat: now,
        exp: now + ttl.as_secs() as i64,
    };

    let header_b64 = URL_SAFE_NO_PAD.encode(
        serde_json::to_vec(&header)
            .map_err(|e| VaultError::Backend(anyhow::anyhow!("token header encoding: {e}")))?,
    );
    let payload_b64 = URL_SAFE_NO_PAD.encode(
        serde_json::to_vec(&claims)
            .map_err(|e| VaultError::Backend(anyhow::anyhow!("token payload encoding: {e}")))?,
    );

    let signing_input = format!("{header_b64}.{payload_b64}");
    let signature = sign(secret, signing_input.as_bytes())?;

    Ok(format!(
        "{signing_input}.{}",
        URL_SAFE_NO_PAD.encode(signature)
    ))
}

/// Verifies a token's structure, signature, and expiry, returning its claims.
///
/// Check order: three-part structure, then signature (constant-time), then
/// payload decode, then expiry. Site resolution and username matching are the
/// caller's responsibility.
pub fn verify(secret: &[u8], token: &str) -> Result<SessionClaims, VaultError> {
    // ---
    let mut parts = token.split('.');
    let (Some(header_b64), Some(payload_b64), Some(signature_b64), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(VaultError::TokenMalformed);
    };

    // An undecodable signature can never match.
    let supplied_sig = URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|_| VaultError::TokenBadSignature)?;

    let signing_input = format!("{header_b64}.{payload_b64}");
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| VaultError::Backend(anyhow::anyhow!("HMAC key setup: {e}")))?;
    mac.update(signing_input.as_bytes());
    mac.verify_slice(&supplied_sig)
        .map_err(|_| VaultError::TokenBadSignature)?;

    let payload = URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|_| VaultError::TokenMalformed)?;
    let claims: SessionClaims =
        serde_json::from_slice(&payload).map_err(|_| VaultError::TokenMalformed)?;

    if claims.exp <= Utc::now().timestamp() {
        return Err(VaultError::TokenExpired);
    }

    Ok(claims)
}

// ---

fn sign(secret: &[u8], data: &[u8]) -> Result<Vec<u8>, VaultError> {
    // ---
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| VaultError::Backend(anyhow::anyhow!("HMAC key setup: {e}")))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn new_session_id() -> String {
    // ---
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
