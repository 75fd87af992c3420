//! Username and password validation plus bcrypt hashing.
//!
//! Validation failures carry user-facing messages; password strength errors
//! enumerate exactly which character classes are missing rather than giving
//! a generic rejection.

use crate::error::VaultError;
use once_cell::sync::Lazy;
use regex::Regex;

// ---

pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MAX_USERNAME_LENGTH: usize = 50;
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 100;

/// Default bcrypt cost factor; overridable through configuration.
pub const DEFAULT_BCRYPT_COST: u32 = 12;

static USERNAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid username regex"));

/// Punctuation accepted as the "special character" password class.
const PASSWORD_SYMBOLS: &str = "!@#$%^&*(),.?\":{}|<>";

// ---

/// Checks username length and character set.
///
/// Availability (uniqueness among active sites) is a separate, delegated
/// lookup performed by [`super::AuthService`].
pub fn validate_username_format(username: &str) -> Result<(), VaultError> {
    // ---
    let len = username.chars().count();
    if len < MIN_USERNAME_LENGTH || len > MAX_USERNAME_LENGTH || !USERNAME_PATTERN.is_match(username)
    {
        return Err(VaultError::Validation(
            "Username must be 3-50 characters and contain only letters, numbers, underscores, and hyphens."
                .to_string(),
        ));
    }
    Ok(())
}

/// Checks password length and strength.
///
/// Requires at least one uppercase letter, one lowercase letter, one digit,
/// and one symbol; the error message names every class that is missing.
pub fn validate_password(password: &str) -> Result<(), VaultError> {
    // ---
    let len = password.chars().count();
    if len < MIN_PASSWORD_LENGTH || len > MAX_PASSWORD_LENGTH {
        return Err(VaultError::Validation(
            "Password must be 8-100 characters.".to_string(),
        ));
    }

    let mut missing = Vec::new();
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        missing.push("at least one uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        missing.push("at least one lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        missing.push("at least one number");
    }
    if !password.chars().any(|c| PASSWORD_SYMBOLS.contains(c)) {
        missing.push("at least one special character (!@#$%^&* etc.)");
    }

    if !missing.is_empty() {
        return Err(VaultError::Validation(format!(
            "Password must contain: {}",
            missing.join(", ")
        )));
    }
    Ok(())
}

/// Hashes a password with bcrypt at the given cost factor.
///
/// The output is self-describing: cost and per-invocation random salt are
/// embedded in the hash string, so no separate salt column is needed.
pub fn hash_password(password: &str, cost: u32) -> Result<String, VaultError> {
    // ---
    bcrypt::hash(password, cost)
        .map_err(|e| VaultError::Backend(anyhow::anyhow!("password hashing failed: {e}")))
}

/// Verifies a password against a stored bcrypt hash.
///
/// Malformed stored hashes and internal errors are verification failures,
/// never panics or propagated faults.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    // ---
    bcrypt::verify(password, stored_hash).unwrap_or(false)
}
