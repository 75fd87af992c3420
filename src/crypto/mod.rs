//! Content encryption core: password-based key derivation and authenticated
//! encryption of tab content.
//!
//! Keys are derived with PBKDF2-HMAC-SHA256 from a secret and a per-site
//! random salt, then fed to Fernet, whose tokens provide confidentiality,
//! integrity, and a timestamp. Decryption failures mean "content
//! unavailable"; they must never crash the caller.

use crate::error::VaultError;
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use fernet::Fernet;
use rand::RngCore;
use sha2::Sha256;

// ---

/// PBKDF2 iteration count.
pub const KEY_DERIVATION_ITERATIONS: u32 = 100_000;

/// Random salt length in bytes, generated once per site.
pub const SALT_LEN: usize = 16;

/// Derived key length in bytes (Fernet requirement).
const KEY_LEN: usize = 32;

// ---

/// Generates a fresh random key-derivation salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    // ---
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}

/// Generates a fresh salt in the urlsafe-base64 form stored with the site.
pub fn generate_salt_encoded() -> String {
    // ---
    URL_SAFE.encode(generate_salt())
}

// ---

/// Authenticated cipher for tab content, keyed by PBKDF2-derived material.
pub struct ContentCipher {
    // ---
    fernet: Fernet,
}

impl ContentCipher {
    // ---
    /// Derives the cipher from a secret and the site's stored base64 salt.
    ///
    /// The 32 derived bytes are urlsafe-base64 encoded into the key format
    /// Fernet expects.
    pub fn derive(secret: &str, salt_encoded: &str) -> Result<Self, VaultError> {
        // ---
        let salt = URL_SAFE
            .decode(salt_encoded)
            .map_err(|_| VaultError::Encryption)?;

        let mut key = [0u8; KEY_LEN];
        pbkdf2::pbkdf2_hmac::<Sha256>(
            secret.as_bytes(),
            &salt,
            KEY_DERIVATION_ITERATIONS,
            &mut key,
        );

        let fernet = Fernet::new(&URL_SAFE.encode(key)).ok_or(VaultError::Encryption)?;
        Ok(Self { fernet })
    }

    /// Encrypts content into a transportable authenticated token.
    pub fn encrypt(&self, content: &str) -> String {
        // ---
        self.fernet.encrypt(content.as_bytes())
    }

    /// Verifies and decrypts a token produced by [`ContentCipher::encrypt`].
    ///
    /// Any tampering, wrong key, or malformed token fails with
    /// [`VaultError::Decryption`]; garbage is never returned as valid.
    pub fn decrypt(&self, token: &str) -> Result<String, VaultError> {
        // ---
        let plaintext = self
            .fernet
            .decrypt(token)
            .map_err(|_| VaultError::Decryption)?;
        String::from_utf8(plaintext).map_err(|_| VaultError::Decryption)
    }
}
