use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A password-protected site: one username, one password hash, many tabs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
    // ---
    pub id: Uuid,
    pub username: String,

    /// Bcrypt hash; self-describing (cost factor and salt are embedded),
    /// never stored in reversible form.
    pub password_hash: String,

    /// Urlsafe-base64 16-byte salt for content key derivation. Present only
    /// when the site was created with encryption enabled.
    pub encryption_salt: Option<String>,

    /// Soft-deactivation flag; inactive sites are invisible to lookups.
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub last_accessed: Option<DateTime<Utc>>,
}

impl Site {
    // ---
    pub fn new(username: String, password_hash: String, encryption_salt: Option<String>) -> Self {
        // ---
        Self {
            id: Uuid::new_v4(),
            username,
            password_hash,
            encryption_salt,
            is_active: true,
            created_at: Utc::now(),
            last_accessed: None,
        }
    }
}

/// Stored body of a tab.
///
/// Exactly one representation exists at a time, determined by whether
/// encryption is enabled for the owning site. The tagged variant makes the
/// "both set" and "both null" column states unrepresentable in the domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TabBody {
    Plaintext(String),
    Ciphertext(String),
}

impl TabBody {
    // ---
    pub fn is_encrypted(&self) -> bool {
        matches!(self, TabBody::Ciphertext(_))
    }
}

/// A named, ordered text tab owned by a site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tab {
    // ---
    pub id: Uuid,

    /// Owning site; tabs are cascade-deleted with their site.
    pub site_id: Uuid,

    /// Unique within the site, at most 100 characters.
    pub name: String,

    /// Non-negative display order.
    pub order: u32,

    pub body: TabBody,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tab {
    // ---
    pub fn new(site_id: Uuid, name: String, order: u32, body: TabBody) -> Self {
        // ---
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            site_id,
            name,
            order,
            body,
            created_at: now,
            updated_at: now,
        }
    }
}
