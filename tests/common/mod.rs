// Test helpers are intentionally partially used
#![allow(dead_code)]

use reqwest::Client;
use securetext_vault::create_router;
use serde_json::json;
use std::sync::Once;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::sleep;

macro_rules! set_env_if_unset {
    // ---
    ($key:expr, $val:expr) => {
        if std::env::var($key).is_err() {
            std::env::set_var($key, $val);
        }
    };
}

static INIT: Once = Once::new();

// ============================================================================
// Test Setup
// ============================================================================

/// Initialize test environment variables once.
///
/// Tests run against the in-memory backend with a low bcrypt cost; each
/// `TestServer` gets a fresh repository, so tests never see each other's
/// sites or tabs.
pub fn setup_test_env() {
    // ---
    INIT.call_once(|| {
        // ---
        set_env_if_unset!("VAULT_BACKEND_KIND", "memory");
        set_env_if_unset!("VAULT_SESSION_SECRET", "integration-test-secret");
        set_env_if_unset!("VAULT_BCRYPT_COST", "4");
        set_env_if_unset!("VAULT_METRICS_TYPE", "noop");
    });
}

pub struct TestServer {
    pub addr: std::net::SocketAddr,
    pub client: Client,
}

impl TestServer {
    // ---
    pub async fn new() -> Self {
        // --
        setup_test_env();

        let app = create_router().expect("Should be able to create router");
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // Spawn the server in the background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give the server a moment to start
        sleep(Duration::from_millis(100)).await;

        let client = Client::new();

        Self { addr, client }
    }

    pub fn url(&self, path: &str) -> String {
        // ---
        format!("http://{}{}", self.addr, path)
    }

    /// Creates a site and returns its session token.
    pub async fn create_site(&self, username: &str, password: &str) -> String {
        // ---
        let response = self
            .client
            .post(self.url("/sites"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("Failed to create site");

        assert_eq!(response.status(), 201, "Site creation should succeed");

        let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
        body["token"]
            .as_str()
            .expect("Site creation should return a token")
            .to_string()
    }
}
