use reqwest::Client;
use securetext_vault::create_router;
use serde_json::json;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::sleep;

mod common;

struct TestServer {
    pub addr: std::net::SocketAddr,
    pub client: Client,
}

impl TestServer {
    // ---
    pub async fn new() -> Self {
        // --
        common::setup_test_env();

        // Enable debug logging only when requested
        if std::env::var("TEST_DEBUG").is_ok() {
            std::env::set_var("RUST_LOG", "debug");
            std::env::set_var("NO_COLOR", "1");
        }

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
}

#[tokio::test]
#[serial_test::serial]
async fn basic_integration_test() {
    // ---
    // Test that the router can be created successfully
    common::setup_test_env();
    let _router = create_router().expect("Should be able to create router");
}

#[tokio::test]
#[serial_test::serial]
async fn health_endpoint_works() {
    // ---
    let server = TestServer::new().await;

    let response = server
        .client
        .get(server.url("/health"))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body = response.text().await.expect("Failed to read response body");
    assert!(!body.is_empty());
}

#[tokio::test]
#[serial_test::serial]
async fn full_health_check_probes_backend() {
    // ---
    let server = TestServer::new().await;

    let response = server
        .client
        .get(server.url("/health?mode=full"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 200);
}

#[tokio::test]
#[serial_test::serial]
async fn root_endpoint_works() {
    // ---
    let server = TestServer::new().await;

    let response = server
        .client
        .get(server.url("/"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 200);

    let body = response.text().await.expect("Failed to read response body");
    assert!(!body.is_empty());
}

#[tokio::test]
#[serial_test::serial]
async fn invalid_routes_return_404() {
    // ---
    let server = TestServer::new().await;

    let response = server
        .client
        .get(server.url("/nonexistent"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[serial_test::serial]
async fn server_handles_concurrent_requests() {
    // ---
    let server = TestServer::new().await;

    // Make multiple concurrent requests
    let futures = (0..10).map(|_| server.client.get(server.url("/health")).send());

    let responses = futures::future::join_all(futures).await;

    // All requests should succeed
    for response in responses {
        let response = response.expect("Request should succeed");
        assert_eq!(response.status(), 200);
    }
}

#[tokio::test]
#[serial_test::serial]
async fn server_handles_malformed_json() {
    // ---
    let server = TestServer::new().await;

    // Send malformed JSON to the site creation endpoint
    let response = server
        .client
        .post(server.url("/sites"))
        .header("content-type", "application/json")
        .body("{ invalid json }")
        .send()
        .await
        .expect("Failed to send request");

    // Should return 400 Bad Request
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[serial_test::serial]
async fn protected_routes_require_bearer_token() {
    // ---
    let server = TestServer::new().await;

    for (method, path) in [
        ("GET", "/session"),
        ("GET", "/tabs"),
        ("POST", "/tabs"),
    ] {
        let request = match method {
            "GET" => server.client.get(server.url(path)),
            _ => server.client.post(server.url(path)).json(&json!({ "name": "X" })),
        };
        let response = request.send().await.expect("Failed to send request");
        assert_eq!(response.status(), 401, "{method} {path} without token");
    }
}
