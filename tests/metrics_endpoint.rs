use serde_json::json;
use serial_test::serial;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

mod common;

// NOTE: Metrics use a global Prometheus registry.
// Tests are serial to avoid double-registration races.
// Can be removed once metrics registry is injectable per test.

#[tokio::test]
#[serial]
async fn metrics_endpoint_with_prometheus() {
    // ---
    // Set environment to use Prometheus metrics for this test
    common::setup_test_env();
    std::env::set_var("VAULT_METRICS_TYPE", "prom");

    let server = common::TestServer::new().await;

    // First, hit some endpoints to generate metrics
    let _ = server
        .client
        .get(server.url("/health"))
        .send()
        .await
        .unwrap();
    let _ = server.client.get(server.url("/")).send().await.unwrap();
    let _ = server
        .client
        .post(server.url("/sites"))
        .json(&json!({ "username": "metrics_probe", "password": "Str0ng!Pass" }))
        .send()
        .await
        .unwrap();

    // Give metrics a moment to be recorded
    sleep(Duration::from_millis(50)).await;

    // Now check the metrics endpoint
    let res = server
        .client
        .get(server.url("/metrics"))
        .send()
        .await
        .unwrap();

    // Check status before consuming the response
    assert!(
        res.status().is_success(),
        "Metrics endpoint should return success"
    );

    let body = res.text().await.unwrap();

    // The metrics endpoint should return some content
    assert!(!body.is_empty(), "Metrics should not be empty");

    // For Prometheus format, we expect specific patterns
    if body.contains("# HELP") || body.contains("# TYPE") {
        println!("Detected Prometheus format metrics");
    } else {
        println!("Metrics format: {body}");
    }

    // Clean up environment variable
    std::env::set_var("VAULT_METRICS_TYPE", "noop");
}

#[tokio::test]
#[serial]
async fn metrics_endpoint_with_noop() {
    // ---
    common::setup_test_env();
    std::env::set_var("VAULT_METRICS_TYPE", "noop");

    let server = common::TestServer::new().await;

    // Hit some endpoints
    let _ = server
        .client
        .get(server.url("/health"))
        .send()
        .await
        .unwrap();
    let _ = server.client.get(server.url("/")).send().await.unwrap();

    // Check the metrics endpoint
    let res = server
        .client
        .get(server.url("/metrics"))
        .send()
        .await
        .unwrap();

    // Should still return success even with noop metrics
    assert!(
        res.status().is_success(),
        "Metrics endpoint should return success even with noop"
    );

    let body = res.text().await.unwrap();
    println!("Noop metrics response: '{body}'");
}

#[tokio::test]
#[serial]
async fn metrics_endpoint_survives_load() {
    // ---
    common::setup_test_env();
    std::env::set_var("VAULT_METRICS_TYPE", "prom");

    let server = Arc::new(common::TestServer::new().await);

    // Seed a counted event first; the probe endpoints below don't increment
    // any domain counter, and an untouched registry renders empty.
    let seeded = server
        .client
        .post(server.url("/sites"))
        .json(&json!({ "username": "load_seed", "password": "Str0ng!Pass" }))
        .send()
        .await
        .unwrap();
    assert_eq!(seeded.status(), 201);

    // Generate some load
    let futures = (0..20).map(|i| {
        let server = Arc::clone(&server);
        async move {
            let endpoint = match i % 3 {
                0 => "/health",
                1 => "/",
                _ => "/metrics",
            };
            server.client.get(server.url(endpoint)).send().await
        }
    });

    let responses = futures::future::join_all(futures).await;

    // All requests should succeed
    for (i, response) in responses.into_iter().enumerate() {
        // ---

        let response = response.unwrap_or_else(|_| panic!("Request {i} should succeed"));
        assert!(
            response.status().is_success(),
            "Request {i} should return success"
        );
    }

    // Now check metrics
    let res = server
        .client
        .get(server.url("/metrics"))
        .send()
        .await
        .unwrap();
    assert!(res.status().is_success());

    let body = res.text().await.unwrap();
    assert!(!body.is_empty());

    std::env::set_var("VAULT_METRICS_TYPE", "noop");
}

#[tokio::test]
#[serial]
async fn metrics_content_type_is_correct() {
    // ---
    common::setup_test_env();
    std::env::set_var("VAULT_METRICS_TYPE", "prom");

    let server = common::TestServer::new().await;

    let res = server
        .client
        .get(server.url("/metrics"))
        .send()
        .await
        .unwrap();
    assert!(res.status().is_success());

    // Check content type
    let content_type = res.headers().get("content-type");
    println!("Metrics content-type: {content_type:?}");

    if let Some(ct) = content_type {
        let ct_str = ct.to_str().unwrap();
        assert!(
            ct_str.contains("text/plain")
                || ct_str.contains("text/")
                || ct_str.contains("application/"),
            "Content type should be appropriate for metrics: {ct_str}"
        );
    }

    std::env::set_var("VAULT_METRICS_TYPE", "noop");
}
