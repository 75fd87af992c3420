use serde_json::json;
use serial_test::serial;

mod common;

// ============================================================================
// Site creation
// ============================================================================

#[tokio::test]
#[serial]
async fn create_site_returns_token_and_default_tab() {
    // ---
    let server = common::TestServer::new().await;

    let response = server
        .client
        .post(server.url("/sites"))
        .json(&json!({ "username": "alice", "password": "Str0ng!Pass" }))
        .send()
        .await
        .expect("Failed to create site");

    assert_eq!(response.status(), 201);

    let body: serde_json::Value = response.json().await.unwrap();
    let token = body["token"].as_str().expect("token present");
    assert_eq!(body["site"]["username"], "alice");
    assert!(body["site"].get("password_hash").is_none());

    // The new site starts with its default tab
    let response = server
        .client
        .get(server.url("/tabs"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let tabs: serde_json::Value = response.json().await.unwrap();
    let tabs = tabs["data"].as_array().expect("tab list");
    assert_eq!(tabs.len(), 1);
    assert_eq!(tabs[0]["name"], "Main");
    assert_eq!(tabs[0]["order"], 0);
    assert_eq!(tabs[0]["content"], "");
}

#[tokio::test]
#[serial]
async fn duplicate_username_is_rejected() {
    // ---
    let server = common::TestServer::new().await;
    server.create_site("alice", "Str0ng!Pass").await;

    let response = server
        .client
        .post(server.url("/sites"))
        .json(&json!({ "username": "alice", "password": "0ther!Pass" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[serial]
async fn weak_passwords_are_rejected_with_specifics() {
    // ---
    let server = common::TestServer::new().await;

    // Too short
    let response = server
        .client
        .post(server.url("/sites"))
        .json(&json!({ "username": "bob", "password": "Ab1!" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    // Missing character classes; the error names what is missing
    let response = server
        .client
        .post(server.url("/sites"))
        .json(&json!({ "username": "bob", "password": "alllowercase" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let body: serde_json::Value = response.json().await.unwrap();
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("uppercase"), "got: {message}");
    assert!(message.contains("number"), "got: {message}");
}

#[tokio::test]
#[serial]
async fn invalid_username_format_is_rejected() {
    // ---
    let server = common::TestServer::new().await;

    for username in ["ab", "has space", "bad/char", &"x".repeat(51)] {
        let response = server
            .client
            .post(server.url("/sites"))
            .json(&json!({ "username": username, "password": "Str0ng!Pass" }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 400, "username: {username:?}");
    }
}

// ============================================================================
// Login and sessions
// ============================================================================

#[tokio::test]
#[serial]
async fn login_returns_token_and_updates_last_accessed() {
    // ---
    let server = common::TestServer::new().await;
    server.create_site("alice", "Str0ng!Pass").await;

    let response = server
        .client
        .post(server.url("/sites/login"))
        .json(&json!({ "username": "alice", "password": "Str0ng!Pass" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["token"].as_str().is_some());
    assert!(!body["site"]["last_accessed"].is_null());
}

#[tokio::test]
#[serial]
async fn wrong_password_and_unknown_user_are_distinct() {
    // ---
    let server = common::TestServer::new().await;
    server.create_site("alice", "Str0ng!Pass").await;

    let response = server
        .client
        .post(server.url("/sites/login"))
        .json(&json!({ "username": "alice", "password": "Wr0ng!Pass" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    let response = server
        .client
        .post(server.url("/sites/login"))
        .json(&json!({ "username": "nobody", "password": "Str0ng!Pass" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[serial]
async fn session_endpoint_resolves_valid_token() {
    // ---
    let server = common::TestServer::new().await;
    let token = server.create_site("alice", "Str0ng!Pass").await;

    let response = server
        .client
        .get(server.url("/session"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["data"]["username"], "alice");
}

#[tokio::test]
#[serial]
async fn tampered_and_garbage_tokens_are_rejected() {
    // ---
    let server = common::TestServer::new().await;
    let token = server.create_site("alice", "Str0ng!Pass").await;

    // Flip the first character of the signature segment
    let mut parts: Vec<&str> = token.split('.').collect();
    assert_eq!(parts.len(), 3);
    let flipped = if parts[2].starts_with('A') { "B" } else { "A" };
    let tampered_sig = flipped.to_string() + &parts[2][1..];
    parts[2] = &tampered_sig;
    let tampered = parts.join(".");

    for bad in [tampered.as_str(), "garbage", "a.b", ""] {
        let response = server
            .client
            .get(server.url("/session"))
            .bearer_auth(bad)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 401, "token: {bad:?}");
    }
}
