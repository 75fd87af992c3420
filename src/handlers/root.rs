use axum::response::IntoResponse;

pub async fn root_handler() -> impl IntoResponse {
    let version = env!("CARGO_PKG_VERSION");
    format!(
        r#"Welcome to SecureText Vault 🔒
Version: {version}

Available endpoints:
  - POST   /sites             - Create a password-protected site
  - POST   /sites/login       - Authenticate and receive a session token
  - GET    /session           - Validate the bearer session token
  - GET    /tabs              - List tabs (bearer auth)
  - POST   /tabs              - Create a tab (bearer auth)
  - PUT    /tabs/{{id}}/content - Save tab content (bearer auth, ?autosave=true for best-effort)
  - PUT    /tabs/{{id}}/name    - Rename a tab (bearer auth)
  - DELETE /tabs/{{id}}         - Delete a tab (bearer auth)
  - GET    /health            - Light health check
  - GET    /health?mode=full  - Full health check (includes the backend store)
  - GET    /metrics           - Prometheus metrics

Password-protected text storage - no registration required.
"#
    )
}
