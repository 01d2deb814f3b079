use std::sync::Arc;

use agrobook::{
    app::build_app,
    auth::google::{GoogleIdentity, IdentityVerifier, VerifyError},
    config::AppConfig,
    state::AppState,
};
use axum::{
    async_trait,
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret";

/// Accepts credentials of the form `google_id|email|name`.
pub struct FakeVerifier;

#[async_trait]
impl IdentityVerifier for FakeVerifier {
    async fn verify(&self, credential: &str) -> Result<GoogleIdentity, VerifyError> {
        let mut parts = credential.split('|');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(google_id), Some(email), Some(name)) if !google_id.is_empty() => {
                Ok(GoogleIdentity {
                    google_id: google_id.into(),
                    email: email.into(),
                    name: name.into(),
                    picture: None,
                })
            }
            _ => Err(VerifyError::Rejected("unrecognized test credential".into())),
        }
    }
}

/// App over a pool that never connects unless a handler touches the database.
#[allow(dead_code)]
pub fn offline_app() -> Router {
    let config = AppConfig::for_tests(TEST_SECRET, "admin@example.com");
    let state = AppState::lazy(config, Arc::new(FakeVerifier)).expect("lazy state");
    build_app(state).expect("app")
}

#[allow(dead_code)]
pub fn database_url() -> Option<String> {
    std::env::var("TEST_DATABASE_URL").ok()
}

/// Skip the test unless `TEST_DATABASE_URL` points at a PostgreSQL instance.
#[macro_export]
macro_rules! require_db {
    () => {
        if crate::common::database_url().is_none() {
            eprintln!("⚠️  Skipping: TEST_DATABASE_URL not set");
            return;
        }
    };
}

/// Migrated app backed by `TEST_DATABASE_URL`, with `admin_email` on the allow-list.
#[allow(dead_code)]
pub async fn db_app(admin_email: &str) -> (Router, AppState) {
    let url = database_url().expect("TEST_DATABASE_URL");
    let db = sqlx::postgres::PgPoolOptions::new()
        .max_connections(4)
        .connect(&url)
        .await
        .expect("connect to test database");
    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .expect("run migrations");

    let mut config = AppConfig::for_tests(TEST_SECRET, admin_email);
    config.database_url = url;
    let state = AppState::from_parts(db, Arc::new(config), Arc::new(FakeVerifier));
    (build_app(state.clone()).expect("app"), state)
}

/// Unique address so parallel tests never share a user row.
#[allow(dead_code)]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@example.com", uuid::Uuid::new_v4())
}

#[allow(dead_code)]
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

/// Signs in through `/api/auth/google`; returns the session token and the user body.
#[allow(dead_code)]
pub async fn login(app: &Router, google_id: &str, email: &str, name: &str) -> (String, Value) {
    let credential = format!("{google_id}|{email}|{name}");
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/google",
        None,
        Some(serde_json::json!({ "credential": credential })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    let token = body["token"].as_str().expect("token").to_string();
    (token, body["user"].clone())
}
