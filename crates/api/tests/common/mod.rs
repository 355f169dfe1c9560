//! Common test utilities for integration tests.
//!
//! Tests drive the full router against the in-memory document store, so no
//! external services are required.

// Not every test binary uses every helper.
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request},
    response::Response,
    Router,
};
use domain::store::MemoryStore;
use hotspot_api::{
    app::create_app,
    config::{
        Config, DatabaseConfig, GroupsConfig, JwtAuthConfig, LoggingConfig, ServerConfig,
        StoreBackend, StoreConfig,
    },
};
use serde_json::{json, Value};
use shared::jwt::JwtConfig;
use std::sync::Arc;
use tower::ServiceExt;

pub const TEST_JWT_SECRET: &str = "integration_test_secret_key_0123456789";

/// Test configuration using the in-memory store and an HS256 secret.
pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            request_timeout_secs: 30,
        },
        database: DatabaseConfig::default(),
        store: StoreConfig {
            backend: StoreBackend::Memory,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        jwt: JwtAuthConfig {
            secret: TEST_JWT_SECRET.to_string(),
            public_key: String::new(),
            leeway_secs: 0,
        },
        groups: GroupsConfig::default(),
    }
}

/// Router plus a handle on its store for asserting persisted state.
pub struct TestApp {
    pub router: Router,
    pub store: MemoryStore,
}

pub fn create_test_app(config: Config) -> TestApp {
    let store = MemoryStore::new();
    let router =
        create_app(config, Arc::new(store.clone())).expect("Failed to build test app");
    TestApp { router, store }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }
}

fn signer() -> JwtConfig {
    JwtConfig::hs256(TEST_JWT_SECRET, 0).unwrap()
}

/// Token for a caller carrying the admin claim.
pub fn admin_token(uid: &str) -> String {
    signer().issue_token(uid, true, 3600).unwrap()
}

/// Token for a regular traveller.
pub fn user_token(uid: &str) -> String {
    signer().issue_token(uid, false, 3600).unwrap()
}

/// Build a JSON request, optionally authenticated.
pub fn json_request(method: Method, uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

/// Build a GET request, optionally authenticated.
pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn parse_response_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(Value::Null)
}

pub fn krakow_group() -> Value {
    json!({
        "name": "Krakow Feb",
        "city": "Krakow",
        "startDate": "2026-02-01",
        "endDate": "2026-02-05"
    })
}

/// Create a group as `admin_uid` and return the `{ groupId, code }` body.
pub async fn create_test_group(app: &TestApp, admin_uid: &str, body: Value) -> Value {
    let token = admin_token(admin_uid);
    let response = app
        .send(json_request(Method::POST, "/api/v1/groups", body, Some(&token)))
        .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    parse_response_body(response).await
}

/// Redeem `code` as `uid`.
pub async fn join_test_group(app: &TestApp, uid: &str, code: &str) -> Response {
    let token = user_token(uid);
    app.send(json_request(
        Method::POST,
        "/api/v1/groups/join",
        json!({ "code": code }),
        Some(&token),
    ))
    .await
}
