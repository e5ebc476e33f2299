// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use stride_tracker::config::Config;
use stride_tracker::db::JsonDb;
use stride_tracker::middleware::auth::create_jwt;
use stride_tracker::routes::create_router;
use stride_tracker::AppState;
use tempfile::TempDir;
use uuid::Uuid;

/// Create a test app backed by a store in a fresh temp dir.
///
/// The `TempDir` guard must stay alive for the duration of the test.
#[allow(dead_code)]
pub async fn create_test_app() -> (axum::Router, Arc<AppState>, TempDir) {
    let tmp = TempDir::new().expect("Failed to create temp dir");
    let mut config = Config::test_default();
    config.data_dir = tmp.path().to_path_buf();

    let db = JsonDb::open(&config.data_dir)
        .await
        .expect("Failed to open store");

    let state = Arc::new(AppState { config, db });
    (create_router(state.clone()), state, tmp)
}

/// Create a session JWT the way the auth routes do.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: Uuid, signing_key: &[u8]) -> String {
    create_jwt(user_id, signing_key).expect("Failed to create JWT")
}

/// Build an authenticated JSON request.
#[allow(dead_code)]
pub fn authed_request(
    method: &str,
    uri: &str,
    token: &str,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"));

    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Build an unauthenticated JSON request.
#[allow(dead_code)]
pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&bytes).expect("Body was not valid JSON")
}

/// Register a user through the API and return (token, user id).
#[allow(dead_code)]
pub async fn register_user(app: &axum::Router, email: &str) -> (String, Uuid) {
    use tower::ServiceExt;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/register",
            serde_json::json!({ "email": email, "password": "correct-horse" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);

    let body = body_json(response).await;
    let token = body["token"].as_str().expect("token missing").to_string();
    let user_id = body["user"]["id"]
        .as_str()
        .expect("user id missing")
        .parse()
        .expect("user id not a UUID");
    (token, user_id)
}
