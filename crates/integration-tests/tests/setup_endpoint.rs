//! HTTP-level tests for `/api/setup`.
//!
//! The router is driven in-process with `tower::ServiceExt::oneshot`; the
//! database is an `InMemoryStore` injected through `AppState::with_store`.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::{
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
    response::Response,
};
use serde_json::{Value, json};
use shukku_integration_tests::{
    app_with_store, config_from, config_with_credentials, config_without_credentials,
};
use shukku_setup::store::InMemoryStore;
use tower::ServiceExt;

async fn send(
    config: shukku_setup::config::SetupConfig,
    store: &Arc<InMemoryStore>,
    method: Method,
    uri: &str,
) -> Response {
    let app = app_with_store(config, store.clone());
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn json_body(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

fn assert_cors(response: &Response) {
    let headers = response.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_METHODS],
        "GET, POST, OPTIONS"
    );
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type");
}

#[tokio::test]
async fn test_get_provisions_demo_data() {
    let store = Arc::new(InMemoryStore::new());
    let response = send(config_with_credentials(), &store, Method::GET, "/api/setup").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_cors(&response);

    let body = json_body(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["message"], json!("Shukku List Database Setup Complete!"));
    assert_eq!(body["data"]["project"], json!("shukku-list"));
    assert_eq!(body["data"]["users"], json!(2));
    assert_eq!(body["data"]["pairs"], json!(1));
    assert_eq!(body["data"]["demo"]["inviteCode"], json!("729463"));
    assert_eq!(body["data"]["demo"]["items"], json!(6));
    assert_eq!(body["data"]["demo"]["couple"], json!("Giash & Rina"));
    assert_eq!(
        body["data"]["demo"]["users"][0],
        json!({ "name": "Giash", "email": "giash@shukku.com", "uid": "giash_uid" })
    );

    let timestamp = body["timestamp"].as_str().unwrap();
    assert!(timestamp.ends_with('Z'));
    // Millisecond precision: "YYYY-MM-DDTHH:MM:SS.mmmZ"
    assert_eq!(timestamp.len(), 24);

    assert_eq!(store.ids("users").await, ["giash_uid", "rina_uid"]);
    assert_eq!(store.ids("pairs").await, ["giash_rina_home"]);
}

#[tokio::test]
async fn test_post_is_rejected_without_database_access() {
    let store = Arc::new(InMemoryStore::new());
    let response = send(config_with_credentials(), &store, Method::POST, "/api/setup").await;

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_cors(&response);
    assert_eq!(
        json_body(response).await,
        json!({ "success": false, "error": "Use GET request to setup database" })
    );
    assert_eq!(store.operations(), 0);
}

#[tokio::test]
async fn test_other_methods_are_rejected() {
    let store = Arc::new(InMemoryStore::new());
    for method in [Method::PUT, Method::DELETE, Method::PATCH] {
        let response = send(config_with_credentials(), &store, method, "/api/setup").await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
    assert_eq!(store.operations(), 0);
}

#[tokio::test]
async fn test_options_preflight_is_empty_ok() {
    let store = Arc::new(InMemoryStore::new());
    let response = send(
        config_with_credentials(),
        &store,
        Method::OPTIONS,
        "/api/setup",
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_cors(&response);
    assert!(body_bytes(response).await.is_empty());
    assert_eq!(store.operations(), 0);
}

#[tokio::test]
async fn test_missing_credentials_reports_setup_steps() {
    let store = Arc::new(InMemoryStore::new());
    let response = send(config_without_credentials(), &store, Method::GET, "/api/setup").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_cors(&response);

    let body = json_body(response).await;
    assert_eq!(body["success"], json!(false));
    let error = body["error"].as_str().unwrap();
    assert!(error.starts_with("FIREBASE_SERVICE_ACCOUNT environment variable is missing."));
    assert!(error.contains("Generate New Private Key"));
    assert!(body["help"].as_str().unwrap().contains("Required Setup:"));

    assert_eq!(store.operations(), 0);
}

#[tokio::test]
async fn test_malformed_credentials_report_parse_error() {
    let store = Arc::new(InMemoryStore::new());
    let config = config_from(&[("FIREBASE_SERVICE_ACCOUNT", "{not json")]);
    let response = send(config, &store, Method::GET, "/api/setup").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .contains("not valid JSON")
    );
    assert_eq!(store.operations(), 0);
}

#[tokio::test]
async fn test_health_and_request_id() {
    let store = Arc::new(InMemoryStore::new());
    let app = app_with_store(config_without_credentials(), store.clone());
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "abc-123")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-request-id"], "abc-123");
    assert_eq!(body_bytes(response).await, b"ok");
}
