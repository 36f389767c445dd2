//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint, against both the
//! memory and the file backend.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use cache_backends::cache::{FileBackend, FileConfig, MemoryBackend, StorageBackend};
use cache_backends::{api::create_router, AppState};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_app() -> Router {
    create_router(AppState::new(Arc::new(MemoryBackend::new())))
}

fn create_file_app() -> (Router, Arc<dyn StorageBackend>, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let backend: Arc<dyn StorageBackend> = Arc::new(FileBackend::new(
        FileConfig::new(temp_dir.path()).with_prefix("api"),
    ));
    (create_router(AppState::new(backend.clone())), backend, temp_dir)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

// == SET Endpoint Tests ==

#[tokio::test]
async fn test_set_endpoint_success() {
    let app = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/set")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"key":"test_key","value":"test_value"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert!(json["message"].as_str().unwrap().contains("test_key"));
}

#[tokio::test]
async fn test_set_endpoint_empty_key() {
    let app = create_test_app();

    let (status, json) = send(&app, "PUT", "/set", Some(r#"{"key":"","value":"v"}"#)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_invalid_json_request() {
    let app = create_test_app();

    let (status, _) = send(&app, "PUT", "/set", Some(r#"{"invalid json"#)).await;

    assert!(status.is_client_error());
}

// == GET Endpoint Tests ==

#[tokio::test]
async fn test_get_endpoint_success() {
    let app = create_test_app();

    let (status, _) = send(
        &app,
        "PUT",
        "/set",
        Some(r#"{"key":"get_key","value":"get_value"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = send(&app, "GET", "/get/get_key", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["key"], "get_key");
    assert_eq!(json["value"], "get_value");
}

#[tokio::test]
async fn test_get_endpoint_not_found() {
    let app = create_test_app();

    let (status, json) = send(&app, "GET", "/get/nonexistent_key", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("nonexistent_key"));
}

// == DELETE Endpoint Tests ==

#[tokio::test]
async fn test_delete_endpoint_success() {
    let app = create_test_app();

    send(
        &app,
        "PUT",
        "/set",
        Some(r#"{"key":"delete_key","value":"delete_value"}"#),
    )
    .await;

    let (status, _) = send(&app, "DELETE", "/del/delete_key", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", "/get/delete_key", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_endpoint_missing_key_is_ok() {
    let app = create_test_app();

    let (status, _) = send(&app, "DELETE", "/del/nonexistent_key", None).await;

    assert_eq!(status, StatusCode::OK);
}

// == CONTAINS / FLUSH Endpoint Tests ==

#[tokio::test]
async fn test_contains_endpoint() {
    let app = create_test_app();

    send(&app, "PUT", "/set", Some(r#"{"key":"c","value":"v","ttl":60}"#)).await;

    let (status, json) = send(&app, "GET", "/contains/c", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["contains"], true);
    assert_eq!(json["expired"], false);

    let (_, json) = send(&app, "GET", "/contains/missing", None).await;
    assert_eq!(json["contains"], false);
    assert_eq!(json["expired"], false);
}

#[tokio::test]
async fn test_flush_endpoint_clears_entries() {
    let app = create_test_app();

    send(&app, "PUT", "/set", Some(r#"{"key":"a","value":"1"}"#)).await;
    send(&app, "PUT", "/set", Some(r#"{"key":"b","value":"2"}"#)).await;

    let (status, json) = send(&app, "POST", "/flush", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["flushed"], true);

    let (status, _) = send(&app, "GET", "/get/a", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "GET", "/get/b", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// == File Backend over HTTP ==

#[tokio::test]
async fn test_file_backend_round_trip() {
    let (app, backend, temp_dir) = create_file_app();

    let (status, _) = send(&app, "PUT", "/set", Some(r#"{"key":"f","value":"on disk"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(temp_dir.path().join("api-f").exists());

    let (_, json) = send(&app, "GET", "/get/f", None).await;
    assert_eq!(json["value"], "on disk");

    let (_, json) = send(&app, "POST", "/flush", None).await;
    assert_eq!(json["flushed"], true);
    assert!(!backend.contains("f"));
}

#[tokio::test]
async fn test_file_backend_rejected_key_reads_as_miss() {
    let (app, _backend, _temp_dir) = create_file_app();

    let (status, _) = send(&app, "PUT", "/set", Some(r#"{"key":"..","value":"x"}"#)).await;
    // Fail-open: the write is swallowed, the request still succeeds
    assert_eq!(status, StatusCode::OK);

    let (_, json) = send(&app, "GET", "/stats", None).await;
    assert_eq!(json["errors"], 1);
}

// == STATS Endpoint Tests ==

#[tokio::test]
async fn test_stats_endpoint() {
    let app = create_test_app();

    send(
        &app,
        "PUT",
        "/set",
        Some(r#"{"key":"stats_key","value":"stats_value"}"#),
    )
    .await;
    send(&app, "GET", "/get/stats_key", None).await;
    send(&app, "GET", "/get/nonexistent", None).await;

    let (status, json) = send(&app, "GET", "/stats", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["hits"].as_u64().unwrap(), 1);
    assert_eq!(json["misses"].as_u64().unwrap(), 1);
    assert_eq!(json["errors"].as_u64().unwrap(), 0);
    assert_eq!(json["backend"], "<MemoryBackend>");
    assert!(json.get("hit_rate").is_some());
}

// == HEALTH Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let (status, json) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"].as_str().unwrap(), "healthy");
    assert!(json.get("timestamp").is_some());
}
