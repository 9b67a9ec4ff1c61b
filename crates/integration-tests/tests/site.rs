//! Banner, connectivity and health endpoints.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::json;

use folio_integration_tests::{TestApp, body_json, body_text, request};
use folio_server::routes::site::BANNER;

#[tokio::test]
async fn test_banner() {
    let app = TestApp::new().await;
    let response = app.send(request("GET", "/", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, BANNER);
}

#[tokio::test]
async fn test_db_ping() {
    let app = TestApp::new().await;
    let response = app.send(request("GET", "/test-db", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "status": "connected" }));
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    assert_eq!(
        app.send(request("GET", "/health", None)).await.status(),
        StatusCode::OK
    );
    assert_eq!(
        app.send(request("GET", "/health/ready", None)).await.status(),
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_unknown_route() {
    let app = TestApp::new().await;
    let response = app.send(request("GET", "/api/unknown", None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
