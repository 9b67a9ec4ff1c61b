//! Banner, connectivity and health endpoints.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde_json::json;

use crate::state::AppState;

/// Text served at `/`.
pub const BANNER: &str = "Portfolio API is running";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(banner))
        .route("/test-db", get(test_db))
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
}

async fn banner() -> &'static str {
    BANNER
}

/// Ping the document store.
///
/// GET /test-db
async fn test_db(State(state): State<AppState>) -> impl IntoResponse {
    match state.store().ping().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "connected" }))),
        Err(e) => {
            tracing::error!(error = %e, "Document store ping failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable", "error": "Database connection failed" })),
            )
        }
    }
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the document store is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
