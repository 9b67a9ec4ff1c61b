//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Banner
//! GET  /test-db                - Document store ping
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check
//!
//! # Content (reads public, writes require an admin session)
//! GET    /api/{resource}       - List documents
//! POST   /api/{resource}       - Create document
//! GET    /api/{resource}/{id}  - Get document
//! PUT    /api/{resource}/{id}  - Merge fields into document
//! DELETE /api/{resource}/{id}  - Delete document
//! POST   /api/about/resume     - Upload resume PDF (multipart field `resume`)
//!
//! # Admin API
//! POST /api/admin/login        - Email/password login
//! POST /api/admin/logout       - Logout
//! GET  /api/admin/me           - Current admin
//! GET  /api/admin/dashboard    - Status snapshot and notifications
//! GET  /api/admin/notifications           - Notifications, newest first
//! POST /api/admin/notifications/{id}/read - Mark notification read
//!
//! # Admin pages
//! GET  /admin?section=<name>   - Dashboard
//! GET  /admin/login            - Login form
//! POST /admin/login            - Login form submit
//! POST /admin/logout           - Logout
//!
//! # Static
//! GET  /uploads/*              - Uploaded files
//! ```

pub mod admin;
pub mod auth;
pub mod content;
pub mod dashboard;
pub mod site;
pub mod upload;

use axum::Router;
use axum::body::Bytes;
use serde::de::DeserializeOwned;
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use folio_core::Severity;

use crate::db::NotificationRepository;
use crate::error::AppError;
use crate::middleware::create_session_layer;
use crate::state::AppState;

/// Build the full application: routes, static uploads, sessions and tracing.
///
/// Sentry layers are added by the binary on top of this.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.store_handle(), state.config());
    let uploads = ServeDir::new(state.uploads().dir());

    Router::new()
        .merge(site::router())
        .merge(content::router())
        .nest("/api/admin", admin::router())
        .merge(auth::router())
        .merge(dashboard::router())
        .nest_service("/uploads", uploads)
        .layer(session_layer)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record("latency_ms", latency.as_millis() as u64);
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// Record a dashboard notification. Repeats of an unread message are folded
/// into the existing one.
///
/// Failures are logged and otherwise ignored so the request that triggered
/// the notification still completes.
pub(crate) async fn notify(state: &AppState, severity: Severity, message: String) {
    if let Err(e) = NotificationRepository::new(state.store())
        .push_unique(severity, message)
        .await
    {
        tracing::warn!(error = %e, "Failed to record notification");
    }
}

/// Parse a JSON request body, reporting failures as validation errors.
///
/// Unlike `axum::Json` this ignores the `Content-Type` header and keeps the
/// JSON error body format.
pub(crate) fn parse_json<T: DeserializeOwned>(body: &Bytes) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|e| AppError::BadRequest(format!("invalid JSON: {e}")))
}
