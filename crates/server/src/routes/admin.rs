//! Admin JSON API, mounted at `/api/admin`.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde::Serialize;
use tracing::instrument;

use folio_core::{Notification, NotificationId, SystemStatus};

use crate::db::{NotificationRepository, RepositoryError};
use crate::error::AppError;
use crate::middleware::RequireAdminAuth;
use crate::models::CurrentAdmin;
use crate::routes::auth::{api_login, api_logout};
use crate::services::status;
use crate::state::AppState;

/// Dashboard payload.
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub status: SystemStatus,
    pub notifications: Vec<Notification>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(api_login))
        .route("/logout", post(api_logout))
        .route("/me", get(me))
        .route("/dashboard", get(dashboard))
        .route("/notifications", get(notifications))
        .route("/notifications/{id}/read", post(mark_read))
}

/// GET /api/admin/me
async fn me(RequireAdminAuth(admin): RequireAdminAuth) -> Json<CurrentAdmin> {
    Json(admin)
}

/// GET /api/admin/dashboard
#[instrument(skip(state, _admin))]
async fn dashboard(
    State(state): State<AppState>,
    RequireAdminAuth(_admin): RequireAdminAuth,
) -> Result<Json<DashboardResponse>, AppError> {
    let status = status::snapshot(state.store(), state.uploads().dir(), state.uptime()).await?;
    let notifications = NotificationRepository::new(state.store()).list().await?;
    Ok(Json(DashboardResponse {
        status,
        notifications,
    }))
}

/// GET /api/admin/notifications
#[instrument(skip(state, _admin))]
async fn notifications(
    State(state): State<AppState>,
    RequireAdminAuth(_admin): RequireAdminAuth,
) -> Result<Json<Vec<Notification>>, AppError> {
    Ok(Json(NotificationRepository::new(state.store()).list().await?))
}

/// POST /api/admin/notifications/{id}/read
#[instrument(skip(state, _admin))]
async fn mark_read(
    State(state): State<AppState>,
    RequireAdminAuth(_admin): RequireAdminAuth,
    Path(id): Path<String>,
) -> Result<Json<Notification>, AppError> {
    let id = NotificationId::parse(&id)
        .map_err(|e| AppError::BadRequest(format!("invalid id: {e}")))?;

    match NotificationRepository::new(state.store()).mark_read(&id).await {
        Ok(notification) => Ok(Json(notification)),
        Err(RepositoryError::NotFound) => Err(AppError::NotFound(format!("notification {id}"))),
        Err(e) => Err(e.into()),
    }
}
