//! Content resource routes.
//!
//! Every [`Resource`] is mounted at `/api/<resource>` with the same handlers;
//! the resource reaches them as a request extension.

use axum::{
    Extension, Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde_json::Value;
use tracing::instrument;

use folio_core::Resource;

use crate::error::AppError;
use crate::middleware::RequireAdminAuth;
use crate::routes::{parse_json, upload};
use crate::services::ContentService;
use crate::state::AppState;

/// Build the content router for all resources.
pub fn router() -> Router<AppState> {
    Resource::ALL
        .into_iter()
        .fold(Router::new(), |router, resource| {
            router.nest(&resource.api_path(), resource_router(resource))
        })
}

fn resource_router(resource: Resource) -> Router<AppState> {
    let mut router = Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show).put(update).delete(remove));

    if resource == Resource::About {
        router = router.route("/resume", upload::route());
    }

    router.layer(Extension(resource))
}

/// GET /api/{resource}
#[instrument(skip(state))]
async fn list(
    State(state): State<AppState>,
    Extension(resource): Extension<Resource>,
) -> Result<Json<Vec<Value>>, AppError> {
    let documents = ContentService::new(state.store(), resource).list().await?;
    Ok(Json(documents))
}

/// GET /api/{resource}/{id}
#[instrument(skip(state))]
async fn show(
    State(state): State<AppState>,
    Extension(resource): Extension<Resource>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let document = ContentService::new(state.store(), resource).get(&id).await?;
    Ok(Json(document))
}

/// POST /api/{resource}
#[instrument(skip(state, admin, body), fields(admin = %admin.email))]
async fn create(
    State(state): State<AppState>,
    Extension(resource): Extension<Resource>,
    RequireAdminAuth(admin): RequireAdminAuth,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let payload = parse_json(&body)?;
    let document = ContentService::new(state.store(), resource)
        .create(payload)
        .await?;
    Ok((StatusCode::CREATED, Json(document)))
}

/// PUT /api/{resource}/{id}
#[instrument(skip(state, admin, body), fields(admin = %admin.email))]
async fn update(
    State(state): State<AppState>,
    Extension(resource): Extension<Resource>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let payload = parse_json(&body)?;
    let document = ContentService::new(state.store(), resource)
        .update(&id, payload)
        .await?;
    Ok(Json(document))
}

/// DELETE /api/{resource}/{id}
#[instrument(skip(state, admin), fields(admin = %admin.email))]
async fn remove(
    State(state): State<AppState>,
    Extension(resource): Extension<Resource>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    ContentService::new(state.store(), resource)
        .delete(&id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
