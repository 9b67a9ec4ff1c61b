//! Resume upload route.
//!
//! POST /api/about/resume (multipart, admin only)

use axum::{
    Json,
    extract::{DefaultBodyLimit, Multipart, State},
    routing::{MethodRouter, post},
};
use serde::Serialize;
use tracing::instrument;

use folio_core::Severity;

use crate::error::AppError;
use crate::middleware::RequireAdminAuth;
use crate::routes::notify;
use crate::services::upload::{MAX_UPLOAD_BYTES, UPLOAD_FIELD};
use crate::services::{StoredUpload, UploadError, UploadGate};
use crate::state::AppState;

/// Request body limit for the upload route: the file limit plus room for
/// multipart framing. Larger bodies fail with 413 like oversized files.
pub const UPLOAD_BODY_LIMIT: usize = MAX_UPLOAD_BYTES + 64 * 1024;

/// Response for an accepted upload.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Path relative to the site root, `uploads/<name>`.
    pub path: String,
    /// Absolute URL of the stored file.
    pub url: String,
    /// Size in bytes.
    pub size: u64,
}

/// Method router for the upload endpoint, with its own body limit.
pub fn route() -> MethodRouter<AppState> {
    post(upload_resume).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
}

#[instrument(skip(state, admin, multipart), fields(admin = %admin.email))]
async fn upload_resume(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    match receive(state.uploads(), multipart).await {
        Ok(stored) => {
            notify(
                &state,
                Severity::Info,
                format!("Resume uploaded: {} ({} bytes)", stored.name, stored.size),
            )
            .await;

            let base = state.config().base_url.trim_end_matches('/');
            Ok(Json(UploadResponse {
                url: format!("{base}/{}", stored.path),
                path: stored.path,
                size: stored.size,
            }))
        }
        Err(e) => {
            if matches!(e, UploadError::Io(_)) {
                notify(&state, Severity::Error, format!("Resume upload failed: {e}")).await;
            } else {
                tracing::warn!(error = %e, "Resume upload rejected");
                notify(&state, Severity::Warning, format!("Resume upload rejected: {e}")).await;
            }
            Err(e.into())
        }
    }
}

/// Read the multipart body and store its single `resume` file.
///
/// The whole body is checked before anything is written.
async fn receive(gate: &UploadGate, mut multipart: Multipart) -> Result<StoredUpload, UploadError> {
    let mut accepted: Option<(Option<String>, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_owned();
        if field.file_name().is_none() && name != UPLOAD_FIELD {
            // Plain form fields are ignored.
            continue;
        }
        if accepted.is_some() {
            return Err(UploadError::TooManyFiles);
        }
        if name != UPLOAD_FIELD {
            return Err(UploadError::UnexpectedField(name));
        }

        UploadGate::check_content_type(field.content_type())?;
        let file_name = field.file_name().map(str::to_owned);
        let content = UploadGate::read(field).await?;
        accepted = Some((file_name, content));
    }

    let (file_name, content) = accepted.ok_or(UploadError::MissingFile)?;
    gate.store(file_name.as_deref(), &content).await
}
