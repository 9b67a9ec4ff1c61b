//! Unified error handling for HTTP handlers.
//!
//! Every error response carries a JSON body `{"error": "..."}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::{AuthError, ContentError, UploadError};

/// Message returned for both unknown accounts and wrong passwords.
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Request failed validation.
    #[error("{0}")]
    BadRequest(String),

    /// User is not authenticated.
    #[error("{0}")]
    Unauthorized(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Upload exceeded the size limit.
    #[error("{0}")]
    PayloadTooLarge(String),

    /// Upload had the wrong content type.
    #[error("{0}")]
    UnsupportedMediaType(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let message = if status.is_server_error() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<ContentError> for AppError {
    fn from(err: ContentError) -> Self {
        match err {
            ContentError::Validation(msg) => Self::BadRequest(msg),
            ContentError::NotFound(resource) => Self::NotFound(resource.to_string()),
            ContentError::Repository(e) => Self::Database(e),
        }
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::TooLarge => Self::PayloadTooLarge(err.to_string()),
            UploadError::UnsupportedType(_) | UploadError::NotPdf => {
                Self::UnsupportedMediaType(err.to_string())
            }
            UploadError::MissingFile
            | UploadError::TooManyFiles
            | UploadError::UnexpectedField(_)
            | UploadError::Malformed(_) => Self::BadRequest(err.to_string()),
            UploadError::Io(e) => Self::Internal(e.to_string()),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::NotFound | AuthError::InvalidCredentials => {
                Self::Unauthorized(INVALID_CREDENTIALS.to_string())
            }
            AuthError::InvalidEmail(_) | AuthError::WeakPassword(_) => {
                Self::BadRequest(err.to_string())
            }
            AuthError::AlreadyExists => Self::BadRequest(err.to_string()),
            AuthError::Repository(e) => Self::Database(e),
            AuthError::PasswordHash => Self::Internal(err.to_string()),
        }
    }
}

impl From<tower_sessions::session::Error> for AppError {
    fn from(err: tower_sessions::session::Error) -> Self {
        Self::Internal(format!("session error: {err}"))
    }
}

/// Set the Sentry user context from the logged-in admin.
pub fn set_sentry_user(admin_id: &str, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(admin_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use folio_core::Resource;

    use super::*;
    use crate::db::StoreError;

    fn get_status(err: impl Into<AppError>) -> StatusCode {
        err.into().into_response().status()
    }

    async fn body_json(err: AppError) -> serde_json::Value {
        let bytes = axum::body::to_bytes(err.into_response().into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("projects".to_string());
        assert_eq!(err.to_string(), "Not found: projects");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_upload_error_mapping() {
        assert_eq!(get_status(UploadError::TooLarge), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            get_status(UploadError::UnsupportedType("image/png".into())),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            get_status(UploadError::NotPdf),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(get_status(UploadError::MissingFile), StatusCode::BAD_REQUEST);
        assert_eq!(get_status(UploadError::TooManyFiles), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_content_and_auth_error_mapping() {
        assert_eq!(
            get_status(ContentError::Validation("bad".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(ContentError::NotFound(Resource::Quotes)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(get_status(AuthError::NotFound), StatusCode::UNAUTHORIZED);
        assert_eq!(
            get_status(AuthError::InvalidCredentials),
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn test_credential_failures_share_one_body() {
        let unknown = body_json(AuthError::NotFound.into()).await;
        let mismatch = body_json(AuthError::InvalidCredentials.into()).await;
        assert_eq!(unknown, mismatch);
        assert_eq!(unknown["error"], INVALID_CREDENTIALS);
    }

    #[tokio::test]
    async fn test_internal_details_hidden() {
        let err = AppError::Database(RepositoryError::Store(StoreError::InvalidDocument(
            "secret detail".into(),
        )));
        let body = body_json(err).await;
        assert_eq!(body["error"], "Internal server error");
    }
}
