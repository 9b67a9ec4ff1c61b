//! Admin session extractors.
//!
//! Pages under `/admin` send anonymous visitors to the login form; JSON
//! endpoints answer `401 {"error": "Authentication required"}` instead.

use axum::{
    Json,
    extract::{FromRequestParts, OriginalUri},
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;
use tower_sessions::Session;

use crate::models::{CurrentAdmin, session_keys};

/// Login page unauthenticated dashboard visitors are sent to.
pub const LOGIN_PATH: &str = "/admin/login";

const AUTH_REQUIRED: &str = "Authentication required";

/// The logged-in admin; rejects anonymous requests.
///
/// ```rust,ignore
/// async fn create(RequireAdminAuth(admin): RequireAdminAuth) -> String {
///     format!("created by {}", admin.email)
/// }
/// ```
pub struct RequireAdminAuth(pub CurrentAdmin);

/// Rejection of [`RequireAdminAuth`].
#[derive(Debug, PartialEq, Eq)]
pub enum AdminAuthRejection {
    RedirectToLogin,
    Unauthorized,
}

impl AdminAuthRejection {
    /// Pick the rejection for a request: JSON callers get a 401, browsers a redirect.
    ///
    /// Nested routers see their path with the mount prefix stripped, so the
    /// decision uses the URI the client sent.
    fn for_request(parts: &Parts) -> Self {
        let path = parts
            .extensions
            .get::<OriginalUri>()
            .map_or_else(|| parts.uri.path(), |original| original.0.path());
        let accepts_json = parts
            .headers
            .get(header::ACCEPT)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("application/json"));

        if path.starts_with("/api/") || accepts_json {
            Self::Unauthorized
        } else {
            Self::RedirectToLogin
        }
    }
}

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::Unauthorized => {
                (StatusCode::UNAUTHORIZED, Json(json!({ "error": AUTH_REQUIRED }))).into_response()
            }
        }
    }
}

impl<S> FromRequestParts<S> for RequireAdminAuth
where
    S: Send + Sync,
{
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_admin(parts)
            .await
            .map(Self)
            .ok_or_else(|| AdminAuthRejection::for_request(parts))
    }
}

/// The logged-in admin, if any. Never rejects.
pub struct OptionalAdminAuth(pub Option<CurrentAdmin>);

impl<S> FromRequestParts<S> for OptionalAdminAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(current_admin(parts).await))
    }
}

/// Read the admin from the request's session.
///
/// A missing session layer, an unreadable record and an anonymous session
/// all read as "not logged in".
async fn current_admin(parts: &Parts) -> Option<CurrentAdmin> {
    let session = parts.extensions.get::<Session>()?;
    match session.get::<CurrentAdmin>(session_keys::CURRENT_ADMIN).await {
        Ok(admin) => admin,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read admin session");
            None
        }
    }
}

/// Start an authenticated session for `admin`.
///
/// The session id is rotated so an id issued before login cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_admin(
    session: &Session,
    admin: &CurrentAdmin,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_ADMIN, admin).await
}

/// End the admin session and delete its record.
///
/// # Errors
///
/// Returns an error if the session record cannot be deleted.
pub async fn clear_current_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts(uri: &str, accept: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri(uri);
        if let Some(accept) = accept {
            builder = builder.header(header::ACCEPT, accept);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_api_requests_get_401() {
        assert_eq!(
            AdminAuthRejection::for_request(&parts("/api/projects", None)),
            AdminAuthRejection::Unauthorized
        );
        assert_eq!(
            AdminAuthRejection::for_request(&parts("/admin", Some("application/json"))),
            AdminAuthRejection::Unauthorized
        );
    }

    #[test]
    fn test_nested_api_routes_get_401() {
        // Inside `nest("/api/admin", ..)` the router sees only `/me`
        let mut nested = parts("/me", None);
        nested
            .extensions
            .insert(OriginalUri("/api/admin/me".parse().unwrap()));
        assert_eq!(
            AdminAuthRejection::for_request(&nested),
            AdminAuthRejection::Unauthorized
        );
    }

    #[test]
    fn test_pages_redirect() {
        assert_eq!(
            AdminAuthRejection::for_request(&parts("/admin?section=quotes", Some("text/html"))),
            AdminAuthRejection::RedirectToLogin
        );
    }

    #[tokio::test]
    async fn test_missing_session_layer_is_anonymous() {
        let mut parts = parts("/admin", None);
        let OptionalAdminAuth(admin) = OptionalAdminAuth::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert!(admin.is_none());
    }
}
