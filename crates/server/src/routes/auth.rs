//! Authentication route handlers for admin.
//!
//! Provides the login form, the JSON login endpoint and logout.

use askama::Template;
use axum::{
    Form, Json, Router,
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use folio_core::Severity;

use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::middleware::auth::LOGIN_PATH;
use crate::middleware::{
    OptionalAdminAuth, RequireAdminAuth, clear_current_admin, set_current_admin,
};
use crate::models::CurrentAdmin;
use crate::routes::{notify, parse_json};
use crate::services::AdminAuthService;
use crate::state::AppState;

/// Dashboard path a successful form login lands on.
const DASHBOARD_PATH: &str = "/admin";

/// Login credentials, from a form or a JSON body.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Query parameters of the login page.
#[derive(Debug, Deserialize)]
pub struct LoginPageQuery {
    pub error: Option<String>,
}

/// Login page template.
#[derive(Template)]
#[template(path = "login.html")]
struct LoginPageTemplate {
    error: Option<String>,
}

/// Build the HTML auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/login", get(login_page).post(login_form))
        .route("/admin/logout", post(logout))
}

/// Verify credentials and start an admin session.
///
/// Failed attempts are logged and recorded as warning notifications.
async fn authenticate(
    state: &AppState,
    session: &Session,
    credentials: &LoginRequest,
) -> Result<CurrentAdmin, AppError> {
    let result = AdminAuthService::new(state.store())
        .login(&credentials.email, &credentials.password)
        .await;

    match result {
        Ok(admin) => {
            let current = CurrentAdmin::from(&admin);
            set_current_admin(session, &current).await?;
            set_sentry_user(current.id.as_str(), Some(current.email.as_str()));
            Ok(current)
        }
        Err(e) => {
            if e.is_credential_failure() {
                tracing::warn!(email = %credentials.email, reason = %e, "Admin login failed");
                notify(
                    state,
                    Severity::Warning,
                    format!("Failed admin login for {}", credentials.email),
                )
                .await;
            }
            Err(e.into())
        }
    }
}

/// Render the login page.
///
/// GET /admin/login
async fn login_page(
    OptionalAdminAuth(admin): OptionalAdminAuth,
    Query(query): Query<LoginPageQuery>,
) -> Response {
    if admin.is_some() {
        return Redirect::to(DASHBOARD_PATH).into_response();
    }

    let error = query
        .error
        .map(|_| "Invalid email or password.".to_string());
    Html(
        LoginPageTemplate { error }
            .render()
            .unwrap_or_else(|_| String::from("Error rendering template")),
    )
    .into_response()
}

/// Handle the login form.
///
/// POST /admin/login
#[instrument(skip(state, session, form))]
async fn login_form(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginRequest>,
) -> Result<Redirect, AppError> {
    match authenticate(&state, &session, &form).await {
        Ok(_) => Ok(Redirect::to(DASHBOARD_PATH)),
        Err(AppError::Unauthorized(_) | AppError::BadRequest(_)) => {
            Ok(Redirect::to(&format!("{LOGIN_PATH}?error=credentials")))
        }
        Err(e) => Err(e),
    }
}

/// Logout and clear session.
///
/// POST /admin/logout
async fn logout(session: Session) -> impl IntoResponse {
    if let Err(e) = clear_current_admin(&session).await {
        tracing::warn!(error = %e, "Failed to clear admin session");
    }
    clear_sentry_user();
    Redirect::to(LOGIN_PATH)
}

/// JSON login.
///
/// POST /api/admin/login
#[instrument(skip(state, session, body))]
pub async fn api_login(
    State(state): State<AppState>,
    session: Session,
    body: Bytes,
) -> Result<Json<CurrentAdmin>, AppError> {
    let credentials: LoginRequest = parse_json(&body)?;
    Ok(Json(authenticate(&state, &session, &credentials).await?))
}

/// JSON logout. Requires a session like every other admin API route.
///
/// POST /api/admin/logout
#[instrument(skip(session, admin), fields(admin = %admin.email))]
pub async fn api_logout(
    RequireAdminAuth(admin): RequireAdminAuth,
    session: Session,
) -> Result<StatusCode, AppError> {
    clear_current_admin(&session).await?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}
