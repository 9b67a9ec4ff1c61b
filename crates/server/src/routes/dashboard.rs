//! Dashboard route handlers.
//!
//! GET  /admin?section=<name>
//! POST /admin/notifications/{id}/read

use askama::Template;
use axum::{
    Router,
    extract::{Path, Query, State},
    response::{Html, Redirect},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

use folio_core::{AdminSection, DatabaseHealth, Notification, NotificationId, SystemStatus};

use crate::db::{NotificationRepository, RepositoryError};
use crate::error::AppError;
use crate::middleware::RequireAdminAuth;
use crate::services::{ContentService, status};
use crate::state::AppState;

/// Query parameters of the dashboard.
#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub section: Option<String>,
}

/// Navigation tab.
#[derive(Debug, Clone)]
pub struct TabView {
    pub slug: &'static str,
    pub label: &'static str,
    pub active: bool,
}

/// Status widgets.
#[derive(Debug, Clone)]
pub struct StatusView {
    pub database: &'static str,
    pub database_ok: bool,
    pub version: String,
    pub uptime: String,
    pub upload_files: u64,
    pub upload_bytes: String,
    pub unread: u64,
    pub resources: Vec<ResourceCountView>,
}

/// Document count of one resource.
#[derive(Debug, Clone)]
pub struct ResourceCountView {
    pub label: &'static str,
    pub slug: &'static str,
    pub count: u64,
}

/// Notification row.
#[derive(Debug, Clone)]
pub struct NotificationView {
    pub id: String,
    pub severity: &'static str,
    pub message: String,
    pub read: bool,
    pub created_at: String,
}

/// Content document row.
#[derive(Debug, Clone)]
pub struct DocumentView {
    pub id: String,
    pub json: String,
}

/// Dashboard template.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub admin_email: String,
    pub section_label: &'static str,
    pub tabs: Vec<TabView>,
    pub status: StatusView,
    pub notifications: Vec<NotificationView>,
    /// Present on content sections.
    pub documents: Option<Vec<DocumentView>>,
    pub show_overview: bool,
    pub show_notifications: bool,
}

// =============================================================================
// Type Conversions
// =============================================================================

/// Format a byte count as e.g. `1.5 MiB`.
fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    #[allow(clippy::cast_precision_loss)]
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS.get(unit).copied().unwrap_or("B"))
    }
}

impl From<&SystemStatus> for StatusView {
    fn from(status: &SystemStatus) -> Self {
        let database_ok = status.database == DatabaseHealth::Connected;
        Self {
            database: if database_ok { "Connected" } else { "Unavailable" },
            database_ok,
            version: status.version.clone(),
            uptime: status.uptime_display(),
            upload_files: status.uploads.files,
            upload_bytes: format_bytes(status.uploads.total_bytes),
            unread: status.unread_notifications,
            resources: status
                .resources
                .iter()
                .map(|r| ResourceCountView {
                    label: r.resource.label(),
                    slug: r.resource.collection(),
                    count: r.count,
                })
                .collect(),
        }
    }
}

impl From<&Notification> for NotificationView {
    fn from(notification: &Notification) -> Self {
        Self {
            id: notification.id.to_string(),
            severity: notification.severity.as_str(),
            message: notification.message.clone(),
            read: notification.read,
            created_at: notification.created_at.format("%Y-%m-%d %H:%M UTC").to_string(),
        }
    }
}

impl From<&Value> for DocumentView {
    fn from(document: &Value) -> Self {
        Self {
            id: document
                .get("id")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            json: serde_json::to_string_pretty(document).unwrap_or_default(),
        }
    }
}

fn tabs(active: AdminSection) -> Vec<TabView> {
    AdminSection::ALL
        .into_iter()
        .map(|section| TabView {
            slug: section.slug(),
            label: section.label(),
            active: section == active,
        })
        .collect()
}

// =============================================================================
// Handlers
// =============================================================================

/// Where the mark-read form returns to.
const NOTIFICATIONS_PATH: &str = "/admin?section=notifications";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin", get(dashboard))
        .route("/admin/notifications/{id}/read", post(mark_read))
}

/// Render the dashboard.
///
/// Unknown or missing sections fall back to the overview.
#[instrument(skip(state, admin), fields(admin = %admin.email))]
async fn dashboard(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Query(query): Query<DashboardQuery>,
) -> Result<Html<String>, AppError> {
    let section = AdminSection::from_query(query.section.as_deref());

    let status = status::snapshot(state.store(), state.uploads().dir(), state.uptime()).await?;
    let notifications = if section == AdminSection::Notifications {
        NotificationRepository::new(state.store()).list().await?
    } else {
        Vec::new()
    };
    let documents = match section.resource() {
        Some(resource) => Some(
            ContentService::new(state.store(), resource)
                .list()
                .await?
                .iter()
                .map(DocumentView::from)
                .collect(),
        ),
        None => None,
    };

    let template = DashboardTemplate {
        admin_email: admin.email.to_string(),
        section_label: section.label(),
        tabs: tabs(section),
        status: StatusView::from(&status),
        notifications: notifications.iter().map(NotificationView::from).collect(),
        documents,
        show_overview: section == AdminSection::Overview,
        show_notifications: section == AdminSection::Notifications,
    };

    template
        .render()
        .map(Html)
        .map_err(|e| AppError::Internal(format!("template error: {e}")))
}

/// Mark a notification read from the notifications tab.
///
/// Unknown or malformed ids are ignored; the tab simply reloads.
#[instrument(skip(state, _admin))]
async fn mark_read(
    State(state): State<AppState>,
    RequireAdminAuth(_admin): RequireAdminAuth,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    if let Ok(id) = NotificationId::parse(&id) {
        match NotificationRepository::new(state.store()).mark_read(&id).await {
            Ok(_) | Err(RepositoryError::NotFound) => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(Redirect::to(NOTIFICATIONS_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.5 KiB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MiB");
    }

    #[test]
    fn test_tabs_mark_active_section() {
        let tabs = tabs(AdminSection::Quotes);
        assert_eq!(tabs.len(), AdminSection::ALL.len());
        let active: Vec<_> = tabs.iter().filter(|t| t.active).map(|t| t.slug).collect();
        assert_eq!(active, ["quotes"]);
    }
}
