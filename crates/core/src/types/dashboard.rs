//! Admin dashboard view models.
//!
//! `SystemStatus` is computed on demand by the server; `Notification`s are
//! persisted and shown in the dashboard's notification list.

use core::fmt;
use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::NotificationId;
use super::resource::Resource;

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Warning,
    Error,
}

impl Severity {
    /// Lowercase name, as stored and serialized.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(Self::Info),
            "warning" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            _ => Err(format!("unknown severity: {s}")),
        }
    }
}

/// A dashboard notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    pub severity: Severity,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Reachability of the document store at snapshot time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseHealth {
    Connected,
    Unavailable,
}

/// Number of documents in one content collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceCount {
    pub resource: Resource,
    pub count: u64,
}

/// Files currently held in the upload directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadStats {
    pub files: u64,
    pub total_bytes: u64,
}

/// Snapshot rendered by the dashboard's status widgets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatus {
    pub database: DatabaseHealth,
    pub version: String,
    pub uptime_seconds: u64,
    /// Empty when the database is unavailable.
    pub resources: Vec<ResourceCount>,
    pub uploads: UploadStats,
    pub unread_notifications: u64,
    pub generated_at: DateTime<Utc>,
}

impl SystemStatus {
    /// Format the uptime as e.g. `2d 3h 4m`.
    #[must_use]
    pub fn uptime_display(&self) -> String {
        let minutes = self.uptime_seconds / 60;
        let (days, hours, mins) = (minutes / 1440, (minutes / 60) % 24, minutes % 60);
        if days > 0 {
            format!("{days}d {hours}h {mins}m")
        } else if hours > 0 {
            format!("{hours}h {mins}m")
        } else {
            format!("{mins}m")
        }
    }
}

/// Tabs of the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AdminSection {
    #[default]
    Overview,
    Projects,
    About,
    Home,
    Quotes,
    Contact,
    Settings,
    Notifications,
}

impl AdminSection {
    pub const ALL: [Self; 8] = [
        Self::Overview,
        Self::Projects,
        Self::About,
        Self::Home,
        Self::Quotes,
        Self::Contact,
        Self::Settings,
        Self::Notifications,
    ];

    /// Query-string value selecting this section.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::Projects => "projects",
            Self::About => "about",
            Self::Home => "home",
            Self::Quotes => "quotes",
            Self::Contact => "contact",
            Self::Settings => "settings",
            Self::Notifications => "notifications",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Overview => "Overview",
            Self::Notifications => "Notifications",
            other => match other.resource() {
                Some(resource) => resource.label(),
                None => "",
            },
        }
    }

    /// Content resource edited in this section, if any.
    #[must_use]
    pub const fn resource(self) -> Option<Resource> {
        match self {
            Self::Projects => Some(Resource::Projects),
            Self::About => Some(Resource::About),
            Self::Home => Some(Resource::Home),
            Self::Quotes => Some(Resource::Quotes),
            Self::Contact => Some(Resource::Contact),
            Self::Settings => Some(Resource::Settings),
            Self::Overview | Self::Notifications => None,
        }
    }

    /// Resolve a `?section=` value, falling back to the overview.
    #[must_use]
    pub fn from_query(value: Option<&str>) -> Self {
        value
            .and_then(|v| Self::ALL.into_iter().find(|s| s.slug() == v))
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn status(uptime_seconds: u64) -> SystemStatus {
        SystemStatus {
            database: DatabaseHealth::Connected,
            version: "0.1.0".to_string(),
            uptime_seconds,
            resources: Vec::new(),
            uploads: UploadStats::default(),
            unread_notifications: 0,
            generated_at: Utc::now(),
        }
    }

    #[test]
    fn test_severity_serde() {
        assert_eq!(
            serde_json::to_string(&Severity::Warning).unwrap(),
            "\"warning\""
        );
        let parsed: Severity = serde_json::from_str("\"error\"").unwrap();
        assert_eq!(parsed, Severity::Error);
        assert_eq!("info".parse::<Severity>().unwrap(), Severity::Info);
        assert!("fatal".parse::<Severity>().is_err());
    }

    #[test]
    fn test_uptime_display() {
        assert_eq!(status(59).uptime_display(), "0m");
        assert_eq!(status(3 * 3600 + 120).uptime_display(), "3h 2m");
        assert_eq!(status(2 * 86_400 + 3600 + 60).uptime_display(), "2d 1h 1m");
    }

    #[test]
    fn test_section_from_query() {
        assert_eq!(
            AdminSection::from_query(Some("quotes")),
            AdminSection::Quotes
        );
        assert_eq!(AdminSection::from_query(Some("bogus")), AdminSection::Overview);
        assert_eq!(AdminSection::from_query(None), AdminSection::Overview);
    }

    #[test]
    fn test_section_resource_mapping() {
        assert_eq!(AdminSection::About.resource(), Some(Resource::About));
        assert_eq!(AdminSection::Notifications.resource(), None);
        assert_eq!(AdminSection::Settings.label(), "Settings");
    }

    #[test]
    fn test_system_status_serializes_camel_case() {
        let json = serde_json::to_value(status(0)).unwrap();
        assert!(json.get("uptimeSeconds").is_some());
        assert!(json.get("unreadNotifications").is_some());
        assert_eq!(json["database"], "connected");
    }
}
