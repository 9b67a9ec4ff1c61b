//! System status snapshot for the admin dashboard.

use std::path::Path;
use std::time::Duration;

use chrono::Utc;

use folio_core::{DatabaseHealth, Resource, ResourceCount, SystemStatus};

use crate::db::{ContentRepository, DocumentStore, NotificationRepository, RepositoryError};
use crate::services::upload::directory_stats;

/// Crate version reported in the status.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Compute a [`SystemStatus`] snapshot.
///
/// A store that fails `ping` is reported as unavailable with no document
/// counts rather than failing the whole snapshot.
///
/// # Errors
///
/// Returns `RepositoryError::Store` if the store answers `ping` but a
/// count query fails.
pub async fn snapshot(
    store: &dyn DocumentStore,
    upload_dir: &Path,
    uptime: Duration,
) -> Result<SystemStatus, RepositoryError> {
    let database = match store.ping().await {
        Ok(()) => DatabaseHealth::Connected,
        Err(e) => {
            tracing::warn!(error = %e, "Document store ping failed");
            DatabaseHealth::Unavailable
        }
    };

    let mut resources = Vec::new();
    let mut unread_notifications = 0;
    if database == DatabaseHealth::Connected {
        for resource in Resource::ALL {
            let count = ContentRepository::new(store, resource).count().await?;
            resources.push(ResourceCount { resource, count });
        }
        unread_notifications = NotificationRepository::new(store).count_unread().await?;
    }

    let uploads = directory_stats(upload_dir).await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, dir = %upload_dir.display(), "Failed to read upload directory");
        folio_core::UploadStats::default()
    });

    Ok(SystemStatus {
        database,
        version: VERSION.to_owned(),
        uptime_seconds: uptime.as_secs(),
        resources,
        uploads,
        unread_notifications,
        generated_at: Utc::now(),
    })
}
