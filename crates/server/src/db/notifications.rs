//! Dashboard notification repository.

use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{self, Document, doc};
use serde::{Deserialize, Serialize};

use folio_core::{Notification, NotificationId, Severity};

use super::{
    DocumentStore, NOTIFICATIONS, Order, RepositoryError, StoreError, object_id,
    to_bson_datetime, to_chrono,
};

/// Most notifications returned by [`NotificationRepository::list`].
pub const LIST_LIMIT: u64 = 100;

/// Stored shape of a notification.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NotificationDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    severity: Severity,
    message: String,
    read: bool,
    created_at: bson::DateTime,
}

impl NotificationDocument {
    fn decode(document: Document) -> Result<Self, RepositoryError> {
        bson::from_document(document).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid notification document: {e}"))
        })
    }

    fn into_notification(self) -> Result<Notification, RepositoryError> {
        let id = NotificationId::parse(&self.id.to_hex())
            .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;
        Ok(Notification {
            id,
            severity: self.severity,
            message: self.message,
            read: self.read,
            created_at: to_chrono(self.created_at),
        })
    }
}

/// Repository for dashboard notifications.
pub struct NotificationRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> NotificationRepository<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Record a new unread notification.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the insert fails.
    pub async fn push(
        &self,
        severity: Severity,
        message: impl Into<String>,
    ) -> Result<Notification, RepositoryError> {
        let document = NotificationDocument {
            id: ObjectId::new(),
            severity,
            message: message.into(),
            read: false,
            created_at: to_bson_datetime(Utc::now()),
        };
        let encoded = bson::to_document(&document)
            .map_err(|e| StoreError::InvalidDocument(e.to_string()))?;
        self.store.insert_one(NOTIFICATIONS, encoded).await?;
        document.into_notification()
    }

    /// Record a notification unless an unread one with the same message
    /// already exists, in which case that one is returned.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the lookup or insert fails.
    pub async fn push_unique(
        &self,
        severity: Severity,
        message: impl Into<String>,
    ) -> Result<Notification, RepositoryError> {
        let message = message.into();
        let existing = self
            .store
            .find_one(
                NOTIFICATIONS,
                doc! { "message": message.as_str(), "read": false },
            )
            .await?;
        match existing {
            Some(document) => NotificationDocument::decode(document)?.into_notification(),
            None => self.push(severity, message).await,
        }
    }

    /// The latest [`LIST_LIMIT`] notifications, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a document is invalid.
    pub async fn list(&self) -> Result<Vec<Notification>, RepositoryError> {
        self.store
            .find(NOTIFICATIONS, doc! {}, Order::NewestFirst, Some(LIST_LIMIT))
            .await?
            .into_iter()
            .map(|d| NotificationDocument::decode(d)?.into_notification())
            .collect()
    }

    /// Mark one notification as read and return it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no notification has this id.
    /// Returns `RepositoryError::Store` if the update fails.
    pub async fn mark_read(&self, id: &NotificationId) -> Result<Notification, RepositoryError> {
        let updated = self
            .store
            .find_one_and_set(
                NOTIFICATIONS,
                doc! { "_id": object_id(id.as_str())? },
                doc! { "read": true },
            )
            .await?
            .ok_or(RepositoryError::NotFound)?;
        NotificationDocument::decode(updated)?.into_notification()
    }

    /// Number of unread notifications.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the query fails.
    pub async fn count_unread(&self) -> Result<u64, RepositoryError> {
        Ok(self
            .store
            .count(NOTIFICATIONS, doc! { "read": false })
            .await?)
    }
}
