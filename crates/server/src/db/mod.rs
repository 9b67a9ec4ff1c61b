//! Document store access.
//!
//! # Collections
//!
//! - `admins` - Admin accounts (unique `email`, argon2 `passwordHash`)
//! - `sessions` - Admin session records (TTL on `expiresAt`)
//! - `notifications` - Dashboard notifications
//! - `projects`, `about`, `home`, `quotes`, `contact`, `settings` - Site content
//!
//! # Connection
//!
//! The composition root builds one [`StoreConnector`], awaits
//! [`StoreConnector::connect`] once and injects the resulting handle into
//! [`crate::state::AppState`] as an `Arc<dyn DocumentStore>`. Repositories
//! borrow that handle; nothing in this crate holds a global connection.

pub mod admins;
pub mod content;
pub mod memory;
pub mod mongo;
pub mod notifications;

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{Bson, Document};
use thiserror::Error;
use tokio::sync::OnceCell;

use crate::config::DatabaseConfig;

pub use admins::AdminRepository;
pub use content::ContentRepository;
pub use memory::MemoryStore;
pub use mongo::MongoStore;
pub use notifications::NotificationRepository;

/// Collection holding admin accounts.
pub const ADMINS: &str = "admins";
/// Collection holding session records.
pub const SESSIONS: &str = "sessions";
/// Collection holding dashboard notifications.
pub const NOTIFICATIONS: &str = "notifications";

/// Errors raised by a [`DocumentStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// No connection string was configured.
    #[error("missing connection string: set MONGO_URI (or atlas_URL)")]
    MissingUri,

    /// Error reported by the database driver.
    #[error("database error: {0}")]
    Driver(#[from] mongodb::error::Error),

    /// A unique index rejected the write.
    #[error("duplicate key: {0}")]
    Duplicate(String),

    /// A value could not be converted to or from BSON.
    #[error("invalid document: {0}")]
    InvalidDocument(String),
}

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A caller-supplied payload cannot be stored (e.g. an integer outside
    /// the signed 64-bit range).
    #[error("unsupported value: {0}")]
    InvalidPayload(String),
}

/// Sort order for [`DocumentStore::find`].
///
/// Store-generated ids grow with insertion time, so ordering by `_id`
/// doubles as ordering by creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    #[default]
    OldestFirst,
    NewestFirst,
}

/// A schema-free document database organised in named collections.
///
/// Filters are documents of top-level field equalities, e.g.
/// `doc! { "email": "admin@example.com" }`.
#[async_trait]
pub trait DocumentStore: fmt::Debug + Send + Sync {
    /// Return the documents matching `filter`, at most `limit` of them.
    async fn find(
        &self,
        collection: &str,
        filter: Document,
        order: Order,
        limit: Option<u64>,
    ) -> Result<Vec<Document>, StoreError>;

    /// Return the first document matching `filter`.
    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<Option<Document>, StoreError>;

    /// Insert a document, generating an `_id` when absent. Returns the `_id`.
    async fn insert_one(&self, collection: &str, document: Document) -> Result<Bson, StoreError>;

    /// Overwrite the given top-level `fields` of the first document matching
    /// `filter` and return the updated document, or `None` if nothing matched.
    async fn find_one_and_set(
        &self,
        collection: &str,
        filter: Document,
        fields: Document,
    ) -> Result<Option<Document>, StoreError>;

    /// Replace the first document matching `filter`, keeping its `_id`.
    ///
    /// With `upsert`, a missing document is created from `filter` plus
    /// `replacement`. Returns the number of documents written.
    async fn replace_one(
        &self,
        collection: &str,
        filter: Document,
        replacement: Document,
        upsert: bool,
    ) -> Result<u64, StoreError>;

    /// Delete the first document matching `filter`. Returns the number deleted.
    async fn delete_one(&self, collection: &str, filter: Document) -> Result<u64, StoreError>;

    /// Count documents matching `filter`.
    async fn count(&self, collection: &str, filter: Document) -> Result<u64, StoreError>;

    /// Round-trip to the server to check connectivity.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Convert a validated hex id into the store's `ObjectId`.
pub(crate) fn object_id(hex: &str) -> Result<ObjectId, RepositoryError> {
    ObjectId::parse_str(hex)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid object id {hex}: {e}")))
}

/// Convert a BSON timestamp to `chrono`.
pub(crate) fn to_chrono(value: mongodb::bson::DateTime) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(value.timestamp_millis()).unwrap_or_default()
}

/// Convert a `chrono` timestamp to BSON.
pub(crate) fn to_bson_datetime(value: DateTime<Utc>) -> mongodb::bson::DateTime {
    mongodb::bson::DateTime::from_millis(value.timestamp_millis())
}

/// Lazily establishes and memoizes the connection to the document store.
///
/// Concurrent callers of [`connect`](Self::connect) share one in-flight
/// attempt and then the same completed handle. A failed attempt is not
/// cached, so a later call starts a fresh one.
#[derive(Debug)]
pub struct StoreConnector {
    settings: Option<DatabaseConfig>,
    store: OnceCell<MongoStore>,
}

impl StoreConnector {
    /// Create a connector for the given database settings.
    #[must_use]
    pub fn new(settings: DatabaseConfig) -> Self {
        Self {
            settings: Some(settings),
            store: OnceCell::new(),
        }
    }

    /// Create a connector from the environment.
    ///
    /// A missing connection string is not reported here; it surfaces as
    /// [`StoreError::MissingUri`] from [`connect`](Self::connect).
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            settings: DatabaseConfig::from_env().ok(),
            store: OnceCell::new(),
        }
    }

    /// Return the shared connection, establishing it on first use.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::MissingUri` if no connection string is
    /// configured, or the driver error if the server cannot be reached.
    pub async fn connect(&self) -> Result<&MongoStore, StoreError> {
        self.store
            .get_or_try_init(|| async {
                let settings = self.settings.as_ref().ok_or(StoreError::MissingUri)?;
                tracing::info!("Connecting to document store");
                MongoStore::connect(settings).await
            })
            .await
    }

    /// Whether a connection has been established.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.store.initialized()
    }
}
