//! `MongoDB` implementation of [`DocumentStore`].

use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{Bson, Document, doc};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{ClientOptions, IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, Database, IndexModel};
use secrecy::ExposeSecret;

use super::{ADMINS, DocumentStore, NOTIFICATIONS, Order, SESSIONS, StoreError};
use crate::config::DatabaseConfig;

/// Database used when neither the config nor the URI names one.
pub const DEFAULT_DATABASE: &str = "portfolio";

/// Server error code for unique index violations.
const DUPLICATE_KEY_CODE: i32 = 11000;

/// How long notifications are kept before the server deletes them.
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// A connected `MongoDB` database.
///
/// Cheap to clone; the driver's client pools connections internally.
#[derive(Debug, Clone)]
pub struct MongoStore {
    client: Client,
    db: Database,
}

impl MongoStore {
    /// Connect and verify the server responds to `ping`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Driver` if the URI is invalid or the server
    /// cannot be reached.
    pub async fn connect(settings: &DatabaseConfig) -> Result<Self, StoreError> {
        let mut options = ClientOptions::parse(settings.uri.expose_secret()).await?;
        options.app_name = Some("folio".to_string());
        options.server_selection_timeout = Some(Duration::from_secs(10));

        let client = Client::with_options(options)?;
        let db = match settings.name.as_deref() {
            Some(name) => client.database(name),
            None => client
                .default_database()
                .unwrap_or_else(|| client.database(DEFAULT_DATABASE)),
        };

        let store = Self { client, db };
        store.ping().await?;
        tracing::info!(database = %store.db.name(), "Connected to document store");
        Ok(store)
    }

    /// Name of the selected database.
    #[must_use]
    pub fn database_name(&self) -> &str {
        self.db.name()
    }

    /// Create the indexes the application relies on.
    ///
    /// - unique `email` on `admins`
    /// - TTL on `sessions.expiresAt`
    /// - TTL on `notifications.createdAt` ([`NOTIFICATION_TTL`])
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Driver` if index creation fails.
    pub async fn ensure_indexes(&self) -> Result<(), StoreError> {
        let unique_email = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection(ADMINS).create_index(unique_email).await?;

        let session_ttl = IndexModel::builder()
            .keys(doc! { "expiresAt": 1 })
            .options(
                IndexOptions::builder()
                    .expire_after(Duration::from_secs(0))
                    .build(),
            )
            .build();
        self.collection(SESSIONS).create_index(session_ttl).await?;

        let notification_ttl = IndexModel::builder()
            .keys(doc! { "createdAt": 1 })
            .options(IndexOptions::builder().expire_after(NOTIFICATION_TTL).build())
            .build();
        self.collection(NOTIFICATIONS)
            .create_index(notification_ttl)
            .await?;

        tracing::debug!("Indexes ensured");
        Ok(())
    }

    /// Shut down the driver's connection pools.
    pub async fn shutdown(self) {
        self.client.shutdown().await;
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.db.collection(name)
    }
}

/// Map unique index violations to `StoreError::Duplicate`.
fn write_error(err: mongodb::error::Error) -> StoreError {
    if let ErrorKind::Write(WriteFailure::WriteError(write_error)) = err.kind.as_ref() {
        if write_error.code == DUPLICATE_KEY_CODE {
            return StoreError::Duplicate(write_error.message.clone());
        }
    }
    StoreError::Driver(err)
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn find(
        &self,
        collection: &str,
        filter: Document,
        order: Order,
        limit: Option<u64>,
    ) -> Result<Vec<Document>, StoreError> {
        let direction = match order {
            Order::OldestFirst => 1,
            Order::NewestFirst => -1,
        };
        let coll = self.collection(collection);
        let mut find = coll
            .find(filter)
            .sort(doc! { "_id": direction });
        if let Some(limit) = limit {
            find = find.limit(i64::try_from(limit).unwrap_or(i64::MAX));
        }
        let cursor = find.await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<Option<Document>, StoreError> {
        Ok(self.collection(collection).find_one(filter).await?)
    }

    async fn insert_one(&self, collection: &str, document: Document) -> Result<Bson, StoreError> {
        let result = self
            .collection(collection)
            .insert_one(document)
            .await
            .map_err(write_error)?;
        Ok(result.inserted_id)
    }

    async fn find_one_and_set(
        &self,
        collection: &str,
        filter: Document,
        fields: Document,
    ) -> Result<Option<Document>, StoreError> {
        Ok(self
            .collection(collection)
            .find_one_and_update(filter, doc! { "$set": fields })
            .return_document(ReturnDocument::After)
            .await
            .map_err(write_error)?)
    }

    async fn replace_one(
        &self,
        collection: &str,
        filter: Document,
        replacement: Document,
        upsert: bool,
    ) -> Result<u64, StoreError> {
        let result = self
            .collection(collection)
            .replace_one(filter, replacement)
            .upsert(upsert)
            .await
            .map_err(write_error)?;
        Ok(result.matched_count + u64::from(result.upserted_id.is_some()))
    }

    async fn delete_one(&self, collection: &str, filter: Document) -> Result<u64, StoreError> {
        let result = self.collection(collection).delete_one(filter).await?;
        Ok(result.deleted_count)
    }

    async fn count(&self, collection: &str, filter: Document) -> Result<u64, StoreError> {
        Ok(self.collection(collection).count_documents(filter).await?)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}
