//! Session middleware configuration for admin.
//!
//! Sessions are kept server-side in the `sessions` collection of the
//! document store. The browser only holds an opaque session id cookie with
//! SameSite=Strict and a 24 hour inactivity expiry.

use std::sync::Arc;

use async_trait::async_trait;
use mongodb::bson::{self, Document, doc};
use time::OffsetDateTime;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store::{self, SessionStore};
use tower_sessions::{Expiry, SessionManagerLayer};

use crate::config::ServerConfig;
use crate::db::{DocumentStore, SESSIONS, StoreError};

/// Session cookie name for admin.
pub const SESSION_COOKIE_NAME: &str = "folio_admin_session";

/// Session expiry time in seconds (24 hours).
const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

/// tower-sessions store backed by a [`DocumentStore`].
///
/// Each record is stored as:
///
/// ```json
/// { "_id": "<session id>", "data": "<JSON-encoded record>", "expiresAt": Date }
/// ```
///
/// `expiresAt` carries a TTL index so the database drops stale sessions;
/// `load` also checks it because TTL deletion is not immediate.
#[derive(Debug, Clone)]
pub struct DocumentSessionStore {
    store: Arc<dyn DocumentStore>,
}

impl DocumentSessionStore {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

fn backend(err: StoreError) -> session_store::Error {
    session_store::Error::Backend(err.to_string())
}

fn expires_at(record: &Record) -> bson::DateTime {
    bson::DateTime::from_millis(record.expiry_date.unix_timestamp().saturating_mul(1000))
}

fn encode(record: &Record) -> session_store::Result<Document> {
    let data = serde_json::to_string(record)
        .map_err(|e| session_store::Error::Encode(e.to_string()))?;
    Ok(doc! { "data": data, "expiresAt": expires_at(record) })
}

fn decode(document: &Document) -> session_store::Result<Record> {
    let data = document
        .get_str("data")
        .map_err(|e| session_store::Error::Decode(e.to_string()))?;
    serde_json::from_str(data).map_err(|e| session_store::Error::Decode(e.to_string()))
}

#[async_trait]
impl SessionStore for DocumentSessionStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        loop {
            let mut document = encode(record)?;
            document.insert("_id", record.id.to_string());
            match self.store.insert_one(SESSIONS, document).await {
                Ok(_) => return Ok(()),
                Err(StoreError::Duplicate(_)) => record.id = Id::default(),
                Err(e) => return Err(backend(e)),
            }
        }
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        self.store
            .replace_one(
                SESSIONS,
                doc! { "_id": record.id.to_string() },
                encode(record)?,
                true,
            )
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn load(&self, id: &Id) -> session_store::Result<Option<Record>> {
        let Some(document) = self
            .store
            .find_one(SESSIONS, doc! { "_id": id.to_string() })
            .await
            .map_err(backend)?
        else {
            return Ok(None);
        };

        let record = decode(&document)?;
        if record.expiry_date <= OffsetDateTime::now_utc() {
            return Ok(None);
        }
        Ok(Some(record))
    }

    async fn delete(&self, id: &Id) -> session_store::Result<()> {
        self.store
            .delete_one(SESSIONS, doc! { "_id": id.to_string() })
            .await
            .map_err(backend)?;
        Ok(())
    }
}

/// Create the session layer over the document store.
///
/// The `Secure` cookie flag follows the configured base URL scheme.
#[must_use]
pub fn create_session_layer(
    store: Arc<dyn DocumentStore>,
    config: &ServerConfig,
) -> SessionManagerLayer<DocumentSessionStore> {
    SessionManagerLayer::new(DocumentSessionStore::new(store))
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(time::Duration::seconds(
            SESSION_EXPIRY_SECONDS,
        )))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::db::MemoryStore;

    fn record(expiry: OffsetDateTime) -> Record {
        let mut data = HashMap::new();
        data.insert("current_admin".to_owned(), serde_json::json!({ "k": "v" }));
        Record {
            id: Id::default(),
            data,
            expiry_date: expiry,
        }
    }

    fn session_store() -> (Arc<MemoryStore>, DocumentSessionStore) {
        let memory = Arc::new(MemoryStore::new());
        let sessions = DocumentSessionStore::new(memory.clone());
        (memory, sessions)
    }

    #[tokio::test]
    async fn test_create_load_delete() {
        let (_, sessions) = session_store();
        let mut rec = record(OffsetDateTime::now_utc() + time::Duration::hours(1));

        sessions.create(&mut rec).await.unwrap();
        let loaded = sessions.load(&rec.id).await.unwrap().unwrap();
        assert_eq!(loaded.data, rec.data);

        sessions.delete(&rec.id).await.unwrap();
        assert!(sessions.load(&rec.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let (memory, sessions) = session_store();
        let mut rec = record(OffsetDateTime::now_utc() + time::Duration::hours(1));
        sessions.create(&mut rec).await.unwrap();

        rec.data.insert("extra".to_owned(), serde_json::json!(1));
        sessions.save(&rec).await.unwrap();

        let loaded = sessions.load(&rec.id).await.unwrap().unwrap();
        assert_eq!(loaded.data.get("extra"), Some(&serde_json::json!(1)));
        assert_eq!(memory.count(SESSIONS, doc! {}).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_expired_record_is_not_loaded() {
        let (_, sessions) = session_store();
        let mut rec = record(OffsetDateTime::now_utc() - time::Duration::minutes(1));

        sessions.create(&mut rec).await.unwrap();
        assert!(sessions.load(&rec.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_retries_on_id_collision() {
        let (memory, sessions) = session_store();
        let mut first = record(OffsetDateTime::now_utc() + time::Duration::hours(1));
        sessions.create(&mut first).await.unwrap();

        let mut second = record(OffsetDateTime::now_utc() + time::Duration::hours(1));
        second.id = first.id;
        sessions.create(&mut second).await.unwrap();

        assert_ne!(second.id, first.id);
        assert_eq!(memory.count(SESSIONS, doc! {}).await.unwrap(), 2);
    }
}
