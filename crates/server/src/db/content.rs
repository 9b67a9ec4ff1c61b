//! Content document repository.
//!
//! One repository instance serves one [`Resource`] collection. Documents are
//! schema-free; the repository only manages `_id` and the
//! `createdAt`/`updatedAt` timestamps and converts between JSON and BSON.

use chrono::{SecondsFormat, Utc};
use mongodb::bson::{self, Bson, Document, doc};
use serde_json::{Map, Value};

use folio_core::{DocumentId, Resource};

use super::{DocumentStore, Order, RepositoryError, object_id, to_bson_datetime, to_chrono};

/// Field holding the creation timestamp.
pub const CREATED_AT: &str = "createdAt";
/// Field holding the last-update timestamp.
pub const UPDATED_AT: &str = "updatedAt";

/// Repository for one content collection.
pub struct ContentRepository<'a> {
    store: &'a dyn DocumentStore,
    resource: Resource,
}

impl<'a> ContentRepository<'a> {
    /// Create a repository for `resource`.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore, resource: Resource) -> Self {
        Self { store, resource }
    }

    /// List all documents, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the query fails.
    pub async fn list(&self) -> Result<Vec<Value>, RepositoryError> {
        let documents = self
            .store
            .find(self.resource.collection(), doc! {}, Order::OldestFirst, None)
            .await?;
        Ok(documents.into_iter().map(document_to_json).collect())
    }

    /// Get one document.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the query fails.
    pub async fn get(&self, id: &DocumentId) -> Result<Option<Value>, RepositoryError> {
        let found = self
            .store
            .find_one(self.resource.collection(), by_id(id)?)
            .await?;
        Ok(found.map(document_to_json))
    }

    /// Insert a new document and return it with its generated `id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidPayload` if the payload cannot be
    /// encoded and `RepositoryError::Store` if the insert fails.
    pub async fn create(&self, payload: Map<String, Value>) -> Result<Value, RepositoryError> {
        let mut document = json_to_document(payload)?;
        let now = Bson::DateTime(to_bson_datetime(Utc::now()));
        document.insert(CREATED_AT, now.clone());
        document.insert(UPDATED_AT, now);

        let id = self
            .store
            .insert_one(self.resource.collection(), document.clone())
            .await?;
        document.insert("_id", id);

        tracing::debug!(resource = %self.resource, "Content document created");
        Ok(document_to_json(document))
    }

    /// Merge `payload` into an existing document.
    ///
    /// Returns `None` if no document has this id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidPayload` if the payload cannot be
    /// encoded and `RepositoryError::Store` if the update fails.
    pub async fn update(
        &self,
        id: &DocumentId,
        payload: Map<String, Value>,
    ) -> Result<Option<Value>, RepositoryError> {
        let mut fields = json_to_document(payload)?;
        fields.insert(UPDATED_AT, to_bson_datetime(Utc::now()));

        let updated = self
            .store
            .find_one_and_set(self.resource.collection(), by_id(id)?, fields)
            .await?;
        Ok(updated.map(document_to_json))
    }

    /// Delete a document. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the delete fails.
    pub async fn delete(&self, id: &DocumentId) -> Result<bool, RepositoryError> {
        let deleted = self
            .store
            .delete_one(self.resource.collection(), by_id(id)?)
            .await?;
        Ok(deleted > 0)
    }

    /// Number of documents in the collection.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the query fails.
    pub async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(self.store.count(self.resource.collection(), doc! {}).await?)
    }
}

fn by_id(id: &DocumentId) -> Result<Document, RepositoryError> {
    Ok(doc! { "_id": object_id(id.as_str())? })
}

// =============================================================================
// JSON <-> BSON
// =============================================================================

/// Encode a JSON object as a BSON document.
fn json_to_document(payload: Map<String, Value>) -> Result<Document, RepositoryError> {
    bson::to_document(&payload).map_err(|e| RepositoryError::InvalidPayload(e.to_string()))
}

/// Render a stored document as JSON, exposing `_id` as a hex `id`.
pub fn document_to_json(document: Document) -> Value {
    let mut object = Map::new();
    for (key, value) in document {
        if key == "_id" {
            object.insert("id".to_owned(), bson_to_json(value));
        } else {
            object.insert(key, bson_to_json(value));
        }
    }
    Value::Object(object)
}

/// Convert a BSON value to plain JSON.
///
/// Object ids become hex strings and dates RFC 3339 strings; everything else
/// uses relaxed extended JSON.
fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => {
            Value::String(to_chrono(dt).to_rfc3339_opts(SecondsFormat::Millis, true))
        }
        Bson::Document(inner) => Value::Object(
            inner
                .into_iter()
                .map(|(k, v)| (k, bson_to_json(v)))
                .collect(),
        ),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        other => other.into_relaxed_extjson(),
    }
}
