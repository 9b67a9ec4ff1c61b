//! Content resource service.
//!
//! Validates payloads before they reach [`ContentRepository`]. Documents are
//! otherwise schema-free; each [`Resource`] only names the string fields it
//! requires.

use serde_json::{Map, Value};
use thiserror::Error;

use folio_core::{DocumentId, Resource};

use crate::db::content::{CREATED_AT, UPDATED_AT};
use crate::db::{ContentRepository, DocumentStore, RepositoryError};

/// Keys managed by the server that clients may not set.
pub const RESERVED_KEYS: [&str; 4] = ["_id", "id", CREATED_AT, UPDATED_AT];

/// Errors that can occur during content operations.
#[derive(Debug, Error)]
pub enum ContentError {
    /// The payload or id is invalid.
    #[error("{0}")]
    Validation(String),

    /// No document has this id.
    #[error("{0} not found")]
    NotFound(Resource),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for ContentError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::InvalidPayload(msg) => Self::Validation(format!("invalid value: {msg}")),
            other => Self::Repository(other),
        }
    }
}

/// Whether a payload creates a document or updates one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Create,
    Update,
}

/// CRUD operations on one content resource.
pub struct ContentService<'a> {
    resource: Resource,
    repo: ContentRepository<'a>,
}

impl<'a> ContentService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore, resource: Resource) -> Self {
        Self {
            resource,
            repo: ContentRepository::new(store, resource),
        }
    }

    /// All documents, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::Repository` if the store fails.
    pub async fn list(&self) -> Result<Vec<Value>, ContentError> {
        Ok(self.repo.list().await?)
    }

    /// One document by id.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::Validation` for a malformed id and
    /// `ContentError::NotFound` if no document has it.
    pub async fn get(&self, id: &str) -> Result<Value, ContentError> {
        let id = parse_id(id)?;
        self.repo
            .get(&id)
            .await?
            .ok_or(ContentError::NotFound(self.resource))
    }

    /// Validate and insert a new document.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::Validation` if the payload is invalid.
    pub async fn create(&self, payload: Value) -> Result<Value, ContentError> {
        let fields = validate(self.resource, payload, Mode::Create)?;
        let created = self.repo.create(fields).await?;
        tracing::info!(resource = %self.resource, id = %created["id"], "Content created");
        Ok(created)
    }

    /// Validate and merge `payload` into an existing document.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::Validation` if the id or payload is invalid and
    /// `ContentError::NotFound` if no document has the id.
    pub async fn update(&self, id: &str, payload: Value) -> Result<Value, ContentError> {
        let id = parse_id(id)?;
        let fields = validate(self.resource, payload, Mode::Update)?;
        let updated = self
            .repo
            .update(&id, fields)
            .await?
            .ok_or(ContentError::NotFound(self.resource))?;
        tracing::info!(resource = %self.resource, %id, "Content updated");
        Ok(updated)
    }

    /// Delete a document.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::Validation` for a malformed id and
    /// `ContentError::NotFound` if no document has it.
    pub async fn delete(&self, id: &str) -> Result<(), ContentError> {
        let id = parse_id(id)?;
        if !self.repo.delete(&id).await? {
            return Err(ContentError::NotFound(self.resource));
        }
        tracing::info!(resource = %self.resource, %id, "Content deleted");
        Ok(())
    }
}

fn parse_id(id: &str) -> Result<DocumentId, ContentError> {
    DocumentId::parse(id).map_err(|e| ContentError::Validation(format!("invalid id: {e}")))
}

/// Check a payload and return its fields.
fn validate(
    resource: Resource,
    payload: Value,
    mode: Mode,
) -> Result<Map<String, Value>, ContentError> {
    let Value::Object(fields) = payload else {
        return Err(ContentError::Validation(
            "request body must be a JSON object".to_owned(),
        ));
    };
    if fields.is_empty() {
        return Err(ContentError::Validation(
            "request body must not be empty".to_owned(),
        ));
    }

    for key in fields.keys() {
        check_key(key)?;
    }

    for &required in resource.required_fields() {
        match (fields.get(required), mode) {
            (Some(Value::String(s)), _) if !s.trim().is_empty() => {}
            (None, Mode::Update) => {}
            _ => {
                return Err(ContentError::Validation(format!(
                    "`{required}` is required and must be a non-empty string"
                )));
            }
        }
    }

    Ok(fields)
}

fn check_key(key: &str) -> Result<(), ContentError> {
    let problem = if key.is_empty() {
        "field names must not be empty"
    } else if key.starts_with('$') {
        "field names must not start with `$`"
    } else if key.contains('.') {
        "field names must not contain `.`"
    } else if RESERVED_KEYS.contains(&key) {
        "field is managed by the server"
    } else {
        return Ok(());
    };
    Err(ContentError::Validation(format!("{problem}: `{key}`")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::db::MemoryStore;

    fn assert_invalid(result: Result<Map<String, Value>, ContentError>) {
        assert!(
            matches!(result, Err(ContentError::Validation(_))),
            "expected validation error, got {result:?}"
        );
    }

    #[test]
    fn test_validate_requires_object() {
        assert_invalid(validate(Resource::Home, json!([1, 2]), Mode::Create));
        assert_invalid(validate(Resource::Home, json!("text"), Mode::Create));
        assert_invalid(validate(Resource::Home, json!({}), Mode::Create));
    }

    #[test]
    fn test_validate_rejects_bad_keys() {
        for key in ["", "$set", "a.b", "_id", "id", "createdAt", "updatedAt"] {
            let mut payload = Map::new();
            payload.insert(key.to_owned(), json!(1));
            assert_invalid(validate(Resource::Settings, Value::Object(payload), Mode::Create));
        }
    }

    #[test]
    fn test_validate_required_fields_on_create() {
        assert_invalid(validate(Resource::Projects, json!({ "title": "X" }), Mode::Create));
        assert_invalid(validate(
            Resource::Projects,
            json!({ "title": "X", "description": "  " }),
            Mode::Create,
        ));
        assert_invalid(validate(Resource::Quotes, json!({ "text": 5 }), Mode::Create));
        assert!(
            validate(
                Resource::Projects,
                json!({ "title": "X", "description": "Y" }),
                Mode::Create
            )
            .is_ok()
        );
    }

    #[test]
    fn test_validate_update_allows_partial() {
        assert!(validate(Resource::Projects, json!({ "title": "New" }), Mode::Update).is_ok());
        assert_invalid(validate(Resource::Projects, json!({ "title": "" }), Mode::Update));
        assert_invalid(validate(Resource::Quotes, json!({ "text": null }), Mode::Update));
    }

    #[tokio::test]
    async fn test_project_lifecycle() {
        let store = MemoryStore::new();
        let service = ContentService::new(&store, Resource::Projects);

        let created = service
            .create(json!({ "title": "X", "description": "Y" }))
            .await
            .unwrap();
        let id = created["id"].as_str().unwrap().to_owned();

        let fetched = service.get(&id).await.unwrap();
        assert_eq!(fetched["title"], "X");
        assert_eq!(fetched["description"], "Y");

        let updated = service.update(&id, json!({ "title": "Z" })).await.unwrap();
        assert_eq!(updated["title"], "Z");
        assert_eq!(updated["description"], "Y");

        service.delete(&id).await.unwrap();
        assert!(matches!(
            service.get(&id).await,
            Err(ContentError::NotFound(Resource::Projects))
        ));
        assert!(matches!(
            service.delete(&id).await,
            Err(ContentError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_malformed_id_is_validation_error() {
        let store = MemoryStore::new();
        let service = ContentService::new(&store, Resource::About);
        assert!(matches!(
            service.get("not-an-id").await,
            Err(ContentError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_unstorable_number_is_validation_error() {
        let store = MemoryStore::new();
        let service = ContentService::new(&store, Resource::Projects);

        let err = service
            .create(json!({ "title": "X", "description": "Y", "stars": u64::MAX }))
            .await
            .unwrap_err();
        assert!(matches!(err, ContentError::Validation(_)));
        assert!(service.list().await.unwrap().is_empty());

        let created = service
            .create(json!({ "title": "X", "description": "Y" }))
            .await
            .unwrap();
        let id = created["id"].as_str().unwrap();
        assert!(matches!(
            service.update(id, json!({ "stars": u64::MAX })).await,
            Err(ContentError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_list_in_insertion_order() {
        let store = MemoryStore::new();
        let service = ContentService::new(&store, Resource::Quotes);
        for text in ["one", "two", "three"] {
            service.create(json!({ "text": text })).await.unwrap();
        }

        let texts: Vec<_> = service
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|q| q["text"].as_str().unwrap().to_owned())
            .collect();
        assert_eq!(texts, ["one", "two", "three"]);
    }
}
