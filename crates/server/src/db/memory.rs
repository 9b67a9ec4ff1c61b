//! In-process [`DocumentStore`] for tests and local experiments.
//!
//! Supports the subset of query semantics the repositories use: filters are
//! top-level field equalities, `_id` is an `ObjectId` generated on insert,
//! and documents keep insertion order.

use std::collections::HashMap;

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{Bson, Document};
use tokio::sync::RwLock;

use super::{DocumentStore, Order, StoreError};

/// Documents held in memory, grouped by collection.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches(document: &Document, filter: &Document) -> bool {
    filter
        .iter()
        .all(|(key, expected)| document.get(key) == Some(expected))
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(
        &self,
        collection: &str,
        filter: Document,
        order: Order,
        limit: Option<u64>,
    ) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        let mut found: Vec<Document> = collections
            .get(collection)
            .map(|docs| docs.iter().filter(|d| matches(d, &filter)).cloned().collect())
            .unwrap_or_default();
        if order == Order::NewestFirst {
            found.reverse();
        }
        if let Some(limit) = limit {
            found.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        }
        Ok(found)
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| matches(d, &filter)).cloned()))
    }

    async fn insert_one(
        &self,
        collection: &str,
        mut document: Document,
    ) -> Result<Bson, StoreError> {
        let id = match document.get("_id") {
            Some(id) => id.clone(),
            None => {
                let id = Bson::ObjectId(ObjectId::new());
                document.insert("_id", id.clone());
                id
            }
        };

        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_owned()).or_default();
        if docs.iter().any(|d| d.get("_id") == Some(&id)) {
            return Err(StoreError::Duplicate(format!("_id {id} in {collection}")));
        }
        docs.push(document);
        Ok(id)
    }

    async fn find_one_and_set(
        &self,
        collection: &str,
        filter: Document,
        fields: Document,
    ) -> Result<Option<Document>, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(document) = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| matches(d, &filter)))
        else {
            return Ok(None);
        };

        for (key, value) in fields {
            document.insert(key, value);
        }
        Ok(Some(document.clone()))
    }

    async fn replace_one(
        &self,
        collection: &str,
        filter: Document,
        replacement: Document,
        upsert: bool,
    ) -> Result<u64, StoreError> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_owned()).or_default();

        if let Some(existing) = docs.iter_mut().find(|d| matches(d, &filter)) {
            let id = existing.get("_id").cloned();
            let mut updated = replacement;
            if let Some(id) = id {
                updated.insert("_id", id);
            }
            *existing = updated;
            return Ok(1);
        }

        if !upsert {
            return Ok(0);
        }

        let mut created = filter;
        for (key, value) in replacement {
            created.insert(key, value);
        }
        if !created.contains_key("_id") {
            created.insert("_id", ObjectId::new());
        }
        docs.push(created);
        Ok(1)
    }

    async fn delete_one(&self, collection: &str, filter: Document) -> Result<u64, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(0);
        };
        match docs.iter().position(|d| matches(d, &filter)) {
            Some(index) => {
                docs.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn count(&self, collection: &str, filter: Document) -> Result<u64, StoreError> {
        let collections = self.collections.read().await;
        let count = collections
            .get(collection)
            .map_or(0, |docs| docs.iter().filter(|d| matches(d, &filter)).count());
        Ok(count as u64)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
