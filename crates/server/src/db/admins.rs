//! Admin account repository.
//!
//! Admin documents live in the `admins` collection:
//!
//! ```json
//! { "_id": ObjectId, "email": "admin@example.com", "passwordHash": "$argon2id$...", "createdAt": Date }
//! ```

use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{self, Document, doc};
use serde::{Deserialize, Serialize};

use folio_core::{AdminId, Email};

use super::{ADMINS, DocumentStore, RepositoryError, StoreError, object_id, to_bson_datetime, to_chrono};
use crate::models::Admin;

// =============================================================================
// Internal Document Types
// =============================================================================

/// Stored shape of an admin account.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdminDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    email: String,
    password_hash: String,
    created_at: bson::DateTime,
}

impl AdminDocument {
    fn decode(document: Document) -> Result<Self, RepositoryError> {
        bson::from_document(document)
            .map_err(|e| RepositoryError::DataCorruption(format!("invalid admin document: {e}")))
    }

    fn into_admin(self) -> Result<(Admin, String), RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let id = AdminId::parse(&self.id.to_hex())
            .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;

        let admin = Admin {
            id,
            email,
            created_at: to_chrono(self.created_at),
        };
        Ok((admin, self.password_hash))
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for admin account operations.
pub struct AdminRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> AdminRepository<'a> {
    /// Create a new admin repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Get an admin by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_id(&self, id: &AdminId) -> Result<Option<Admin>, RepositoryError> {
        let filter = doc! { "_id": object_id(id.as_str())? };
        let found = self.store.find_one(ADMINS, filter).await?;
        found
            .map(|d| AdminDocument::decode(d)?.into_admin().map(|(admin, _)| admin))
            .transpose()
    }

    /// Get an admin by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<Admin>, RepositoryError> {
        Ok(self.get_password_hash(email).await?.map(|(admin, _)| admin))
    }

    /// Get an admin together with their password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(Admin, String)>, RepositoryError> {
        let found = self
            .store
            .find_one(ADMINS, doc! { "email": email.as_str() })
            .await?;
        found
            .map(|d| AdminDocument::decode(d)?.into_admin())
            .transpose()
    }

    /// Create a new admin account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already registered.
    /// Returns `RepositoryError::Store` if the insert fails.
    pub async fn create(
        &self,
        email: &Email,
        password_hash: &str,
    ) -> Result<Admin, RepositoryError> {
        if self.get_by_email(email).await?.is_some() {
            return Err(RepositoryError::Conflict(format!(
                "admin already exists: {email}"
            )));
        }

        let document = AdminDocument {
            id: ObjectId::new(),
            email: email.as_str().to_owned(),
            password_hash: password_hash.to_owned(),
            created_at: to_bson_datetime(Utc::now()),
        };
        let encoded = bson::to_document(&document)
            .map_err(|e| StoreError::InvalidDocument(e.to_string()))?;

        self.store
            .insert_one(ADMINS, encoded)
            .await
            .map_err(|e| match e {
                StoreError::Duplicate(_) => {
                    RepositoryError::Conflict(format!("admin already exists: {email}"))
                }
                other => RepositoryError::Store(other),
            })?;

        tracing::info!(email = %email, "Admin account created");
        document.into_admin().map(|(admin, _)| admin)
    }

    /// Count admin accounts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the query fails.
    pub async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(self.store.count(ADMINS, doc! {}).await?)
    }
}
