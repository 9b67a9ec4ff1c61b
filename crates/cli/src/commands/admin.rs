//! Admin account management commands.
//!
//! # Usage
//!
//! ```bash
//! folio admin create -e editor@example.com -p 'a-long-password'
//! ```
//!
//! # Environment Variables
//!
//! - `MONGO_URI` (or `atlas_URL`) - Document store connection string
//! - `ADMIN_PASSWORD` - Password, when `-p` is not given

use thiserror::Error;

use folio_server::db::{StoreConnector, StoreError};
use folio_server::services::{AdminAuthService, AuthError};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Connecting to the document store failed.
    #[error("Database connection error: {0}")]
    Store(#[from] StoreError),

    /// Creating the account failed.
    #[error("{0}")]
    Auth(#[from] AuthError),
}

/// Create a new admin account.
///
/// # Errors
///
/// Returns `AdminError::Store` if the document store is unreachable, or
/// `AdminError::Auth` if the email is invalid or taken or the password is
/// too weak.
pub async fn create(email: &str, password: &str) -> Result<(), AdminError> {
    let connector = StoreConnector::from_env();

    tracing::info!("Connecting to document store...");
    let store = connector.connect().await?;
    store.ensure_indexes().await?;

    tracing::info!("Creating admin account: {email}");
    let admin = AdminAuthService::new(store)
        .create_admin(email, password)
        .await?;

    tracing::info!(
        "Admin account created successfully! ID: {}, Email: {}",
        admin.id,
        admin.email
    );
    Ok(())
}
