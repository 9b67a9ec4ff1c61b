//! Seed the default admin account.
//!
//! Running the command any number of times leaves exactly one admin with the
//! given email; later runs do not change its password.

use folio_server::services::{AdminAuthService, SeedOutcome};

use super::admin::AdminError;
use folio_server::db::StoreConnector;

/// Ensure the admin account exists.
///
/// # Errors
///
/// Returns an error if the document store is unreachable or the email or
/// password is invalid.
pub async fn admin(email: &str, password: &str) -> Result<(), AdminError> {
    let connector = StoreConnector::from_env();
    let store = connector.connect().await?;
    store.ensure_indexes().await?;

    match AdminAuthService::new(store).seed(email, password).await? {
        SeedOutcome::Created(admin) => {
            tracing::info!(id = %admin.id, email = %admin.email, "Admin seeded");
        }
        SeedOutcome::AlreadyExists => {
            tracing::warn!(email, "Admin already exists; nothing to do");
        }
    }
    Ok(())
}
