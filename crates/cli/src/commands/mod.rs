//! CLI subcommands.

pub mod admin;
pub mod seed;

use folio_server::db::{DocumentStore, StoreConnector, StoreError};

/// Connect to the document store and run a `ping`.
///
/// # Errors
///
/// Returns `StoreError::MissingUri` if no connection string is set, or the
/// driver error if the server cannot be reached.
pub async fn ping() -> Result<(), StoreError> {
    let connector = StoreConnector::from_env();
    let store = connector.connect().await?;
    store.ping().await?;
    tracing::info!(database = %store.database_name(), "Document store is reachable");
    Ok(())
}
