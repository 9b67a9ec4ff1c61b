//! Admin account domain type.

use chrono::{DateTime, Utc};

use folio_core::{AdminId, Email};

/// An admin account (domain type).
///
/// The password hash never leaves the repository/auth layer; this type is
/// safe to log and render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admin {
    /// Store-generated admin ID.
    pub id: AdminId,
    /// Normalized login email.
    pub email: Email,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}
