//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Admin email/password authentication and seeding
//! - `content` - Validated CRUD over the content resources
//! - `status` - System status snapshot for the dashboard
//! - `upload` - PDF resume upload gate

pub mod auth;
pub mod content;
pub mod status;
pub mod upload;

pub use auth::{AdminAuthService, AuthError, SeedOutcome};
pub use content::{ContentError, ContentService};
pub use upload::{StoredUpload, UploadError, UploadGate};
