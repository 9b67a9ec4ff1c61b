//! Core types for Folio.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod dashboard;
pub mod email;
pub mod id;
pub mod resource;

pub use dashboard::{
    AdminSection, DatabaseHealth, Notification, ResourceCount, Severity, SystemStatus,
    UploadStats,
};
pub use email::{Email, EmailError};
pub use id::*;
pub use resource::{Resource, ResourceParseError};
