//! Domain models for the server.

pub mod admin;
pub mod session;

pub use admin::Admin;
pub use session::{CurrentAdmin, keys as session_keys};
