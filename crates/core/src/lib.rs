//! Folio Core - Shared types library.
//!
//! This crate provides common types used across all Folio components:
//! - `server` - Public content API plus the admin panel
//! - `cli` - Command-line tools for seeding and store checks
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, content resources and dashboard view models

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
