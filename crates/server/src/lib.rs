//! Folio server library.
//!
//! Portfolio content API, resume upload gate and admin panel, exposed as a
//! library so the CLI and integration tests can reuse the store adapter,
//! services and router.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
