//! HTTP middleware for admin.
//!
//! - `auth` - Extractors requiring an authenticated admin session
//! - `session` - tower-sessions layer backed by the document store

pub mod auth;
pub mod session;

pub use auth::{
    AdminAuthRejection, OptionalAdminAuth, RequireAdminAuth, clear_current_admin,
    set_current_admin,
};
pub use session::{DocumentSessionStore, SESSION_COOKIE_NAME, create_session_layer};
