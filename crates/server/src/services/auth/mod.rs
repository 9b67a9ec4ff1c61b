//! Admin authentication service.
//!
//! Admins sign in with email and password. Passwords are stored as argon2id
//! PHC strings; the session that follows a successful login is managed by
//! the route layer (see [`crate::middleware::auth`]).

mod error;

pub use error::AuthError;

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use folio_core::Email;

use crate::db::{AdminRepository, DocumentStore};
use crate::models::Admin;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Email of the account created by [`AdminAuthService::seed`] by default.
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@example.com";

/// Hash checked when the email is unknown, so both login failures cost one
/// argon2 verification.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("folio-unknown-admin").ok());

/// Result of seeding the admin account.
#[derive(Debug)]
pub enum SeedOutcome {
    /// The account did not exist and was created.
    Created(Admin),
    /// An account with this email already exists; nothing was written.
    AlreadyExists,
}

/// Admin authentication service.
pub struct AdminAuthService<'a> {
    admins: AdminRepository<'a>,
}

impl<'a> AdminAuthService<'a> {
    /// Create a new admin authentication service.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self {
            admins: AdminRepository::new(store),
        }
    }

    /// Verify an email/password pair.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email is malformed.
    /// Returns `AuthError::NotFound` if no admin has this email.
    /// Returns `AuthError::InvalidCredentials` if the password does not match.
    pub async fn login(&self, email: &str, password: &str) -> Result<Admin, AuthError> {
        let email = Email::parse_normalized(email)?;
        let Some((admin, hash)) = self.admins.get_password_hash(&email).await? else {
            if let Some(dummy) = DUMMY_HASH.as_deref() {
                let _ = verify_password(password, dummy);
            }
            return Err(AuthError::NotFound);
        };

        verify_password(password, &hash)?;

        tracing::info!(admin_id = %admin.id, "Admin logged in");
        Ok(admin)
    }

    /// Create a new admin account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email is malformed.
    /// Returns `AuthError::WeakPassword` if the password is too short.
    /// Returns `AuthError::AlreadyExists` if the email is taken.
    pub async fn create_admin(&self, email: &str, password: &str) -> Result<Admin, AuthError> {
        let email = Email::parse_normalized(email)?;
        validate_password(password)?;

        if self.admins.get_by_email(&email).await?.is_some() {
            return Err(AuthError::AlreadyExists);
        }

        let hash = hash_password(password)?;
        Ok(self.admins.create(&email, &hash).await?)
    }

    /// Ensure an admin account exists for `email`.
    ///
    /// Running this any number of times leaves exactly one account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` or `AuthError::WeakPassword` for bad
    /// input, and `AuthError::Repository` if the store fails.
    pub async fn seed(&self, email: &str, password: &str) -> Result<SeedOutcome, AuthError> {
        match self.create_admin(email, password).await {
            Ok(admin) => Ok(SeedOutcome::Created(admin)),
            Err(AuthError::AlreadyExists) => {
                tracing::info!(email, "Admin already seeded");
                Ok(SeedOutcome::AlreadyExists)
            }
            Err(e) => Err(e),
        }
    }
}

/// Validate password requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
