//! Newtype IDs for type-safe document references.
//!
//! Documents in the store are keyed by 12-byte object ids, rendered as
//! 24 lowercase hex characters. Use the `define_id!` macro to create
//! type-safe ID wrappers that prevent accidentally mixing IDs from
//! different collections.

use thiserror::Error;

/// Errors that can occur when parsing a document ID.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    /// The input is not exactly 24 characters long.
    #[error("id must be {expected} hex characters (got {actual})")]
    InvalidLength {
        /// Required length.
        expected: usize,
        /// Length of the rejected input.
        actual: usize,
    },
    /// The input contains a character outside `[0-9a-fA-F]`.
    #[error("id must only contain hex characters")]
    InvalidCharacter,
}

/// Length of a hex-encoded object id.
pub const ID_HEX_LENGTH: usize = 24;

/// Validate and normalize a hex object id.
///
/// # Errors
///
/// Returns an error if the input is not 24 hex characters.
pub fn parse_hex_id(s: &str) -> Result<String, IdError> {
    if s.len() != ID_HEX_LENGTH {
        return Err(IdError::InvalidLength {
            expected: ID_HEX_LENGTH,
            actual: s.len(),
        });
    }
    if !s.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(IdError::InvalidCharacter);
    }
    Ok(s.to_ascii_lowercase())
}

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around a validated hex `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - `parse()`, `as_str()`, `Display` and `FromStr`
///
/// # Example
///
/// ```rust
/// # use folio_core::define_id;
/// define_id!(ProjectId);
/// define_id!(QuoteId);
///
/// let project = ProjectId::parse("65a1f0c2e4b0a1b2c3d4e5f6").unwrap();
/// assert_eq!(project.as_str(), "65a1f0c2e4b0a1b2c3d4e5f6");
///
/// // These are different types, so this won't compile:
/// // let _: QuoteId = project;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Parse an ID from its hex representation.
            ///
            /// # Errors
            ///
            /// Returns an error if the input is not 24 hex characters.
            pub fn parse(s: &str) -> ::core::result::Result<Self, $crate::IdError> {
                $crate::parse_hex_id(s).map(Self)
            }

            /// Get the hex representation.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::IdError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                Self::parse(s)
            }
        }
    };
}

// Define standard document IDs
define_id!(DocumentId);
define_id!(AdminId);
define_id!(NotificationId);
