//! Content resources served by the public API.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a resource name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown resource: {0}")]
pub struct ResourceParseError(pub String);

/// A content collection editable from the admin panel.
///
/// Every resource is a schema-free collection of JSON objects. Reads are
/// public; writes require an admin session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Projects,
    About,
    Home,
    Quotes,
    Contact,
    Settings,
}

impl Resource {
    /// All resources, in the order the admin panel lists them.
    pub const ALL: [Self; 6] = [
        Self::Projects,
        Self::About,
        Self::Home,
        Self::Quotes,
        Self::Contact,
        Self::Settings,
    ];

    /// Name of the backing collection, also the URL segment under `/api`.
    #[must_use]
    pub const fn collection(self) -> &'static str {
        match self {
            Self::Projects => "projects",
            Self::About => "about",
            Self::Home => "home",
            Self::Quotes => "quotes",
            Self::Contact => "contact",
            Self::Settings => "settings",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Projects => "Projects",
            Self::About => "About",
            Self::Home => "Home",
            Self::Quotes => "Quotes",
            Self::Contact => "Contact",
            Self::Settings => "Settings",
        }
    }

    /// Fields that must be present as non-empty strings when a document is created.
    #[must_use]
    pub const fn required_fields(self) -> &'static [&'static str] {
        match self {
            Self::Projects => &["title", "description"],
            Self::Quotes => &["text"],
            Self::About | Self::Home | Self::Contact | Self::Settings => &[],
        }
    }

    /// Mount path of the resource's routes.
    #[must_use]
    pub fn api_path(self) -> String {
        format!("/api/{}", self.collection())
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection())
    }
}

impl FromStr for Resource {
    type Err = ResourceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.collection().eq_ignore_ascii_case(s))
            .ok_or_else(|| ResourceParseError(s.to_owned()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_names_are_unique() {
        let mut names: Vec<_> = Resource::ALL.iter().map(|r| r.collection()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Resource::ALL.len());
    }

    #[test]
    fn test_from_str() {
        assert_eq!("projects".parse::<Resource>().unwrap(), Resource::Projects);
        assert_eq!("Quotes".parse::<Resource>().unwrap(), Resource::Quotes);
        assert!("blog".parse::<Resource>().is_err());
    }

    #[test]
    fn test_api_path() {
        assert_eq!(Resource::Contact.api_path(), "/api/contact");
    }

    #[test]
    fn test_required_fields() {
        assert_eq!(
            Resource::Projects.required_fields(),
            &["title", "description"]
        );
        assert!(Resource::Settings.required_fields().is_empty());
    }
}
