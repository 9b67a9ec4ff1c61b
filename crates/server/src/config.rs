//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `MONGO_URI` - Document store connection string (falls back to `atlas_URL`)
//!
//! ## Optional
//! - `MONGO_DB_NAME` - Database name (default: the URI's default database, else `portfolio`)
//! - `HOST` - Bind address (default: 0.0.0.0)
//! - `PORT` - Listen port (default: 5000)
//! - `BASE_URL` - Public URL of the site (default: `http://localhost:<PORT>`)
//! - `UPLOAD_DIR` - Directory for uploaded files (default: uploads)
//! - `LOG_FORMAT` - `json` for structured logs, anything else for text
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` / `SENTRY_TRACES_SAMPLE_RATE` - Sample rates (default: 1.0)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;

/// Primary connection string variable.
pub const DATABASE_URL_VAR: &str = "MONGO_URI";
/// Legacy connection string variable, read when `MONGO_URI` is unset.
pub const FALLBACK_DATABASE_URL_VAR: &str = "atlas_URL";

const DEFAULT_PORT: &str = "5000";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Document store connection settings.
///
/// `SecretString` keeps the URI (which usually embeds a password) out of
/// `Debug` output.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Connection string
    pub uri: SecretString,
    /// Database name override
    pub name: Option<String>,
}

impl DatabaseConfig {
    /// Load the connection settings from the environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if neither `MONGO_URI` nor
    /// `atlas_URL` is set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            uri: get_database_url(DATABASE_URL_VAR)?,
            name: get_optional_env("MONGO_DB_NAME"),
        })
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Document store settings
    pub database: DatabaseConfig,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL
    pub base_url: String,
    /// Directory uploaded files are written to and served from
    pub upload_dir: PathBuf,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database = DatabaseConfig::from_env()?;
        let host = get_env_or_default("HOST", "0.0.0.0")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("PORT", DEFAULT_PORT)
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PORT".to_string(), e.to_string()))?;
        let base_url = get_optional_env("BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{port}"));
        let upload_dir = PathBuf::from(get_env_or_default("UPLOAD_DIR", "uploads"));
        let log_format = match get_optional_env("LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = parse_rate("SENTRY_SAMPLE_RATE")?;
        let sentry_traces_sample_rate = parse_rate("SENTRY_TRACES_SAMPLE_RATE")?;

        Ok(Self {
            database,
            host,
            port,
            base_url,
            upload_dir,
            log_format,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the site is served over HTTPS (controls the `Secure` cookie flag).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get the connection string, falling back to the legacy `atlas_URL` name.
///
/// A variable that is set but blank counts as unset.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    resolve_database_url(
        get_optional_env(primary_key),
        get_optional_env(FALLBACK_DATABASE_URL_VAR),
    )
    .map(SecretString::from)
    .ok_or_else(|| ConfigError::MissingEnvVar(primary_key.to_string()))
}

fn resolve_database_url(primary: Option<String>, fallback: Option<String>) -> Option<String> {
    let present = |value: &String| !value.trim().is_empty();
    primary.filter(present).or_else(|| fallback.filter(present))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an optional sample rate in `[0.0, 1.0]`, defaulting to 1.0.
fn parse_rate(key: &str) -> Result<f32, ConfigError> {
    let Some(raw) = get_optional_env(key) else {
        return Ok(1.0);
    };
    let rate = raw
        .parse::<f32>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !(0.0..=1.0).contains(&rate) {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0.0 and 1.0 (got {rate})"),
        ));
    }
    Ok(rate)
}
