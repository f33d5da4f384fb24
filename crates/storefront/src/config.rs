//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `TECHMART_HOST` - Bind address (default: 127.0.0.1)
//! - `TECHMART_PORT` - Listen port (default: 3000)
//! - `TECHMART_BASE_URL` - Public URL; `https://` turns on secure cookies
//!   (default: <http://localhost:3000>)
//! - `TECHMART_BOOTSTRAP_ADMIN` - Address granted admin rights on
//!   registration (default: admin@techmart.com)
//! - `TECHMART_BOOTSTRAP_ADMIN_PASSWORD` - When set, the bootstrap admin
//!   account is registered at startup with this password
//! - `TECHMART_SEED_CATALOG` - Load the demo catalog at startup (default: true)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

use techmart_core::Email;
use techmart_ledger::accounts::BOOTSTRAP_ADMIN_EMAIL;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Address that becomes admin on registration
    pub bootstrap_admin: Email,
    /// Password for registering the bootstrap admin at startup
    pub bootstrap_admin_password: Option<SecretString>,
    /// Whether to load the demo catalog at startup
    pub seed_catalog: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl StorefrontConfig {
    /// Configuration with every optional setting at its default.
    #[must_use]
    pub fn new(bootstrap_admin: Email) -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            bootstrap_admin,
            bootstrap_admin_password: None,
            seed_catalog: true,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("TECHMART_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("TECHMART_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("TECHMART_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("TECHMART_PORT".to_string(), e.to_string()))?;
        let base_url = get_env_or_default("TECHMART_BASE_URL", "http://localhost:3000");
        let bootstrap_admin = Email::parse(&get_env_or_default(
            "TECHMART_BOOTSTRAP_ADMIN",
            BOOTSTRAP_ADMIN_EMAIL,
        ))
        .map_err(|e| {
            ConfigError::InvalidEnvVar("TECHMART_BOOTSTRAP_ADMIN".to_string(), e.to_string())
        })?;
        let bootstrap_admin_password =
            get_optional_env("TECHMART_BOOTSTRAP_ADMIN_PASSWORD").map(SecretString::from);
        let seed_catalog = parse_bool(
            "TECHMART_SEED_CATALOG",
            &get_env_or_default("TECHMART_SEED_CATALOG", "true"),
        )?;

        Ok(Self {
            host,
            port,
            base_url,
            bootstrap_admin,
            bootstrap_admin_password,
            seed_catalog,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the storefront is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse a boolean flag.
fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got '{other}'"),
        )),
    }
}
