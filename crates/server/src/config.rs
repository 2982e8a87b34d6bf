//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CHAD_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `SHOPIFY_ADMIN_TOKEN` - Shopify Admin API access token
//! - `SHIP24_API_KEY` - Ship24 tracking API key
//!
//! ## Optional
//! - `CHAD_HOST` - Bind address (default: 127.0.0.1)
//! - `CHAD_PORT` - Listen port (default: 8000)
//! - `SHOPIFY_API_VERSION` - Admin API version (default: 2026-01)
//! - `CHAD_ADMIN_EMAIL` - Support email allowed to view any order
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

use chad_core::Email;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Order-status server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Shopify Admin API configuration
    pub shopify: ShopifyAdminConfig,
    /// Ship24 tracking API configuration
    pub ship24: Ship24Config,
    /// Support email that bypasses the per-order permission check
    pub admin_email: Option<Email>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Shopify Admin API configuration.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct ShopifyAdminConfig {
    /// Admin API version (e.g., 2026-01)
    pub api_version: String,
    /// Admin API access token (server-side only)
    pub access_token: SecretString,
}

impl std::fmt::Debug for ShopifyAdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyAdminConfig")
            .field("api_version", &self.api_version)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

/// Ship24 tracking API configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct Ship24Config {
    /// Ship24 API key
    pub api_key: SecretString,
}

impl std::fmt::Debug for Ship24Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ship24Config")
            .field("api_key", &"[REDACTED]")
            .finish()
    }
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

        let database_url = get_database_url("CHAD_DATABASE_URL")?;
        let host = get_env_or_default("CHAD_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("CHAD_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("CHAD_PORT", "8000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("CHAD_PORT".to_string(), e.to_string()))?;

        let shopify = ShopifyAdminConfig::from_env()?;
        let ship24 = Ship24Config::from_env()?;

        let admin_email = get_optional_env("CHAD_ADMIN_EMAIL")
            .map(|raw| {
                Email::parse(&raw).map_err(|e| {
                    ConfigError::InvalidEnvVar("CHAD_ADMIN_EMAIL".to_string(), e.to_string())
                })
            })
            .transpose()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            database_url,
            host,
            port,
            shopify,
            ship24,
            admin_email,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl ShopifyAdminConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_version: get_env_or_default("SHOPIFY_API_VERSION", "2026-01"),
            access_token: get_required_secret("SHOPIFY_ADMIN_TOKEN")?,
        })
    }
}

impl Ship24Config {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: get_required_secret("SHIP24_API_KEY")?,
        })
    }
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get database URL with fallback to generic `DATABASE_URL` (used by Fly.io postgres attach).
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
