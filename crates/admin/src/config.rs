//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPKEEPER_API_URL` - Base URL of the storefront REST API
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3002)
//! - `ADMIN_BASE_URL` - Public URL for the admin panel (default: `http://<host>:<port>`)
//! - `SHOPKEEPER_HTTP_TIMEOUT_SECS` - Backend request timeout (default: 30)
//! - `SHOPKEEPER_SEARCH_DEBOUNCE_MS` - Live search debounce delay (default: 300)
//! - `SHOPKEEPER_PAGE_SIZE` - Rows per list page, 1..=100 (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Traces sample rate (default: 1.0)

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_PORT: &str = "3002";
const DEFAULT_TIMEOUT_SECS: &str = "30";
const DEFAULT_DEBOUNCE_MS: &str = "300";
const DEFAULT_PAGE_SIZE: &str = "10";
const MAX_PAGE_SIZE: u32 = 100;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// Storefront API base URL
    pub api_url: Url,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the admin panel
    pub base_url: String,
    /// Timeout applied to every backend request
    pub http_timeout: Duration,
    /// Delay before a live search keystroke turns into a request
    pub search_debounce: Duration,
    /// Rows per list page
    pub page_size: u32,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

impl AdminConfig {
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
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let api_url = env.required("SHOPKEEPER_API_URL")?;
        let api_url = Url::parse(&api_url)
            .map_err(|e| ConfigError::InvalidEnvVar("SHOPKEEPER_API_URL".to_string(), e.to_string()))?;

        let host: IpAddr = env.parse("ADMIN_HOST", "127.0.0.1")?;
        let port: u16 = env.parse("ADMIN_PORT", DEFAULT_PORT)?;
        let base_url = env
            .optional("ADMIN_BASE_URL")
            .unwrap_or_else(|| format!("http://{}", SocketAddr::new(host, port)));

        let http_timeout =
            Duration::from_secs(env.parse("SHOPKEEPER_HTTP_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?);
        let search_debounce =
            Duration::from_millis(env.parse("SHOPKEEPER_SEARCH_DEBOUNCE_MS", DEFAULT_DEBOUNCE_MS)?);
        let page_size = env
            .parse::<u32>("SHOPKEEPER_PAGE_SIZE", DEFAULT_PAGE_SIZE)?
            .clamp(1, MAX_PAGE_SIZE);

        let sentry_dsn = env.optional("SENTRY_DSN");
        let sentry_environment = env.optional("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = env
            .optional("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = env
            .optional("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            api_url,
            host,
            port,
            base_url,
            http_timeout,
            search_debounce,
            page_size,
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

    /// Whether the panel is served over HTTPS (decides secure cookies).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get an optional variable, treating empty values as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parse<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key)
            .unwrap_or_else(|| default.to_string())
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<AdminConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AdminConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("SHOPKEEPER_API_URL", "http://localhost:8000")]).unwrap();
        assert_eq!(config.port, 3002);
        assert_eq!(config.base_url, "http://127.0.0.1:3002");
        assert_eq!(config.search_debounce, Duration::from_millis(300));
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert_eq!(config.page_size, 10);
        assert!(!config.is_secure());
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_missing_api_url() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "SHOPKEEPER_API_URL"));
    }

    #[test]
    fn test_invalid_port() {
        let err = load(&[
            ("SHOPKEEPER_API_URL", "http://localhost:8000"),
            ("ADMIN_PORT", "not-a-port"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "ADMIN_PORT"));
    }

    #[test]
    fn test_invalid_api_url() {
        let err = load(&[("SHOPKEEPER_API_URL", "not a url")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_page_size_is_clamped() {
        let config = load(&[
            ("SHOPKEEPER_API_URL", "http://localhost:8000"),
            ("SHOPKEEPER_PAGE_SIZE", "500"),
        ])
        .unwrap();
        assert_eq!(config.page_size, 100);
    }

    #[test]
    fn test_https_base_url_is_secure() {
        let config = load(&[
            ("SHOPKEEPER_API_URL", "http://localhost:8000"),
            ("ADMIN_BASE_URL", "https://admin.shop.example"),
        ])
        .unwrap();
        assert!(config.is_secure());
        assert_eq!(config.socket_addr().port(), 3002);
    }
}
