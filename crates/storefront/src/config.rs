//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PREFORMA_BASE_URL` - Public URL for the storefront
//! - `PREFORMA_ADMIN_PASSWORD` - Password for the catalog admin panel
//!
//! ## Optional
//! - `PREFORMA_HOST` - Bind address (default: 127.0.0.1)
//! - `PREFORMA_PORT` - Listen port (default: 3000)
//! - `PREFORMA_DATA_PATH` - Key-value data file (default: `data/local_storage.json`)
//! - `PREFORMA_SUBMISSION_DELAY_MS` - Delay before a sent quote clears the cart (default: 2500)
//! - `PREFORMA_LOG_JSON` - Emit JSON logs when `1` or `true`
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//!
//! ## Quote email (all or none)
//! - `QUOTE_SMTP_HOST`, `QUOTE_SMTP_PORT` (default: 587), `QUOTE_SMTP_USERNAME`,
//!   `QUOTE_SMTP_PASSWORD`, `QUOTE_FROM_ADDRESS`, `QUOTE_SALES_ADDRESS`
//!
//! Without the SMTP group, quote requests are only written to the log.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
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
    /// File holding the key-value store
    pub data_path: PathBuf,
    /// Admin panel password
    pub admin_password: SecretString,
    /// How long a sent quote stays on screen before the cart is cleared
    pub submission_delay: Duration,
    /// Emit logs as JSON
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// SMTP delivery of quote requests
    pub quote_email: Option<QuoteEmailConfig>,
}

/// SMTP settings for delivering quote requests to the sales inbox.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct QuoteEmailConfig {
    /// SMTP server hostname
    pub smtp_host: String,
    /// SMTP server port
    pub smtp_port: u16,
    /// SMTP authentication username
    pub smtp_username: String,
    /// SMTP authentication password
    pub smtp_password: SecretString,
    /// Email sender address (From header)
    pub from_address: String,
    /// Inbox that receives quote requests
    pub sales_address: String,
}

impl std::fmt::Debug for QuoteEmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuoteEmailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &"[REDACTED]")
            .field("from_address", &self.from_address)
            .field("sales_address", &self.sales_address)
            .finish()
    }
}

impl StorefrontConfig {
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

        let host = env.parse_or("PREFORMA_HOST", "127.0.0.1")?;
        let port = env.parse_or("PREFORMA_PORT", "3000")?;
        let base_url = env.required("PREFORMA_BASE_URL")?;
        let data_path = PathBuf::from(env.or_default("PREFORMA_DATA_PATH", "data/local_storage.json"));

        let admin_password = env.required("PREFORMA_ADMIN_PASSWORD")?;
        let delay_ms: u64 = env.parse_or("PREFORMA_SUBMISSION_DELAY_MS", "2500")?;
        let log_json = env
            .optional("PREFORMA_LOG_JSON")
            .is_some_and(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"));

        Ok(Self {
            host,
            port,
            base_url,
            data_path,
            admin_password: SecretString::from(admin_password),
            submission_delay: Duration::from_millis(delay_ms),
            log_json,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
            quote_email: QuoteEmailConfig::from_env(&env)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether session cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl QuoteEmailConfig {
    const GROUP: [&'static str; 5] = [
        "QUOTE_SMTP_HOST",
        "QUOTE_SMTP_USERNAME",
        "QUOTE_SMTP_PASSWORD",
        "QUOTE_FROM_ADDRESS",
        "QUOTE_SALES_ADDRESS",
    ];

    fn from_env(env: &Env<'_>) -> Result<Option<Self>, ConfigError> {
        if Self::GROUP.iter().all(|key| env.optional(key).is_none()) {
            return Ok(None);
        }

        Ok(Some(Self {
            smtp_host: env.required("QUOTE_SMTP_HOST")?,
            smtp_port: env.parse_or("QUOTE_SMTP_PORT", "587")?,
            smtp_username: env.required("QUOTE_SMTP_USERNAME")?,
            smtp_password: SecretString::from(env.required("QUOTE_SMTP_PASSWORD")?),
            from_address: env.required("QUOTE_FROM_ADDRESS")?,
            sales_address: env.required("QUOTE_SALES_ADDRESS")?,
        }))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    /// Get an optional variable. Blank values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parse_or<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.or_default(key, default)
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }
}
