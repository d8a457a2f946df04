//! Setup service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required per invocation
//! - `FIREBASE_SERVICE_ACCOUNT` - Service account JSON for the target project.
//!   Missing at startup is fine; the endpoint reports it to the caller.
//!
//! ## Optional
//! - `SETUP_HOST` - Bind address (default: 127.0.0.1)
//! - `SETUP_PORT` - Listen port (default: `PORT`, then 3000)
//! - `FIRESTORE_EMULATOR_HOST` - `host:port` of a local Firestore emulator
//! - `FIRESTORE_DATABASE` - Database id (default: `(default)`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Name of the variable holding the service account JSON.
pub const SERVICE_ACCOUNT_VAR: &str = "FIREBASE_SERVICE_ACCOUNT";

const DEFAULT_DATABASE_ID: &str = "(default)";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Setup service configuration.
///
/// Implements `Debug` manually to redact the credential blob.
#[derive(Clone)]
pub struct SetupConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Raw service account JSON, if supplied
    pub service_account: Option<SecretString>,
    /// Firestore connection settings
    pub firestore: FirestoreConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

/// Where Firestore requests are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirestoreConfig {
    /// `host:port` of a Firestore emulator; production Google endpoints when unset
    pub emulator_host: Option<String>,
    /// Database id inside the project
    pub database_id: String,
}

impl Default for FirestoreConfig {
    fn default() -> Self {
        Self {
            emulator_host: None,
            database_id: DEFAULT_DATABASE_ID.to_string(),
        }
    }
}

impl std::fmt::Debug for SetupConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SetupConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field(
                "service_account",
                &self.service_account.as_ref().map(|_| "[REDACTED]"),
            )
            .field("firestore", &self.firestore)
            .field("sentry_dsn", &self.sentry_dsn)
            .field("sentry_environment", &self.sentry_environment)
            .finish()
    }
}

impl SetupConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an optional variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let host = get("SETUP_HOST")
            .unwrap_or_else(|| "127.0.0.1".to_string())
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("SETUP_HOST".to_string(), e.to_string()))?;

        let (port_key, port) = get("SETUP_PORT")
            .map(|port| ("SETUP_PORT", port))
            .or_else(|| get("PORT").map(|port| ("PORT", port)))
            .unwrap_or(("SETUP_PORT", "3000".to_string()));
        let port = port
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar(port_key.to_string(), e.to_string()))?;

        let emulator_host = get("FIRESTORE_EMULATOR_HOST");
        if let Some(emulator) = &emulator_host {
            validate_emulator_host(emulator)?;
        }

        Ok(Self {
            host,
            port,
            service_account: get(SERVICE_ACCOUNT_VAR).map(SecretString::from),
            firestore: FirestoreConfig {
                emulator_host,
                database_id: get("FIRESTORE_DATABASE")
                    .unwrap_or_else(|| DEFAULT_DATABASE_ID.to_string()),
            },
            sentry_dsn: get("SENTRY_DSN"),
            sentry_environment: get("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// The emulator host must be a bare `host:port` authority.
fn validate_emulator_host(value: &str) -> Result<(), ConfigError> {
    let invalid = |reason: &str| {
        ConfigError::InvalidEnvVar("FIRESTORE_EMULATOR_HOST".to_string(), reason.to_string())
    };

    if value.contains("://") || value.contains('/') {
        return Err(invalid("expected host:port without scheme or path"));
    }
    Url::parse(&format!("http://{value}")).map_err(|e| invalid(&e.to_string()))?;
    let has_port = value
        .rsplit_once(':')
        .is_some_and(|(_, port)| port.parse::<u16>().is_ok());
    if !has_port {
        return Err(invalid("missing port"));
    }
    Ok(())
}
