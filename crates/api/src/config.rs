//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DATABASE_URL` - `PostgreSQL` connection string
//! - `AUTH_SECRET` - Bearer-token signing secret (min 32 chars)
//!
//! ## Optional
//! - `HOST` - Bind address (default: 127.0.0.1)
//! - `PORT` - Listen port (default: 4000)
//! - `ENVIRONMENT` - `development` or `production` (default: development);
//!   development widens the default log filter to include sqlx queries

use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_AUTH_SECRET_LENGTH: usize = 32;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Deployment environment flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn parse(s: &str) -> Result<Self, ConfigError> {
        match s {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(ConfigError::InvalidEnvVar(
                "ENVIRONMENT".to_owned(),
                format!("expected development or production, got {other}"),
            )),
        }
    }

    /// Default tracing filter for this environment.
    #[must_use]
    pub const fn default_log_filter(self) -> &'static str {
        match self {
            Self::Development => "marzipan_api=debug,sqlx=debug,tower_http=debug",
            Self::Production => "marzipan_api=info",
        }
    }
}

/// API application configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Bearer-token signing secret
    pub auth_secret: SecretString,
    /// Deployment environment
    pub environment: Environment,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the signing secret fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_required_env("DATABASE_URL").map(SecretString::from)?;
        let host = get_env_or_default("HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("HOST".to_owned(), e.to_string()))?;
        let port = get_env_or_default("PORT", "4000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PORT".to_owned(), e.to_string()))?;
        let auth_secret = get_required_env("AUTH_SECRET").map(SecretString::from)?;
        validate_auth_secret(&auth_secret, "AUTH_SECRET")?;
        let environment = Environment::parse(&get_env_or_default("ENVIRONMENT", "development"))?;

        Ok(Self {
            database_url,
            host,
            port,
            auth_secret,
            environment,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_owned()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Validate that the signing secret meets minimum length requirements.
fn validate_auth_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_AUTH_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_owned(),
            format!(
                "must be at least {} characters (got {})",
                MIN_AUTH_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_parses_aliases() {
        assert_eq!(
            Environment::parse("dev").expect("dev parses"),
            Environment::Development
        );
        assert_eq!(
            Environment::parse("production").expect("production parses"),
            Environment::Production
        );
        assert!(Environment::parse("staging").is_err());
    }

    #[test]
    fn short_auth_secret_is_rejected() {
        let secret = SecretString::from("short");
        assert!(matches!(
            validate_auth_secret(&secret, "AUTH_SECRET"),
            Err(ConfigError::InsecureSecret(..))
        ));
    }

    #[test]
    fn long_auth_secret_is_accepted() {
        let secret = SecretString::from("0123456789abcdef0123456789abcdef");
        assert!(validate_auth_secret(&secret, "AUTH_SECRET").is_ok());
    }

    #[test]
    fn development_filter_logs_queries() {
        assert!(
            Environment::Development
                .default_log_filter()
                .contains("sqlx=debug")
        );
        assert!(
            !Environment::Production
                .default_log_filter()
                .contains("sqlx")
        );
    }
}
