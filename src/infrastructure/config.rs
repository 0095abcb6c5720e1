//! Application configuration management.
//!
//! Configuration is read once at start-up from environment variables (a `.env`
//! file is honoured by `main`). Parsing goes through a lookup function so it
//! can be exercised without touching the process environment.
//!
//! # Environment Variables
//!
//! - `HOST`: bind address (default `0.0.0.0`)
//! - `PORT`: bind port (default `8000`)
//! - `STORAGE_MODE`: `in_memory` (default) | `postgres`
//! - `DATABASE_URL`: required when `STORAGE_MODE=postgres`
//! - `DATABASE_MAX_CONNECTIONS`: pool size (default `5`)
//! - `SITE_URL`: base URL used in login links (default `http://localhost:<PORT>`)
//! - `EMAIL_FROM`: sender of login emails (default `noreply@superlists`)
//! - `LOGIN_TOKEN_TTL_MINUTES`: login link lifetime (default `60`)
//! - `SECURE_COOKIES`: mark the session cookie `Secure` (default `false`)
//! - `SESSION_MAX_AGE_HOURS`: session lifetime (default `336`, two weeks)

use std::env;
use std::str::FromStr;

use thiserror::Error;

use super::factory::RepositoryConfig;

/// Configuration error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Invalid storage mode: '{0}'. Expected 'in_memory' or 'postgres'")]
    InvalidStorageMode(String),

    #[error("DATABASE_URL environment variable is required when STORAGE_MODE=postgres")]
    MissingDatabaseUrl,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub repository: RepositoryConfig,
    /// Scheme, host and optional port; no trailing slash.
    pub site_url: String,
    pub email_from: String,
    pub login_token_ttl_minutes: i64,
    pub secure_cookies: bool,
    pub session_max_age_hours: i64,
}

impl AppConfig {
    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid, or if the
    /// selected storage mode lacks its connection settings.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup.
    ///
    /// Blank values count as unset.
    ///
    /// # Errors
    ///
    /// See [`AppConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let lookup = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or("PORT", lookup("PORT"), 8000)?;
        let repository = RepositoryConfig::from_lookup(&lookup)?;
        let site_url = lookup("SITE_URL")
            .unwrap_or_else(|| format!("http://localhost:{port}"))
            .trim_end_matches('/')
            .to_string();
        let email_from = lookup("EMAIL_FROM").unwrap_or_else(|| "noreply@superlists".to_string());

        let login_token_ttl_minutes = parse_or(
            "LOGIN_TOKEN_TTL_MINUTES",
            lookup("LOGIN_TOKEN_TTL_MINUTES"),
            60,
        )?;
        require_positive("LOGIN_TOKEN_TTL_MINUTES", login_token_ttl_minutes)?;

        let session_max_age_hours = parse_or(
            "SESSION_MAX_AGE_HOURS",
            lookup("SESSION_MAX_AGE_HOURS"),
            336,
        )?;
        require_positive("SESSION_MAX_AGE_HOURS", session_max_age_hours)?;

        let secure_cookies = match lookup("SECURE_COOKIES") {
            None => false,
            Some(value) => parse_flag("SECURE_COOKIES", &value)?,
        };

        Ok(Self {
            host,
            port,
            repository,
            site_url,
            email_from,
            login_token_ttl_minutes,
            secure_cookies,
            session_max_age_hours,
        })
    }

    /// `host:port` for binding the listener.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn require_positive(key: &str, value: i64) -> Result<(), ConfigError> {
    if value > 0 {
        return Ok(());
    }
    Err(ConfigError::InvalidValue {
        key: key.to_string(),
        message: "must be positive".to_string(),
    })
}

/// Parses an optional value, falling back to `default` when it is unset.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` if the value does not parse.
pub(crate) fn parse_or<T>(key: &str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.map_or(Ok(default), |value| {
        value.parse().map_err(|error: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: error.to_string(),
        })
    })
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected a boolean, got '{value}'"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::StorageMode;
    use rstest::rstest;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        AppConfig::from_lookup(|key| values.get(key).cloned())
    }

    #[rstest]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8000");
        assert_eq!(config.repository.storage_mode, StorageMode::InMemory);
        assert_eq!(config.repository.max_connections, 5);
        assert_eq!(config.site_url, "http://localhost:8000");
        assert_eq!(config.email_from, "noreply@superlists");
        assert_eq!(config.login_token_ttl_minutes, 60);
        assert!(!config.secure_cookies);
        assert_eq!(config.session_max_age_hours, 336);
    }

    #[rstest]
    fn test_explicit_values() {
        let config = config_from(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "9000"),
            ("STORAGE_MODE", "postgres"),
            ("DATABASE_URL", "postgres://localhost/superlists"),
            ("SITE_URL", "https://superlists.example.com/"),
            ("EMAIL_FROM", "lists@example.com"),
            ("LOGIN_TOKEN_TTL_MINUTES", "15"),
            ("SECURE_COOKIES", "true"),
            ("SESSION_MAX_AGE_HOURS", "24"),
        ])
        .unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:9000");
        assert_eq!(config.repository.storage_mode, StorageMode::Postgres);
        assert_eq!(config.site_url, "https://superlists.example.com");
        assert_eq!(config.email_from, "lists@example.com");
        assert_eq!(config.login_token_ttl_minutes, 15);
        assert!(config.secure_cookies);
        assert_eq!(config.session_max_age_hours, 24);
    }

    #[rstest]
    fn test_site_url_defaults_to_configured_port() {
        let config = config_from(&[("PORT", "8123")]).unwrap();
        assert_eq!(config.site_url, "http://localhost:8123");
    }

    #[rstest]
    #[case("PORT", "not-a-number")]
    #[case("PORT", "70000")]
    #[case("LOGIN_TOKEN_TTL_MINUTES", "0")]
    #[case("SESSION_MAX_AGE_HOURS", "-1")]
    #[case("SECURE_COOKIES", "maybe")]
    fn test_invalid_values_are_rejected(#[case] key: &str, #[case] value: &str) {
        let error = config_from(&[(key, value)]).unwrap_err();
        assert!(matches!(error, ConfigError::InvalidValue { key: ref k, .. } if k == key));
    }

    #[rstest]
    fn test_postgres_requires_database_url() {
        let error = config_from(&[("STORAGE_MODE", "postgres")]).unwrap_err();
        assert_eq!(error, ConfigError::MissingDatabaseUrl);
    }

    #[rstest]
    fn test_blank_values_count_as_unset() {
        let config = config_from(&[("HOST", "   "), ("PORT", "")]).unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:8000");
    }
}
