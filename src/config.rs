//! Configuration module
//!
//! Loads configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgSslMode};

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection options
    pub database: PgConnectOptions,

    /// Maximum database connections in pool
    pub database_max_connections: u32,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    /// How long a withdrawal waits for a locked wallet before giving up
    pub lock_timeout: Duration,

    /// Upper bound on a single HTTP request
    pub request_timeout: Duration,

    /// Log output format
    pub log_format: LogFormat,
}

/// Log output format selected by LOG_FORMAT
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database = match lookup("DATABASE_URL") {
            Some(url) => PgConnectOptions::from_str(&url)
                .map_err(|_| ConfigError::InvalidValue("DATABASE_URL"))?,
            None => database_from_parts(&lookup)?,
        };

        let database_max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?;

        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let port = parse_or(&lookup, "SERVER_PORT", 8080)?;

        let environment = lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string());

        // Postgres reads a zero lock_timeout as "wait forever"
        let lock_timeout =
            Duration::from_millis(parse_positive(&lookup, "LOCK_TIMEOUT_MS", 5000)?);

        let request_timeout =
            Duration::from_secs(parse_positive(&lookup, "REQUEST_TIMEOUT_SECS", 30)?);

        let log_format = match lookup("LOG_FORMAT").as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(_) => return Err(ConfigError::InvalidValue("LOG_FORMAT")),
        };

        Ok(Self {
            database,
            database_max_connections,
            host,
            port,
            environment,
            lock_timeout,
            request_timeout,
            log_format,
        })
    }
}

/// Connection options from DB_HOST, DB_PORT, DB_USER, DB_PASSWORD, DB_NAME, DB_SSLMODE.
/// Values are passed through verbatim, so no URL escaping is involved.
fn database_from_parts<F>(lookup: &F) -> Result<PgConnectOptions, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let host = lookup("DB_HOST").ok_or(ConfigError::MissingEnv("DATABASE_URL or DB_HOST"))?;
    let port: u16 = parse_or(lookup, "DB_PORT", 5432)?;
    let user = lookup("DB_USER").ok_or(ConfigError::MissingEnv("DB_USER"))?;
    let name = lookup("DB_NAME").ok_or(ConfigError::MissingEnv("DB_NAME"))?;
    let ssl_mode: PgSslMode = parse_or(lookup, "DB_SSLMODE", PgSslMode::Disable)?;

    let mut options = PgConnectOptions::new()
        .host(&host)
        .port(port)
        .username(&user)
        .database(&name)
        .ssl_mode(ssl_mode);

    if let Some(password) = lookup("DB_PASSWORD") {
        options = options.password(&password);
    }

    Ok(options)
}

fn parse_positive<F>(lookup: &F, key: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match parse_or(lookup, key, default)? {
        0 => Err(ConfigError::InvalidValue(key)),
        value => Ok(value),
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue(key)),
        None => Ok(default),
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/wallet")]))
            .unwrap();

        assert_eq!(config.database.get_host(), "localhost");
        assert_eq!(config.database.get_database(), Some("wallet"));
        assert_eq!(config.database_max_connections, 10);
        assert_eq!(config.port, 8080);
        assert_eq!(config.lock_timeout, Duration::from_millis(5000));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.environment, "development");
    }

    #[test]
    fn test_database_from_parts() {
        let config = Config::from_lookup(lookup(&[
            ("DB_HOST", "db"),
            ("DB_USER", "wallet"),
            ("DB_PASSWORD", "secret"),
            ("DB_NAME", "wallet_db"),
        ]))
        .unwrap();

        assert_eq!(config.database.get_host(), "db");
        assert_eq!(config.database.get_port(), 5432);
        assert_eq!(config.database.get_username(), "wallet");
        assert_eq!(config.database.get_database(), Some("wallet_db"));
    }

    #[test]
    fn test_database_parts_are_not_url_escaped() {
        let config = Config::from_lookup(lookup(&[
            ("DB_HOST", "db"),
            ("DB_USER", "wallet"),
            ("DB_PASSWORD", "p@ss/w#rd"),
            ("DB_NAME", "wallet_db"),
        ]))
        .unwrap();

        assert_eq!(config.database.get_host(), "db");
        assert_eq!(config.database.get_database(), Some("wallet_db"));
    }

    #[test]
    fn test_invalid_ssl_mode() {
        let err = Config::from_lookup(lookup(&[
            ("DB_HOST", "db"),
            ("DB_USER", "wallet"),
            ("DB_NAME", "wallet_db"),
            ("DB_SSLMODE", "sometimes"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue("DB_SSLMODE")));
    }

    #[test]
    fn test_zero_timeouts_rejected() {
        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/wallet"),
            ("LOCK_TIMEOUT_MS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue("LOCK_TIMEOUT_MS")));

        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/wallet"),
            ("REQUEST_TIMEOUT_SECS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue("REQUEST_TIMEOUT_SECS")));
    }

    #[test]
    fn test_missing_database() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnv("DATABASE_URL or DB_HOST")));
    }

    #[test]
    fn test_invalid_port() {
        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/wallet"),
            ("SERVER_PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue("SERVER_PORT")));
    }

    #[test]
    fn test_json_log_format() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/wallet"),
            ("LOG_FORMAT", "json"),
            ("ENVIRONMENT", "production"),
        ]))
        .unwrap();

        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.environment, "production");
    }
}
