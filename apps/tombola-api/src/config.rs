//! Application configuration loaded from environment variables.
//!
//! Fail-fast: required variables must be present and valid, or the
//! application exits with a clear error message before binding anything.

use std::env;
use thiserror::Error;

/// Minimum accepted length for the token signing secret.
const MIN_JWT_SECRET_LEN: usize = 16;

/// Configuration errors that can occur during environment loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },
}

/// Application configuration.
#[derive(Clone)]
pub struct Config {
    /// PostgreSQL connection string.
    pub database_url: String,

    /// Symmetric secret for signing identity tokens.
    pub jwt_secret: String,

    /// Token lifetime in seconds.
    pub jwt_ttl_secs: i64,

    /// Server bind address.
    pub host: String,

    /// Server listen port.
    pub port: u16,

    /// Tracing filter directive (e.g. "info,tombola=debug").
    pub rust_log: String,

    /// Allowed CORS origins ("*" for development).
    pub cors_origins: Vec<String>,

    /// Connection pool bound.
    pub db_max_connections: u32,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[redacted]")
            .field("jwt_secret", &"[redacted]")
            .field("jwt_ttl_secs", &self.jwt_ttl_secs)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("rust_log", &self.rust_log)
            .field("cors_origins", &self.cors_origins)
            .field("db_max_connections", &self.db_max_connections)
            .finish()
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Required Variables
    ///
    /// - `DATABASE_URL` — PostgreSQL connection string
    /// - `JWT_SECRET` — token signing secret (at least 16 characters)
    ///
    /// # Optional Variables
    ///
    /// - `JWT_TTL_SECS` — token lifetime (default: 7200)
    /// - `HOST` — bind address (default: "0.0.0.0")
    /// - `PORT` — listen port (default: 8080)
    /// - `RUST_LOG` — log filter (default: "info")
    /// - `CORS_ORIGINS` — comma-separated origins (default: "*")
    /// - `DB_MAX_CONNECTIONS` — pool bound (default: 10)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a required variable is missing or any
    /// value fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env if present (development only).
        let _ = dotenvy::dotenv();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let jwt_secret =
            env::var("JWT_SECRET").map_err(|_| ConfigError::MissingVar("JWT_SECRET".to_string()))?;
        if jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::InvalidValue {
                var: "JWT_SECRET".to_string(),
                message: format!("must be at least {MIN_JWT_SECRET_LEN} characters"),
            });
        }

        let jwt_ttl_secs: i64 = env::var("JWT_TTL_SECS")
            .unwrap_or_else(|_| "7200".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                var: "JWT_TTL_SECS".to_string(),
                message: "must be an integer number of seconds".to_string(),
            })?;
        if jwt_ttl_secs <= 0 {
            return Err(ConfigError::InvalidValue {
                var: "JWT_TTL_SECS".to_string(),
                message: "must be positive".to_string(),
            });
        }

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port: u16 = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                var: "PORT".to_string(),
                message: "must be a port number".to_string(),
            })?;
        if port == 0 {
            return Err(ConfigError::InvalidValue {
                var: "PORT".to_string(),
                message: "must be between 1 and 65535".to_string(),
            });
        }

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let cors_origins = env::var("CORS_ORIGINS")
            .map(|s| s.split(',').map(|o| o.trim().to_string()).collect())
            .unwrap_or_else(|_| vec!["*".to_string()]);

        let db_max_connections: u32 = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                var: "DB_MAX_CONNECTIONS".to_string(),
                message: "must be a positive integer".to_string(),
            })?;

        Ok(Config {
            database_url,
            jwt_secret,
            jwt_ttl_secs,
            host,
            port,
            rust_log,
            cors_origins,
            db_max_connections,
        })
    }

    /// The server bind address as `host:port`.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        Config {
            database_url: "postgres://localhost/tombola".to_string(),
            jwt_secret: "a-long-enough-test-secret".to_string(),
            jwt_ttl_secs: 7200,
            host: "127.0.0.1".to_string(),
            port: 8080,
            rust_log: "info".to_string(),
            cors_origins: vec!["*".to_string()],
            db_max_connections: 10,
        }
    }

    #[test]
    fn test_bind_addr() {
        let mut config = sample();
        config.port = 3000;
        assert_eq!(config.bind_addr(), "127.0.0.1:3000");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let rendered = format!("{:?}", sample());
        assert!(!rendered.contains("postgres://localhost"));
        assert!(!rendered.contains("a-long-enough-test-secret"));
        assert!(rendered.contains("[redacted]"));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingVar("JWT_SECRET".to_string());
        assert_eq!(
            err.to_string(),
            "Missing required environment variable: JWT_SECRET"
        );

        let err = ConfigError::InvalidValue {
            var: "PORT".to_string(),
            message: "must be a port number".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid value for PORT: must be a port number");
    }
}
