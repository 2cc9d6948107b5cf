// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Configuration loading from environment variables.

use std::net::SocketAddr;

/// State-manager configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL or SQLite connection URL
    pub database_url: String,
    /// Name of the table holding per-document state
    pub state_table: String,
    /// HTTP server address for the state endpoint
    pub http_addr: SocketAddr,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `DOCSTATE_DATABASE_URL`: PostgreSQL or SQLite connection string
    ///
    /// Optional (with defaults):
    /// - `DOCSTATE_STATE_TABLE`: backing table name (default: document_states)
    /// - `DOCSTATE_HTTP_PORT`: HTTP server port (default: 8080)
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = std::env::var("DOCSTATE_DATABASE_URL")
            .map_err(|_| ConfigError::Missing("DOCSTATE_DATABASE_URL"))?;

        let state_table = std::env::var("DOCSTATE_STATE_TABLE")
            .unwrap_or_else(|_| "document_states".to_string());
        if state_table.is_empty() || !is_valid_table_name(&state_table) {
            return Err(ConfigError::Invalid(
                "DOCSTATE_STATE_TABLE",
                "must be a plain identifier (letters, digits, underscores)",
            ));
        }

        let http_port: u16 = std::env::var("DOCSTATE_HTTP_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| {
                ConfigError::Invalid("DOCSTATE_HTTP_PORT", "must be a valid port number")
            })?;

        Ok(Self {
            database_url,
            state_table,
            http_addr: SocketAddr::from(([0, 0, 0, 0], http_port)),
        })
    }
}

/// The table name is interpolated into SQL statements, so it must be a plain
/// identifier rather than arbitrary text.
fn is_valid_table_name(name: &str) -> bool {
    !name.starts_with(|c: char| c.is_ascii_digit())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),

    /// An environment variable has an invalid value.
    #[error("invalid value for {0}: {1}")]
    Invalid(&'static str, &'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to serialize tests that modify environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Helper to set env vars for a test and restore them after
    struct EnvGuard {
        vars: Vec<(String, Option<String>)>,
    }

    impl EnvGuard {
        fn new() -> Self {
            Self { vars: Vec::new() }
        }

        fn set(&mut self, key: &str, value: &str) {
            let old = env::var(key).ok();
            self.vars.push((key.to_string(), old));
            // SAFETY: Tests are serialized via ENV_MUTEX, so no concurrent access
            unsafe { env::set_var(key, value) };
        }

        fn remove(&mut self, key: &str) {
            let old = env::var(key).ok();
            self.vars.push((key.to_string(), old));
            // SAFETY: Tests are serialized via ENV_MUTEX, so no concurrent access
            unsafe { env::remove_var(key) };
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, value) in self.vars.drain(..).rev() {
                // SAFETY: Tests are serialized via ENV_MUTEX, so no concurrent access
                unsafe {
                    match value {
                        Some(v) => env::set_var(&key, v),
                        None => env::remove_var(&key),
                    }
                }
            }
        }
    }

    #[test]
    fn test_config_from_env_with_defaults() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let mut guard = EnvGuard::new();

        guard.set("DOCSTATE_DATABASE_URL", "postgres://localhost/docs");
        guard.remove("DOCSTATE_STATE_TABLE");
        guard.remove("DOCSTATE_HTTP_PORT");

        let config = Config::from_env().unwrap();

        assert_eq!(config.database_url, "postgres://localhost/docs");
        assert_eq!(config.state_table, "document_states");
        assert_eq!(config.http_addr.port(), 8080);
    }

    #[test]
    fn test_config_from_env_all_custom() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let mut guard = EnvGuard::new();

        guard.set("DOCSTATE_DATABASE_URL", "sqlite:state.db?mode=rwc");
        guard.set("DOCSTATE_STATE_TABLE", "pipeline_states");
        guard.set("DOCSTATE_HTTP_PORT", "9090");

        let config = Config::from_env().unwrap();

        assert_eq!(config.database_url, "sqlite:state.db?mode=rwc");
        assert_eq!(config.state_table, "pipeline_states");
        assert_eq!(config.http_addr.port(), 9090);
    }

    #[test]
    fn test_config_missing_database_url() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let mut guard = EnvGuard::new();

        guard.remove("DOCSTATE_DATABASE_URL");

        let result = Config::from_env();
        assert!(result.is_err());

        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DOCSTATE_DATABASE_URL")));
        assert!(err.to_string().contains("DOCSTATE_DATABASE_URL"));
    }

    #[test]
    fn test_config_invalid_port() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let mut guard = EnvGuard::new();

        guard.set("DOCSTATE_DATABASE_URL", "postgres://localhost/docs");
        guard.set("DOCSTATE_HTTP_PORT", "not_a_number");

        let result = Config::from_env();
        assert!(result.is_err());

        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::Invalid("DOCSTATE_HTTP_PORT", _)));
    }

    #[test]
    fn test_config_invalid_port_out_of_range() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let mut guard = EnvGuard::new();

        guard.set("DOCSTATE_DATABASE_URL", "postgres://localhost/docs");
        guard.set("DOCSTATE_HTTP_PORT", "99999"); // > 65535

        let result = Config::from_env();
        assert!(result.is_err());
    }

    #[test]
    fn test_config_rejects_unsafe_table_name() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let mut guard = EnvGuard::new();

        guard.set("DOCSTATE_DATABASE_URL", "postgres://localhost/docs");
        guard.set("DOCSTATE_STATE_TABLE", "states; DROP TABLE documents");

        let result = Config::from_env();
        assert!(result.is_err());

        let err = result.unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid("DOCSTATE_STATE_TABLE", _)
        ));
    }

    #[test]
    fn test_config_rejects_leading_digit_table_name() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let mut guard = EnvGuard::new();

        guard.set("DOCSTATE_DATABASE_URL", "postgres://localhost/docs");
        guard.set("DOCSTATE_STATE_TABLE", "2024_states");

        assert!(Config::from_env().is_err());
    }

    #[test]
    fn test_config_error_display() {
        let missing = ConfigError::Missing("MY_VAR");
        assert_eq!(
            missing.to_string(),
            "missing required environment variable: MY_VAR"
        );

        let invalid = ConfigError::Invalid("MY_VAR", "must be a number");
        assert_eq!(
            invalid.to_string(),
            "invalid value for MY_VAR: must be a number"
        );
    }
}
