//! User service configuration.

use std::env;
use std::time::Duration;

use common::{Context, DatabaseConfig};

/// Default per-operation deadline in milliseconds
pub const DEFAULT_OPERATION_TIMEOUT_MS: u64 = 5_000;

/// User service configuration.
#[derive(Debug, Clone)]
pub struct UserServiceConfig {
    /// Storage connection settings
    pub database: DatabaseConfig,
    /// Deadline applied to contexts created by [`UserServiceConfig::operation_context`]
    pub operation_timeout: Duration,
}

impl UserServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = DatabaseConfig::default();

        Self {
            database: DatabaseConfig {
                url: env::var("USER_SERVICE_DATABASE_URL")
                    .or_else(|_| env::var("DATABASE_URL"))
                    .unwrap_or(defaults.url),
                max_connections: parse_var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or(defaults.max_connections),
                min_connections: parse_var("DATABASE_MIN_CONNECTIONS")
                    .unwrap_or(defaults.min_connections),
                connect_timeout_secs: parse_var("DATABASE_CONNECT_TIMEOUT_SECS")
                    .unwrap_or(defaults.connect_timeout_secs),
                sqlx_logging: parse_var("DATABASE_SQLX_LOGGING").unwrap_or(defaults.sqlx_logging),
            },
            operation_timeout: Duration::from_millis(
                parse_var("USER_SERVICE_OPERATION_TIMEOUT_MS")
                    .unwrap_or(DEFAULT_OPERATION_TIMEOUT_MS),
            ),
        }
    }

    /// Fresh context bounded by the configured operation timeout
    pub fn operation_context(&self) -> Context {
        Context::background().with_timeout(self.operation_timeout)
    }
}

impl Default for UserServiceConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            operation_timeout: Duration::from_millis(DEFAULT_OPERATION_TIMEOUT_MS),
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}
