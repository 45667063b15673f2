//! Vault Configuration
//!
//! Database node-set and rate-limit configuration, read from the
//! environment once at process start.

use std::env;
use std::time::Duration;

use platform::rate_limit::RateLimitConfig;
use thiserror::Error;

/// Default database hosts when `DB_HOSTS` is not set
const DEFAULT_DB_HOSTS: &str = "db_node1,db_node2,db_node3";

/// Default PostgreSQL port
const DEFAULT_DB_PORT: u16 = 5432;

/// Default per-pool connection limit
const DEFAULT_CONNECTION_LIMIT: u32 = 10;

/// Default connection-acquire timeout in milliseconds
const DEFAULT_ACQUIRE_TIMEOUT_MS: u64 = 5_000;

/// Configuration errors (startup only)
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidVar(&'static str, String),
}

/// Database node-set configuration
///
/// The node set is fixed at process start; changing it requires a restart
/// and reshuffles most keys' placement.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Backing database nodes
    pub hosts: Vec<String>,
    /// Port shared by all nodes
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    /// Per-pool connection limit
    pub connection_limit: u32,
    /// Connection-acquire timeout
    pub acquire_timeout: Duration,
}

impl DbConfig {
    /// Read the configuration from the environment
    ///
    /// `DB_USER`, `DB_PASSWORD` and `DB_NAME` are required; everything
    /// else falls back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let hosts: Vec<String> = env::var("DB_HOSTS")
            .unwrap_or_else(|_| DEFAULT_DB_HOSTS.to_string())
            .split(',')
            .map(|host| host.trim().to_string())
            .filter(|host| !host.is_empty())
            .collect();

        if hosts.is_empty() {
            return Err(ConfigError::InvalidVar(
                "DB_HOSTS",
                "at least one host is required".to_string(),
            ));
        }

        let port = match env::var("DB_PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigError::InvalidVar("DB_PORT", raw.clone()))?,
            Err(_) => DEFAULT_DB_PORT,
        };

        let connection_limit = match env::var("DB_CONNECTION_LIMIT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigError::InvalidVar("DB_CONNECTION_LIMIT", raw.clone()))?,
            Err(_) => DEFAULT_CONNECTION_LIMIT,
        };

        let acquire_timeout_ms = match env::var("DB_ACQUIRE_TIMEOUT_MS") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigError::InvalidVar("DB_ACQUIRE_TIMEOUT_MS", raw.clone()))?,
            Err(_) => DEFAULT_ACQUIRE_TIMEOUT_MS,
        };

        Ok(Self {
            hosts,
            port,
            user: env::var("DB_USER").map_err(|_| ConfigError::MissingVar("DB_USER"))?,
            password: env::var("DB_PASSWORD")
                .map_err(|_| ConfigError::MissingVar("DB_PASSWORD"))?,
            database: env::var("DB_NAME").map_err(|_| ConfigError::MissingVar("DB_NAME"))?,
            connection_limit,
            acquire_timeout: Duration::from_millis(acquire_timeout_ms),
        })
    }

    /// Connection URL for one node
    pub fn node_url(&self, host: &str) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.password, host, self.port, self.database
        )
    }
}

/// Per-endpoint rate budgets, fixed at startup
#[derive(Debug, Clone)]
pub struct RateSettings {
    /// Collection routes: list, create, blind match
    pub collection: RateLimitConfig,
    /// Item routes addressed by id (single-row cost, higher budget)
    pub item: RateLimitConfig,
}

impl Default for RateSettings {
    fn default() -> Self {
        Self {
            collection: RateLimitConfig::new(20, 10_000),
            item: RateLimitConfig::new(100, 10_000),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DbConfig {
        DbConfig {
            hosts: vec!["db_node1".to_string(), "db_node2".to_string()],
            port: 5432,
            user: "vault".to_string(),
            password: "secret".to_string(),
            database: "sensitive".to_string(),
            connection_limit: 10,
            acquire_timeout: Duration::from_millis(5_000),
        }
    }

    #[test]
    fn test_node_url() {
        assert_eq!(
            config().node_url("db_node2"),
            "postgres://vault:secret@db_node2:5432/sensitive"
        );
    }

    #[test]
    fn test_default_rate_settings() {
        let settings = RateSettings::default();
        assert_eq!(settings.collection.max_tokens, 20);
        assert_eq!(settings.collection.interval_ms(), 10_000);
        assert_eq!(settings.item.max_tokens, 100);
        assert_eq!(settings.item.interval_ms(), 10_000);
    }
}
