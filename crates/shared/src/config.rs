//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Document numbering configuration.
    #[serde(default)]
    pub numbering: NumberingConfig,
    /// Inventory costing configuration.
    #[serde(default)]
    pub costing: CostingConfig,
    /// Retry policy for concurrency conflicts.
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Document numbering configuration.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct NumberingConfig {
    /// Create a default series when none is active for an entity type.
    #[serde(default = "default_true")]
    pub auto_provision: bool,
    /// Zero-padding width of the counter part.
    #[serde(default = "default_pad_width")]
    pub pad_width: usize,
}

impl Default for NumberingConfig {
    fn default() -> Self {
        Self {
            auto_provision: true,
            pad_width: default_pad_width(),
        }
    }
}

fn default_pad_width() -> usize {
    5
}

/// Inventory costing configuration.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CostingConfig {
    /// Allow outgoing movements to drive on-hand quantity below zero.
    ///
    /// When false such movements are rejected instead of clamping the value.
    #[serde(default = "default_true")]
    pub allow_negative_stock: bool,
}

impl Default for CostingConfig {
    fn default() -> Self {
        Self {
            allow_negative_stock: true,
        }
    }
}

/// Retry policy for operations failing with a concurrency conflict.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RetryConfig {
    /// Total attempts including the first one.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_true() -> bool {
    true
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("FOLIO").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_environment_with_defaults() {
        temp_env::with_vars(
            [
                ("FOLIO__DATABASE__URL", Some("postgres://localhost/folio_test")),
                ("FOLIO__COSTING__ALLOW_NEGATIVE_STOCK", Some("false")),
                ("RUN_MODE", Some("test-does-not-exist")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "postgres://localhost/folio_test");
                assert_eq!(config.database.max_connections, 10);
                assert!(config.numbering.auto_provision);
                assert_eq!(config.numbering.pad_width, 5);
                assert!(!config.costing.allow_negative_stock);
                assert_eq!(config.retry.max_attempts, 3);
            },
        );
    }

    #[test]
    fn test_missing_database_url_fails() {
        temp_env::with_vars(
            [
                ("FOLIO__DATABASE__URL", None::<&str>),
                ("RUN_MODE", Some("test-does-not-exist")),
            ],
            || {
                assert!(AppConfig::load().is_err());
            },
        );
    }
}
