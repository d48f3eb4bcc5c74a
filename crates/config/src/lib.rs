//! Spincycle Configuration
//!
//! TOML-based configuration loading with sensible defaults. A minimal config
//! should just work - only specify what you need to change.
//!
//! # Parsing
//!
//! Use the `FromStr` trait to parse configuration:
//!
//! ```
//! use spincycle_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str("[warehouse]\nbackend = \"memory\"").unwrap();
//! ```
//!
//! # Example Full Config
//!
//! ```toml
//! [warehouse]
//! backend = "postgres"
//! url = "postgres://localhost/spincycle"
//!
//! [sink]
//! batch_size = 500
//! flush_interval_ms = 5000
//! retry_attempts = 0
//! retry_base_delay_ms = 200
//! retry_max_delay_ms = 5000
//!
//! [log]
//! level = "info"
//! format = "console"
//! ```

mod error;
mod logging;

use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

pub use error::{ConfigError, Result};
pub use logging::{LogConfig, LogFormat, LogLevel};

/// Warehouse backend selection
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Postgres warehouse (default; requires `url`)
    #[default]
    Postgres,
    /// In-memory recording writer (tests, local development)
    Memory,
    /// Discard-and-count writer (benchmarking)
    Null,
}

/// Warehouse connection configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WarehouseConfig {
    /// Destination backend
    pub backend: Backend,

    /// Connection string; opaque to the pipeline, handed to the writer at
    /// construction
    pub url: String,
}

/// Sink batching and retry configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    /// Rows per table before a size-triggered flush; 0 flushes on every event
    pub batch_size: usize,

    /// Periodic flush interval in milliseconds; 0 disables the timer
    pub flush_interval_ms: u64,

    /// In-call retry attempts after a failed write; 0 relies on buffer
    /// retention alone
    pub retry_attempts: usize,

    /// Delay before the first in-call retry, in milliseconds
    pub retry_base_delay_ms: u64,

    /// Upper bound for the retry backoff delay, in milliseconds
    pub retry_max_delay_ms: u64,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            batch_size: 500,
            flush_interval_ms: 5000,
            retry_attempts: 0,
            retry_base_delay_ms: 200,
            retry_max_delay_ms: 5000,
        }
    }
}

impl SinkConfig {
    /// Flush interval as a duration
    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }

    /// Base retry delay as a duration
    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    /// Maximum retry delay as a duration
    pub fn retry_max_delay(&self) -> Duration {
        Duration::from_millis(self.retry_max_delay_ms)
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Warehouse connection
    pub warehouse: WarehouseConfig,

    /// Sink batching and retry
    pub sink: SinkConfig,

    /// Logging
    pub log: LogConfig,
}

impl Config {
    /// Load and validate configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        contents.parse()
    }

    /// Validate cross-field constraints
    pub fn validate(&self) -> Result<()> {
        if self.warehouse.backend == Backend::Postgres && self.warehouse.url.is_empty() {
            return Err(ConfigError::missing_field("warehouse", "url"));
        }
        if self.sink.retry_max_delay_ms < self.sink.retry_base_delay_ms {
            return Err(ConfigError::invalid_value(
                "sink",
                "retry_max_delay_ms",
                format!(
                    "must be >= retry_base_delay_ms ({})",
                    self.sink.retry_base_delay_ms
                ),
            ));
        }
        Ok(())
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_uses_defaults() {
        let config: Config = "[warehouse]\nurl = \"postgres://localhost/spincycle\""
            .parse()
            .unwrap();

        assert_eq!(config.warehouse.backend, Backend::Postgres);
        assert_eq!(config.sink.batch_size, 500);
        assert_eq!(config.sink.flush_interval(), Duration::from_millis(5000));
        assert_eq!(config.sink.retry_attempts, 0);
        assert_eq!(config.log.level, LogLevel::Info);
        assert_eq!(config.log.format, LogFormat::Console);
    }

    #[test]
    fn memory_backend_needs_no_url() {
        let config: Config = "[warehouse]\nbackend = \"memory\"".parse().unwrap();
        assert_eq!(config.warehouse.backend, Backend::Memory);
    }

    #[test]
    fn postgres_backend_requires_url() {
        let err = Config::from_str("[warehouse]\nbackend = \"postgres\"").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingField {
                section: "warehouse",
                field: "url",
            }
        ));
    }

    #[test]
    fn retry_delays_must_be_ordered() {
        let err = Config::from_str(
            "[warehouse]\nbackend = \"null\"\n[sink]\nretry_base_delay_ms = 500\nretry_max_delay_ms = 100",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                section: "sink",
                field: "retry_max_delay_ms",
                ..
            }
        ));
    }

    #[test]
    fn full_config_parses() {
        let config: Config = r#"
            [warehouse]
            backend = "postgres"
            url = "postgres://warehouse.internal/analytics"

            [sink]
            batch_size = 250
            flush_interval_ms = 1000
            retry_attempts = 3
            retry_base_delay_ms = 100
            retry_max_delay_ms = 2000

            [log]
            level = "debug"
            format = "json"
        "#
        .parse()
        .unwrap();

        assert_eq!(config.sink.batch_size, 250);
        assert_eq!(config.sink.retry_attempts, 3);
        assert_eq!(config.sink.retry_base_delay(), Duration::from_millis(100));
        assert_eq!(config.log.level, LogLevel::Debug);
        assert_eq!(config.log.format, LogFormat::Json);
    }
}
