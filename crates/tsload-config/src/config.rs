//! Loader configuration types.
//!
//! Every field has a default so a partial TOML file (or none at all) yields a
//! complete configuration.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tsload_common::schema::DEFAULT_BATCH_BUDGET_BYTES;

use crate::ConfigError;

/// Default ClickHouse HTTP endpoint.
pub const DEFAULT_URL: &str = "http://localhost:8123";

/// Default target database.
pub const DEFAULT_DATABASE: &str = "benchmark";

/// Default ClickHouse user.
pub const DEFAULT_USER: &str = "default";

/// Default benchmark input file.
pub const DEFAULT_INPUT: &str = "../test_data/timescaledb-data-8-1s-24h";

/// Default name of the tag-set side table.
pub const DEFAULT_TAGS_TABLE: &str = "tags";

/// Complete loader configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub store: StoreConfig,
    pub load: LoadConfig,
}

/// Connection settings for the column store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// HTTP endpoint, e.g. `http://localhost:8123`.
    pub url: String,

    pub database: String,

    pub user: String,

    pub password: String,

    /// TCP connect timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Whole-request timeout in seconds; large batches need a generous value.
    pub request_timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            user: DEFAULT_USER.to_string(),
            password: String::new(),
            connect_timeout_secs: 10,
            request_timeout_secs: 300,
        }
    }
}

impl StoreConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// What to load and how to batch it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    /// Benchmark data file.
    pub input: PathBuf,

    /// Approximate payload bytes per write batch.
    pub batch_budget_bytes: usize,

    /// Name of the tag-set side table.
    pub tags_table: String,

    /// Synthetic partition date stamped on every tags row.
    pub tags_date: NaiveDate,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            batch_budget_bytes: DEFAULT_BATCH_BUDGET_BYTES,
            tags_table: DEFAULT_TAGS_TABLE.to_string(),
            tags_date: default_tags_date(),
        }
    }
}

/// The benchmark's first day, used as the tags table partition date.
pub fn default_tags_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2016, 1, 1).unwrap_or_default()
}

impl LoaderConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(content: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load a configuration file from disk.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_setup() {
        let config = LoaderConfig::default();
        assert_eq!(config.store.url, "http://localhost:8123");
        assert_eq!(config.store.database, "benchmark");
        assert_eq!(config.store.user, "default");
        assert!(config.store.password.is_empty());
        assert_eq!(config.load.batch_budget_bytes, 1024 * 1024);
        assert_eq!(config.load.tags_table, "tags");
        assert_eq!(config.load.tags_date.to_string(), "2016-01-01");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let input = r#"
[store]
database = "tsbs"

[load]
batch_budget_bytes = 4096
"#;
        let config = LoaderConfig::from_toml_str(input, Path::new("inline.toml")).unwrap();
        assert_eq!(config.store.database, "tsbs");
        assert_eq!(config.store.url, DEFAULT_URL);
        assert_eq!(config.load.batch_budget_bytes, 4096);
        assert_eq!(config.load.tags_table, DEFAULT_TAGS_TABLE);
    }

    #[test]
    fn tags_date_parses_from_toml() {
        let input = r#"
[load]
tags_date = "2020-02-29"
"#;
        let config = LoaderConfig::from_toml_str(input, Path::new("inline.toml")).unwrap();
        assert_eq!(config.load.tags_date, NaiveDate::from_ymd_opt(2020, 2, 29).unwrap());
    }

    #[test]
    fn malformed_toml_reports_origin() {
        let err = LoaderConfig::from_toml_str("[store\nurl=", Path::new("broken.toml"))
            .unwrap_err();
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = LoaderConfig::load_from_file(Path::new("/nonexistent/tsload.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
