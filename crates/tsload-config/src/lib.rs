//! tsload configuration loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for the loader configuration file (TOML)
//! - Config resolution (CLI → env → file → defaults)
//! - Semantic validation of resolved values

pub mod config;
pub mod resolve;
pub mod validate;

pub use config::{LoadConfig, LoaderConfig, StoreConfig};
pub use resolve::{
    default_config_path, resolve_config, resolve_config_with, resolve_load_config,
    resolve_load_config_with, ConfigOverrides,
};
pub use validate::ValidationError;

/// Errors raised while loading or resolving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {message}")]
    Parse {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("invalid value for {name}: {value:?}")]
    InvalidEnv { name: String, value: String },

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

impl From<ConfigError> for tsload_common::Error {
    fn from(err: ConfigError) -> Self {
        tsload_common::Error::Config(err.to_string())
    }
}
