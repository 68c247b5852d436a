//! Error types for tsload.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for tsload operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for tsload.
///
/// Every variant is fatal for a load run; callers propagate it to the
/// binary's top-level handler which maps it to an exit code.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    // Input errors (20-29)
    #[error("failed to read input {path}: {source}")]
    InputIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Decoding errors (30-39)
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("schema error for metric '{metric}': {message}")]
    Schema { metric: String, message: String },

    // Store errors (40-49)
    #[error("store error: {0}")]
    Store(String),

    // Output errors (60-69)
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    /// Used for detailed error reporting in JSON output.
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::InputIo { .. } => 20,
            Error::Parse { .. } => 30,
            Error::Schema { .. } => 31,
            Error::Store(_) => 40,
            Error::Json(_) => 61,
        }
    }

    /// Wrap an I/O failure on the input file.
    pub fn input_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::InputIo {
            path: path.into(),
            source,
        }
    }
}
