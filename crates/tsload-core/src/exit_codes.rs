//! Exit codes for the tsload CLI.
//!
//! Exit codes communicate the outcome of a run without requiring output
//! parsing. They are stable.

use tsload_common::Error;

/// Exit codes for tsload operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Load or inspection completed
    Clean = 0,

    /// Configuration error
    ConfigError = 10,

    /// Input file could not be opened or read
    InputError = 11,

    /// Input file is malformed or its schema is inconsistent
    ParseError = 12,

    /// Store unreachable or rejected a statement or batch
    StoreError = 13,

    /// Internal/unknown error
    InternalError = 99,
}

impl ExitCode {
    /// Map a fatal error to the code the process exits with.
    pub fn from_error(err: &Error) -> Self {
        match err {
            Error::Config(_) => ExitCode::ConfigError,
            Error::InputIo { .. } => ExitCode::InputError,
            Error::Parse { .. } | Error::Schema { .. } => ExitCode::ParseError,
            Error::Store(_) => ExitCode::StoreError,
            Error::Json(_) => ExitCode::InternalError,
        }
    }

    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Clean)
    }

    /// Check if this exit code indicates an error requiring attention.
    pub fn is_error(self) -> bool {
        (self as i32) >= 10
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}
