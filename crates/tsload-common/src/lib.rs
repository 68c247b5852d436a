//! tsload common types, IDs, and errors.
//!
//! This crate provides foundational types shared across the tsload crates:
//! - Tag-set identity type
//! - Fixed table column names and engine constants
//! - Common error types with stable codes
//! - Output format selection

pub mod error;
pub mod id;
pub mod output;
pub mod schema;

pub use error::{Error, Result};
pub use id::TagId;
pub use output::OutputFormat;
pub use schema::{PREFIX_COLUMNS, SCHEMA_VERSION};
