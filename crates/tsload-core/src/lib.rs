//! tsload command-line front end.
//!
//! Wires resolved configuration, the ClickHouse HTTP store and the ingest
//! pipeline together behind the `tsload` binary.

pub mod cli;
pub mod clickhouse;
pub mod commands;
pub mod exit_codes;
pub mod logging;

pub use clickhouse::{ClickHouseBatch, ClickHouseStore};
pub use exit_codes::ExitCode;
