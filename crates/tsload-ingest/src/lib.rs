//! tsload ingest core.
//!
//! This crate provides:
//! - The line-state parser for benchmark time-series files
//! - Tag-set deduplication into dense ids
//! - Table definitions and provisioning DDL
//! - Byte-budgeted batch partitioning and writes through a [`Store`]
//! - Arrow encoding of batches for the HTTP store

pub mod batch;
pub mod encode;
pub mod loader;
pub mod parser;
pub mod row;
pub mod schema;
pub mod store;
pub mod table;
pub mod tags;
pub mod value;

pub use batch::{partition, rows_per_batch, write_metric, write_tags, MetricWriteStats};
pub use encode::RecordBatchBuilder;
pub use loader::{LoadOptions, LoadSummary, Loader};
pub use parser::{
    parse_file, parse_reader, ParseError, ParseErrorKind, ParsedInput, Parser, ParserState,
};
pub use row::{InsertQueue, Row};
pub use schema::{MetricColumns, MetricSchema, SchemaError};
pub use store::{BatchWriter, MemoryStore, Store, StoreError};
pub use table::{provision, ColumnDef, TableDef};
pub use tags::{Tag, TagRegistry, TAG_KEYS};
pub use value::{ColumnType, Value};
