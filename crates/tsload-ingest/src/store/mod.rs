//! Store collaborator interface.
//!
//! The loader only needs four operations from the column store: execute a
//! statement, open a batch for a table, append rows to it, and send it.
//! Every call blocks until the store acknowledges it.

pub mod memory;

use crate::table::TableDef;
use crate::value::{ColumnType, Value};

pub use memory::{MemoryBatch, MemoryStore, SentBatch};

/// Failures reported by a store or raised while encoding a batch for it.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("failed to encode batch for '{table}': {message}")]
    Encode { table: String, message: String },

    #[error("row for '{table}' has {found} values, table has {expected} columns")]
    ArityMismatch {
        table: String,
        expected: usize,
        found: usize,
    },

    #[error("column '{column}' of '{table}' expects {expected}, got {found}")]
    TypeMismatch {
        table: String,
        column: String,
        expected: ColumnType,
        found: ColumnType,
    },

    #[error("store rejected request for '{table}': {reason}")]
    Rejected { table: String, reason: String },
}

impl From<StoreError> for tsload_common::Error {
    fn from(err: StoreError) -> Self {
        tsload_common::Error::Store(err.to_string())
    }
}

/// A column store the loader can provision tables in and write batches to.
pub trait Store {
    type Batch<'a>: BatchWriter
    where
        Self: 'a;

    /// Check that the store is reachable.
    fn ping(&mut self) -> Result<(), StoreError>;

    /// Run a DDL or DML statement.
    fn execute(&mut self, statement: &str) -> Result<(), StoreError>;

    /// Open an empty batch targeting `table`.
    fn prepare_batch<'a>(&'a mut self, table: &TableDef) -> Result<Self::Batch<'a>, StoreError>;
}

/// Rows accumulated for one table and sent in one write call.
pub trait BatchWriter {
    /// Add one row, given as the full value tuple in table column order.
    fn append(&mut self, values: Vec<Value>) -> Result<(), StoreError>;

    /// Rows appended so far.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver the batch, blocking until the store acknowledges it.
    fn send(self) -> Result<(), StoreError>;
}
