//! Byte-budgeted batching of metric rows.
//!
//! Batch size is estimated from the float payload alone: a row of `n` value
//! columns is counted as `n * 8` bytes. Prefix columns and protocol framing
//! are not accounted for.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use tsload_common::schema::FLOAT64_BYTES;

use crate::row::Row;
use crate::store::{BatchWriter, Store, StoreError};
use crate::table::{tag_row, TableDef};
use crate::tags::TagRegistry;

/// Rows per batch for a budget of `budget_bytes` and `value_columns` floats per row.
///
/// `floor(budget / value_columns / 8)`, never less than one row.
pub fn rows_per_batch(budget_bytes: usize, value_columns: usize) -> usize {
    (budget_bytes / value_columns.max(1) / FLOAT64_BYTES).max(1)
}

/// Consecutive chunks of at most `rows_per_batch` rows, in input order.
pub fn partition(rows: &[Row], rows_per_batch: usize) -> std::slice::Chunks<'_, Row> {
    rows.chunks(rows_per_batch.max(1))
}

/// Outcome of writing one metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricWriteStats {
    pub metric: String,
    pub rows: usize,
    pub batches: usize,
    pub rows_per_batch: usize,
}

/// Write `rows` into `table`, one prepared batch per chunk.
///
/// The first failed append or send aborts the write; nothing is retried.
pub fn write_metric<S: Store>(
    store: &mut S,
    table: &TableDef,
    rows: &[Row],
    budget_bytes: usize,
) -> Result<MetricWriteStats, StoreError> {
    let per_batch = rows_per_batch(budget_bytes, table.value_column_count());
    let mut batches = 0;

    for chunk in partition(rows, per_batch) {
        let mut batch = store.prepare_batch(table)?;
        for row in chunk {
            batch.append(row.to_values())?;
        }
        batch.send()?;
        batches += 1;
        debug!(table = %table.name, batch = batches, rows = chunk.len(), "sent batch");
    }

    info!(
        table = %table.name,
        rows = rows.len(),
        batches,
        rows_per_batch = per_batch,
        "metric written"
    );

    Ok(MetricWriteStats {
        metric: table.name.clone(),
        rows: rows.len(),
        batches,
        rows_per_batch: per_batch,
    })
}

/// Write every registered tag-set into `table` as a single batch, in id order.
///
/// An empty registry sends nothing.
pub fn write_tags<S: Store>(
    store: &mut S,
    table: &TableDef,
    tags: &TagRegistry,
    date: NaiveDate,
) -> Result<usize, StoreError> {
    if tags.is_empty() {
        return Ok(0);
    }
    let mut batch = store.prepare_batch(table)?;
    for (id, tag) in tags.iter() {
        batch.append(tag_row(date, id.get(), tag))?;
    }
    let written = batch.len();
    batch.send()?;
    info!(table = %table.name, tags = written, "tags written");
    Ok(written)
}
