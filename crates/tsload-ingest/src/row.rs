//! Metric rows and the per-metric insert queue.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::collections::HashMap;

use tsload_common::TagId;

use crate::value::Value;

const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// One sample: `[created_date, created_at, tags_id, f64...]`.
///
/// Both time fields come from a single nanosecond timestamp read as UTC.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub created_date: NaiveDate,
    pub created_at: NaiveDateTime,
    pub tags_id: TagId,
    pub values: Vec<f64>,
}

impl Row {
    /// Build a row from a Unix timestamp in nanoseconds.
    ///
    /// Returns `None` when the timestamp is outside chrono's range.
    pub fn from_timestamp_nanos(nanos: i64, tags_id: TagId, values: Vec<f64>) -> Option<Self> {
        let seconds = nanos.div_euclid(NANOS_PER_SECOND);
        let created_at = DateTime::from_timestamp(seconds, 0)?.naive_utc();
        Some(Row {
            created_date: created_at.date(),
            created_at,
            tags_id,
            values,
        })
    }

    /// Number of cells including the three prefix fields.
    pub fn width(&self) -> usize {
        3 + self.values.len()
    }

    /// Full value tuple in table column order.
    pub fn to_values(&self) -> Vec<Value> {
        let mut out = Vec::with_capacity(self.width());
        out.push(Value::Date(self.created_date));
        out.push(Value::DateTime(self.created_at));
        out.push(Value::UInt64(self.tags_id.get()));
        out.extend(self.values.iter().copied().map(Value::Float64));
        out
    }
}

/// Rows per metric, each list in input order.
#[derive(Debug, Clone, Default)]
pub struct InsertQueue {
    rows: HashMap<String, Vec<Row>>,
    total: usize,
}

impl InsertQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, metric: &str, row: Row) {
        match self.rows.get_mut(metric) {
            Some(rows) => rows.push(row),
            None => {
                self.rows.insert(metric.to_string(), vec![row]);
            }
        }
        self.total += 1;
    }

    /// Rows queued for `metric`; empty when none were seen.
    pub fn rows(&self, metric: &str) -> &[Row] {
        self.rows.get(metric).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of metrics with at least one row.
    pub fn metric_count(&self) -> usize {
        self.rows.len()
    }

    pub fn total_rows(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}
