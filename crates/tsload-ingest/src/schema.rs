//! Per-metric column schema discovered from the schema block.

use std::collections::HashMap;

/// Errors in metric column declarations or in rows that disagree with them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("schema line has an empty metric name")]
    EmptyMetricName,

    #[error("metric declares no columns")]
    NoColumns { metric: String },

    #[error("column {position} has an empty name")]
    EmptyColumnName { metric: String, position: usize },

    #[error("redeclared with columns {declared:?}, previously {existing:?}")]
    ConflictingColumns {
        metric: String,
        existing: Vec<String>,
        declared: Vec<String>,
    },

    #[error("metric name collides with the tags table '{table}'")]
    CollidesWithTagsTable { metric: String, table: String },

    #[error("data line references a metric missing from the schema block")]
    UnknownMetric { metric: String },

    #[error("data line has {found} values, schema declares {expected} columns")]
    ColumnCountMismatch {
        metric: String,
        expected: usize,
        found: usize,
    },
}

impl SchemaError {
    /// Metric the error refers to (empty for a nameless schema line).
    pub fn metric(&self) -> &str {
        match self {
            SchemaError::EmptyMetricName => "",
            SchemaError::NoColumns { metric }
            | SchemaError::EmptyColumnName { metric, .. }
            | SchemaError::ConflictingColumns { metric, .. }
            | SchemaError::CollidesWithTagsTable { metric, .. }
            | SchemaError::UnknownMetric { metric }
            | SchemaError::ColumnCountMismatch { metric, .. } => metric,
        }
    }
}

impl From<SchemaError> for tsload_common::Error {
    fn from(err: SchemaError) -> Self {
        tsload_common::Error::Schema {
            metric: err.metric().to_string(),
            message: err.to_string(),
        }
    }
}

/// A metric and its value columns, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricColumns {
    pub name: String,
    pub columns: Vec<String>,
}

/// Metric name → ordered column names, iterated in discovery order.
#[derive(Debug, Clone, Default)]
pub struct MetricSchema {
    metrics: Vec<MetricColumns>,
    index: HashMap<String, usize>,
}

impl MetricSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a metric's columns.
    ///
    /// Re-declaring a metric with the same columns is a no-op and returns
    /// `false`; different columns are rejected.
    pub fn declare(&mut self, name: &str, columns: Vec<String>) -> Result<bool, SchemaError> {
        if name.is_empty() {
            return Err(SchemaError::EmptyMetricName);
        }
        if columns.is_empty() {
            return Err(SchemaError::NoColumns {
                metric: name.to_string(),
            });
        }
        if let Some(position) = columns.iter().position(String::is_empty) {
            return Err(SchemaError::EmptyColumnName {
                metric: name.to_string(),
                position: position + 1,
            });
        }

        if let Some(&i) = self.index.get(name) {
            let existing = &self.metrics[i].columns;
            if *existing == columns {
                return Ok(false);
            }
            return Err(SchemaError::ConflictingColumns {
                metric: name.to_string(),
                existing: existing.clone(),
                declared: columns,
            });
        }

        self.index.insert(name.to_string(), self.metrics.len());
        self.metrics.push(MetricColumns {
            name: name.to_string(),
            columns,
        });
        Ok(true)
    }

    pub fn columns(&self, name: &str) -> Option<&[String]> {
        self.index
            .get(name)
            .map(|&i| self.metrics[i].columns.as_slice())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Metrics in the order they were first declared.
    pub fn iter(&self) -> impl Iterator<Item = &MetricColumns> + '_ {
        self.metrics.iter()
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}
