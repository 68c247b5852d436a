//! Typed cells handed to a store batch.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Date bucket text form.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Second-precision timestamp text form.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Column types used by the generated tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    Date,
    DateTime,
    UInt64,
    Float64,
    String,
}

impl ColumnType {
    /// Type name as written in DDL.
    pub fn sql_name(self) -> &'static str {
        match self {
            ColumnType::Date => "Date",
            ColumnType::DateTime => "DateTime",
            ColumnType::UInt64 => "UInt64",
            ColumnType::Float64 => "Float64",
            ColumnType::String => "String",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_name())
    }
}

/// One cell of a row being appended to a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    UInt64(u64),
    Float64(f64),
    String(String),
}

impl Value {
    pub fn column_type(&self) -> ColumnType {
        match self {
            Value::Date(_) => ColumnType::Date,
            Value::DateTime(_) => ColumnType::DateTime,
            Value::UInt64(_) => ColumnType::UInt64,
            Value::Float64(_) => ColumnType::Float64,
            Value::String(_) => ColumnType::String,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            Value::DateTime(dt) => write!(f, "{}", dt.format(DATETIME_FORMAT)),
            Value::UInt64(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::String(s) => f.write_str(s),
        }
    }
}
