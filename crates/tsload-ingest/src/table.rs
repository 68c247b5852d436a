//! Table definitions and DDL for metric tables and the tags table.
//!
//! Table and column names come straight from the input file and are written
//! into DDL verbatim, without quoting or validation.

use chrono::NaiveDate;
use tracing::debug;

use tsload_common::schema::{
    CREATED_DATE_COLUMN, INDEX_GRANULARITY, PREFIX_COLUMNS, TAGS_ID_COLUMN, TAG_ID_COLUMN,
};

use crate::store::{Store, StoreError};
use crate::tags::{Tag, TAG_KEYS};
use crate::value::{ColumnType, Value};

/// Types of [`PREFIX_COLUMNS`], in the same order.
const PREFIX_TYPES: [ColumnType; 3] = [ColumnType::Date, ColumnType::DateTime, ColumnType::UInt64];

/// A named, typed column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub ty: ColumnType,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, ty: ColumnType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Layout and MergeTree keys of one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDef {
    pub name: String,
    pub columns: Vec<ColumnDef>,
    /// Column whose month partitions the table.
    pub partition_date: String,
    pub order_by: Vec<String>,
}

impl TableDef {
    /// Metric table: the three prefix columns followed by one Float64 per value column.
    pub fn metric(name: &str, value_columns: &[String]) -> Self {
        let mut columns = Vec::with_capacity(PREFIX_COLUMNS.len() + value_columns.len());
        columns.extend(
            PREFIX_COLUMNS
                .iter()
                .zip(PREFIX_TYPES)
                .map(|(name, ty)| ColumnDef::new(*name, ty)),
        );
        columns.extend(
            value_columns
                .iter()
                .map(|c| ColumnDef::new(c.as_str(), ColumnType::Float64)),
        );
        TableDef {
            name: name.to_string(),
            columns,
            partition_date: CREATED_DATE_COLUMN.to_string(),
            order_by: vec![TAGS_ID_COLUMN.to_string(), CREATED_DATE_COLUMN.to_string()],
        }
    }

    /// Tag-set side table: partition date, id, then the ten tag attributes.
    pub fn tags(name: &str) -> Self {
        let mut columns = Vec::with_capacity(2 + TAG_KEYS.len());
        columns.push(ColumnDef::new(CREATED_DATE_COLUMN, ColumnType::Date));
        columns.push(ColumnDef::new(TAG_ID_COLUMN, ColumnType::UInt64));
        columns.extend(TAG_KEYS.iter().map(|k| ColumnDef::new(*k, ColumnType::String)));
        TableDef {
            name: name.to_string(),
            columns,
            partition_date: CREATED_DATE_COLUMN.to_string(),
            order_by: vec![TAG_ID_COLUMN.to_string()],
        }
    }

    /// Number of Float64 value columns.
    pub fn value_column_count(&self) -> usize {
        self.columns
            .iter()
            .filter(|c| c.ty == ColumnType::Float64)
            .count()
    }

    pub fn drop_statement(&self) -> String {
        format!("DROP TABLE IF EXISTS {}", self.name)
    }

    pub fn create_statement(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(|c| format!("{} {}", c.name, c.ty))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "CREATE TABLE {} ({}) ENGINE = MergeTree PARTITION BY toYYYYMM({}) ORDER BY ({}) SETTINGS index_granularity = {}",
            self.name,
            columns,
            self.partition_date,
            self.order_by.join(", "),
            INDEX_GRANULARITY,
        )
    }

    pub fn insert_statement(&self) -> String {
        format!("INSERT INTO {}", self.name)
    }

    /// Check a value tuple against the column list.
    pub fn check_row(&self, values: &[Value]) -> Result<(), StoreError> {
        if values.len() != self.columns.len() {
            return Err(StoreError::ArityMismatch {
                table: self.name.clone(),
                expected: self.columns.len(),
                found: values.len(),
            });
        }
        for (column, value) in self.columns.iter().zip(values) {
            let found = value.column_type();
            if found != column.ty {
                return Err(StoreError::TypeMismatch {
                    table: self.name.clone(),
                    column: column.name.clone(),
                    expected: column.ty,
                    found,
                });
            }
        }
        Ok(())
    }
}

/// Value tuple of one tags-table row.
pub fn tag_row(date: NaiveDate, id: u64, tag: &Tag) -> Vec<Value> {
    let mut values = Vec::with_capacity(2 + TAG_KEYS.len());
    values.push(Value::Date(date));
    values.push(Value::UInt64(id));
    values.extend(tag.values().iter().map(|v| Value::String(v.to_string())));
    values
}

/// Drop `table` if it exists, then create it afresh.
pub fn provision<S: Store>(store: &mut S, table: &TableDef) -> Result<(), StoreError> {
    debug!(table = %table.name, columns = table.columns.len(), "provisioning table");
    store.execute(&table.drop_statement())?;
    store.execute(&table.create_statement())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::tags::sample_tag;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn metric_table_ddl() {
        let table = TableDef::metric("cpu", &cols(&["usage_user", "usage_system"]));
        assert_eq!(
            table.create_statement(),
            "CREATE TABLE cpu (created_date Date, created_at DateTime, tags_id UInt64, \
             usage_user Float64, usage_system Float64) ENGINE = MergeTree \
             PARTITION BY toYYYYMM(created_date) ORDER BY (tags_id, created_date) \
             SETTINGS index_granularity = 8192"
        );
        assert_eq!(table.drop_statement(), "DROP TABLE IF EXISTS cpu");
        assert_eq!(table.insert_statement(), "INSERT INTO cpu");
        assert_eq!(table.value_column_count(), 2);
    }

    #[test]
    fn metric_table_leads_with_prefix_columns() {
        let table = TableDef::metric("mem", &cols(&["used"]));
        let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names[..3], PREFIX_COLUMNS);
        assert_eq!(names[3], "used");
        assert_eq!(table.columns[1].ty, ColumnType::DateTime);
        assert_eq!(table.value_column_count(), 1);
    }

    #[test]
    fn tags_table_ddl() {
        let table = TableDef::tags("tags");
        let ddl = table.create_statement();
        assert!(ddl.starts_with(
            "CREATE TABLE tags (created_date Date, id UInt64, hostname String, region String,"
        ));
        assert!(ddl.contains("service_environment String)"));
        assert!(ddl.contains("ORDER BY (id)"));
        assert_eq!(table.value_column_count(), 0);
    }

    #[test]
    fn provision_drops_then_creates() {
        let mut store = MemoryStore::new();
        let table = TableDef::metric("mem", &cols(&["used"]));
        provision(&mut store, &table).unwrap();
        assert_eq!(store.statements().len(), 2);
        assert_eq!(store.statements()[0], "DROP TABLE IF EXISTS mem");
        assert!(store.statements()[1].starts_with("CREATE TABLE mem ("));
    }

    #[test]
    fn check_row_reports_mismatches() {
        let table = TableDef::metric("cpu", &cols(&["a"]));
        let date = NaiveDate::from_ymd_opt(2016, 1, 1).unwrap();
        let err = table.check_row(&[Value::Date(date)]).unwrap_err();
        assert!(matches!(err, StoreError::ArityMismatch { expected: 4, found: 1, .. }));

        let row = vec![
            Value::Date(date),
            Value::Date(date),
            Value::UInt64(1),
            Value::Float64(1.0),
        ];
        let err = table.check_row(&row).unwrap_err();
        assert!(matches!(
            err,
            StoreError::TypeMismatch { expected: ColumnType::DateTime, found: ColumnType::Date, .. }
        ));
    }

    #[test]
    fn tag_row_matches_tags_table() {
        let date = NaiveDate::from_ymd_opt(2016, 1, 1).unwrap();
        let row = tag_row(date, 4, &sample_tag("host_4"));
        TableDef::tags("tags").check_row(&row).unwrap();
        assert_eq!(row[2], Value::String("host_4".into()));
    }
}
