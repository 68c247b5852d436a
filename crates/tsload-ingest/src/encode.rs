//! Arrow encoding of store batches.
//!
//! Rows are appended cell by cell into typed Arrow column builders derived
//! from the [`TableDef`], then finished into a `RecordBatch` and serialized
//! as an Arrow IPC stream, which ClickHouse ingests with `FORMAT ArrowStream`.

use std::sync::Arc;

use arrow::array::{
    ArrayRef, Date32Builder, Float64Builder, RecordBatch, StringBuilder, TimestampSecondBuilder,
    UInt64Builder,
};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef, TimeUnit};
use arrow::ipc::writer::StreamWriter;
use chrono::NaiveDate;

use crate::store::StoreError;
use crate::table::TableDef;
use crate::value::{ColumnType, Value};

const UTC: &str = "UTC";

/// Arrow type used to carry a column of the given type.
pub fn arrow_type(ty: ColumnType) -> DataType {
    match ty {
        ColumnType::Date => DataType::Date32,
        ColumnType::DateTime => DataType::Timestamp(TimeUnit::Second, Some(UTC.into())),
        ColumnType::UInt64 => DataType::UInt64,
        ColumnType::Float64 => DataType::Float64,
        ColumnType::String => DataType::Utf8,
    }
}

/// Arrow schema mirroring the table's columns.
pub fn arrow_schema(table: &TableDef) -> SchemaRef {
    Arc::new(Schema::new(
        table
            .columns
            .iter()
            .map(|c| Field::new(c.name.as_str(), arrow_type(c.ty), false))
            .collect::<Vec<_>>(),
    ))
}

enum ColumnBuilder {
    Date(Date32Builder),
    DateTime(TimestampSecondBuilder),
    UInt64(UInt64Builder),
    Float64(Float64Builder),
    String(StringBuilder),
}

impl ColumnBuilder {
    fn new(ty: ColumnType, capacity: usize) -> Self {
        match ty {
            ColumnType::Date => ColumnBuilder::Date(Date32Builder::with_capacity(capacity)),
            ColumnType::DateTime => ColumnBuilder::DateTime(
                TimestampSecondBuilder::with_capacity(capacity).with_timezone(UTC),
            ),
            ColumnType::UInt64 => ColumnBuilder::UInt64(UInt64Builder::with_capacity(capacity)),
            ColumnType::Float64 => ColumnBuilder::Float64(Float64Builder::with_capacity(capacity)),
            ColumnType::String => {
                ColumnBuilder::String(StringBuilder::with_capacity(capacity, capacity * 16))
            }
        }
    }

    // Caller has already checked the value type against the column.
    fn push(&mut self, value: Value) {
        match (self, value) {
            (ColumnBuilder::Date(b), Value::Date(d)) => b.append_value(days_since_epoch(d)),
            (ColumnBuilder::DateTime(b), Value::DateTime(dt)) => {
                b.append_value(dt.and_utc().timestamp())
            }
            (ColumnBuilder::UInt64(b), Value::UInt64(v)) => b.append_value(v),
            (ColumnBuilder::Float64(b), Value::Float64(v)) => b.append_value(v),
            (ColumnBuilder::String(b), Value::String(s)) => b.append_value(s),
            _ => {}
        }
    }

    fn finish(&mut self) -> ArrayRef {
        match self {
            ColumnBuilder::Date(b) => Arc::new(b.finish()),
            ColumnBuilder::DateTime(b) => Arc::new(b.finish()),
            ColumnBuilder::UInt64(b) => Arc::new(b.finish()),
            ColumnBuilder::Float64(b) => Arc::new(b.finish()),
            ColumnBuilder::String(b) => Arc::new(b.finish()),
        }
    }
}

fn days_since_epoch(date: NaiveDate) -> i32 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
    date.signed_duration_since(epoch).num_days() as i32
}

/// Columnar accumulator for one table's rows.
pub struct RecordBatchBuilder {
    table: TableDef,
    schema: SchemaRef,
    columns: Vec<ColumnBuilder>,
    rows: usize,
}

impl RecordBatchBuilder {
    pub fn new(table: &TableDef, capacity: usize) -> Self {
        Self {
            table: table.clone(),
            schema: arrow_schema(table),
            columns: table
                .columns
                .iter()
                .map(|c| ColumnBuilder::new(c.ty, capacity))
                .collect(),
            rows: 0,
        }
    }

    pub fn table(&self) -> &TableDef {
        &self.table
    }

    /// Append one row; a row that does not fit the table leaves the builder unchanged.
    pub fn append(&mut self, values: Vec<Value>) -> Result<(), StoreError> {
        self.table.check_row(&values)?;
        for (column, value) in self.columns.iter_mut().zip(values) {
            column.push(value);
        }
        self.rows += 1;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Build the record batch and reset the builder.
    pub fn finish(&mut self) -> Result<RecordBatch, StoreError> {
        let arrays: Vec<ArrayRef> = self.columns.iter_mut().map(ColumnBuilder::finish).collect();
        self.rows = 0;
        RecordBatch::try_new(self.schema.clone(), arrays).map_err(|e| StoreError::Encode {
            table: self.table.name.clone(),
            message: e.to_string(),
        })
    }

    /// Finish and serialize as an Arrow IPC stream.
    pub fn finish_ipc_stream(&mut self) -> Result<Vec<u8>, StoreError> {
        let batch = self.finish()?;
        encode_ipc_stream(&self.table.name, &batch)
    }
}

/// Serialize one record batch as an Arrow IPC stream.
pub fn encode_ipc_stream(table: &str, batch: &RecordBatch) -> Result<Vec<u8>, StoreError> {
    let encode_err = |e: arrow::error::ArrowError| StoreError::Encode {
        table: table.to_string(),
        message: e.to_string(),
    };
    let mut buffer = Vec::new();
    {
        let mut writer = StreamWriter::try_new(&mut buffer, &batch.schema()).map_err(encode_err)?;
        writer.write(batch).map_err(encode_err)?;
        writer.finish().map_err(encode_err)?;
    }
    Ok(buffer)
}
