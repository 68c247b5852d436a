//! In-memory store used for dry runs and tests.

use super::{BatchWriter, Store, StoreError};
use crate::table::TableDef;
use crate::value::Value;

/// A batch as it was delivered to a [`MemoryStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct SentBatch {
    pub table: String,
    pub row_count: usize,
    /// Empty when the store discards row contents.
    pub rows: Vec<Vec<Value>>,
}

/// Records statements and sent batches instead of talking to a server.
#[derive(Debug, Default)]
pub struct MemoryStore {
    statements: Vec<String>,
    batches: Vec<SentBatch>,
    pings: usize,
    discard_rows: bool,
    fail_on_send: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that keeps row counts but drops row contents.
    pub fn discarding() -> Self {
        Self {
            discard_rows: true,
            ..Self::default()
        }
    }

    /// Make the `n`th send (0-based) fail with [`StoreError::Rejected`].
    pub fn fail_on_send(mut self, n: usize) -> Self {
        self.fail_on_send = Some(n);
        self
    }

    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    pub fn batches(&self) -> &[SentBatch] {
        &self.batches
    }

    pub fn pings(&self) -> usize {
        self.pings
    }

    /// Batches sent to `table`, in send order.
    pub fn batches_for<'a>(&'a self, table: &str) -> impl Iterator<Item = &'a SentBatch> + 'a {
        let table = table.to_string();
        self.batches.iter().filter(move |b| b.table == table)
    }

    /// All rows sent to `table`, concatenated in send order.
    pub fn rows_for(&self, table: &str) -> Vec<&[Value]> {
        self.batches
            .iter()
            .filter(|b| b.table == table)
            .flat_map(|b| b.rows.iter().map(Vec::as_slice))
            .collect()
    }
}

impl Store for MemoryStore {
    type Batch<'a> = MemoryBatch<'a>;

    fn ping(&mut self) -> Result<(), StoreError> {
        self.pings += 1;
        Ok(())
    }

    fn execute(&mut self, statement: &str) -> Result<(), StoreError> {
        self.statements.push(statement.to_string());
        Ok(())
    }

    fn prepare_batch<'a>(&'a mut self, table: &TableDef) -> Result<MemoryBatch<'a>, StoreError> {
        Ok(MemoryBatch {
            store: self,
            table: table.clone(),
            rows: Vec::new(),
            row_count: 0,
        })
    }
}

/// Open batch of a [`MemoryStore`].
#[derive(Debug)]
pub struct MemoryBatch<'a> {
    store: &'a mut MemoryStore,
    table: TableDef,
    rows: Vec<Vec<Value>>,
    row_count: usize,
}

impl BatchWriter for MemoryBatch<'_> {
    fn append(&mut self, values: Vec<Value>) -> Result<(), StoreError> {
        self.table.check_row(&values)?;
        if !self.store.discard_rows {
            self.rows.push(values);
        }
        self.row_count += 1;
        Ok(())
    }

    fn len(&self) -> usize {
        self.row_count
    }

    fn send(self) -> Result<(), StoreError> {
        if self.store.fail_on_send == Some(self.store.batches.len()) {
            return Err(StoreError::Rejected {
                table: self.table.name,
                reason: "injected send failure".to_string(),
            });
        }
        self.store.batches.push(SentBatch {
            table: self.table.name,
            row_count: self.row_count,
            rows: self.rows,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> TableDef {
        TableDef::metric("cpu", &["a".to_string()])
    }

    fn row(v: f64) -> Vec<Value> {
        let date = chrono::NaiveDate::from_ymd_opt(2016, 1, 1).unwrap();
        vec![
            Value::Date(date),
            Value::DateTime(date.and_hms_opt(0, 0, 0).unwrap()),
            Value::UInt64(1),
            Value::Float64(v),
        ]
    }

    #[test]
    fn records_sent_rows() {
        let mut store = MemoryStore::new();
        let mut batch = store.prepare_batch(&table()).unwrap();
        batch.append(row(1.0)).unwrap();
        batch.append(row(2.0)).unwrap();
        assert_eq!(batch.len(), 2);
        batch.send().unwrap();

        assert_eq!(store.batches().len(), 1);
        let rows = store.rows_for("cpu");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][3], Value::Float64(2.0));
    }

    #[test]
    fn unsent_batch_leaves_no_trace() {
        let mut store = MemoryStore::new();
        {
            let mut batch = store.prepare_batch(&table()).unwrap();
            batch.append(row(1.0)).unwrap();
        }
        assert!(store.batches().is_empty());
    }

    #[test]
    fn discarding_store_counts_only() {
        let mut store = MemoryStore::discarding();
        let mut batch = store.prepare_batch(&table()).unwrap();
        batch.append(row(1.0)).unwrap();
        batch.send().unwrap();
        assert_eq!(store.batches()[0].row_count, 1);
        assert!(store.batches()[0].rows.is_empty());
    }

    #[test]
    fn append_validates_row_shape() {
        let mut store = MemoryStore::new();
        let mut batch = store.prepare_batch(&table()).unwrap();
        assert!(batch.append(vec![Value::UInt64(1)]).is_err());
        assert!(batch.is_empty());
    }

    #[test]
    fn injected_failure_on_nth_send() {
        let mut store = MemoryStore::new().fail_on_send(1);
        store.prepare_batch(&table()).unwrap().send().unwrap();
        let err = store.prepare_batch(&table()).unwrap().send().unwrap_err();
        assert!(matches!(err, StoreError::Rejected { .. }));
        assert_eq!(store.batches().len(), 1);
    }

    #[test]
    fn lookups_do_not_borrow_the_table_name() {
        let mut store = MemoryStore::new();
        let mut batch = store.prepare_batch(&table()).unwrap();
        batch.append(row(4.0)).unwrap();
        batch.send().unwrap();

        let (rows, batches) = {
            let name = String::from("cpu");
            (store.rows_for(&name), store.batches_for(&name))
        };
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][3], Value::Float64(4.0));
        assert_eq!(batches.count(), 1);
    }
}
