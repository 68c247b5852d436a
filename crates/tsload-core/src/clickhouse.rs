//! ClickHouse store over the HTTP interface.
//!
//! Statements are POSTed as the request body. Batches are encoded as Arrow
//! IPC streams and inserted with `FORMAT ArrowStream`, one request per batch.

use std::io::Read;

use tracing::debug;
use tsload_config::StoreConfig;
use tsload_ingest::{BatchWriter, RecordBatchBuilder, Store, StoreError, TableDef, Value};

const USER_HEADER: &str = "X-ClickHouse-User";
const KEY_HEADER: &str = "X-ClickHouse-Key";

/// Longest error body kept from a failed response.
const MAX_ERROR_BODY: u64 = 8 * 1024;

/// Blocking ClickHouse HTTP client.
pub struct ClickHouseStore {
    agent: ureq::Agent,
    base_url: String,
    database: String,
    user: String,
    password: String,
}

impl ClickHouseStore {
    pub fn new(config: &StoreConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(config.connect_timeout())
            .timeout(config.request_timeout())
            .build();
        Self {
            agent,
            base_url: config.url.trim_end_matches('/').to_string(),
            database: config.database.clone(),
            user: config.user.clone(),
            password: config.password.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    fn post(&self) -> ureq::Request {
        let mut request = self
            .agent
            .post(&format!("{}/", self.base_url))
            .query("database", &self.database)
            .set(USER_HEADER, &self.user);
        if !self.password.is_empty() {
            request = request.set(KEY_HEADER, &self.password);
        }
        request
    }
}

impl Store for ClickHouseStore {
    type Batch<'a> = ClickHouseBatch<'a>;

    fn ping(&mut self) -> Result<(), StoreError> {
        let url = format!("{}/ping", self.base_url);
        self.agent.get(&url).call().map_err(store_error)?;
        debug!(url = %self.base_url, "store reachable");
        Ok(())
    }

    fn execute(&mut self, statement: &str) -> Result<(), StoreError> {
        debug!(statement, "executing");
        self.post().send_string(statement).map_err(store_error)?;
        Ok(())
    }

    fn prepare_batch<'a>(
        &'a mut self,
        table: &TableDef,
    ) -> Result<ClickHouseBatch<'a>, StoreError> {
        Ok(ClickHouseBatch {
            store: self,
            builder: RecordBatchBuilder::new(table, 0),
        })
    }
}

/// Rows buffered in Arrow column builders until [`BatchWriter::send`].
pub struct ClickHouseBatch<'a> {
    store: &'a ClickHouseStore,
    builder: RecordBatchBuilder,
}

impl BatchWriter for ClickHouseBatch<'_> {
    fn append(&mut self, values: Vec<Value>) -> Result<(), StoreError> {
        self.builder.append(values)
    }

    fn len(&self) -> usize {
        self.builder.len()
    }

    fn send(mut self) -> Result<(), StoreError> {
        let rows = self.builder.len();
        let body = self.builder.finish_ipc_stream()?;
        let table = self.builder.table();
        let query = format!("{} FORMAT ArrowStream", table.insert_statement());
        self.store
            .post()
            .query("query", &query)
            .set("Content-Type", "application/octet-stream")
            .send_bytes(&body)
            .map_err(store_error)?;
        debug!(table = %table.name, rows, bytes = body.len(), "batch sent");
        Ok(())
    }
}

fn store_error(err: ureq::Error) -> StoreError {
    match err {
        ureq::Error::Status(status, response) => StoreError::Http {
            status,
            body: error_body(response.into_reader()),
        },
        ureq::Error::Transport(transport) => StoreError::Transport(transport.to_string()),
    }
}

/// Server message of a failed response, capped at [`MAX_ERROR_BODY`] bytes.
///
/// An unreadable body yields an empty message; the HTTP status still stands.
fn error_body(reader: impl Read) -> String {
    let mut body = String::new();
    if let Err(err) = reader.take(MAX_ERROR_BODY).read_to_string(&mut body) {
        debug!(error = %err, "failed to read error response body");
        body.clear();
    }
    body.trim().to_string()
}
