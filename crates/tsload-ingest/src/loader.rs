//! End-to-end load: parse, provision, flush tags, write metric batches.

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use tsload_common::{Result, SCHEMA_VERSION};
use tsload_config::LoadConfig;

use crate::batch::{write_metric, write_tags, MetricWriteStats};
use crate::parser::{parse_file, ParsedInput};
use crate::schema::SchemaError;
use crate::store::Store;
use crate::table::{provision, TableDef};

/// Knobs the loader needs once configuration is resolved.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub batch_budget_bytes: usize,
    pub tags_table: String,
    pub tags_date: NaiveDate,
}

impl From<&LoadConfig> for LoadOptions {
    fn from(config: &LoadConfig) -> Self {
        Self {
            batch_budget_bytes: config.batch_budget_bytes,
            tags_table: config.tags_table.clone(),
            tags_date: config.tags_date,
        }
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self::from(&LoadConfig::default())
    }
}

/// Result of a completed load.
#[derive(Debug, Clone, Serialize)]
pub struct LoadSummary {
    pub schema_version: String,
    pub input: Option<PathBuf>,
    pub lines: usize,
    pub tags: usize,
    pub total_rows: usize,
    pub total_batches: usize,
    pub metrics: Vec<MetricWriteStats>,
    pub parse_ms: u128,
    pub insert_ms: u128,
}

/// Drives a load into a [`Store`].
pub struct Loader<S> {
    store: S,
    options: LoadOptions,
}

impl<S: Store> Loader<S> {
    pub fn new(store: S, options: LoadOptions) -> Self {
        Self { store, options }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Ping the store, parse `input`, then write everything it contains.
    pub fn run(&mut self, input: &Path) -> Result<LoadSummary> {
        self.store.ping()?;

        let started = Instant::now();
        let parsed = parse_file(input)?;
        let parse_elapsed = started.elapsed();
        info!(
            input = %input.display(),
            lines = parsed.lines,
            metrics = parsed.schema.len(),
            metrics_with_rows = parsed.queue.metric_count(),
            tags = parsed.tags.len(),
            rows = parsed.queue.total_rows(),
            elapsed_ms = parse_elapsed.as_millis() as u64,
            "parsed input"
        );

        let mut summary = self.load_parsed(&parsed)?;
        summary.input = Some(input.to_path_buf());
        summary.parse_ms = parse_elapsed.as_millis();
        Ok(summary)
    }

    /// Provision tables and write an already parsed input.
    ///
    /// Metric tables are recreated in schema discovery order, then the tags
    /// table is recreated and filled, then each metric's rows are written.
    /// A metric named like the tags table is rejected before any DDL runs.
    pub fn load_parsed(&mut self, parsed: &ParsedInput) -> Result<LoadSummary> {
        if parsed.schema.contains(&self.options.tags_table) {
            return Err(SchemaError::CollidesWithTagsTable {
                metric: self.options.tags_table.clone(),
                table: self.options.tags_table.clone(),
            }
            .into());
        }

        let tables: Vec<TableDef> = parsed
            .schema
            .iter()
            .map(|m| TableDef::metric(&m.name, &m.columns))
            .collect();
        for table in &tables {
            provision(&mut self.store, table)?;
        }

        let tags_table = TableDef::tags(&self.options.tags_table);
        provision(&mut self.store, &tags_table)?;
        let tags = write_tags(
            &mut self.store,
            &tags_table,
            &parsed.tags,
            self.options.tags_date,
        )?;

        let started = Instant::now();
        let mut metrics = Vec::with_capacity(tables.len());
        for table in &tables {
            let rows = parsed.queue.rows(&table.name);
            metrics.push(write_metric(
                &mut self.store,
                table,
                rows,
                self.options.batch_budget_bytes,
            )?);
        }
        let insert_elapsed = started.elapsed();
        info!(
            elapsed = ?insert_elapsed,
            elapsed_ms = insert_elapsed.as_millis() as u64,
            "inserting data took"
        );

        Ok(LoadSummary {
            schema_version: SCHEMA_VERSION.to_string(),
            input: None,
            lines: parsed.lines,
            tags,
            total_rows: metrics.iter().map(|m| m.rows).sum(),
            total_batches: metrics.iter().map(|m| m.batches).sum(),
            metrics,
            parse_ms: 0,
            insert_ms: insert_elapsed.as_millis(),
        })
    }
}
