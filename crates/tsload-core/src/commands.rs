//! Command implementations behind the CLI.

use std::fmt::Write as _;
use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

use tsload_common::{OutputFormat, Result, SCHEMA_VERSION};
use tsload_config::{resolve_config, resolve_load_config, ConfigOverrides, LoaderConfig};
use tsload_ingest::{parse_file, rows_per_batch, LoadOptions, LoadSummary, Loader, MemoryStore};

use crate::clickhouse::ClickHouseStore;

/// Parse the input and write it to the store.
///
/// With `dry_run` the rows go to a discarding in-memory store, so the whole
/// pipeline runs without a server.
pub fn run_load(overrides: &ConfigOverrides, dry_run: bool) -> Result<LoadSummary> {
    let config = resolve_config(overrides)?;
    load_with_config(&config, dry_run)
}

pub fn load_with_config(config: &LoaderConfig, dry_run: bool) -> Result<LoadSummary> {
    let options = LoadOptions::from(&config.load);
    let input = config.load.input.as_path();
    if dry_run {
        info!(input = %input.display(), "dry run, nothing is sent to the store");
        Loader::new(MemoryStore::discarding(), options).run(input)
    } else {
        info!(
            input = %input.display(),
            url = %config.store.url,
            database = %config.store.database,
            "loading"
        );
        Loader::new(ClickHouseStore::new(&config.store), options).run(input)
    }
}

/// What `inspect` reports about one metric.
#[derive(Debug, Clone, Serialize)]
pub struct MetricReport {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: usize,
    /// Rows per batch a load with the configured budget would use.
    pub rows_per_batch: usize,
}

/// Result of parsing an input without writing it anywhere.
#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    pub schema_version: String,
    pub input: PathBuf,
    pub lines: usize,
    pub tags: usize,
    pub total_rows: usize,
    pub batch_budget_bytes: usize,
    pub metrics: Vec<MetricReport>,
}

/// Parse the input only and describe what a load would create.
///
/// Store settings are not validated since nothing is sent.
pub fn run_inspect(overrides: &ConfigOverrides) -> Result<InspectReport> {
    let config = resolve_load_config(overrides)?;
    inspect_with_config(&config)
}

pub fn inspect_with_config(config: &LoaderConfig) -> Result<InspectReport> {
    let input = &config.load.input;
    let parsed = parse_file(input)?;
    let budget = config.load.batch_budget_bytes;
    let metrics = parsed
        .schema
        .iter()
        .map(|m| MetricReport {
            name: m.name.clone(),
            columns: m.columns.clone(),
            rows: parsed.queue.rows(&m.name).len(),
            rows_per_batch: rows_per_batch(budget, m.columns.len()),
        })
        .collect();
    Ok(InspectReport {
        schema_version: SCHEMA_VERSION.to_string(),
        input: input.clone(),
        lines: parsed.lines,
        tags: parsed.tags.len(),
        total_rows: parsed.queue.total_rows(),
        batch_budget_bytes: budget,
        metrics,
    })
}

pub fn render_load(summary: &LoadSummary, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(summary)?),
        OutputFormat::Text => {
            let mut out = String::new();
            let input = summary
                .input
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            let _ = writeln!(
                out,
                "loaded {input}: {} rows in {} batches across {} tables, {} tags",
                summary.total_rows,
                summary.total_batches,
                summary.metrics.len(),
                summary.tags
            );
            for m in &summary.metrics {
                let _ = writeln!(
                    out,
                    "  {:<16} rows={:<10} batches={:<6} rows_per_batch={}",
                    m.metric, m.rows, m.batches, m.rows_per_batch
                );
            }
            let _ = writeln!(
                out,
                "parse {} ms, insert {} ms",
                summary.parse_ms, summary.insert_ms
            );
            Ok(out)
        }
    }
}

pub fn render_inspect(report: &InspectReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Text => {
            let mut out = String::new();
            let _ = writeln!(
                out,
                "{}: {} lines, {} tags, {} rows",
                report.input.display(),
                report.lines,
                report.tags,
                report.total_rows
            );
            for m in &report.metrics {
                let _ = writeln!(
                    out,
                    "  {} ({} columns) rows={} rows_per_batch={}",
                    m.name,
                    m.columns.len(),
                    m.rows,
                    m.rows_per_batch
                );
                let _ = writeln!(out, "    {}", m.columns.join(", "));
            }
            Ok(out)
        }
    }
}
