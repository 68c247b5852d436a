//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tsload_common::OutputFormat;
use tsload_config::ConfigOverrides;

#[derive(Debug, Parser)]
#[command(
    name = "tsload",
    version,
    about = "Load benchmark time-series files into ClickHouse"
)]
pub struct Cli {
    /// Log filter directive, e.g. `info` or `tsload_ingest=debug`
    #[arg(long, global = true, default_value = "info", env = "TSLOAD_LOG")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Parse an input file and write it to the store
    Load(LoadArgs),
    /// Parse an input file and report its schema without writing anything
    Inspect(InspectArgs),
}

#[derive(Debug, Args)]
pub struct LoadArgs {
    /// Benchmark input file
    #[arg(long, short)]
    pub input: Option<PathBuf>,

    /// Config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// ClickHouse HTTP endpoint
    #[arg(long)]
    pub url: Option<String>,

    #[arg(long)]
    pub database: Option<String>,

    #[arg(long)]
    pub user: Option<String>,

    #[arg(long)]
    pub password: Option<String>,

    /// Byte budget per batch
    #[arg(long, value_name = "BYTES")]
    pub batch_budget: Option<usize>,

    /// Run the whole pipeline against an in-memory store
    #[arg(long)]
    pub dry_run: bool,

    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Benchmark input file
    #[arg(long, short)]
    pub input: Option<PathBuf>,

    /// Config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

impl LoadArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            config_path: self.config.clone(),
            input: self.input.clone(),
            url: self.url.clone(),
            database: self.database.clone(),
            user: self.user.clone(),
            password: self.password.clone(),
            batch_budget_bytes: self.batch_budget,
        }
    }
}

impl InspectArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            config_path: self.config.clone(),
            input: self.input.clone(),
            ..ConfigOverrides::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn load_flags_become_overrides() {
        let cli = Cli::try_parse_from([
            "tsload",
            "load",
            "--input",
            "data.txt",
            "--url",
            "http://ch:8123",
            "--batch-budget",
            "4096",
            "--dry-run",
            "--format",
            "json",
        ])
        .unwrap();
        let Commands::Load(args) = cli.command else {
            panic!("expected load");
        };
        assert!(args.dry_run);
        assert_eq!(args.format, OutputFormat::Json);
        let overrides = args.overrides();
        assert_eq!(overrides.input, Some(PathBuf::from("data.txt")));
        assert_eq!(overrides.url.as_deref(), Some("http://ch:8123"));
        assert_eq!(overrides.batch_budget_bytes, Some(4096));
        assert_eq!(overrides.database, None);
    }

    #[test]
    fn log_flags_are_global() {
        let cli =
            Cli::try_parse_from(["tsload", "inspect", "--log-level", "debug", "--log-json"]).unwrap();
        assert_eq!(cli.log_level, "debug");
        assert!(cli.log_json);
        assert!(matches!(cli.command, Commands::Inspect(_)));
    }
}
