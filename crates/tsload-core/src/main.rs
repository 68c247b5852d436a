use clap::Parser;
use tracing::error;

use tsload_common::{Error, OutputFormat};
use tsload_core::cli::{Cli, Commands};
use tsload_core::commands::{render_inspect, render_load, run_inspect, run_load};
use tsload_core::logging::init_logging;
use tsload_core::ExitCode;

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.log_json);

    let (format, result) = match &cli.command {
        Commands::Load(args) => (
            args.format,
            run_load(&args.overrides(), args.dry_run).and_then(|s| render_load(&s, args.format)),
        ),
        Commands::Inspect(args) => (
            args.format,
            run_inspect(&args.overrides()).and_then(|r| render_inspect(&r, args.format)),
        ),
    };

    match result {
        Ok(output) => print!("{output}"),
        Err(err) => {
            let code = ExitCode::from_error(&err);
            error!(error = %err, code = err.code(), "tsload failed");
            report_error(&err, format);
            std::process::exit(code.as_i32());
        }
    }
}

fn report_error(err: &Error, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let body = serde_json::json!({
                "error": { "code": err.code(), "message": err.to_string() }
            });
            println!("{body}");
        }
        OutputFormat::Text => eprintln!("tsload: {err}"),
    }
}
