//! Command-line entry point for summary-eval.

use anyhow::Result;
use clap::Parser;
use rust_summary_eval::cli::{cmd_evaluate, cmd_export, cmd_ingest, cmd_summarize, Cli, Command};
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() {
    init_tracing();

    if let Err(err) = run() {
        error!(error = %err, "command failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Evaluate(args) => cmd_evaluate(args),
        Command::Ingest(args) => cmd_ingest(args),
        Command::Summarize(args) => cmd_summarize(args),
        Command::ExportCsv(args) => cmd_export(args),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
