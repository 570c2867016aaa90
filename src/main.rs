//! CLI entry point for the rawfetch tool.

use std::time::Duration;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use rawfetch_core::{DownloadConfig, DownloadOrchestrator};
use tracing::{debug, info};

mod cli;

use cli::Args;

fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let Some((url, output)) = args.target() else {
        println!("{}", Args::command().render_usage());
        return Ok(());
    };

    let config = DownloadConfig::default()
        .with_max_attempts(u32::from(args.max_attempts))
        .with_retry_delay(Duration::from_millis(args.retry_delay_ms));

    info!(%url, output = %output.display(), "rawfetch starting");
    let mut orchestrator = DownloadOrchestrator::new(url, config)?;
    let report = orchestrator.download(output)?;

    println!("OK {} bytes -> {}", report.bytes_written, output.display());
    Ok(())
}
