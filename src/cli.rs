//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use rawfetch_core::DEFAULT_MAX_ATTEMPTS;

/// Download one file over plain HTTP/1.1.
///
/// Large files on servers that support byte ranges are fetched in 8 MiB
/// ranges; everything else is streamed in a single request.
#[derive(Parser, Debug)]
#[command(name = "rawfetch")]
#[command(author, version, about)]
pub struct Args {
    /// URL to download (http://host[:port]/path)
    pub url: Option<String>,

    /// File to write the downloaded bytes to
    pub output: Option<PathBuf>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Maximum attempts per request for transient failures (1-10)
    #[arg(short = 'r', long, default_value_t = DEFAULT_MAX_ATTEMPTS as u8, value_parser = clap::value_parser!(u8).range(1..=10))]
    pub max_attempts: u8,

    /// Pause between attempts in milliseconds (max 60000)
    #[arg(long, default_value_t = 2000, value_parser = clap::value_parser!(u64).range(0..=60000))]
    pub retry_delay_ms: u64,
}

impl Args {
    /// URL and output path, if both were given.
    pub fn target(&self) -> Option<(&str, &PathBuf)> {
        Some((self.url.as_deref()?, self.output.as_ref()?))
    }
}
