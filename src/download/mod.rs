//! Resource download on top of the raw HTTP client.
//!
//! This module decides how a resource is fetched and keeps trying through
//! transient network failures.
//!
//! # Features
//!
//! - `HEAD` probe for size and byte-range support
//! - Ranged fetching for large resources (8 MiB ranges from 32 MiB up)
//! - Streaming whole-body fetching for everything else
//! - Bounded retries with a fixed pause (5 attempts, 2 s)
//! - Structured error types with full context
//!
//! # Example
//!
//! ```no_run
//! use rawfetch_core::download::{DownloadConfig, DownloadOrchestrator};
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut orchestrator =
//!     DownloadOrchestrator::new("http://example.com/paper.pdf", DownloadConfig::default())?;
//! let report = orchestrator.download(Path::new("paper.pdf"))?;
//! println!("Downloaded {} bytes", report.bytes_written);
//! # Ok(())
//! # }
//! ```

mod config;
mod constants;
mod error;
mod orchestrator;
mod output;
mod retry;

pub use config::DownloadConfig;
pub use constants::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_RANGE_CHUNK_SIZE, DEFAULT_RANGE_THRESHOLD, DEFAULT_RETRY_DELAY,
};
pub use error::DownloadError;
pub use orchestrator::{DownloadOrchestrator, DownloadReport, Strategy};
pub use output::OutputFile;
pub use retry::{FailureType, RetryDecision, RetryPolicy, classify_error, retry_with};

// Note: we do NOT define module-local Result aliases.
// Use `Result<T, DownloadError>` explicitly in function signatures.
