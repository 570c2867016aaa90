//! Rawfetch Core Library
//!
//! This library downloads a single resource over plain HTTP/1.1, speaking the
//! protocol directly over a TCP socket.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`http`] - Socket transport, response framing and parsing, connections
//! - [`download`] - Strategy selection, retries and the output file
//! - [`parser`] - Target URL validation

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod download;
pub mod http;
pub mod parser;

// Re-export commonly used types
pub use download::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY, DownloadConfig, DownloadError,
    DownloadOrchestrator, DownloadReport, FailureType, RetryPolicy, Strategy, classify_error,
};
pub use http::{HttpConnection, HttpError, TcpConnector};
pub use parser::{ParseError, TargetUrl};
