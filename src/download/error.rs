//! Error types for the download module.
//!
//! This module defines structured errors for the download operation,
//! providing context-rich error messages for debugging and user feedback.

use std::path::PathBuf;

use thiserror::Error;

use crate::http::HttpError;
use crate::parser::ParseError;

/// Errors that can occur while downloading a resource.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Transport, framing or protocol failure talking to the server.
    #[error("{source}")]
    Http {
        /// The underlying HTTP layer error.
        #[from]
        source: HttpError,
    },

    /// The server answered with a non-2xx status.
    #[error("HTTP {status} {reason} downloading {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
        /// The reason phrase from the status line.
        reason: String,
    },

    /// The target URL was rejected.
    #[error(transparent)]
    InvalidUrl(#[from] ParseError),

    /// File system error on the output file (create, write, flush).
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Bytes written do not match the size announced by the server.
    #[error(
        "integrity check failed for {path}: expected {expected_bytes} bytes, got {actual_bytes}"
    )]
    Integrity {
        /// Output path that failed verification.
        path: PathBuf,
        /// Expected size in bytes.
        expected_bytes: u64,
        /// Actual size in bytes.
        actual_bytes: u64,
    },

    /// A range response body does not cover the requested range.
    #[error(
        "range bytes={first}-{last} returned {actual_bytes} bytes, expected {expected_bytes}"
    )]
    RangeMismatch {
        /// First byte requested.
        first: u64,
        /// Last byte requested (inclusive).
        last: u64,
        /// Length of the requested range.
        expected_bytes: u64,
        /// Length of the body received.
        actual_bytes: u64,
    },

    /// The configuration is unusable.
    #[error("invalid download configuration: {reason}")]
    InvalidConfig {
        /// What is wrong.
        reason: String,
    },
}

impl DownloadError {
    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16, reason: impl Into<String>) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
            reason: reason.into(),
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an integrity mismatch error.
    pub fn integrity(path: impl Into<PathBuf>, expected_bytes: u64, actual_bytes: u64) -> Self {
        Self::Integrity {
            path: path.into(),
            expected_bytes,
            actual_bytes,
        }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}

// `From<std::io::Error>` is deliberately missing: every IO failure needs the
// output path, so callers go through `DownloadError::io`.
