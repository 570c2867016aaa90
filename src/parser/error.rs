//! Error types for URL parsing.

use thiserror::Error;

/// Errors that can occur while parsing the target URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// URL does not match `scheme://host[:port]/path`.
    #[error("'{url}' is not a valid URL: {reason}\n  Suggestion: {suggestion}")]
    InvalidUrl {
        /// The URL that failed validation
        url: String,
        /// Why the URL is invalid
        reason: String,
        /// How to fix the issue
        suggestion: String,
    },

    /// URL scheme is anything other than `http`.
    #[error("scheme '{scheme}' is not supported\n  Suggestion: Use a plain http:// URL")]
    UnsupportedScheme {
        /// The rejected scheme
        scheme: String,
    },
}

impl ParseError {
    /// Creates an `InvalidUrl` error for a URL that does not match the pattern.
    #[must_use]
    pub fn malformed(url: &str) -> Self {
        Self::InvalidUrl {
            url: url.to_string(),
            reason: "expected scheme://host[:port]/path".to_string(),
            suggestion: "Check the URL format and try again".to_string(),
        }
    }

    /// Creates an `InvalidUrl` error for a bad port.
    #[must_use]
    pub fn bad_port(url: &str, port: &str) -> Self {
        Self::InvalidUrl {
            url: url.to_string(),
            reason: format!("port '{port}' is not a number between 1 and 65535"),
            suggestion: "Use a numeric port such as :8080, or omit it for port 80".to_string(),
        }
    }

    /// Creates an `UnsupportedScheme` error.
    #[must_use]
    pub fn unsupported_scheme(scheme: &str) -> Self {
        Self::UnsupportedScheme {
            scheme: scheme.to_string(),
        }
    }
}
