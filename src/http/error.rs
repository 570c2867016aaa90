//! Error types for the raw HTTP layer.
//!
//! Every variant knows whether the failure is worth another attempt on a
//! fresh connection; see [`HttpError::is_retryable`].

use thiserror::Error;

/// Errors raised while talking HTTP/1.1 over a socket.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The peer closed the connection (zero-byte read or peek).
    #[error("connection closed by peer")]
    Closed,

    /// Writing the request to the socket failed.
    #[error("cannot send data: {source}")]
    Send {
        /// The underlying socket error.
        #[source]
        source: std::io::Error,
    },

    /// Reading or peeking from the socket failed.
    #[error("cannot receive data: {source}")]
    Receive {
        /// The underlying socket error.
        #[source]
        source: std::io::Error,
    },

    /// An operation was attempted on a connection that is already dead.
    #[error("attempt to use bad connection")]
    StaleConnection,

    /// Host name resolution failed.
    #[error("cannot resolve {host}:{port}: {source}")]
    Resolve {
        /// Host being resolved.
        host: String,
        /// Port being resolved.
        port: u16,
        /// The underlying resolver error.
        #[source]
        source: std::io::Error,
    },

    /// None of the resolved addresses accepted a connection.
    #[error("could not connect to {host}:{port}")]
    Connect {
        /// Target host.
        host: String,
        /// Target port.
        port: u16,
        /// Error from the last address tried, if any address was tried.
        #[source]
        source: Option<std::io::Error>,
    },

    /// The status line or header block could not be parsed.
    #[error("cannot parse response: {reason}")]
    MalformedResponse {
        /// What was wrong with the response.
        reason: String,
    },

    /// The response carries no `Content-Length` header.
    #[error("fetching response without Content-Length header is not supported")]
    MissingContentLength,

    /// The header block did not terminate within the allowed size.
    #[error("response head is too big (limit {limit} bytes)")]
    HeadTooLarge {
        /// The configured cap in bytes.
        limit: usize,
    },

    /// The body chunk consumer failed to accept a chunk.
    #[error("body chunk sink failed: {source}")]
    Sink {
        /// The error returned by the sink.
        #[source]
        source: std::io::Error,
    },
}

impl HttpError {
    /// Creates a [`HttpError::MalformedResponse`].
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            reason: reason.into(),
        }
    }

    /// Whether retrying on a fresh connection may succeed.
    ///
    /// | Variant | Retryable |
    /// |---------|-----------|
    /// | Closed, Send, Receive, StaleConnection | yes |
    /// | Resolve, Connect | no |
    /// | MalformedResponse, MissingContentLength, HeadTooLarge | no |
    /// | Sink | no |
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Closed | Self::Send { .. } | Self::Receive { .. } | Self::StaleConnection => {
                true
            }
            Self::Resolve { .. }
            | Self::Connect { .. }
            | Self::MalformedResponse { .. }
            | Self::MissingContentLength
            | Self::HeadTooLarge { .. }
            | Self::Sink { .. } => false,
        }
    }
}
