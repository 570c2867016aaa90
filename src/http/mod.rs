//! Minimal HTTP/1.1 client over a raw TCP socket.
//!
//! The layers, from the socket up:
//! - [`Transport`] / [`TcpTransport`]: blocking send, receive and peek
//! - [`ResponseFrameReader`]: finds the head/body boundary in the byte stream
//!   and reads `Content-Length` bodies, buffered or streamed
//! - [`parse_head`] / [`ResponseHead`]: status line and headers, as spans
//!   over the raw head bytes
//! - [`HttpConnection`]: one request/response cycle at a time, with a
//!   live/dead lifecycle
//!
//! Only `Content-Length` framing is supported. There is no TLS, chunked
//! transfer-encoding, redirect handling or pipelining.
//!
//! # Example
//!
//! ```no_run
//! use rawfetch_core::http::{
//!     BodyMode, Connect, FrameLimits, HttpConnection, TcpConnector, build_get_request,
//! };
//!
//! # fn example() -> Result<(), rawfetch_core::http::HttpError> {
//! let transport = TcpConnector.connect("example.com", 80)?;
//! let mut connection = HttpConnection::new(transport, FrameLimits::default());
//! let response =
//!     connection.perform_request(&build_get_request("example.com", "/"), BodyMode::Buffered)?;
//! println!("{} {}", response.head().status_code(), response.head().status_text());
//! # Ok(())
//! # }
//! ```

mod connection;
mod error;
mod frame;
mod parser;
mod request;
#[cfg(test)]
pub(crate) mod testing;
mod transport;

pub use connection::{BodyMode, ChunkSink, ConnectionState, HttpConnection, Response};
pub use error::HttpError;
pub use frame::{
    DEFAULT_INITIAL_HEAD_CAPACITY, DEFAULT_MAX_HEAD_SIZE, DEFAULT_STREAM_CHUNK_SIZE, FrameLimits,
    ResponseFrameReader,
};
pub use parser::{HeadLayout, ResponseHead, parse_head};
pub use request::{build_get_request, build_head_request, build_range_request};
pub use transport::{Connect, TcpConnector, TcpTransport, Transport};
