//! One request/response cycle at a time over a single transport.
//!
//! A connection is either [`ConnectionState::Live`] or
//! [`ConnectionState::Dead`], and only ever moves from live to dead: on any
//! failure during an exchange (the stream position is no longer trustworthy),
//! when the server announces `Connection: close`, or when a body is left
//! unread on the socket. A dead connection is
//! never reused; the owner opens a new one.

use tracing::{debug, instrument};

use super::error::HttpError;
use super::frame::{FrameLimits, ResponseFrameReader};
use super::parser::ResponseHead;
use super::transport::Transport;

/// Consumer for streamed body chunks.
pub type ChunkSink<'s> = &'s mut dyn FnMut(&[u8]) -> std::io::Result<()>;

/// How much of the response body the caller wants.
pub enum BodyMode<'s> {
    /// Read the head only (for `HEAD` requests).
    HeadOnly,
    /// Read the whole body into memory.
    Buffered,
    /// Read the whole body into memory only if the declared length is exactly
    /// this many bytes. Otherwise the body is left unread, the response has no
    /// body and the connection is dead.
    BufferedExact(u64),
    /// Hand the body to a sink in bounded chunks.
    Streamed(ChunkSink<'s>),
}

impl std::fmt::Debug for BodyMode<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HeadOnly => f.write_str("HeadOnly"),
            Self::Buffered => f.write_str("Buffered"),
            Self::BufferedExact(len) => f.debug_tuple("BufferedExact").field(len).finish(),
            Self::Streamed(_) => f.write_str("Streamed"),
        }
    }
}

/// Lifecycle of an [`HttpConnection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Usable for another request.
    Live,
    /// Permanently unusable.
    Dead,
}

/// A parsed response and, in buffered mode, its body.
#[derive(Debug)]
pub struct Response {
    head: ResponseHead,
    content_length: u64,
    body: Option<Vec<u8>>,
}

impl Response {
    /// The parsed status line and headers.
    #[must_use]
    pub fn head(&self) -> &ResponseHead {
        &self.head
    }

    /// Declared `Content-Length`.
    #[must_use]
    pub fn content_length(&self) -> u64 {
        self.content_length
    }

    /// The body, present only when read in [`BodyMode::Buffered`].
    #[must_use]
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }
}

/// An HTTP/1.1 connection over a [`Transport`].
#[derive(Debug)]
pub struct HttpConnection<T: Transport> {
    transport: T,
    state: ConnectionState,
    limits: FrameLimits,
}

impl<T: Transport> HttpConnection<T> {
    /// Wraps a connected transport.
    pub fn new(transport: T, limits: FrameLimits) -> Self {
        Self {
            transport,
            state: ConnectionState::Live,
            limits,
        }
    }

    /// Current lifecycle state. A dead transport makes the connection dead.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        if self.state == ConnectionState::Live && self.transport.is_live() {
            ConnectionState::Live
        } else {
            ConnectionState::Dead
        }
    }

    /// Shorthand for `state() == ConnectionState::Live`.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.state() == ConnectionState::Live
    }

    fn mark_dead(&mut self) {
        self.state = ConnectionState::Dead;
        self.transport.close();
    }

    /// Sends `request` verbatim and reads the response.
    ///
    /// The response must declare `Content-Length`; the body is then read
    /// according to `body`.
    ///
    /// # Errors
    ///
    /// [`HttpError::StaleConnection`] if the connection is already dead,
    /// [`HttpError::MissingContentLength`] if the response has no length,
    /// plus any transport, framing or parse error. The connection is dead
    /// after any error.
    #[instrument(level = "debug", skip_all, fields(request = request.lines().next().unwrap_or_default()))]
    pub fn perform_request(
        &mut self,
        request: &str,
        body: BodyMode<'_>,
    ) -> Result<Response, HttpError> {
        if !self.is_live() {
            return Err(HttpError::StaleConnection);
        }

        let result = self.exchange(request, body);
        match &result {
            Err(error) => {
                debug!(%error, "exchange failed, connection is dead");
                self.mark_dead();
            }
            Ok(response) if response.head.has_header_token("Connection", "close") => {
                debug!("server closes the connection");
                self.mark_dead();
            }
            Ok(_) => {}
        }
        result
    }

    fn exchange(&mut self, request: &str, body: BodyMode<'_>) -> Result<Response, HttpError> {
        self.transport.send(request.as_bytes())?;

        let mut reader = ResponseFrameReader::new(&mut self.transport, self.limits);
        let head = ResponseHead::parse(reader.read_head()?)?;
        debug!(
            status = head.status_code(),
            reason = %head.status_text(),
            "response head received"
        );

        let content_length = head
            .content_length()?
            .ok_or(HttpError::MissingContentLength)?;

        let mut body_unread = false;
        let body = match body {
            BodyMode::HeadOnly => None,
            BodyMode::BufferedExact(expected) if expected != content_length => {
                debug!(expected, content_length, "declared length differs, body left unread");
                body_unread = true;
                None
            }
            BodyMode::Buffered | BodyMode::BufferedExact(_) => {
                let len = usize::try_from(content_length).map_err(|_| {
                    HttpError::malformed(format!("Content-Length {content_length} does not fit in memory"))
                })?;
                Some(reader.read_body(len)?)
            }
            BodyMode::Streamed(sink) => {
                reader.stream_body(content_length, sink)?;
                None
            }
        };

        if body_unread {
            self.mark_dead();
        }

        Ok(Response {
            head,
            content_length,
            body,
        })
    }
}
