//! Response framing: splitting the socket byte stream into head and body.
//!
//! The head is assembled without knowing its length up front. Each pass peeks
//! whatever is available into the free tail of a growable buffer, looks for
//! the `CRLF CRLF` terminator, and then consumes only as many bytes as belong
//! to the head. The socket is left positioned at the first body byte.
//!
//! The body is then read by `Content-Length`, either into one buffer or in
//! bounded chunks handed to a caller-supplied sink.

use tracing::{debug, trace};

use super::error::HttpError;
use super::transport::Transport;

const HEAD_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Initial head buffer capacity (10 KiB).
pub const DEFAULT_INITIAL_HEAD_CAPACITY: usize = 10 * 1024;

/// Largest head buffer the reader will grow to (1 MiB).
pub const DEFAULT_MAX_HEAD_SIZE: usize = 1024 * 1024;

/// Working buffer size for streamed bodies (8 MiB).
pub const DEFAULT_STREAM_CHUNK_SIZE: usize = 8 * 1024 * 1024;

/// Buffer sizing for [`ResponseFrameReader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLimits {
    /// Starting size of the head buffer.
    pub initial_head_capacity: usize,
    /// The head buffer doubles on exhaustion but never beyond this.
    pub max_head_size: usize,
    /// Largest chunk delivered to a streaming sink.
    pub stream_chunk_size: usize,
}

impl Default for FrameLimits {
    fn default() -> Self {
        Self {
            initial_head_capacity: DEFAULT_INITIAL_HEAD_CAPACITY,
            max_head_size: DEFAULT_MAX_HEAD_SIZE,
            stream_chunk_size: DEFAULT_STREAM_CHUNK_SIZE,
        }
    }
}

/// Reads one response frame from a transport.
#[derive(Debug)]
pub struct ResponseFrameReader<'a, T: Transport> {
    transport: &'a mut T,
    limits: FrameLimits,
}

impl<'a, T: Transport> ResponseFrameReader<'a, T> {
    /// Creates a reader over `transport`.
    pub fn new(transport: &'a mut T, limits: FrameLimits) -> Self {
        Self { transport, limits }
    }

    /// Consumes exactly the status line and header block, returning them.
    ///
    /// # Errors
    ///
    /// [`HttpError::Closed`] if the peer goes away first,
    /// [`HttpError::HeadTooLarge`] if the block does not fit in
    /// [`FrameLimits::max_head_size`], plus any transport error.
    pub fn read_head(&mut self) -> Result<Vec<u8>, HttpError> {
        let mut buffer = vec![0u8; self.limits.initial_head_capacity.max(HEAD_TERMINATOR.len())];
        let mut filled = 0;

        loop {
            let peeked = self.transport.peek(&mut buffer[filled..])?;
            let window_start = filled;
            let window_end = filled + peeked;

            let head_end = find_head_end(&buffer[..window_end], window_start);
            let needed = head_end.map_or(peeked, |end| end - window_start);
            trace!(window_start, peeked, ?head_end, "scanned head window");

            self.receive_exact(&mut buffer[window_start..window_start + needed])?;

            if let Some(end) = head_end {
                buffer.truncate(end);
                debug!(head_bytes = end, "response head assembled");
                return Ok(buffer);
            }

            filled = window_end;
            if filled == buffer.len() {
                let grown = buffer.len() * 2;
                if grown > self.limits.max_head_size {
                    return Err(HttpError::HeadTooLarge {
                        limit: self.limits.max_head_size,
                    });
                }
                trace!(from = buffer.len(), to = grown, "growing head buffer");
                buffer.resize(grown, 0);
            }
        }
    }

    /// Reads exactly `content_length` body bytes into one buffer.
    ///
    /// # Errors
    ///
    /// [`HttpError::Closed`] if the peer closes before the body is complete,
    /// plus any transport error.
    pub fn read_body(&mut self, content_length: usize) -> Result<Vec<u8>, HttpError> {
        let mut body = vec![0u8; content_length];
        self.receive_exact(&mut body)?;
        debug!(body_bytes = content_length, "response body read");
        Ok(body)
    }

    /// Reads `content_length` body bytes, handing them to `sink` in chunks of
    /// at most [`FrameLimits::stream_chunk_size`]. Chunk contents are only valid
    /// for the duration of the call. Returns the number of bytes delivered.
    ///
    /// # Errors
    ///
    /// [`HttpError::Closed`] if the peer closes early, [`HttpError::Sink`] if
    /// the sink rejects a chunk, plus any transport error.
    pub fn stream_body(
        &mut self,
        content_length: u64,
        sink: &mut dyn FnMut(&[u8]) -> std::io::Result<()>,
    ) -> Result<u64, HttpError> {
        if content_length == 0 {
            return Ok(0);
        }

        let capacity = usize::try_from(content_length)
            .map_or(self.limits.stream_chunk_size, |len| {
                len.min(self.limits.stream_chunk_size)
            })
            .max(1);
        let mut chunk = vec![0u8; capacity];
        let mut fill = 0;
        let mut total: u64 = 0;

        while total < content_length {
            let remaining = usize::try_from(content_length - total).unwrap_or(usize::MAX);
            let limit = (chunk.len() - fill).min(remaining);
            let received = self.transport.receive(&mut chunk[fill..fill + limit])?;
            fill += received;
            total += received as u64;

            if fill == chunk.len() || total == content_length {
                sink(&chunk[..fill]).map_err(|source| HttpError::Sink { source })?;
                trace!(chunk_bytes = fill, total, "delivered body chunk");
                fill = 0;
            }
        }

        debug!(body_bytes = total, "response body streamed");
        Ok(total)
    }

    fn receive_exact(&mut self, buf: &mut [u8]) -> Result<(), HttpError> {
        let mut done = 0;
        while done < buf.len() {
            done += self.transport.receive(&mut buf[done..])?;
        }
        Ok(())
    }
}

/// Finds the end of the head (index just past `CRLF CRLF`) in `buf`, scanning
/// the window that starts at `window_start`.
///
/// The scan starts three bytes before the window so a terminator split across
/// two peeks is still found.
fn find_head_end(buf: &[u8], window_start: usize) -> Option<usize> {
    let scan_from = window_start.saturating_sub(HEAD_TERMINATOR.len() - 1);
    buf[scan_from..]
        .windows(HEAD_TERMINATOR.len())
        .position(|w| w == HEAD_TERMINATOR)
        .map(|pos| scan_from + pos + HEAD_TERMINATOR.len())
}
