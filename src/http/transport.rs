//! Blocking byte transport over a connected TCP socket.
//!
//! [`Transport`] is the seam between the HTTP framing code and the socket:
//! the frame reader only ever needs `send`, `receive` and a non-destructive
//! `peek`. A zero-byte read or peek means the peer went away and is reported
//! as [`HttpError::Closed`]. Once a transport fails or is closed it stays
//! dead; callers replace it through a [`Connect`] implementation instead of
//! retrying on it.

use std::io::{ErrorKind, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};

use tracing::{debug, instrument, trace, warn};

use super::error::HttpError;

/// Byte-level operations the HTTP layer needs from a connected socket.
pub trait Transport {
    /// Sends every byte of `bytes`, looping over partial writes.
    ///
    /// # Errors
    ///
    /// [`HttpError::Send`] if the socket rejects the write,
    /// [`HttpError::StaleConnection`] if the transport is already dead.
    fn send(&mut self, bytes: &[u8]) -> Result<(), HttpError>;

    /// Reads at most `buf.len()` bytes, consuming them. Returns the number of
    /// bytes read, which is never zero.
    ///
    /// # Errors
    ///
    /// [`HttpError::Closed`] on peer close, [`HttpError::Receive`] on a socket
    /// error, [`HttpError::StaleConnection`] if already dead.
    fn receive(&mut self, buf: &mut [u8]) -> Result<usize, HttpError>;

    /// Like [`Transport::receive`] but leaves the bytes in the socket.
    ///
    /// # Errors
    ///
    /// Same as [`Transport::receive`].
    fn peek(&mut self, buf: &mut [u8]) -> Result<usize, HttpError>;

    /// Releases the socket. The transport is dead afterwards.
    fn close(&mut self);

    /// Whether the transport can still be used.
    fn is_live(&self) -> bool;
}

/// Opens transports to a host and port.
pub trait Connect {
    /// Transport produced by this connector.
    type Transport: Transport;

    /// Opens a fresh connection.
    ///
    /// # Errors
    ///
    /// [`HttpError::Resolve`] or [`HttpError::Connect`] when no connection
    /// can be established.
    fn connect(&self, host: &str, port: u16) -> Result<Self::Transport, HttpError>;
}

/// [`Transport`] backed by a [`TcpStream`].
#[derive(Debug)]
pub struct TcpTransport {
    stream: Option<TcpStream>,
    peer: String,
}

impl TcpTransport {
    /// Wraps an already connected stream.
    #[must_use]
    pub fn from_stream(stream: TcpStream) -> Self {
        let peer = stream
            .peer_addr()
            .map_or_else(|_| "<unknown>".to_string(), |addr| addr.to_string());
        Self {
            stream: Some(stream),
            peer,
        }
    }

    /// Address of the remote end, for diagnostics.
    #[must_use]
    pub fn peer(&self) -> &str {
        &self.peer
    }

    fn stream(&mut self) -> Result<&mut TcpStream, HttpError> {
        self.stream.as_mut().ok_or(HttpError::StaleConnection)
    }

    fn fail(&mut self, error: HttpError) -> HttpError {
        debug!(peer = %self.peer, error = %error, "transport failed, closing");
        self.close();
        error
    }

    fn read_with(&mut self, buf: &mut [u8], peek: bool) -> Result<usize, HttpError> {
        let stream = self.stream()?;
        let result = loop {
            let attempt = if peek {
                stream.peek(buf)
            } else {
                stream.read(buf)
            };
            match attempt {
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                other => break other,
            }
        };

        match result {
            Ok(0) if !buf.is_empty() => Err(self.fail(HttpError::Closed)),
            Ok(n) => {
                trace!(peer = %self.peer, bytes = n, peek, "read from socket");
                Ok(n)
            }
            Err(source) => Err(self.fail(HttpError::Receive { source })),
        }
    }
}

impl Transport for TcpTransport {
    fn send(&mut self, bytes: &[u8]) -> Result<(), HttpError> {
        let stream = self.stream()?;
        let mut sent = 0;
        let mut failure = None;
        while sent < bytes.len() {
            match stream.write(&bytes[sent..]) {
                Ok(0) => {
                    failure = Some(std::io::Error::new(
                        ErrorKind::WriteZero,
                        "socket accepted zero bytes",
                    ));
                    break;
                }
                Ok(n) => sent += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }

        match failure {
            Some(source) => Err(self.fail(HttpError::Send { source })),
            None => {
                trace!(peer = %self.peer, bytes = sent, "sent to socket");
                Ok(())
            }
        }
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<usize, HttpError> {
        self.read_with(buf, false)
    }

    fn peek(&mut self, buf: &mut [u8]) -> Result<usize, HttpError> {
        self.read_with(buf, true)
    }

    fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            // The peer may already be gone; dropping the stream releases it either way.
            let _ = stream.shutdown(Shutdown::Both);
        }
    }

    fn is_live(&self) -> bool {
        self.stream.is_some()
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        self.close();
    }
}

/// Connects plain TCP sockets, trying every resolved address in order.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl Connect for TcpConnector {
    type Transport = TcpTransport;

    #[instrument(level = "debug", skip(self))]
    fn connect(&self, host: &str, port: u16) -> Result<TcpTransport, HttpError> {
        let addrs = (host, port)
            .to_socket_addrs()
            .map_err(|source| HttpError::Resolve {
                host: host.to_string(),
                port,
                source,
            })?;

        let mut last_error = None;
        for addr in addrs {
            match TcpStream::connect(addr) {
                Ok(stream) => {
                    debug!(%addr, "connected");
                    return Ok(TcpTransport::from_stream(stream));
                }
                Err(e) => {
                    warn!(%addr, error = %e, "connect attempt failed");
                    last_error = Some(e);
                }
            }
        }

        Err(HttpError::Connect {
            host: host.to_string(),
            port,
            source: last_error,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::net::TcpListener;
    use std::thread;

    use super::*;

    fn loopback_pair() -> (TcpTransport, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let accept = thread::spawn(move || listener.accept().unwrap().0);
        let transport = TcpConnector.connect("127.0.0.1", port).unwrap();
        (transport, accept.join().unwrap())
    }

    #[test]
    fn test_tcp_transport_peek_does_not_consume() {
        let (mut transport, mut server) = loopback_pair();
        server.write_all(b"hello").unwrap();

        let mut buf = [0u8; 5];
        let mut peeked = 0;
        while peeked < 5 {
            peeked = transport.peek(&mut buf).unwrap();
        }
        assert_eq!(&buf, b"hello");

        let mut read = [0u8; 5];
        let n = transport.receive(&mut read).unwrap();
        assert_eq!(&read[..n], &b"hello"[..n]);
    }

    #[test]
    fn test_tcp_transport_send_reaches_peer() {
        let (mut transport, mut server) = loopback_pair();
        transport.send(b"GET / HTTP/1.1\r\n\r\n").unwrap();

        let mut buf = [0u8; 18];
        server.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"GET / HTTP/1.1\r\n\r\n");
    }

    #[test]
    fn test_tcp_transport_peer_close_is_closed_and_dead() {
        let (mut transport, server) = loopback_pair();
        drop(server);

        let mut buf = [0u8; 8];
        let err = transport.receive(&mut buf).unwrap_err();
        assert!(matches!(err, HttpError::Closed), "got: {err:?}");
        assert!(!transport.is_live());
    }

    #[test]
    fn test_tcp_transport_closed_transport_is_stale() {
        let (mut transport, _server) = loopback_pair();
        transport.close();
        assert!(!transport.is_live());

        let err = transport.send(b"x").unwrap_err();
        assert!(matches!(err, HttpError::StaleConnection));
        let mut buf = [0u8; 1];
        let err = transport.peek(&mut buf).unwrap_err();
        assert!(matches!(err, HttpError::StaleConnection));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_tcp_connector_refused_port_is_connect_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = TcpConnector.connect("127.0.0.1", port).unwrap_err();
        assert!(matches!(err, HttpError::Connect { .. }), "got: {err:?}");
        assert!(!err.is_retryable());
    }
}
