//! Loopback HTTP/1.1 server for integration tests.
//!
//! The server accepts connections on `127.0.0.1` and answers each request
//! through a handler closure. Every request is recorded together with the
//! connection it arrived on, so tests can assert on request order, `Range`
//! headers and reconnects.

#![allow(dead_code)]

use std::io::{BufRead, BufReader, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

/// A request as seen by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    /// Position among all requests the server received, from 0.
    pub index: usize,
    /// Accepted connection the request arrived on, from 0.
    pub connection: usize,
    pub method: String,
    pub path: String,
    pub host: Option<String>,
    /// Parsed `Range: bytes=first-last`.
    pub range: Option<(u64, u64)>,
}

/// What the server does with a request.
#[derive(Debug)]
pub enum Reply {
    /// Write the bytes and keep the connection open.
    Send(Vec<u8>),
    /// Write the bytes, then shut the connection down.
    SendAndClose(Vec<u8>),
}

type Handler = dyn Fn(&RecordedRequest) -> Reply + Send + Sync;

/// A running loopback server. The listener thread lives until the test
/// process exits.
pub struct TestServer {
    port: u16,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl TestServer {
    /// Starts a server answering every request with `handler`.
    pub fn start<F>(handler: F) -> Self
    where
        F: Fn(&RecordedRequest) -> Reply + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback listener");
        let port = listener.local_addr().expect("listener address").port();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let handler: Arc<Handler> = Arc::new(handler);

        let recorded = Arc::clone(&requests);
        thread::spawn(move || {
            for (connection, stream) in listener.incoming().enumerate() {
                let Ok(stream) = stream else { continue };
                let recorded = Arc::clone(&recorded);
                let handler = Arc::clone(&handler);
                thread::spawn(move || serve(stream, connection, &recorded, handler.as_ref()));
            }
        });

        Self { port, requests }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// `http://127.0.0.1:<port><path>`
    pub fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{path}", self.port)
    }

    /// Requests received so far, in arrival order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("request log lock").clone()
    }

    /// Requests with the given method, in arrival order.
    pub fn requests_with_method(&self, method: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method)
            .collect()
    }
}

fn serve(
    stream: TcpStream,
    connection: usize,
    recorded: &Mutex<Vec<RecordedRequest>>,
    handler: &Handler,
) {
    let Ok(read_half) = stream.try_clone() else {
        return;
    };
    let mut reader = BufReader::new(read_half);
    let mut writer = stream;

    loop {
        let Some(mut request) = read_request(&mut reader, connection) else {
            return;
        };
        {
            let mut log = recorded.lock().expect("request log lock");
            request.index = log.len();
            log.push(request.clone());
        }

        match handler(&request) {
            Reply::Send(bytes) => {
                if writer.write_all(&bytes).and_then(|()| writer.flush()).is_err() {
                    return;
                }
            }
            Reply::SendAndClose(bytes) => {
                let _ = writer.write_all(&bytes);
                let _ = writer.flush();
                let _ = writer.shutdown(Shutdown::Both);
                return;
            }
        }
    }
}

fn read_request(reader: &mut BufReader<TcpStream>, connection: usize) -> Option<RecordedRequest> {
    let mut line = String::new();
    if reader.read_line(&mut line).ok()? == 0 {
        return None;
    }
    let mut parts = line.trim_end().split(' ');
    let method = parts.next()?.to_string();
    let path = parts.next()?.to_string();

    let mut host = None;
    let mut range = None;
    loop {
        let mut header = String::new();
        if reader.read_line(&mut header).ok()? == 0 {
            return None;
        }
        let header = header.trim_end();
        if header.is_empty() {
            break;
        }
        let Some((name, value)) = header.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if name.eq_ignore_ascii_case("host") {
            host = Some(value.to_string());
        } else if name.eq_ignore_ascii_case("range") {
            range = parse_range(value);
        }
    }

    Some(RecordedRequest {
        index: 0,
        connection,
        method,
        path,
        host,
        range,
    })
}

fn parse_range(value: &str) -> Option<(u64, u64)> {
    let (first, last) = value.strip_prefix("bytes=")?.split_once('-')?;
    Some((first.parse().ok()?, last.parse().ok()?))
}

/// Serializes a response with the given status line tail, headers and body.
pub fn response(status: &str, headers: &[String], body: &[u8]) -> Vec<u8> {
    let mut raw = format!("HTTP/1.1 {status}\r\n");
    for header in headers {
        raw.push_str(header);
        raw.push_str("\r\n");
    }
    raw.push_str("\r\n");
    let mut raw = raw.into_bytes();
    raw.extend_from_slice(body);
    raw
}

/// `200 OK` with `Content-Length` and the body.
pub fn ok(body: &[u8]) -> Vec<u8> {
    response("200 OK", &[format!("Content-Length: {}", body.len())], body)
}

/// `206 Partial Content` with `Content-Length` and the body.
pub fn partial(body: &[u8]) -> Vec<u8> {
    response(
        "206 Partial Content",
        &[format!("Content-Length: {}", body.len())],
        body,
    )
}

/// Head-only `200 OK` answer to a probe.
pub fn probe(size: u64, accept_ranges: bool) -> Vec<u8> {
    let mut headers = vec![format!("Content-Length: {size}")];
    if accept_ranges {
        headers.push("Accept-Ranges: bytes".to_string());
    }
    response("200 OK", &headers, b"")
}

/// Deterministic content for byte offsets `first..=last`.
pub fn pattern(first: u64, last: u64) -> Vec<u8> {
    (first..=last).map(|i| (i % 251) as u8).collect()
}
