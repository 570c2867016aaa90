//! HTTP/1.1 request text.

const KEEP_ALIVE: &str = "Connection: keep-alive\r\nKeep-Alive: timeout=60, max=6000\r\n";

fn request_head(method: &str, host: &str, path: &str) -> String {
    format!("{method} {path} HTTP/1.1\r\nHost: {host}\r\n{KEEP_ALIVE}")
}

/// `HEAD` request for `path`.
#[must_use]
pub fn build_head_request(host: &str, path: &str) -> String {
    let mut request = request_head("HEAD", host, path);
    request.push_str("\r\n");
    request
}

/// `GET` request for the whole resource.
#[must_use]
pub fn build_get_request(host: &str, path: &str) -> String {
    let mut request = request_head("GET", host, path);
    request.push_str("\r\n");
    request
}

/// `GET` request for the inclusive byte range `first..=last`.
#[must_use]
pub fn build_range_request(host: &str, path: &str, first: u64, last: u64) -> String {
    let mut request = request_head("GET", host, path);
    request.push_str(&format!("Range: bytes={first}-{last}\r\n\r\n"));
    request
}
