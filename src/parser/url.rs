//! Target URL validation: `scheme://host[:port]/path`.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::error::ParseError;

/// Port used when the URL does not name one.
pub const DEFAULT_PORT: u16 = 80;

/// Captures scheme, host, optional port and path (which must start with `/`).
#[allow(clippy::expect_used)]
static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([^:/?#]+)://([^:/?#]+)(?::([^:/?#]*))?(/.*)$").expect("URL regex is valid") // Static pattern, safe to panic
});

/// Host, port and path of the resource to download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetUrl {
    host: String,
    port: u16,
    path: String,
}

impl TargetUrl {
    /// Parses and validates `url`.
    ///
    /// # Errors
    ///
    /// [`ParseError::InvalidUrl`] if the pattern does not match or the port is
    /// not a non-zero `u16`, [`ParseError::UnsupportedScheme`] for anything but
    /// `http`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rawfetch_core::parser::TargetUrl;
    ///
    /// let url = TargetUrl::parse("http://example.com/files/data.bin").unwrap();
    /// assert_eq!(url.host(), "example.com");
    /// assert_eq!(url.port(), 80);
    /// assert_eq!(url.path(), "/files/data.bin");
    /// ```
    pub fn parse(url: &str) -> Result<Self, ParseError> {
        let captures = URL_PATTERN
            .captures(url.trim())
            .ok_or_else(|| ParseError::malformed(url))?;

        let scheme = &captures[1];
        if !scheme.eq_ignore_ascii_case("http") {
            return Err(ParseError::unsupported_scheme(scheme));
        }

        let port = match captures.get(3) {
            None => DEFAULT_PORT,
            Some(port) => port
                .as_str()
                .parse::<u16>()
                .ok()
                .filter(|p| *p != 0)
                .ok_or_else(|| ParseError::bad_port(url, port.as_str()))?,
        };

        let target = Self {
            host: captures[2].to_string(),
            port,
            path: captures[4].to_string(),
        };
        debug!(%target, "parsed target URL");
        Ok(target)
    }

    /// Host name or address literal.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// TCP port, 80 unless given.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Request path, always starting with `/`.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for TargetUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "http://{}:{}{}", self.host, self.port, self.path)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_target_url_default_port() {
        let url = TargetUrl::parse("http://example.com/a/b.iso").unwrap();
        assert_eq!(url.host(), "example.com");
        assert_eq!(url.port(), 80);
        assert_eq!(url.path(), "/a/b.iso");
    }

    #[test]
    fn test_target_url_explicit_port() {
        let url = TargetUrl::parse("http://127.0.0.1:8080/file").unwrap();
        assert_eq!(url.host(), "127.0.0.1");
        assert_eq!(url.port(), 8080);
        assert_eq!(url.path(), "/file");
    }

    #[test]
    fn test_target_url_root_path_and_query() {
        assert_eq!(TargetUrl::parse("http://h/").unwrap().path(), "/");
        assert_eq!(
            TargetUrl::parse("http://h/get?x=1").unwrap().path(),
            "/get?x=1"
        );
    }

    #[test]
    fn test_target_url_scheme_is_case_insensitive() {
        assert!(TargetUrl::parse("HTTP://example.com/x").is_ok());
    }

    #[test]
    fn test_target_url_rejects_https() {
        let err = TargetUrl::parse("https://example.com/x").unwrap_err();
        assert_eq!(err, ParseError::unsupported_scheme("https"));
    }

    #[test]
    fn test_target_url_rejects_missing_path() {
        let err = TargetUrl::parse("http://example.com").unwrap_err();
        assert!(matches!(err, ParseError::InvalidUrl { .. }));
    }

    #[test]
    fn test_target_url_rejects_garbage() {
        for input in ["", "example.com/x", "://h/x", "http:///x"] {
            let err = TargetUrl::parse(input).unwrap_err();
            assert!(matches!(err, ParseError::InvalidUrl { .. }), "{input}");
        }
    }

    #[test]
    fn test_target_url_rejects_bad_ports() {
        for input in ["http://h:0/x", "http://h:70000/x", "http://h:abc/x", "http://h:/x"] {
            let err = TargetUrl::parse(input).unwrap_err();
            assert!(matches!(err, ParseError::InvalidUrl { .. }), "{input}");
        }
    }

    #[test]
    fn test_target_url_display() {
        let url = TargetUrl::parse("http://h/x").unwrap();
        assert_eq!(url.to_string(), "http://h:80/x");
    }
}
