//! Status line and header block parsing.
//!
//! [`parse_head`] is a pure function over a complete header block. It does not
//! copy anything: the result is a [`HeadLayout`] of byte spans into the input.
//! [`ResponseHead`] keeps the raw block and its layout together so the spans
//! stay valid for as long as the head is alive.
//!
//! Field values may carry any byte except CR and LF (obs-text included), so
//! spans are found on raw bytes and text is only decoded when asked for.

use std::borrow::Cow;
use std::ops::Range;

use super::error::HttpError;

const CRLF: &[u8] = b"\r\n";

/// Byte spans describing a parsed header block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadLayout {
    version: Range<usize>,
    status_code: u16,
    status_text: Range<usize>,
    headers: Vec<(Range<usize>, Range<usize>)>,
    body_offset: usize,
}

impl HeadLayout {
    /// Numeric status code.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// Offset of the first byte after the header block.
    #[must_use]
    pub fn body_offset(&self) -> usize {
        self.body_offset
    }

    /// Number of distinct header names retained.
    #[must_use]
    pub fn header_count(&self) -> usize {
        self.headers.len()
    }
}

/// Parses a status line and header block.
///
/// `raw` must contain the whole block up to and including the empty line.
/// Header names keep their received case. When a name repeats (compared
/// ASCII case-insensitively) only the first occurrence is kept.
///
/// # Errors
///
/// [`HttpError::MalformedResponse`] if the status line is missing a field or
/// has a non-numeric code, a header line has no colon, or the block is not
/// terminated by an empty line.
pub fn parse_head(raw: &[u8]) -> Result<HeadLayout, HttpError> {
    let line_end =
        find(raw, 0, CRLF).ok_or_else(|| HttpError::malformed("status line is not terminated"))?;
    let (version, status_code, status_text) = parse_status_line(raw, line_end)?;

    let mut headers: Vec<(Range<usize>, Range<usize>)> = Vec::new();
    let mut pos = line_end + CRLF.len();
    loop {
        let end = find(raw, pos, CRLF)
            .ok_or_else(|| HttpError::malformed("header block is not terminated"))?;
        if end == pos {
            pos += CRLF.len();
            break;
        }

        let colon = find(&raw[..end], pos, b":")
            .ok_or_else(|| HttpError::malformed("header line without ':'"))?;
        let name = trim_span(raw, pos..colon);
        let value = trim_span(raw, colon + 1..end);

        let duplicate = headers
            .iter()
            .any(|(existing, _)| raw[existing.clone()].eq_ignore_ascii_case(&raw[name.clone()]));
        if !duplicate {
            headers.push((name, value));
        }

        pos = end + CRLF.len();
    }

    Ok(HeadLayout {
        version,
        status_code,
        status_text,
        headers,
        body_offset: pos,
    })
}

/// Index of the first `needle` in `raw` at or after `from`.
fn find(raw: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    raw.get(from..)?
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|offset| from + offset)
}

fn parse_status_line(
    raw: &[u8],
    line_end: usize,
) -> Result<(Range<usize>, u16, Range<usize>), HttpError> {
    let line = &raw[..line_end];

    let first_space = find(line, 0, b" ")
        .ok_or_else(|| HttpError::malformed("status line has no status code"))?;
    let rest = first_space + 1;
    let second_space = find(line, rest, b" ")
        .ok_or_else(|| HttpError::malformed("status line has no status text"))?;

    let code = &line[rest..second_space];
    let status_code = std::str::from_utf8(code)
        .ok()
        .and_then(|code| code.parse::<u16>().ok())
        .ok_or_else(|| {
            HttpError::malformed(format!(
                "status code '{}' is not numeric",
                String::from_utf8_lossy(code)
            ))
        })?;

    Ok((0..first_space, status_code, second_space + 1..line_end))
}

fn trim_span(raw: &[u8], span: Range<usize>) -> Range<usize> {
    let slice = &raw[span.clone()];
    let leading = slice.iter().take_while(|b| b.is_ascii_whitespace()).count();
    let trailing = slice[leading..]
        .iter()
        .rev()
        .take_while(|b| b.is_ascii_whitespace())
        .count();
    span.start + leading..span.end - trailing
}

/// A parsed response head that owns its raw bytes.
#[derive(Debug, Clone)]
pub struct ResponseHead {
    raw: Vec<u8>,
    layout: HeadLayout,
}

impl ResponseHead {
    /// Parses `raw` and keeps it alongside the resulting layout.
    ///
    /// # Errors
    ///
    /// Same as [`parse_head`].
    pub fn parse(raw: Vec<u8>) -> Result<Self, HttpError> {
        let layout = parse_head(&raw)?;
        Ok(Self { raw, layout })
    }

    fn bytes(&self, span: &Range<usize>) -> &[u8] {
        &self.raw[span.clone()]
    }

    /// Decodes a span, replacing bytes that are not UTF-8. Borrows when the
    /// span is already valid.
    fn view(&self, span: &Range<usize>) -> Cow<'_, str> {
        String::from_utf8_lossy(self.bytes(span))
    }

    fn find_header(&self, name: &str) -> Option<&Range<usize>> {
        self.layout
            .headers
            .iter()
            .find(|(key, _)| self.bytes(key).eq_ignore_ascii_case(name.as_bytes()))
            .map(|(_, value)| value)
    }

    /// Protocol version from the status line, e.g. `HTTP/1.1`.
    #[must_use]
    pub fn version(&self) -> Cow<'_, str> {
        self.view(&self.layout.version)
    }

    /// Numeric status code.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.layout.status_code
    }

    /// Reason phrase from the status line.
    #[must_use]
    pub fn status_text(&self) -> Cow<'_, str> {
        self.view(&self.layout.status_text)
    }

    /// Whether the status code is in the 2xx class.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.layout.status_code / 100 == 2
    }

    /// Value of the first header called `name` (ASCII case-insensitive).
    /// Bytes that are not UTF-8 are replaced; see [`header_bytes`](Self::header_bytes).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<Cow<'_, str>> {
        self.find_header(name).map(|value| self.view(value))
    }

    /// Raw value of the first header called `name`.
    #[must_use]
    pub fn header_bytes(&self, name: &str) -> Option<&[u8]> {
        self.find_header(name).map(|value| self.bytes(value))
    }

    /// Iterates headers in received order.
    pub fn headers(&self) -> impl Iterator<Item = (Cow<'_, str>, Cow<'_, str>)> {
        self.layout
            .headers
            .iter()
            .map(|(key, value)| (self.view(key), self.view(value)))
    }

    /// Whether header `name` lists `token` among its comma or space separated
    /// values, compared ASCII case-insensitively.
    #[must_use]
    pub fn has_header_token(&self, name: &str, token: &str) -> bool {
        self.header_bytes(name).is_some_and(|value| {
            value
                .split(|b| *b == b',' || b.is_ascii_whitespace())
                .any(|part| part.eq_ignore_ascii_case(token.as_bytes()))
        })
    }

    /// Declared body length.
    ///
    /// Returns `Ok(None)` when the header is absent.
    ///
    /// # Errors
    ///
    /// [`HttpError::MalformedResponse`] when the value is not a decimal integer.
    pub fn content_length(&self) -> Result<Option<u64>, HttpError> {
        self.header_bytes("Content-Length")
            .map(|value| {
                std::str::from_utf8(value)
                    .ok()
                    .and_then(|text| text.parse::<u64>().ok())
                    .ok_or_else(|| {
                        HttpError::malformed(format!(
                            "invalid Content-Length '{}'",
                            String::from_utf8_lossy(value)
                        ))
                    })
            })
            .transpose()
    }

    /// The raw header block as received.
    #[must_use]
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// The span layout of the raw block.
    #[must_use]
    pub fn layout(&self) -> &HeadLayout {
        &self.layout
    }
}
