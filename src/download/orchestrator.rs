//! Download orchestration: probe, pick a strategy, fetch with retries.
//!
//! A download starts with a `HEAD` probe for the resource size and range
//! support. Large resources on servers that advertise `Accept-Ranges: bytes`
//! are fetched as a sequence of fixed-size ranges, each retried on its own;
//! everything else is streamed in one `GET`, and a failed attempt restarts
//! from byte zero with a truncated output file.
//!
//! The orchestrator owns at most one connection. Before every request a dead
//! connection is dropped and a fresh one opened, so reconnecting after a
//! transient failure needs no help from callers.

use std::path::Path;
use std::thread;

use tracing::{debug, info, instrument};

use super::config::DownloadConfig;
use super::error::DownloadError;
use super::output::OutputFile;
use super::retry::{classify_error, retry_with};
use crate::http::{
    BodyMode, Connect, HttpConnection, Response, TcpConnector, build_get_request,
    build_head_request, build_range_request,
};
use crate::parser::TargetUrl;

/// How the body is fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// One streamed `GET` for the whole resource.
    WholeBody,
    /// Consecutive `Range` requests of a fixed size.
    Ranged,
}

/// Outcome of a successful download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadReport {
    /// Size announced by the `HEAD` probe.
    pub resource_size: u64,
    /// Strategy that was used.
    pub strategy: Strategy,
    /// Bytes in the output file.
    pub bytes_written: u64,
    /// `GET` requests issued, including retried ones.
    pub requests: u32,
    /// Attempts beyond the first, over all retried actions.
    pub retries: u32,
}

/// What the `HEAD` probe learned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Probe {
    size: u64,
    accepts_ranges: bool,
}

/// Downloads one resource to a file.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use rawfetch_core::download::{DownloadConfig, DownloadOrchestrator};
///
/// # fn example() -> Result<(), rawfetch_core::download::DownloadError> {
/// let mut orchestrator =
///     DownloadOrchestrator::new("http://example.com/big.iso", DownloadConfig::default())?;
/// let report = orchestrator.download(Path::new("big.iso"))?;
/// println!("{} bytes via {:?}", report.bytes_written, report.strategy);
/// # Ok(())
/// # }
/// ```
pub struct DownloadOrchestrator<C: Connect = TcpConnector> {
    target: TargetUrl,
    connector: C,
    config: DownloadConfig,
    connection: Option<HttpConnection<C::Transport>>,
    requests: u32,
    retries: u32,
}

impl<C: Connect> std::fmt::Debug for DownloadOrchestrator<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadOrchestrator")
            .field("target", &self.target)
            .field("config", &self.config)
            .field("connected", &self.connection.is_some())
            .finish_non_exhaustive()
    }
}

impl DownloadOrchestrator<TcpConnector> {
    /// Creates an orchestrator for `url` that connects over plain TCP.
    ///
    /// # Errors
    ///
    /// [`DownloadError::InvalidUrl`] if `url` is not an `http://host[:port]/path`
    /// URL, [`DownloadError::InvalidConfig`] if `config` fails validation.
    pub fn new(url: &str, config: DownloadConfig) -> Result<Self, DownloadError> {
        Self::with_connector(TargetUrl::parse(url)?, TcpConnector, config)
    }
}

impl<C: Connect> DownloadOrchestrator<C> {
    /// Creates an orchestrator that opens connections through `connector`.
    ///
    /// # Errors
    ///
    /// [`DownloadError::InvalidConfig`] if `config` fails validation.
    pub fn with_connector(
        target: TargetUrl,
        connector: C,
        config: DownloadConfig,
    ) -> Result<Self, DownloadError> {
        config.validate()?;
        Ok(Self {
            target,
            connector,
            config,
            connection: None,
            requests: 0,
            retries: 0,
        })
    }

    /// The resource being downloaded.
    #[must_use]
    pub fn target(&self) -> &TargetUrl {
        &self.target
    }

    /// Downloads the resource into `output`, replacing its content.
    ///
    /// # Errors
    ///
    /// The first permanent failure, or the last transient one once an action
    /// has used up its attempts. See [`classify_error`] for which is which.
    #[instrument(skip(self, output), fields(url = %self.target, output = %output.display()))]
    pub fn download(&mut self, output: &Path) -> Result<DownloadReport, DownloadError> {
        self.requests = 0;
        self.retries = 0;

        let probe = self.probe()?;
        let strategy = self.select_strategy(probe);
        info!(
            size = probe.size,
            accepts_ranges = probe.accepts_ranges,
            ?strategy,
            "starting download"
        );

        let bytes_written = match strategy {
            Strategy::Ranged => self.fetch_ranged(probe.size, output)?,
            Strategy::WholeBody => self.fetch_whole(probe.size, output)?,
        };

        info!(
            bytes = bytes_written,
            requests = self.requests,
            retries = self.retries,
            "download completed"
        );
        Ok(DownloadReport {
            resource_size: probe.size,
            strategy,
            bytes_written,
            requests: self.requests,
            retries: self.retries,
        })
    }

    /// `HEAD` for the size and `Accept-Ranges: bytes`.
    fn probe(&mut self) -> Result<Probe, DownloadError> {
        let request = build_head_request(self.target.host(), self.target.path());
        let policy = self.config.retry_policy();

        retry_with(&policy, classify_error, thread::sleep, |attempt| {
            self.note_attempt(attempt);
            let response = self.send(&request, BodyMode::HeadOnly)?;
            self.check_status(&response)?;
            let probe = Probe {
                size: response.content_length(),
                accepts_ranges: response.head().has_header_token("Accept-Ranges", "bytes"),
            };
            debug!(size = probe.size, accepts_ranges = probe.accepts_ranges, "probe done");
            Ok(probe)
        })
    }

    fn select_strategy(&self, probe: Probe) -> Strategy {
        if probe.accepts_ranges && probe.size >= self.config.range_threshold() {
            Strategy::Ranged
        } else {
            Strategy::WholeBody
        }
    }

    /// Fetches `[0, size)` in consecutive ranges, appending each in order.
    fn fetch_ranged(&mut self, size: u64, output: &Path) -> Result<u64, DownloadError> {
        let mut file = OutputFile::create(output)?;
        if size == 0 {
            return file.close();
        }

        let chunk = self.config.range_chunk_size();
        let policy = self.config.retry_policy();
        let mut cursor = 0u64;

        while file.written() < size {
            let first = cursor;
            let last = cursor.saturating_add(chunk - 1).min(size - 1);
            let request = build_range_request(self.target.host(), self.target.path(), first, last);

            retry_with(&policy, classify_error, thread::sleep, |attempt| {
                self.note_attempt(attempt);
                self.requests += 1;
                let expected_bytes = last - first + 1;
                let response = self.send(&request, BodyMode::BufferedExact(expected_bytes))?;
                self.check_status(&response)?;

                let Some(body) = response.body() else {
                    return Err(DownloadError::RangeMismatch {
                        first,
                        last,
                        expected_bytes,
                        actual_bytes: response.content_length(),
                    });
                };
                file.append(body)
            })?;

            debug!(
                path = %file.path().display(),
                first,
                last,
                written = file.written(),
                "range committed"
            );
            cursor = cursor.saturating_add(chunk);
        }

        file.close()
    }

    /// Streams the whole body. Every attempt starts over with a truncated file.
    fn fetch_whole(&mut self, size: u64, output: &Path) -> Result<u64, DownloadError> {
        let request = build_get_request(self.target.host(), self.target.path());
        let policy = self.config.retry_policy();

        retry_with(&policy, classify_error, thread::sleep, |attempt| {
            self.note_attempt(attempt);
            self.requests += 1;
            let mut file = OutputFile::create(output)?;
            let response =
                self.send(&request, BodyMode::Streamed(&mut |chunk| file.append_io(chunk)))?;
            self.check_status(&response)?;

            let written = file.close()?;
            if written != size {
                return Err(DownloadError::integrity(output, size, written));
            }
            Ok(written)
        })
    }

    /// Sends one request on a live connection, reconnecting first if needed.
    fn send(&mut self, request: &str, body: BodyMode<'_>) -> Result<Response, DownloadError> {
        let connection = self.acquire_connection()?;
        Ok(connection.perform_request(request, body)?)
    }

    /// Returns the current connection if it is live, otherwise replaces it.
    fn acquire_connection(&mut self) -> Result<&mut HttpConnection<C::Transport>, DownloadError> {
        let connection = match self.connection.take() {
            Some(live) if live.is_live() => live,
            stale => {
                if stale.is_some() {
                    debug!("dropping dead connection");
                }
                let transport = self
                    .connector
                    .connect(self.target.host(), self.target.port())?;
                debug!(host = self.target.host(), port = self.target.port(), "connection opened");
                HttpConnection::new(transport, self.config.frame_limits())
            }
        };
        Ok(self.connection.insert(connection))
    }

    fn check_status(&self, response: &Response) -> Result<(), DownloadError> {
        let head = response.head();
        if head.is_success() {
            Ok(())
        } else {
            Err(DownloadError::http_status(
                self.target.to_string(),
                head.status_code(),
                head.status_text(),
            ))
        }
    }

    fn note_attempt(&mut self, attempt: u32) {
        if attempt > 1 {
            self.retries += 1;
        }
    }
}
