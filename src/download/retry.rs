//! Bounded retry with a fixed pause for transient download failures.
//!
//! This module provides the [`RetryPolicy`] and [`FailureType`] types for
//! classifying download errors and determining retry behavior, and
//! [`retry_with`], the wrapper that runs an action under a policy.
//!
//! # Overview
//!
//! When an attempt fails, the error is classified into a [`FailureType`]:
//! - [`FailureType::Transient`] - the connection dropped or a socket call
//!   failed; a fresh connection may succeed
//! - [`FailureType::Permanent`] - the server or the local file system gave an
//!   answer that will not change on retry
//!
//! The [`RetryPolicy`] then decides whether to try again based on the failure
//! type and attempt count. The pause between attempts is fixed.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use rawfetch_core::download::{DownloadError, FailureType, RetryPolicy, classify_error, retry_with};
//! use rawfetch_core::http::HttpError;
//!
//! let policy = RetryPolicy::new(5, Duration::ZERO);
//! let mut calls = 0;
//! let result: Result<u32, DownloadError> = retry_with(
//!     &policy,
//!     classify_error,
//!     |_| {},
//!     |attempt| {
//!         calls += 1;
//!         if attempt < 3 { Err(HttpError::Closed.into()) } else { Ok(attempt) }
//!     },
//! );
//! assert_eq!(result.unwrap(), 3);
//! assert_eq!(calls, 3);
//! ```

use std::fmt::Display;
use std::time::Duration;

use tracing::{debug, instrument, warn};

use super::DownloadError;
use super::constants::{DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY};

/// Classification of download failure types.
///
/// Used to determine whether a failed attempt should be retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureType {
    /// Temporary failure that may succeed on retry.
    ///
    /// Examples: peer closed the socket, send/receive error, stale connection.
    Transient,

    /// Permanent failure that won't succeed regardless of retries.
    ///
    /// Examples: 404 Not Found, malformed response, missing Content-Length,
    /// invalid URL, output file not writable.
    Permanent,
}

/// Decision on whether to retry a failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry after the specified delay.
    Retry {
        /// How long to wait before retrying.
        delay: Duration,
        /// Which attempt number this will be (1-indexed, so first retry is attempt 2).
        attempt: u32,
    },

    /// Do not retry.
    DoNotRetry {
        /// Human-readable reason why retry is not attempted.
        reason: String,
    },
}

/// Configuration for bounded retry with a fixed delay.
///
/// # Default Values
///
/// - `max_attempts`: 5
/// - `delay`: 2 seconds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial attempt).
    max_attempts: u32,

    /// Pause before every retry.
    delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Creates a new retry policy.
    ///
    /// # Arguments
    ///
    /// * `max_attempts` - Maximum attempts including initial (raised to 1 if 0)
    /// * `delay` - Pause before each retry
    #[must_use]
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Creates a policy with a custom `max_attempts`, using the default delay.
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self::new(max_attempts, DEFAULT_RETRY_DELAY)
    }

    /// Returns the maximum number of attempts configured.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the pause between attempts.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Determines whether to retry after attempt number `attempt` (1-indexed)
    /// failed with a failure of type `failure_type`.
    #[instrument(level = "trace", skip(self), fields(max_attempts = self.max_attempts))]
    pub fn should_retry(&self, failure_type: FailureType, attempt: u32) -> RetryDecision {
        if failure_type == FailureType::Permanent {
            return RetryDecision::DoNotRetry {
                reason: "permanent failure - retry would not help".to_string(),
            };
        }

        if attempt >= self.max_attempts {
            debug!(attempt, max = self.max_attempts, "max attempts reached");
            return RetryDecision::DoNotRetry {
                reason: format!("max attempts ({}) exhausted", self.max_attempts),
            };
        }

        RetryDecision::Retry {
            delay: self.delay,
            attempt: attempt + 1,
        }
    }
}

/// Runs `action` until it succeeds, fails permanently, or the policy runs out
/// of attempts.
///
/// `action` receives the 1-indexed attempt number. `classify` decides whether
/// an error is transient; `sleep` is called with the policy delay before every
/// retry. The last error is returned unchanged.
///
/// # Errors
///
/// The first permanent error, or the error of the final attempt.
pub fn retry_with<T, E, A, C, S>(
    policy: &RetryPolicy,
    classify: C,
    mut sleep: S,
    mut action: A,
) -> Result<T, E>
where
    A: FnMut(u32) -> Result<T, E>,
    C: Fn(&E) -> FailureType,
    S: FnMut(Duration),
    E: Display,
{
    let mut attempt = 1;
    loop {
        let error = match action(attempt) {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        match policy.should_retry(classify(&error), attempt) {
            RetryDecision::Retry {
                delay,
                attempt: next,
            } => {
                warn!(
                    attempt,
                    next_attempt = next,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    %error,
                    "attempt failed, will retry"
                );
                sleep(delay);
                attempt = next;
            }
            RetryDecision::DoNotRetry { reason } => {
                debug!(attempt, %reason, %error, "giving up");
                return Err(error);
            }
        }
    }
}

/// Classifies a download error into a failure type for retry decisions.
///
/// | Error | Type | Rationale |
/// |-------|------|-----------|
/// | Http (closed, send, receive, stale) | Transient | a new connection may work |
/// | Http (resolve, connect) | Permanent | host unreachable |
/// | Http (malformed, no length, head too large, sink) | Permanent | same bytes next time |
/// | HttpStatus | Permanent | any non-2xx answer is final |
/// | InvalidUrl | Permanent | won't succeed |
/// | Io | Permanent | local file system issue |
/// | Integrity, RangeMismatch | Permanent | server disagrees with itself |
/// | InvalidConfig | Permanent | won't succeed |
#[must_use]
pub fn classify_error(error: &DownloadError) -> FailureType {
    match error {
        DownloadError::Http { source } if source.is_retryable() => FailureType::Transient,
        DownloadError::Http { .. }
        | DownloadError::HttpStatus { .. }
        | DownloadError::InvalidUrl(_)
        | DownloadError::Io { .. }
        | DownloadError::Integrity { .. }
        | DownloadError::RangeMismatch { .. }
        | DownloadError::InvalidConfig { .. } => FailureType::Permanent,
    }
}
