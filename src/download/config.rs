//! Tunables for a download session.

use std::time::Duration;

use super::DownloadError;
use super::constants::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_RANGE_CHUNK_SIZE, DEFAULT_RANGE_THRESHOLD, DEFAULT_RETRY_DELAY,
};
use super::retry::RetryPolicy;
use crate::http::FrameLimits;

/// Settings for [`DownloadOrchestrator`](super::DownloadOrchestrator).
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use rawfetch_core::download::DownloadConfig;
///
/// let config = DownloadConfig::default()
///     .with_max_attempts(3)
///     .with_retry_delay(Duration::from_millis(250));
/// assert!(config.validate().is_ok());
/// assert_eq!(config.range_chunk_size(), 8 * 1024 * 1024);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadConfig {
    max_attempts: u32,
    retry_delay: Duration,
    range_threshold: u64,
    range_chunk_size: u64,
    frame_limits: FrameLimits,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
            range_threshold: DEFAULT_RANGE_THRESHOLD,
            range_chunk_size: DEFAULT_RANGE_CHUNK_SIZE,
            frame_limits: FrameLimits::default(),
        }
    }
}

impl DownloadConfig {
    /// Attempts per retried action, including the first.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Pause between attempts.
    #[must_use]
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Smallest resource size that may be fetched in ranges.
    #[must_use]
    pub fn with_range_threshold(mut self, range_threshold: u64) -> Self {
        self.range_threshold = range_threshold;
        self
    }

    /// Bytes per range request.
    #[must_use]
    pub fn with_range_chunk_size(mut self, range_chunk_size: u64) -> Self {
        self.range_chunk_size = range_chunk_size;
        self
    }

    /// Head and streaming buffer sizes.
    #[must_use]
    pub fn with_frame_limits(mut self, frame_limits: FrameLimits) -> Self {
        self.frame_limits = frame_limits;
        self
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    #[must_use]
    pub fn range_threshold(&self) -> u64 {
        self.range_threshold
    }

    #[must_use]
    pub fn range_chunk_size(&self) -> u64 {
        self.range_chunk_size
    }

    #[must_use]
    pub fn frame_limits(&self) -> FrameLimits {
        self.frame_limits
    }

    /// The retry policy these settings describe.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, self.retry_delay)
    }

    /// Rejects settings that cannot make progress.
    ///
    /// # Errors
    ///
    /// [`DownloadError::InvalidConfig`] naming the offending setting.
    pub fn validate(&self) -> Result<(), DownloadError> {
        if self.max_attempts == 0 {
            return Err(DownloadError::invalid_config("max_attempts must be at least 1"));
        }
        if self.range_chunk_size == 0 {
            return Err(DownloadError::invalid_config("range_chunk_size must be non-zero"));
        }
        let limits = &self.frame_limits;
        if limits.stream_chunk_size == 0 {
            return Err(DownloadError::invalid_config("stream_chunk_size must be non-zero"));
        }
        if limits.initial_head_capacity == 0 {
            return Err(DownloadError::invalid_config(
                "initial_head_capacity must be non-zero",
            ));
        }
        if limits.initial_head_capacity > limits.max_head_size {
            return Err(DownloadError::invalid_config(format!(
                "initial_head_capacity {} exceeds max_head_size {}",
                limits.initial_head_capacity, limits.max_head_size
            )));
        }
        Ok(())
    }
}
