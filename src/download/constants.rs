//! Constants for the download module (strategy thresholds, retry timing).

use std::time::Duration;

/// Maximum attempts for each retried network action, including the first.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Fixed pause between attempts (2 seconds).
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Resources at least this large use ranged mode when the server allows it (32 MiB).
pub const DEFAULT_RANGE_THRESHOLD: u64 = 32 * 1024 * 1024;

/// Bytes requested per range in ranged mode (8 MiB).
pub const DEFAULT_RANGE_CHUNK_SIZE: u64 = 8 * 1024 * 1024;
