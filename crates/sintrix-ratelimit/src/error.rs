//! Error types for rate limiting.

use snafu::Snafu;

use crate::types::UsageSnapshot;
use crate::types::Window;

/// Error when a request is rejected or limiter state cannot be read.
///
/// Distinguishes actual rate limiting (a window at its ceiling) from
/// internal failures (a poisoned counter lock).
#[derive(Debug, Clone, Snafu)]
#[snafu(visibility(pub))]
pub enum RateLimitError {
    /// A window is at or above its ceiling.
    #[snafu(display("{window} window exhausted, retry after {retry_after_secs}s"))]
    WindowExhausted {
        /// The window that is at its ceiling.
        window: Window,
        /// Seconds until the exhausted window rolls over.
        retry_after_secs: u64,
        /// Usage across all three windows at the time of rejection.
        usage: UsageSnapshot,
    },

    /// A counter lock was poisoned by a panicking thread.
    #[snafu(display("rate limiter lock poisoned: {reason}"))]
    LockPoisoned {
        /// Which lock failed.
        reason: String,
    },
}

impl RateLimitError {
    /// Returns the retry hint if this is a WindowExhausted error, None otherwise.
    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            RateLimitError::WindowExhausted { retry_after_secs, .. } => Some(*retry_after_secs),
            RateLimitError::LockPoisoned { .. } => None,
        }
    }
}
