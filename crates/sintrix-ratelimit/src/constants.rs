//! Window durations for multi-window rate limiting.
//!
//! These are fixed: every key is counted against the same three windows,
//! only the ceilings vary by tier.

/// Length of the minute window in seconds.
pub const MINUTE_SECS: u64 = 60;

/// Length of the hour window in seconds.
pub const HOUR_SECS: u64 = 60 * 60;

/// Length of the day window in seconds.
pub const DAY_SECS: u64 = 24 * 60 * 60;
