//! Counter and snapshot types for multi-window rate limiting.

use std::fmt;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Deserialize;
use serde::Serialize;

/// One of the three counting windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Window {
    /// Sixty-second window.
    Minute,
    /// Sixty-minute window.
    Hour,
    /// Twenty-four-hour window.
    Day,
}

impl Window {
    /// Duration of this window in seconds.
    #[inline]
    pub fn secs(&self) -> u64 {
        match self {
            Window::Minute => crate::constants::MINUTE_SECS,
            Window::Hour => crate::constants::HOUR_SECS,
            Window::Day => crate::constants::DAY_SECS,
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Window::Minute => write!(f, "minute"),
            Window::Hour => write!(f, "hour"),
            Window::Day => write!(f, "day"),
        }
    }
}

/// Request ceilings for the three windows.
///
/// The limiter itself has no notion of service tiers; callers derive the
/// ceilings from whatever policy they own and pass them in per admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowLimits {
    /// Maximum requests per minute window.
    pub per_minute: u32,
    /// Maximum requests per hour window.
    pub per_hour: u32,
    /// Maximum requests per day window.
    pub per_day: u32,
}

impl WindowLimits {
    /// Ceiling for the given window.
    #[inline]
    pub fn limit(&self, window: Window) -> u32 {
        match window {
            Window::Minute => self.per_minute,
            Window::Hour => self.per_hour,
            Window::Day => self.per_day,
        }
    }
}

/// Per-key usage state: three counts plus a single shared window anchor.
///
/// A single anchor keeps the state compact; the cascading reconciliation in
/// [`crate::pure::reconcile`] interprets elapsed time against it, largest
/// window first. Counts are monotonically non-decreasing within their own
/// window and reset independently, so `minute <= hour <= day` is not a
/// structural guarantee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageCounter {
    /// Requests admitted in the current minute window.
    pub minute: u32,
    /// Requests admitted in the current hour window.
    pub hour: u32,
    /// Requests admitted in the current day window.
    pub day: u32,
    /// Unix timestamp (seconds) the windows are measured from.
    pub anchor_secs: u64,
}

impl UsageCounter {
    /// Fresh counter anchored at the given time.
    pub fn new(anchor_secs: u64) -> Self {
        Self {
            minute: 0,
            hour: 0,
            day: 0,
            anchor_secs,
        }
    }

    /// Count for the given window.
    #[inline]
    pub fn count(&self, window: Window) -> u32 {
        match window {
            Window::Minute => self.minute,
            Window::Hour => self.hour,
            Window::Day => self.day,
        }
    }
}

/// Current count and ceiling for one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowUsage {
    /// Requests counted so far in the window.
    pub current: u32,
    /// Ceiling for the window.
    pub limit: u32,
}

/// Read-only usage view across all three windows.
///
/// Serializable so the caller can surface it for introspection or billing
/// display. Taking a snapshot never mutates the underlying counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    /// Minute window usage.
    pub minute: WindowUsage,
    /// Hour window usage.
    pub hour: WindowUsage,
    /// Day window usage.
    pub day: WindowUsage,
}

impl UsageSnapshot {
    /// Build a snapshot from a counter and the ceilings it is judged against.
    pub fn new(counter: &UsageCounter, limits: &WindowLimits) -> Self {
        Self {
            minute: WindowUsage {
                current: counter.minute,
                limit: limits.per_minute,
            },
            hour: WindowUsage {
                current: counter.hour,
                limit: limits.per_hour,
            },
            day: WindowUsage {
                current: counter.day,
                limit: limits.per_day,
            },
        }
    }

    /// Usage for the given window.
    #[inline]
    pub fn window(&self, window: Window) -> WindowUsage {
        match window {
            Window::Minute => self.minute,
            Window::Hour => self.hour,
            Window::Day => self.day,
        }
    }
}

/// Current Unix timestamp in seconds.
///
/// Returns 0 if system time is before the Unix epoch (should never happen
/// on properly configured systems, but prevents panics).
#[inline]
pub fn now_unix_secs() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_secs() {
        assert_eq!(Window::Minute.secs(), 60);
        assert_eq!(Window::Hour.secs(), 3_600);
        assert_eq!(Window::Day.secs(), 86_400);
    }

    #[test]
    fn test_snapshot_reflects_counter_and_limits() {
        let counter = UsageCounter {
            minute: 3,
            hour: 40,
            day: 900,
            anchor_secs: 1_000,
        };
        let limits = WindowLimits {
            per_minute: 60,
            per_hour: 1_000,
            per_day: 10_000,
        };
        let snapshot = UsageSnapshot::new(&counter, &limits);
        assert_eq!(snapshot.minute, WindowUsage { current: 3, limit: 60 });
        assert_eq!(snapshot.hour, WindowUsage { current: 40, limit: 1_000 });
        assert_eq!(snapshot.day, WindowUsage { current: 900, limit: 10_000 });
    }

    #[test]
    fn test_snapshot_serializes_per_window() {
        let counter = UsageCounter::new(0);
        let limits = WindowLimits {
            per_minute: 60,
            per_hour: 1_000,
            per_day: 1_000,
        };
        let json = serde_json::to_value(UsageSnapshot::new(&counter, &limits)).unwrap();
        assert_eq!(json["minute"]["current"], 0);
        assert_eq!(json["minute"]["limit"], 60);
        assert_eq!(json["day"]["limit"], 1_000);
    }
}
