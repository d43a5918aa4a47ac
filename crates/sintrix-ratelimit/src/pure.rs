//! Pure window reconciliation and ceiling checks.
//!
//! The cascading three-window reset is the part of rate limiting that is
//! easiest to get subtly wrong (partial resets, off-by-one ceilings), so it
//! lives here as pure functions: deterministic, side-effect free, time
//! passed explicitly. The imperative shell in [`crate::limiter`] only adds
//! locking and storage.
//!
//! All calculations use saturating arithmetic; no function here panics.

use crate::constants::DAY_SECS;
use crate::constants::HOUR_SECS;
use crate::constants::MINUTE_SECS;
use crate::types::UsageCounter;
use crate::types::Window;
use crate::types::WindowLimits;

/// Reconcile a counter against elapsed time since its anchor.
///
/// Checks the largest window first so a long-idle key resets cleanly
/// instead of being left in a stale partial state:
///
/// - `>= 24h` elapsed: all three counts reset
/// - `>= 1h` elapsed: hour and minute counts reset
/// - `>= 1min` elapsed: minute count resets
///
/// Whenever any reset fires the anchor moves to `now_secs`, so each window
/// is measured from the most recent rollover rather than drifting against
/// an ancient anchor.
#[inline]
pub fn reconcile(counter: UsageCounter, now_secs: u64) -> UsageCounter {
    let elapsed = now_secs.saturating_sub(counter.anchor_secs);

    if elapsed >= DAY_SECS {
        UsageCounter::new(now_secs)
    } else if elapsed >= HOUR_SECS {
        UsageCounter {
            minute: 0,
            hour: 0,
            day: counter.day,
            anchor_secs: now_secs,
        }
    } else if elapsed >= MINUTE_SECS {
        UsageCounter {
            minute: 0,
            hour: counter.hour,
            day: counter.day,
            anchor_secs: now_secs,
        }
    } else {
        counter
    }
}

/// Find the first window at or above its ceiling, if any.
///
/// Checked minute, hour, then day, so the reported window is the one with
/// the shortest retry horizon when several are exhausted at once.
#[inline]
pub fn exhausted_window(counter: &UsageCounter, limits: &WindowLimits) -> Option<Window> {
    if counter.minute >= limits.per_minute {
        Some(Window::Minute)
    } else if counter.hour >= limits.per_hour {
        Some(Window::Hour)
    } else if counter.day >= limits.per_day {
        Some(Window::Day)
    } else {
        None
    }
}

/// Record one admitted request across all three windows.
#[inline]
pub fn record_admit(counter: UsageCounter) -> UsageCounter {
    UsageCounter {
        minute: counter.minute.saturating_add(1),
        hour: counter.hour.saturating_add(1),
        day: counter.day.saturating_add(1),
        anchor_secs: counter.anchor_secs,
    }
}

/// Seconds until the given window rolls over, measured from its anchor.
///
/// Conservative: never returns 0 (a reconciled counter that is still
/// exhausted always has time remaining in the window, but a caller retrying
/// "now" would race the clock).
#[inline]
pub fn retry_after_secs(window: Window, anchor_secs: u64, now_secs: u64) -> u64 {
    let elapsed = now_secs.saturating_sub(anchor_secs);
    window.secs().saturating_sub(elapsed).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter(minute: u32, hour: u32, day: u32, anchor_secs: u64) -> UsageCounter {
        UsageCounter {
            minute,
            hour,
            day,
            anchor_secs,
        }
    }

    fn limits(per_minute: u32, per_hour: u32, per_day: u32) -> WindowLimits {
        WindowLimits {
            per_minute,
            per_hour,
            per_day,
        }
    }

    // ========================================================================
    // Reconciliation
    // ========================================================================

    #[test]
    fn test_reconcile_within_minute_is_identity() {
        let c = counter(10, 100, 500, 1_000);
        assert_eq!(reconcile(c, 1_059), c);
    }

    #[test]
    fn test_reconcile_minute_rollover_resets_minute_only() {
        let c = counter(10, 100, 500, 1_000);
        let r = reconcile(c, 1_060);
        assert_eq!(r.minute, 0);
        assert_eq!(r.hour, 100);
        assert_eq!(r.day, 500);
        assert_eq!(r.anchor_secs, 1_060);
    }

    #[test]
    fn test_reconcile_hour_rollover_resets_hour_and_minute() {
        let c = counter(10, 100, 500, 1_000);
        let r = reconcile(c, 1_000 + 3_600);
        assert_eq!(r.minute, 0);
        assert_eq!(r.hour, 0);
        assert_eq!(r.day, 500);
        assert_eq!(r.anchor_secs, 4_600);
    }

    #[test]
    fn test_reconcile_day_rollover_resets_everything() {
        let c = counter(10, 100, 500, 1_000);
        let r = reconcile(c, 1_000 + 86_400);
        assert_eq!(r, UsageCounter::new(87_400));
    }

    #[test]
    fn test_reconcile_long_idle_key_resets_cleanly() {
        // A week of silence must not leave a stale partial state.
        let c = counter(60, 1_000, 1_000, 1_000);
        let r = reconcile(c, 1_000 + 7 * 86_400);
        assert_eq!(r.minute, 0);
        assert_eq!(r.hour, 0);
        assert_eq!(r.day, 0);
    }

    #[test]
    fn test_reconcile_clock_backwards_is_identity() {
        // saturating_sub gives 0 elapsed, nothing resets.
        let c = counter(10, 100, 500, 2_000);
        assert_eq!(reconcile(c, 1_500), c);
    }

    #[test]
    fn test_reconcile_boundary_is_inclusive() {
        // Exactly 60s elapsed counts as a rollover.
        let c = counter(60, 60, 60, 0);
        let r = reconcile(c, 60);
        assert_eq!(r.minute, 0);
        assert_eq!(r.hour, 60);
    }

    // ========================================================================
    // Ceiling checks
    // ========================================================================

    #[test]
    fn test_exhausted_none_below_ceilings() {
        let c = counter(59, 999, 999, 0);
        assert_eq!(exhausted_window(&c, &limits(60, 1_000, 1_000)), None);
    }

    #[test]
    fn test_exhausted_at_ceiling_not_just_above() {
        // "at or above" - count == limit already rejects.
        let c = counter(60, 100, 100, 0);
        assert_eq!(exhausted_window(&c, &limits(60, 1_000, 1_000)), Some(Window::Minute));
    }

    #[test]
    fn test_exhausted_reports_shortest_window_first() {
        let c = counter(60, 1_000, 1_000, 0);
        assert_eq!(exhausted_window(&c, &limits(60, 1_000, 1_000)), Some(Window::Minute));
    }

    #[test]
    fn test_exhausted_hour_before_day() {
        let c = counter(0, 1_000, 1_000, 0);
        assert_eq!(exhausted_window(&c, &limits(60, 1_000, 1_000)), Some(Window::Hour));
    }

    #[test]
    fn test_exhausted_day_alone() {
        let c = counter(0, 0, 500, 0);
        assert_eq!(exhausted_window(&c, &limits(60, 1_000, 500)), Some(Window::Day));
    }

    // ========================================================================
    // Admission recording
    // ========================================================================

    #[test]
    fn test_record_admit_increments_all_three() {
        let r = record_admit(counter(1, 2, 3, 42));
        assert_eq!((r.minute, r.hour, r.day), (2, 3, 4));
        assert_eq!(r.anchor_secs, 42);
    }

    #[test]
    fn test_record_admit_saturates() {
        let r = record_admit(counter(u32::MAX, 0, 0, 0));
        assert_eq!(r.minute, u32::MAX);
    }

    // ========================================================================
    // Retry hints
    // ========================================================================

    #[test]
    fn test_retry_after_remaining_minute() {
        assert_eq!(retry_after_secs(Window::Minute, 1_000, 1_040), 20);
    }

    #[test]
    fn test_retry_after_never_zero() {
        assert_eq!(retry_after_secs(Window::Minute, 1_000, 1_060), 1);
        assert_eq!(retry_after_secs(Window::Minute, 1_000, 5_000), 1);
    }

    #[test]
    fn test_retry_after_full_window_when_fresh() {
        assert_eq!(retry_after_secs(Window::Day, 1_000, 1_000), 86_400);
    }
}
