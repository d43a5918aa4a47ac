//! Per-key admission decisions over the pure reconciliation core.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::RwLock;

use tracing::debug;

use crate::error::RateLimitError;
use crate::pure;
use crate::types::UsageCounter;
use crate::types::UsageSnapshot;
use crate::types::WindowLimits;
use crate::types::now_unix_secs;

/// Multi-window rate limiter keyed by opaque identifiers.
///
/// Counters are created lazily on first admission check and live for the
/// process lifetime. Each counter sits behind its own mutex so concurrent
/// requests for the same key serialize through a single
/// reconcile-check-increment critical section; requests for different keys
/// never contend on counter state. The lock is never held across I/O.
pub struct RateLimiter {
    /// Per-key counters. The outer lock only guards map membership.
    counters: RwLock<HashMap<String, Arc<Mutex<UsageCounter>>>>,
}

impl RateLimiter {
    /// Create a limiter with no tracked keys.
    pub fn new() -> Self {
        Self {
            counters: RwLock::new(HashMap::new()),
        }
    }

    /// Admit or reject one request for `key` against `limits`.
    ///
    /// Reconciles the key's windows against elapsed time, then checks every
    /// ceiling. Only an admitted request increments the counters; a rejected
    /// call leaves them exactly as reconciled, so hammering an exhausted key
    /// does not push it further past its ceiling.
    ///
    /// Returns the post-admission usage on success.
    pub fn admit(&self, key: &str, limits: &WindowLimits) -> Result<UsageSnapshot, RateLimitError> {
        self.admit_at(key, limits, now_unix_secs())
    }

    /// [`RateLimiter::admit`] with the clock injected.
    ///
    /// Deterministic entry point: window expiry can be exercised without
    /// waiting for wall time to pass.
    pub fn admit_at(
        &self,
        key: &str,
        limits: &WindowLimits,
        now_secs: u64,
    ) -> Result<UsageSnapshot, RateLimitError> {
        let cell = self.counter_cell(key, now_secs)?;
        let mut counter = cell.lock().map_err(|_| RateLimitError::LockPoisoned {
            reason: format!("counter lock for key '{key}'"),
        })?;

        // Critical section: reconcile, check, increment. Two concurrent
        // callers sitting one below a ceiling must not both get through.
        let reconciled = pure::reconcile(*counter, now_secs);

        if let Some(window) = pure::exhausted_window(&reconciled, limits) {
            *counter = reconciled;
            let usage = UsageSnapshot::new(&reconciled, limits);
            debug!(key, %window, current = reconciled.count(window), "request rejected, window exhausted");
            return Err(RateLimitError::WindowExhausted {
                window,
                retry_after_secs: pure::retry_after_secs(window, reconciled.anchor_secs, now_secs),
                usage,
            });
        }

        let admitted = pure::record_admit(reconciled);
        *counter = admitted;
        debug!(key, minute = admitted.minute, hour = admitted.hour, day = admitted.day, "request admitted");
        Ok(UsageSnapshot::new(&admitted, limits))
    }

    /// Read-only usage view for `key`.
    ///
    /// Reports counts as they would stand after reconciliation but mutates
    /// nothing; a key that has never been checked reports zeros. Suitable
    /// for introspection and billing display.
    pub fn usage(&self, key: &str, limits: &WindowLimits) -> Result<UsageSnapshot, RateLimitError> {
        self.usage_at(key, limits, now_unix_secs())
    }

    /// [`RateLimiter::usage`] with the clock injected.
    pub fn usage_at(
        &self,
        key: &str,
        limits: &WindowLimits,
        now_secs: u64,
    ) -> Result<UsageSnapshot, RateLimitError> {
        let map = self.counters.read().map_err(|_| RateLimitError::LockPoisoned {
            reason: "counter registry read lock".to_string(),
        })?;

        let counter = match map.get(key) {
            Some(cell) => {
                let guard = cell.lock().map_err(|_| RateLimitError::LockPoisoned {
                    reason: format!("counter lock for key '{key}'"),
                })?;
                pure::reconcile(*guard, now_secs)
            }
            None => UsageCounter::new(now_secs),
        };

        Ok(UsageSnapshot::new(&counter, limits))
    }

    /// Number of keys with tracked counters.
    pub fn tracked_keys(&self) -> usize {
        self.counters.read().map(|map| map.len()).unwrap_or(0)
    }

    /// Fetch the counter cell for `key`, creating it lazily.
    ///
    /// Read lock on the fast path; the write lock is only taken for a key's
    /// first admission check.
    fn counter_cell(&self, key: &str, now_secs: u64) -> Result<Arc<Mutex<UsageCounter>>, RateLimitError> {
        {
            let map = self.counters.read().map_err(|_| RateLimitError::LockPoisoned {
                reason: "counter registry read lock".to_string(),
            })?;
            if let Some(cell) = map.get(key) {
                return Ok(Arc::clone(cell));
            }
        }

        let mut map = self.counters.write().map_err(|_| RateLimitError::LockPoisoned {
            reason: "counter registry write lock".to_string(),
        })?;
        let cell = map
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(UsageCounter::new(now_secs))));
        Ok(Arc::clone(cell))
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter").field("tracked_keys", &self.tracked_keys()).finish()
    }
}
