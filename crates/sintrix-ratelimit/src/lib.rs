//! Sliding multi-window rate limiting keyed by opaque identifiers.
//!
//! Every key is counted against three independently-expiring windows
//! (minute, hour, day) sharing a single anchor timestamp. The admission
//! decision is split into a functional core and an imperative shell:
//!
//! - [`pure`] - deterministic reconciliation, ceiling checks and retry
//!   hints, with time passed explicitly
//! - [`RateLimiter`] - lazily-created per-key counters behind per-key
//!   locks, so concurrent requests for one key serialize through a single
//!   reconcile-check-increment critical section
//!
//! The limiter is policy-free: callers pass the [`WindowLimits`] a key is
//! judged against on every call, and rejections report which window was
//! exhausted plus a usage snapshot for Retry-After guidance.
//!
//! ```ignore
//! use sintrix_ratelimit::{RateLimiter, WindowLimits};
//!
//! let limiter = RateLimiter::new();
//! let limits = WindowLimits { per_minute: 60, per_hour: 1_000, per_day: 1_000 };
//!
//! match limiter.admit("key-id", &limits) {
//!     Ok(usage) => { /* proceed, usage available for logging */ }
//!     Err(err) => { /* 429 with err.retry_after_secs() */ }
//! }
//! ```

pub mod constants;
mod error;
mod limiter;
pub mod pure;
mod types;

pub use error::RateLimitError;
pub use limiter::RateLimiter;
pub use types::UsageCounter;
pub use types::UsageSnapshot;
pub use types::Window;
pub use types::WindowLimits;
pub use types::WindowUsage;
pub use types::now_unix_secs;
