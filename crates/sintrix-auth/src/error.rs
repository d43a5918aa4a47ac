//! Error taxonomy for key issuance and request authorization.
//!
//! Every variant is a local, recoverable condition reported to the caller
//! as a structured result; nothing here crashes the process. Display
//! strings are safe to expose to clients: they never reveal which other
//! keys exist or any counter beyond the denied key's own usage.

use snafu::Snafu;

use sintrix_ratelimit::UsageSnapshot;
use sintrix_ratelimit::Window;

use crate::permission::Permission;

/// Denial and issuance failures.
#[derive(Debug, Clone, Snafu)]
#[snafu(visibility(pub))]
pub enum AuthError {
    /// No `Authorization: Bearer <token>` header, or one too malformed to parse.
    #[snafu(display("missing or malformed bearer token"))]
    MissingKey,

    /// The presented token matches no issued key.
    #[snafu(display("invalid API key"))]
    InvalidKey,

    /// The key is valid but does not hold the required permission.
    #[snafu(display("key lacks required permission '{required}'"))]
    InsufficientPermission {
        /// The permission the protected operation demanded.
        required: Permission,
    },

    /// A rate window is at its ceiling.
    #[snafu(display("rate limit exceeded: {window} window exhausted, retry after {retry_after_secs}s"))]
    RateLimitExceeded {
        /// The exhausted window.
        window: Window,
        /// Seconds until the exhausted window rolls over (Retry-After hint).
        retry_after_secs: u64,
        /// The denied key's own usage at rejection time.
        usage: UsageSnapshot,
    },

    /// The same plaintext key was issued twice.
    #[snafu(display("key already issued"))]
    DuplicateKey,

    /// Issuance named a tier that is neither `free` nor `pro`.
    #[snafu(display("unrecognized tier '{value}'"))]
    InvalidTier {
        /// The rejected tier string.
        value: String,
    },

    /// Issuance named a permission other than `predict`, `train` or `manage`.
    #[snafu(display("unrecognized permission '{value}'"))]
    InvalidPermission {
        /// The rejected permission string.
        value: String,
    },

    /// A registry or counter lock was poisoned by a panicking thread.
    #[snafu(display("internal error: {reason}"))]
    Internal {
        /// What failed.
        reason: String,
    },
}

impl AuthError {
    /// Transport status the surrounding request layer should map this to.
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::MissingKey | AuthError::InvalidKey => 401,
            AuthError::InsufficientPermission { .. } => 403,
            AuthError::RateLimitExceeded { .. } => 429,
            AuthError::DuplicateKey => 409,
            AuthError::InvalidTier { .. } | AuthError::InvalidPermission { .. } => 400,
            AuthError::Internal { .. } => 500,
        }
    }

    /// Retry-After hint in seconds, present only for rate-limit denials.
    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            AuthError::RateLimitExceeded { retry_after_secs, .. } => Some(*retry_after_secs),
            _ => None,
        }
    }
}
