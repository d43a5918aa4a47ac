//! Single admission decision composing key verification, permission and
//! rate-limit checks.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use sintrix_ratelimit::RateLimitError;
use sintrix_ratelimit::RateLimiter;
use sintrix_ratelimit::UsageSnapshot;
use sintrix_ratelimit::now_unix_secs;

use crate::constants::AUTHORIZATION_HEADER;
use crate::constants::BEARER_SCHEME;
use crate::error::AuthError;
use crate::keystore::KeyStore;
use crate::permission::Permission;
use crate::record::KeyRecord;

/// Extract the token from an `Authorization` header value.
///
/// Strict on the `Bearer ` scheme; an empty token is treated as absent.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let token = header_value.strip_prefix(BEARER_SCHEME)?;
    if token.is_empty() { None } else { Some(token) }
}

/// Entry point protecting any operation.
///
/// Composes [`KeyStore`] verification, a permission membership check and
/// [`RateLimiter`] admission into one decision, short-circuiting on the
/// first failure. The only side effect on any path is the counter
/// increment inside a successful admission; every denial leaves all state
/// untouched.
///
/// Both collaborators are injected by handle, constructed once at process
/// start; the gate owns no state of its own. All checks are synchronous
/// and CPU-bound, so the decision returns without yielding.
pub struct AuthorizationGate {
    store: Arc<KeyStore>,
    limiter: Arc<RateLimiter>,
}

impl AuthorizationGate {
    /// Create a gate over the given store and limiter.
    pub fn new(store: Arc<KeyStore>, limiter: Arc<RateLimiter>) -> Self {
        Self { store, limiter }
    }

    /// Authorize a request presented as a header map.
    ///
    /// Header-name lookup is case-insensitive, as in any HTTP-shaped
    /// transport. Returns the verified record on success so the caller can
    /// log and bill against it.
    pub fn authorize(
        &self,
        headers: &HashMap<String, String>,
        required: Permission,
    ) -> Result<KeyRecord, AuthError> {
        let authorization = headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(AUTHORIZATION_HEADER))
            .map(|(_, value)| value.as_str());
        self.authorize_header(authorization, required)
    }

    /// Authorize from the raw `Authorization` header value, if any.
    ///
    /// Denial order: missing/malformed token, unknown key, missing
    /// permission, exhausted rate window. Steps before admission never
    /// touch counters, so a permission denial consumes no quota.
    pub fn authorize_header(
        &self,
        authorization: Option<&str>,
        required: Permission,
    ) -> Result<KeyRecord, AuthError> {
        self.authorize_header_at(authorization, required, now_unix_secs())
    }

    /// [`AuthorizationGate::authorize_header`] with the clock injected.
    ///
    /// Deterministic entry point for tests and simulation; production
    /// callers use the wall-clock variants.
    pub fn authorize_header_at(
        &self,
        authorization: Option<&str>,
        required: Permission,
        now_secs: u64,
    ) -> Result<KeyRecord, AuthError> {
        let token = authorization.and_then(bearer_token).ok_or(AuthError::MissingKey)?;

        let record = self.store.verify(token)?;

        if !record.has_permission(required) {
            debug!(key_id = %record.id, %required, "denied: insufficient permission");
            return Err(AuthError::InsufficientPermission { required });
        }

        match self.limiter.admit_at(record.id.as_str(), &record.window_limits(), now_secs) {
            Ok(_) => Ok(record),
            Err(RateLimitError::WindowExhausted {
                window,
                retry_after_secs,
                usage,
            }) => {
                debug!(key_id = %record.id, %window, retry_after_secs, "denied: rate limit exceeded");
                Err(AuthError::RateLimitExceeded {
                    window,
                    retry_after_secs,
                    usage,
                })
            }
            Err(RateLimitError::LockPoisoned { reason }) => Err(AuthError::Internal { reason }),
        }
    }

    /// Read-only usage view for a verified key, for introspection and
    /// billing display. Never consumes quota.
    pub fn usage(&self, record: &KeyRecord) -> Result<UsageSnapshot, AuthError> {
        self.usage_at(record, now_unix_secs())
    }

    /// [`AuthorizationGate::usage`] with the clock injected, so reads line
    /// up with admissions made through [`AuthorizationGate::authorize_header_at`].
    pub fn usage_at(&self, record: &KeyRecord, now_secs: u64) -> Result<UsageSnapshot, AuthError> {
        match self
            .limiter
            .usage_at(record.id.as_str(), &record.window_limits(), now_secs)
        {
            Ok(usage) => Ok(usage),
            Err(RateLimitError::LockPoisoned { reason }) => Err(AuthError::Internal { reason }),
            // A usage read never rejects; a ceiling report here is a
            // limiter defect.
            Err(err @ RateLimitError::WindowExhausted { .. }) => Err(AuthError::Internal {
                reason: err.to_string(),
            }),
        }
    }
}

impl std::fmt::Debug for AuthorizationGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationGate")
            .field("store", &self.store)
            .field("limiter", &self.limiter)
            .finish()
    }
}
