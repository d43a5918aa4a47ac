//! Fixed limits and formats for key issuance and authorization.

/// Requests per minute for free-tier keys.
pub const FREE_MINUTE_LIMIT: u32 = 60;

/// Requests per hour for free-tier keys.
pub const FREE_HOUR_LIMIT: u32 = 1_000;

/// Default daily limit for free-tier keys (overridable per key at issuance).
pub const FREE_DEFAULT_DAILY_LIMIT: u32 = 1_000;

/// Requests per minute for pro-tier keys.
pub const PRO_MINUTE_LIMIT: u32 = 300;

/// Requests per hour for pro-tier keys.
pub const PRO_HOUR_LIMIT: u32 = 5_000;

/// Default daily limit for pro-tier keys (overridable per key at issuance).
pub const PRO_DEFAULT_DAILY_LIMIT: u32 = 10_000;

/// Issued-key prefix for free-tier keys.
///
/// The prefix exists for operational triage only; tier is authoritative
/// from the stored record, never from the key text.
pub const FREE_KEY_PREFIX: &str = "sk_test_";

/// Issued-key prefix for pro-tier keys.
pub const PRO_KEY_PREFIX: &str = "sk_prod_";

/// Random bytes of key material behind the prefix (rendered as hex).
pub const KEY_MATERIAL_LEN: usize = 16;

/// Salt length in bytes for key-hash derivation.
pub const SALT_LEN: usize = 16;

/// Random bytes in an opaque key identifier (rendered as hex).
pub const KEY_ID_LEN: usize = 16;

/// Header the gate reads the bearer token from.
pub const AUTHORIZATION_HEADER: &str = "authorization";

/// Required authorization scheme prefix.
pub const BEARER_SCHEME: &str = "Bearer ";
