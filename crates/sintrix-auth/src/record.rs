//! Issued-key records and one-way hash derivation.
//!
//! Plaintext keys never appear in a record: storage holds only an
//! HMAC-SHA256 of the plaintext under a per-key random salt, keyed by an
//! opaque random identifier.

use std::collections::BTreeSet;
use std::fmt;

use hmac::Hmac;
use hmac::Mac;
use rand::Rng;
use serde::Deserialize;
use serde::Serialize;
use sha2::Sha256;
use sintrix_ratelimit::WindowLimits;

use crate::constants::KEY_ID_LEN;
use crate::constants::SALT_LEN;
use crate::error::AuthError;
use crate::permission::Permission;
use crate::permission::Tier;

type HmacSha256 = Hmac<Sha256>;

/// Opaque identifier a record is stored under.
///
/// Random, carries no information about the plaintext key, and is safe to
/// log or use as a rate-limiting key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyId(String);

impl KeyId {
    /// Generate a fresh random identifier.
    pub(crate) fn generate() -> Self {
        let bytes: [u8; KEY_ID_LEN] = rand::rng().random();
        Self(hex::encode(bytes))
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stored state for one issued key.
///
/// Immutable after issuance: there is no update or delete path, and
/// rotation means issuing a new key. Serializable so a durable backing
/// store can hold records without format changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRecord {
    /// Opaque storage identifier.
    pub id: KeyId,
    /// HMAC-SHA256 of the plaintext key under `salt`.
    pub key_hash: [u8; 32],
    /// Per-key random salt.
    pub salt: [u8; SALT_LEN],
    /// Service class determining fixed window ceilings.
    pub tier: Tier,
    /// Capabilities this key holds.
    pub permissions: BTreeSet<Permission>,
    /// Per-key daily request ceiling, set at issuance.
    pub daily_limit: u32,
    /// Unix timestamp (seconds) of issuance.
    pub issued_at: u64,
}

impl KeyRecord {
    /// Whether this key holds the given permission.
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    /// Window ceilings this key is rate-limited against.
    pub fn window_limits(&self) -> WindowLimits {
        self.tier.window_limits(self.daily_limit)
    }

    /// Whether `plaintext` is the key this record was issued for.
    ///
    /// Recomputes the salted hash and compares in constant time, so a scan
    /// over the registry leaks no per-candidate timing beyond the scan
    /// itself.
    pub(crate) fn matches(&self, plaintext: &str) -> bool {
        let Ok(mut mac) = HmacSha256::new_from_slice(&self.salt) else {
            return false;
        };
        mac.update(plaintext.as_bytes());
        mac.verify_slice(&self.key_hash).is_ok()
    }
}

/// One-way derivation of a stored key hash.
pub(crate) fn derive_key_hash(plaintext: &str, salt: &[u8]) -> Result<[u8; 32], AuthError> {
    let mut mac = HmacSha256::new_from_slice(salt).map_err(|_| AuthError::Internal {
        reason: "hmac initialization".to_string(),
    })?;
    mac.update(plaintext.as_bytes());
    Ok(mac.finalize().into_bytes().into())
}

/// Generate a fresh random salt.
pub(crate) fn generate_salt() -> [u8; SALT_LEN] {
    rand::rng().random()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sintrix_ratelimit::now_unix_secs;

    fn record_for(plaintext: &str, tier: Tier) -> KeyRecord {
        let salt = generate_salt();
        KeyRecord {
            id: KeyId::generate(),
            key_hash: derive_key_hash(plaintext, &salt).unwrap(),
            salt,
            tier,
            permissions: BTreeSet::from([Permission::Predict]),
            daily_limit: tier.default_daily_limit(),
            issued_at: now_unix_secs(),
        }
    }

    #[test]
    fn test_hash_is_never_the_plaintext() {
        let record = record_for("sk_test_0123456789abcdef", Tier::Free);
        assert_ne!(&record.key_hash[..], "sk_test_0123456789abcdef".as_bytes());
    }

    #[test]
    fn test_matches_own_plaintext_only() {
        let record = record_for("sk_test_aaaa", Tier::Free);
        assert!(record.matches("sk_test_aaaa"));
        assert!(!record.matches("sk_test_aaab"));
        assert!(!record.matches(""));
    }

    #[test]
    fn test_same_plaintext_different_salts_differ() {
        let a = record_for("sk_test_same", Tier::Free);
        let b = record_for("sk_test_same", Tier::Free);
        assert_ne!(a.key_hash, b.key_hash);
    }

    #[test]
    fn test_window_limits_combine_tier_and_daily() {
        let mut record = record_for("sk_prod_x", Tier::Pro);
        record.daily_limit = 123;
        let limits = record.window_limits();
        assert_eq!(limits.per_minute, 300);
        assert_eq!(limits.per_hour, 5_000);
        assert_eq!(limits.per_day, 123);
    }

    #[test]
    fn test_record_serde_round_trip() {
        let record = record_for("sk_test_serde", Tier::Free);
        let json = serde_json::to_string(&record).unwrap();
        let back: KeyRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
        assert!(back.matches("sk_test_serde"));
    }

    #[test]
    fn test_key_ids_are_unique() {
        assert_ne!(KeyId::generate(), KeyId::generate());
    }
}
