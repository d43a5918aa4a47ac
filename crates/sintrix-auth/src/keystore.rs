//! Registry mapping presented plaintext keys to their records.

use std::collections::BTreeSet;
use std::collections::HashMap;
use std::sync::RwLock;

use tracing::debug;

use sintrix_ratelimit::now_unix_secs;

use crate::error::AuthError;
use crate::permission::Permission;
use crate::permission::Tier;
use crate::record::KeyId;
use crate::record::KeyRecord;
use crate::record::derive_key_hash;
use crate::record::generate_salt;

/// In-memory registry of issued keys.
///
/// Records are keyed by opaque [`KeyId`], never by the plaintext, so the
/// secret has no residency in the map structure. Verification is a
/// sequential hash scan over the full registry; the registry is small and
/// each candidate comparison is constant-time.
///
/// Reads (verification) far outnumber writes (issuance), so the registry
/// sits behind a readers-writer lock: many concurrent verifies, exclusive
/// issuance. Constructed once at process start and shared by handle; a
/// production deployment would substitute durable storage behind the same
/// `verify`/`issue` surface.
pub struct KeyStore {
    records: RwLock<HashMap<KeyId, KeyRecord>>,
}

impl KeyStore {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve a presented plaintext key to its record.
    ///
    /// Recomputes the salted hash against every stored record and returns
    /// the match, or [`AuthError::InvalidKey`] when nothing matches. Never
    /// mutates the registry.
    pub fn verify(&self, plaintext: &str) -> Result<KeyRecord, AuthError> {
        let records = self.records.read().map_err(|_| AuthError::Internal {
            reason: "key registry read lock poisoned".to_string(),
        })?;

        for record in records.values() {
            if record.matches(plaintext) {
                debug!(key_id = %record.id, tier = %record.tier, "key verified");
                return Ok(record.clone());
            }
        }

        Err(AuthError::InvalidKey)
    }

    /// Store a new key, derived from `plaintext` with a fresh random salt.
    ///
    /// Fails with [`AuthError::DuplicateKey`] if the same plaintext was
    /// already issued. The duplicate scan and the insert happen under one
    /// exclusive lock, so concurrent issuance of the same plaintext cannot
    /// slip through.
    pub fn issue(
        &self,
        plaintext: &str,
        tier: Tier,
        permissions: BTreeSet<Permission>,
        daily_limit: u32,
    ) -> Result<KeyId, AuthError> {
        let mut records = self.records.write().map_err(|_| AuthError::Internal {
            reason: "key registry write lock poisoned".to_string(),
        })?;

        if records.values().any(|record| record.matches(plaintext)) {
            return Err(AuthError::DuplicateKey);
        }

        let salt = generate_salt();
        let record = KeyRecord {
            id: KeyId::generate(),
            key_hash: derive_key_hash(plaintext, &salt)?,
            salt,
            tier,
            permissions,
            daily_limit,
            issued_at: now_unix_secs(),
        };
        let id = record.id.clone();
        debug!(key_id = %id, tier = %tier, daily_limit, "key issued");
        records.insert(id.clone(), record);

        Ok(id)
    }

    /// Number of issued keys.
    pub fn len(&self) -> usize {
        self.records.read().map(|records| records.len()).unwrap_or(0)
    }

    /// Whether the registry holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for KeyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for KeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyStore").field("keys", &self.len()).finish()
    }
}
