//! Key issuance: parameter validation, random key generation, storage.

use std::collections::BTreeSet;
use std::str::FromStr;
use std::sync::Arc;

use rand::Rng;
use tracing::debug;

use crate::constants::KEY_MATERIAL_LEN;
use crate::error::AuthError;
use crate::keystore::KeyStore;
use crate::permission::Permission;
use crate::permission::Tier;
use crate::record::KeyId;

/// A freshly issued key.
///
/// The plaintext is returned exactly once, here; it is not recoverable from
/// storage afterwards.
#[derive(Debug, Clone)]
pub struct IssuedKey {
    /// Opaque identifier of the stored record.
    pub id: KeyId,
    /// The key to hand to the client.
    pub plaintext: String,
}

/// Issues new API keys and delegates storage to [`KeyStore`].
pub struct KeyIssuer {
    store: Arc<KeyStore>,
}

impl KeyIssuer {
    /// Create an issuer writing to the given store.
    pub fn new(store: Arc<KeyStore>) -> Self {
        Self { store }
    }

    /// Issue a key with the tier's default daily limit.
    pub fn issue(&self, tier: Tier, permissions: &[Permission]) -> Result<IssuedKey, AuthError> {
        self.issue_with_daily_limit(tier, permissions, tier.default_daily_limit())
    }

    /// Issue a key with an explicit per-key daily limit.
    ///
    /// The plaintext is `<tier prefix> + 32 hex chars` of cryptographically
    /// random material. The prefix distinguishes free/pro for operational
    /// triage only; nothing trusts it as a tier claim.
    pub fn issue_with_daily_limit(
        &self,
        tier: Tier,
        permissions: &[Permission],
        daily_limit: u32,
    ) -> Result<IssuedKey, AuthError> {
        if permissions.is_empty() {
            return Err(AuthError::InvalidPermission {
                value: "(empty set)".to_string(),
            });
        }

        let material: [u8; KEY_MATERIAL_LEN] = rand::rng().random();
        let plaintext = format!("{}{}", tier.key_prefix(), hex::encode(material));
        let permissions: BTreeSet<Permission> = permissions.iter().copied().collect();

        let id = self.store.issue(&plaintext, tier, permissions, daily_limit)?;
        debug!(key_id = %id, %tier, "issued new key");

        Ok(IssuedKey { id, plaintext })
    }

    /// Issue from untrusted string parameters.
    ///
    /// Boundary for administrative requests: rejects tiers outside
    /// {free, pro} and permissions outside {predict, train, manage} before
    /// any key material is generated.
    pub fn issue_from_request(&self, tier: &str, permissions: &[String]) -> Result<IssuedKey, AuthError> {
        let tier = Tier::from_str(tier)?;
        let parsed = permissions
            .iter()
            .map(|p| Permission::from_str(p))
            .collect::<Result<Vec<_>, _>>()?;
        self.issue(tier, &parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> (Arc<KeyStore>, KeyIssuer) {
        let store = Arc::new(KeyStore::new());
        (Arc::clone(&store), KeyIssuer::new(store))
    }

    #[test]
    fn test_issued_key_verifies() {
        let (store, issuer) = issuer();
        let issued = issuer.issue(Tier::Free, &[Permission::Predict]).unwrap();

        let record = store.verify(&issued.plaintext).unwrap();
        assert_eq!(record.id, issued.id);
        assert_eq!(record.daily_limit, 1_000);
    }

    #[test]
    fn test_key_shape_by_tier() {
        let (_, issuer) = issuer();

        let free = issuer.issue(Tier::Free, &[Permission::Predict]).unwrap();
        assert!(free.plaintext.starts_with("sk_test_"));
        assert_eq!(free.plaintext.len(), "sk_test_".len() + 32);

        let pro = issuer.issue(Tier::Pro, &[Permission::Predict]).unwrap();
        assert!(pro.plaintext.starts_with("sk_prod_"));
    }

    #[test]
    fn test_issued_keys_are_unique() {
        let (_, issuer) = issuer();
        let a = issuer.issue(Tier::Free, &[Permission::Predict]).unwrap();
        let b = issuer.issue(Tier::Free, &[Permission::Predict]).unwrap();
        assert_ne!(a.plaintext, b.plaintext);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_explicit_daily_limit() {
        let (store, issuer) = issuer();
        let issued = issuer
            .issue_with_daily_limit(Tier::Pro, &[Permission::Manage], 42)
            .unwrap();
        assert_eq!(store.verify(&issued.plaintext).unwrap().daily_limit, 42);
    }

    #[test]
    fn test_empty_permission_set_rejected() {
        let (store, issuer) = issuer();
        let err = issuer.issue(Tier::Free, &[]).unwrap_err();
        assert!(matches!(err, AuthError::InvalidPermission { .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn test_request_boundary_validates_tier() {
        let (_, issuer) = issuer();
        let err = issuer
            .issue_from_request("enterprise", &["predict".to_string()])
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidTier { value } if value == "enterprise"));
    }

    #[test]
    fn test_request_boundary_validates_permissions() {
        let (store, issuer) = issuer();
        let err = issuer
            .issue_from_request("free", &["predict".to_string(), "delete".to_string()])
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidPermission { value } if value == "delete"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_request_boundary_happy_path() {
        let (store, issuer) = issuer();
        let issued = issuer
            .issue_from_request("pro", &["predict".to_string(), "train".to_string()])
            .unwrap();
        let record = store.verify(&issued.plaintext).unwrap();
        assert_eq!(record.tier, Tier::Pro);
        assert!(record.has_permission(Permission::Train));
        assert!(!record.has_permission(Permission::Manage));
    }
}
