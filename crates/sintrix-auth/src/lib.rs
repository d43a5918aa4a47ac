//! API-key authorization: salted-hash key storage, permission-scoped
//! checks and tiered rate limiting behind one admission gate.
//!
//! Turns an opaque bearer token into a verified identity with scoped
//! permissions and a multi-window quota:
//!
//! - [`KeyStore`] - salted-hash records of issued keys; verifies presented
//!   plaintext without ever persisting it
//! - [`KeyIssuer`] - creates keys (tier + permission set), delegates
//!   storage to the store
//! - [`AuthorizationGate`] - composes verification, permission membership
//!   and [`sintrix_ratelimit::RateLimiter`] admission into a single
//!   request-admission decision
//!
//! Records are keyed by an opaque random [`KeyId`]; the plaintext exists
//! only in the issuance response and in the presented header. Denials come
//! back as a structured [`AuthError`] with a transport status mapping and,
//! for rate-limit denials, a Retry-After hint plus the denied key's own
//! usage snapshot.
//!
//! ```ignore
//! use std::sync::Arc;
//! use sintrix_auth::{AuthorizationGate, KeyIssuer, KeyStore, Permission, Tier};
//! use sintrix_ratelimit::RateLimiter;
//!
//! let store = Arc::new(KeyStore::new());
//! let limiter = Arc::new(RateLimiter::new());
//! let issuer = KeyIssuer::new(Arc::clone(&store));
//! let gate = AuthorizationGate::new(store, limiter);
//!
//! let issued = issuer.issue(Tier::Free, &[Permission::Predict])?;
//! let header = format!("Bearer {}", issued.plaintext);
//! let record = gate.authorize_header(Some(&header), Permission::Predict)?;
//! ```

pub mod constants;
mod error;
mod gate;
mod issuer;
mod keystore;
mod permission;
mod record;

pub use error::AuthError;
pub use gate::AuthorizationGate;
pub use gate::bearer_token;
pub use issuer::IssuedKey;
pub use issuer::KeyIssuer;
pub use keystore::KeyStore;
pub use permission::Permission;
pub use permission::Tier;
pub use record::KeyId;
pub use record::KeyRecord;
