//! Decryption authorization types
//!
//! Reading a plaintext back from the ledger requires a time-bounded
//! credential: an ephemeral key pair plus the identity's signature over the
//! public key, the authorized vault contracts and a validity window.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::identifiers::{IdentityId, VaultAddress};
use crate::CipherwattError;

/// Seconds in one validity day.
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Private half of the ephemeral decryption key pair.
///
/// Scrubbed from memory on drop and never printed.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct AuthorizationSecret(Vec<u8>);

impl AuthorizationSecret {
    /// Wrap raw secret bytes
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Secret bytes; handle with care
    pub fn expose(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for AuthorizationSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AuthorizationSecret(<{} bytes redacted>)", self.0.len())
    }
}

/// Cache key for stored authorizations.
///
/// Resources are sorted and deduplicated so that the same set requested in a
/// different order maps to the same entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AuthorizationKey {
    resources: Vec<VaultAddress>,
    identity: IdentityId,
}

impl AuthorizationKey {
    /// Build a normalized key.
    pub fn new(resources: &[VaultAddress], identity: IdentityId) -> Self {
        let resources: BTreeSet<VaultAddress> = resources.iter().copied().collect();
        Self {
            resources: resources.into_iter().collect(),
            identity,
        }
    }

    /// Sorted resource handles
    pub fn resources(&self) -> &[VaultAddress] {
        &self.resources
    }

    /// Identity the authorization belongs to
    pub fn identity(&self) -> IdentityId {
        self.identity
    }

    /// Canonical string form, stable across runs.
    pub fn canonical(&self) -> String {
        let resources: Vec<String> = self.resources.iter().map(ToString::to_string).collect();
        format!("{}:{}", self.identity, resources.join(","))
    }
}

impl fmt::Display for AuthorizationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

/// Message the identity signs to grant decryption rights.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationRequest {
    /// Ephemeral public key that will receive re-encrypted values
    pub public_key: Vec<u8>,
    /// Vault contracts covered by the grant
    pub resources: Vec<VaultAddress>,
    /// Identity granting the rights
    pub identity_id: IdentityId,
    /// Start of the validity window (unix seconds)
    pub valid_from: u64,
    /// Length of the validity window
    pub valid_duration_days: u32,
}

impl AuthorizationRequest {
    /// Canonical bytes presented to the signer.
    pub fn message_bytes(&self) -> Result<Vec<u8>, CipherwattError> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Time-bounded credential permitting plaintext recovery of vault values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecryptionAuthorization {
    /// Ephemeral private key
    pub private_key: AuthorizationSecret,
    /// Ephemeral public key
    pub public_key: Vec<u8>,
    /// Identity signature over the [`AuthorizationRequest`]
    pub signature: Vec<u8>,
    /// Vault contracts covered, in the order they were requested
    pub authorized_resources: Vec<VaultAddress>,
    /// Identity that signed
    pub identity_id: IdentityId,
    /// Start of the validity window (unix seconds)
    pub valid_from: u64,
    /// Length of the validity window
    pub valid_duration_days: u32,
}

impl DecryptionAuthorization {
    /// Last second (inclusive) at which the authorization may be used.
    pub fn expires_at(&self) -> u64 {
        self.valid_from
            .saturating_add(u64::from(self.valid_duration_days).saturating_mul(SECONDS_PER_DAY))
    }

    /// Whether `now` lies in `[valid_from, valid_from + days]`.
    pub fn is_valid_at(&self, now: u64) -> bool {
        self.valid_from <= now && now <= self.expires_at()
    }

    /// Whether the authorized set equals `resources`, ignoring order.
    pub fn covers_exactly(&self, resources: &[VaultAddress]) -> bool {
        let granted: BTreeSet<&VaultAddress> = self.authorized_resources.iter().collect();
        let requested: BTreeSet<&VaultAddress> = resources.iter().collect();
        granted == requested
    }

    /// The request this authorization's signature should cover.
    pub fn request(&self) -> AuthorizationRequest {
        AuthorizationRequest {
            public_key: self.public_key.clone(),
            resources: self.authorized_resources.clone(),
            identity_id: self.identity_id,
            valid_from: self.valid_from,
            valid_duration_days: self.valid_duration_days,
        }
    }

    /// Cache key this authorization is stored under.
    pub fn key(&self) -> AuthorizationKey {
        AuthorizationKey::new(&self.authorized_resources, self.identity_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn vault(byte: u8) -> VaultAddress {
        VaultAddress::from_bytes([byte; 20])
    }

    fn authorization(valid_from: u64, days: u32) -> DecryptionAuthorization {
        DecryptionAuthorization {
            private_key: AuthorizationSecret::new(vec![1; 32]),
            public_key: vec![2; 32],
            signature: vec![3; 64],
            authorized_resources: vec![vault(2), vault(1)],
            identity_id: IdentityId::from_bytes([9; 20]),
            valid_from,
            valid_duration_days: days,
        }
    }

    #[test]
    fn test_validity_window_is_inclusive() {
        let auth = authorization(1_000, 1);
        assert!(!auth.is_valid_at(999));
        assert!(auth.is_valid_at(1_000));
        assert!(auth.is_valid_at(1_000 + SECONDS_PER_DAY));
        assert!(!auth.is_valid_at(1_001 + SECONDS_PER_DAY));
    }

    #[test]
    fn test_covers_exactly_ignores_order() {
        let auth = authorization(0, 10);
        assert!(auth.covers_exactly(&[vault(1), vault(2)]));
        assert!(!auth.covers_exactly(&[vault(1)]));
        assert!(!auth.covers_exactly(&[vault(1), vault(2), vault(3)]));
    }

    #[test]
    fn test_key_is_order_independent() {
        let identity = IdentityId::from_bytes([9; 20]);
        let a = AuthorizationKey::new(&[vault(2), vault(1)], identity);
        let b = AuthorizationKey::new(&[vault(1), vault(2), vault(1)], identity);
        assert_eq!(a, b);
        assert_eq!(a.resources(), &[vault(1), vault(2)]);
        assert_eq!(authorization(0, 1).key(), a);
    }

    #[test]
    fn test_secret_is_redacted() {
        let auth = authorization(0, 1);
        let rendered = format!("{auth:?}");
        assert!(rendered.contains("redacted"));
        assert!(!rendered.contains("[1, 1, 1"));
    }

    #[test]
    fn test_expiry_saturates() {
        let auth = authorization(u64::MAX - 5, u32::MAX);
        assert_eq!(auth.expires_at(), u64::MAX);
    }

    proptest! {
        #[test]
        fn prop_valid_exactly_inside_window(
            valid_from in 0u64..4_000_000_000,
            days in 1u32..=365,
            offset in 0u64..40_000_000,
        ) {
            let auth = authorization(valid_from, days);
            let window = u64::from(days) * SECONDS_PER_DAY;
            prop_assert_eq!(auth.is_valid_at(valid_from + offset), offset <= window);
            if valid_from > 0 {
                prop_assert!(!auth.is_valid_at(valid_from - 1));
            }
        }
    }
}
