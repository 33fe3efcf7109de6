//! Decryption signature manager
//!
//! Hands out a [`DecryptionAuthorization`] for a set of vaults, reusing the
//! cached one while it is inside its validity window and covers exactly the
//! requested set. Otherwise the identity is prompted once for a new one.
//!
//! ```text
//! ensure_authorization(resources, identity)
//!   ├─ store.get(key)
//!   │  └─ valid at now ∧ same set ∧ same identity ∧ key pair intact → return cached
//!   ├─ generate ephemeral key pair
//!   ├─ signer.sign_authorization(request)   (declined → Unavailable, no retry)
//!   ├─ store.set(key, authorization)
//!   └─ return authorization
//! ```

use std::sync::Arc;

use cipherwatt_core::{
    AuthorizationKey, AuthorizationRequest, DecryptionAuthorization, IdentityId,
    PhysicalTimeEffects, SignatureStore, SignerEffects, VaultAddress,
};
use tracing::{debug, info, warn};

use crate::errors::AuthorizationError;
use crate::keys::{generate_key_pair, key_pair_matches};

/// Validity granted to new authorizations unless configured otherwise.
pub const DEFAULT_VALIDITY_DAYS: u32 = 10;

/// Obtains, validates and caches decryption authorizations.
#[derive(Clone)]
pub struct SignatureManager {
    store: Arc<dyn SignatureStore>,
    signer: Arc<dyn SignerEffects>,
    clock: Arc<dyn PhysicalTimeEffects>,
    validity_days: u32,
}

impl std::fmt::Debug for SignatureManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureManager")
            .field("validity_days", &self.validity_days)
            .finish_non_exhaustive()
    }
}

impl SignatureManager {
    /// Create a manager granting [`DEFAULT_VALIDITY_DAYS`] per authorization.
    pub fn new(
        store: Arc<dyn SignatureStore>,
        signer: Arc<dyn SignerEffects>,
        clock: Arc<dyn PhysicalTimeEffects>,
    ) -> Self {
        Self {
            store,
            signer,
            clock,
            validity_days: DEFAULT_VALIDITY_DAYS,
        }
    }

    /// Override the validity window of new authorizations.
    #[must_use]
    pub fn with_validity_days(mut self, days: u32) -> Self {
        self.validity_days = days;
        self
    }

    /// Validity window of new authorizations
    pub fn validity_days(&self) -> u32 {
        self.validity_days
    }

    /// Return a usable authorization for `resources`, signing a new one only
    /// when the cached entry is missing, expired or mismatched.
    pub async fn ensure_authorization(
        &self,
        resources: &[VaultAddress],
        identity: IdentityId,
    ) -> Result<DecryptionAuthorization, AuthorizationError> {
        if resources.is_empty() {
            return Err(AuthorizationError::NoResources);
        }
        let key = AuthorizationKey::new(resources, identity);
        let now = self.clock.now_secs();

        match self.store.get(&key).await {
            Ok(Some(cached)) if self.is_reusable(&cached, resources, identity, now) => {
                debug!(%identity, expires_at = cached.expires_at(), "Reusing cached decryption authorization");
                return Ok(cached);
            }
            Ok(Some(cached)) => {
                debug!(
                    %identity,
                    valid_from = cached.valid_from,
                    expires_at = cached.expires_at(),
                    now,
                    "Cached decryption authorization not reusable"
                );
            }
            Ok(None) => {}
            Err(e) => {
                warn!(%identity, error = %e, "Signature store lookup failed; requesting a new signature");
            }
        }

        let authorization = self.sign_new(resources, identity, now).await?;

        if let Err(e) = self.store.set(&key, authorization.clone()).await {
            warn!(%identity, error = %e, "Failed to cache decryption authorization");
        }
        Ok(authorization)
    }

    /// Remove the cached authorization for `resources`.
    pub async fn forget(
        &self,
        resources: &[VaultAddress],
        identity: IdentityId,
    ) -> Result<bool, cipherwatt_core::CipherwattError> {
        let key = AuthorizationKey::new(resources, identity);
        let removed = self.store.remove(&key).await?;
        if removed {
            info!(%identity, "Forgot cached decryption authorization");
        }
        Ok(removed)
    }

    fn is_reusable(
        &self,
        cached: &DecryptionAuthorization,
        resources: &[VaultAddress],
        identity: IdentityId,
        now: u64,
    ) -> bool {
        cached.identity_id == identity
            && cached.is_valid_at(now)
            && cached.covers_exactly(resources)
            && !cached.signature.is_empty()
            && key_pair_matches(&cached.private_key, &cached.public_key)
    }

    async fn sign_new(
        &self,
        resources: &[VaultAddress],
        identity: IdentityId,
        now: u64,
    ) -> Result<DecryptionAuthorization, AuthorizationError> {
        let key_pair = generate_key_pair();
        let request = AuthorizationRequest {
            public_key: key_pair.public.clone(),
            resources: resources.to_vec(),
            identity_id: identity,
            valid_from: now,
            valid_duration_days: self.validity_days,
        };
        info!(%identity, resources = resources.len(), days = self.validity_days, "Requesting decryption authorization signature");
        let signature = match self.signer.sign_authorization(&request).await {
            Ok(signature) => signature,
            Err(e) => {
                warn!(%identity, error = %e, "Decryption authorization signing failed");
                return Err(e.into());
            }
        };
        if signature.is_empty() {
            return Err(AuthorizationError::InvalidSignature {
                reason: "signer returned an empty signature".to_string(),
            });
        }

        Ok(DecryptionAuthorization {
            private_key: key_pair.secret,
            public_key: key_pair.public,
            signature,
            authorized_resources: request.resources,
            identity_id: identity,
            valid_from: now,
            valid_duration_days: self.validity_days,
        })
    }
}
