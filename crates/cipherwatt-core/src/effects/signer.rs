//! Interactive signer and signature store effects

use async_trait::async_trait;

use crate::authorization::{AuthorizationKey, AuthorizationRequest, DecryptionAuthorization};
use crate::CipherwattError;

/// Failure of the interactive signing step.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignerError {
    /// The user rejected the signature prompt
    #[error("signature request declined")]
    Declined,
    /// No wallet is able to sign for the requested identity
    #[error("signer unavailable: {reason}")]
    Unavailable {
        /// What went wrong
        reason: String,
    },
}

/// Wallet prompting the identity to sign an authorization.
#[async_trait]
pub trait SignerEffects: Send + Sync {
    /// Sign `request` on behalf of `request.identity_id`.
    async fn sign_authorization(
        &self,
        request: &AuthorizationRequest,
    ) -> Result<Vec<u8>, SignerError>;
}

/// Key-value store persisting decryption authorizations between operations.
#[async_trait]
pub trait SignatureStore: Send + Sync {
    /// Fetch the authorization stored under `key`.
    async fn get(
        &self,
        key: &AuthorizationKey,
    ) -> Result<Option<DecryptionAuthorization>, CipherwattError>;

    /// Store `authorization` under `key`, replacing any previous entry.
    async fn set(
        &self,
        key: &AuthorizationKey,
        authorization: DecryptionAuthorization,
    ) -> Result<(), CipherwattError>;

    /// Drop the entry under `key`; returns whether one existed.
    async fn remove(&self, key: &AuthorizationKey) -> Result<bool, CipherwattError>;
}
