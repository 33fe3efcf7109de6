//! Client-side encryption engine effects

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::identifiers::{CiphertextHandle, IdentityId, VaultAddress};
use crate::scaling::ScaledValue;
use crate::CipherwattError;

/// Ciphertext handle plus the proof binding it to a contract and identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedInput {
    /// Handle the vault will store
    pub handle: CiphertextHandle,
    /// Input proof verified on-chain
    pub proof: Vec<u8>,
}

/// Encryption engine producing inputs for a single 32-bit value.
#[async_trait]
pub trait EncryptionEffects: Send + Sync {
    /// Whether the engine finished loading its public parameters.
    fn is_ready(&self) -> bool {
        true
    }

    /// Encrypt `value` for `vault`, bound to `identity`.
    ///
    /// Always yields exactly one handle and one proof.
    async fn build_encrypted_input(
        &self,
        vault: VaultAddress,
        identity: IdentityId,
        value: ScaledValue,
    ) -> Result<EncryptedInput, CipherwattError>;
}
