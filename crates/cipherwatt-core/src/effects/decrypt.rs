//! Decrypt capability effects

use async_trait::async_trait;
use std::collections::HashMap;

use crate::authorization::DecryptionAuthorization;
use crate::identifiers::{CiphertextHandle, VaultAddress};
use crate::CipherwattError;

/// User decryption through the relayer.
#[async_trait]
pub trait DecryptEffects: Send + Sync {
    /// Decrypt one handle held by `vault`.
    async fn decrypt(
        &self,
        handle: CiphertextHandle,
        vault: VaultAddress,
        authorization: &DecryptionAuthorization,
    ) -> Result<u128, CipherwattError>;

    /// Decrypt several handles under one authorization.
    ///
    /// The default issues one request per pair; relayer bindings override it
    /// with a single batched request.
    async fn decrypt_batch(
        &self,
        pairs: &[(CiphertextHandle, VaultAddress)],
        authorization: &DecryptionAuthorization,
    ) -> Result<HashMap<CiphertextHandle, u128>, CipherwattError> {
        let mut values = HashMap::with_capacity(pairs.len());
        for (handle, vault) in pairs {
            let value = self.decrypt(*handle, *vault, authorization).await?;
            values.insert(*handle, value);
        }
        Ok(values)
    }
}
