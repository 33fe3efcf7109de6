//! Mock decrypt capability

use async_trait::async_trait;
use cipherwatt_core::{
    CipherwattError, CiphertextHandle, DecryptEffects, DecryptionAuthorization, VaultAddress,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::encryption::CiphertextBook;
use crate::{Gate, HookSlot};

/// Relayer stand-in resolving handles through a [`CiphertextBook`].
#[derive(Debug)]
pub struct MockDecryptor {
    book: CiphertextBook,
    fail: AtomicBool,
    calls: AtomicU64,
    batch_calls: AtomicU64,
    hook: HookSlot,
    gate: Gate,
}

impl MockDecryptor {
    /// Decryptor reading plaintexts from `book`
    pub fn new(book: CiphertextBook) -> Self {
        Self {
            book,
            fail: AtomicBool::new(false),
            calls: AtomicU64::new(0),
            batch_calls: AtomicU64::new(0),
            hook: HookSlot::default(),
            gate: Gate::new(),
        }
    }

    /// Make subsequent calls fail with a network error
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Run `hook` inside every subsequent call
    pub fn on_decrypt(&self, hook: impl Fn() + Send + Sync + 'static) {
        self.hook.set(hook);
    }

    /// Gate every decrypt call waits on
    pub fn gate(&self) -> &Gate {
        &self.gate
    }

    /// Number of single-handle decrypts
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of batched decrypts
    pub fn batch_calls(&self) -> u64 {
        self.batch_calls.load(Ordering::SeqCst)
    }

    fn resolve(
        &self,
        handle: CiphertextHandle,
        vault: VaultAddress,
        authorization: &DecryptionAuthorization,
    ) -> Result<u128, CipherwattError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(CipherwattError::network("relayer unavailable"));
        }
        if !authorization.authorized_resources.contains(&vault) {
            return Err(CipherwattError::crypto(format!(
                "authorization does not cover {vault}"
            )));
        }
        self.book
            .plaintext(&handle)
            .ok_or_else(|| CipherwattError::not_found(format!("unknown handle {handle}")))
    }
}

#[async_trait]
impl DecryptEffects for MockDecryptor {
    async fn decrypt(
        &self,
        handle: CiphertextHandle,
        vault: VaultAddress,
        authorization: &DecryptionAuthorization,
    ) -> Result<u128, CipherwattError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gate.pass().await;
        self.hook.fire();
        self.resolve(handle, vault, authorization)
    }

    async fn decrypt_batch(
        &self,
        pairs: &[(CiphertextHandle, VaultAddress)],
        authorization: &DecryptionAuthorization,
    ) -> Result<HashMap<CiphertextHandle, u128>, CipherwattError> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        self.gate.pass().await;
        self.hook.fire();
        pairs
            .iter()
            .map(|(handle, vault)| Ok((*handle, self.resolve(*handle, *vault, authorization)?)))
            .collect()
    }
}
