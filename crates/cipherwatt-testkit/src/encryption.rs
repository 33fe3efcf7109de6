//! Mock encryption engine

use async_trait::async_trait;
use cipherwatt_core::{
    CipherwattError, CiphertextHandle, EncryptedInput, EncryptionEffects, IdentityId, ScaledValue,
    VaultAddress,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crate::HookSlot;

/// Plaintexts behind every handle the mock engine produced.
///
/// Shared with [`crate::MockDecryptor`] so a value written through the
/// coordinator decrypts back to the same integer.
#[derive(Debug, Clone, Default)]
pub struct CiphertextBook {
    entries: Arc<Mutex<HashMap<CiphertextHandle, u128>>>,
}

impl CiphertextBook {
    /// Create an empty book
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the plaintext behind `handle`
    pub fn insert(&self, handle: CiphertextHandle, plaintext: u128) {
        self.entries.lock().insert(handle, plaintext);
    }

    /// Look up the plaintext behind `handle`
    pub fn plaintext(&self, handle: &CiphertextHandle) -> Option<u128> {
        self.entries.lock().get(handle).copied()
    }
}

/// Deterministic encryption engine.
#[derive(Debug)]
pub struct MockEncryption {
    book: CiphertextBook,
    ready: AtomicBool,
    fail: AtomicBool,
    calls: AtomicU64,
    inputs: Mutex<Vec<(VaultAddress, IdentityId, ScaledValue)>>,
    hook: HookSlot,
}

impl MockEncryption {
    /// Engine writing plaintexts into `book`
    pub fn new(book: CiphertextBook) -> Self {
        Self {
            book,
            ready: AtomicBool::new(true),
            fail: AtomicBool::new(false),
            calls: AtomicU64::new(0),
            inputs: Mutex::new(Vec::new()),
            hook: HookSlot::default(),
        }
    }

    /// Toggle whether the engine reports itself loaded
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// Make subsequent calls fail with a network error
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Run `hook` inside every subsequent call
    pub fn on_encrypt(&self, hook: impl Fn() + Send + Sync + 'static) {
        self.hook.set(hook);
    }

    /// Remove the hook
    pub fn clear_hook(&self) {
        self.hook.clear();
    }

    /// Number of `build_encrypted_input` calls
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Arguments of every call, in order
    pub fn inputs(&self) -> Vec<(VaultAddress, IdentityId, ScaledValue)> {
        self.inputs.lock().clone()
    }
}

#[async_trait]
impl EncryptionEffects for MockEncryption {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn build_encrypted_input(
        &self,
        vault: VaultAddress,
        identity: IdentityId,
        value: ScaledValue,
    ) -> Result<EncryptedInput, CipherwattError> {
        let sequence = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.inputs.lock().push((vault, identity, value));
        self.hook.fire();
        if self.fail.load(Ordering::SeqCst) {
            return Err(CipherwattError::network("relayer public key unavailable"));
        }

        let mut bytes = [0u8; 32];
        bytes[..8].copy_from_slice(&sequence.to_be_bytes());
        bytes[8..12].copy_from_slice(&value.raw().to_be_bytes());
        bytes[12..32].copy_from_slice(vault.as_bytes());
        let handle = CiphertextHandle::from_bytes(bytes);
        self.book.insert(handle, u128::from(value.raw()));

        let mut proof = identity.as_bytes().to_vec();
        proof.extend_from_slice(&sequence.to_be_bytes());
        Ok(EncryptedInput { handle, proof })
    }
}
