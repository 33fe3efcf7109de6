//! Mock interactive signer

use async_trait::async_trait;
use cipherwatt_core::{AuthorizationRequest, SignerEffects, SignerError};
use ed25519_dalek::{Signer, SigningKey};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::HookSlot;

/// Wallet that signs every request with a fixed key unless told to decline.
#[derive(Debug)]
pub struct MockSigner {
    key: SigningKey,
    decline: AtomicBool,
    empty_signatures: AtomicBool,
    calls: AtomicU64,
    requests: Mutex<Vec<AuthorizationRequest>>,
    hook: HookSlot,
}

impl Default for MockSigner {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSigner {
    /// Signer with a fixed test key
    pub fn new() -> Self {
        Self {
            key: SigningKey::from_bytes(&[0x42; 32]),
            decline: AtomicBool::new(false),
            empty_signatures: AtomicBool::new(false),
            calls: AtomicU64::new(0),
            requests: Mutex::new(Vec::new()),
            hook: HookSlot::default(),
        }
    }

    /// Decline every subsequent prompt
    pub fn set_declining(&self, decline: bool) {
        self.decline.store(decline, Ordering::SeqCst);
    }

    /// Return empty signatures (a broken wallet)
    pub fn set_empty_signatures(&self, empty: bool) {
        self.empty_signatures.store(empty, Ordering::SeqCst);
    }

    /// Run `hook` inside every subsequent prompt
    pub fn on_sign(&self, hook: impl Fn() + Send + Sync + 'static) {
        self.hook.set(hook);
    }

    /// Number of prompts shown
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every request presented, in order
    pub fn requests(&self) -> Vec<AuthorizationRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl SignerEffects for MockSigner {
    async fn sign_authorization(
        &self,
        request: &AuthorizationRequest,
    ) -> Result<Vec<u8>, SignerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());
        self.hook.fire();
        if self.decline.load(Ordering::SeqCst) {
            return Err(SignerError::Declined);
        }
        if self.empty_signatures.load(Ordering::SeqCst) {
            return Ok(Vec::new());
        }
        let message = request
            .message_bytes()
            .map_err(|e| SignerError::Unavailable {
                reason: e.to_string(),
            })?;
        Ok(self.key.sign(&message).to_bytes().to_vec())
    }
}
