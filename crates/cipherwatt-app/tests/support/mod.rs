//! Coordinator test harness.
//!
//! [`Harness`] wires a [`VaultCoordinator`] to the testkit mocks and a
//! session connected as Alice on Sepolia.

#![allow(dead_code)]

use std::sync::Arc;

use cipherwatt_app::{
    Collaborators, CoordinatorConfig, SessionContext, SessionHandle, VaultCoordinator,
};
use cipherwatt_core::{CiphertextHandle, RecordId, SignatureStore};
use cipherwatt_signature::{InMemorySignatureStore, SignatureManager};
use cipherwatt_testkit::{TestEnvironment, ALICE, SEPOLIA, SEPOLIA_VAULT};

pub struct Harness {
    pub env: TestEnvironment,
    pub session: SessionHandle,
    pub coordinator: VaultCoordinator,
}

impl Harness {
    /// Connected as Alice on Sepolia, in-memory signature cache.
    pub fn new() -> Self {
        let harness = Self::disconnected();
        harness.session.connect(SEPOLIA, ALICE);
        harness
    }

    /// No network, no identity.
    pub fn disconnected() -> Self {
        Self::build(
            TestEnvironment::new(),
            Arc::new(InMemorySignatureStore::new()),
            None,
        )
    }

    /// Connected, with collaborators derived from `config`.
    pub fn with_config(env: TestEnvironment, config: &CoordinatorConfig) -> Self {
        let harness = Self::build(env, config.signature_store(), Some(config));
        harness.session.connect(SEPOLIA, ALICE);
        harness
    }

    fn build(
        env: TestEnvironment,
        store: Arc<dyn SignatureStore>,
        config: Option<&CoordinatorConfig>,
    ) -> Self {
        let signatures = match config {
            Some(config) => config.signature_manager(store, env.signer.clone(), env.clock.clone()),
            None => SignatureManager::new(store, env.signer.clone(), env.clock.clone()),
        };
        let (session, view) = SessionContext::init(env.registry.clone());
        let coordinator = VaultCoordinator::new(
            view,
            Collaborators {
                ledger: env.ledger.clone(),
                encryption: env.encryption.clone(),
                decryptor: env.decryptor.clone(),
                signatures,
            },
        );
        Self {
            env,
            session,
            coordinator,
        }
    }

    /// Store a record on the Sepolia vault whose plaintext is `raw`.
    pub fn seed_record(&self, id: u64, raw: u128) -> RecordId {
        let record_id = RecordId(id);
        let mut bytes = [0xee; 32];
        bytes[..8].copy_from_slice(&id.to_be_bytes());
        let handle = CiphertextHandle::from_bytes(bytes);
        self.env.book.insert(handle, raw);
        self.env.ledger.insert_record(SEPOLIA_VAULT, record_id, handle);
        record_id
    }
}

/// Yield until `condition` holds.
pub async fn until(condition: impl Fn() -> bool) {
    while !condition() {
        tokio::task::yield_now().await;
    }
}
