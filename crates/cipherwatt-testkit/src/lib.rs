//! # Cipherwatt Testkit
//!
//! Deterministic, in-memory stand-ins for every collaborator the coordinator
//! talks to. Each mock counts its calls, can be told to fail, and exposes a
//! [`Hook`] that runs inside the call so a test can change the session
//! context exactly between two checkpoints. [`Gate`] holds a call until the
//! test releases it, which is how in-flight operations are produced.
//!
//! ```rust,ignore
//! let env = TestEnvironment::new();
//! env.ledger.confirmation_gate().close();
//! // ... start a create, observe it in flight, then:
//! env.ledger.confirmation_gate().release(1);
//! ```

#![allow(clippy::unwrap_used, clippy::expect_used)]

pub mod clock;
pub mod decryptor;
pub mod encryption;
pub mod fixtures;
pub mod gate;
pub mod ledger;
pub mod signer;

pub use clock::ControllableClock;
pub use decryptor::MockDecryptor;
pub use encryption::{CiphertextBook, MockEncryption};
pub use fixtures::{
    identity, network, vault, TestEnvironment, ALICE, BOB, HOLESKY, SEPOLIA, SEPOLIA_VAULT,
    START_TIME,
};
pub use gate::Gate;
pub use ledger::MockLedger;
pub use signer::MockSigner;

use std::sync::Arc;

/// Callback run from inside a mocked collaborator call.
pub type Hook = Arc<dyn Fn() + Send + Sync>;

/// Slot holding an optional [`Hook`].
#[derive(Default)]
pub(crate) struct HookSlot(parking_lot::Mutex<Option<Hook>>);

impl HookSlot {
    pub(crate) fn set(&self, hook: impl Fn() + Send + Sync + 'static) {
        *self.0.lock() = Some(Arc::new(hook));
    }

    pub(crate) fn clear(&self) {
        *self.0.lock() = None;
    }

    pub(crate) fn fire(&self) {
        let hook = self.0.lock().clone();
        if let Some(hook) = hook {
            hook();
        }
    }
}

impl std::fmt::Debug for HookSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let armed = self.0.lock().is_some();
        f.debug_tuple("HookSlot").field(&armed).finish()
    }
}
