//! # Session Context
//!
//! Process-wide record of the active network and signing identity.
//!
//! The host owns the single [`SessionHandle`] and applies wallet events
//! (account switched, chain switched, disconnected) through it. Everything
//! else gets a [`SessionView`], a read-only accessor that always returns the
//! latest values. Nothing caches a view's answer; the staleness guard asks
//! again at each checkpoint.
//!
//! ```rust,ignore
//! let (handle, view) = SessionContext::init(registry);
//! handle.connect(SEPOLIA, alice);
//! let coordinator = VaultCoordinator::new(view, collaborators);
//! // later, from the wallet event listener:
//! handle.set_network(Some(HOLESKY));
//! ```

use cipherwatt_core::{
    DeploymentRegistry, IdentityId, NetworkId, SessionSnapshot, VaultAddress, VaultDescriptor,
};
use futures_signals::signal::{Mutable, Signal};
use std::sync::Arc;
use tracing::info;

/// Snapshot plus the vault descriptor derived from its network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionState {
    /// Active network and identity
    pub snapshot: SessionSnapshot,
    /// Vault as seen from `snapshot.network_id`
    pub descriptor: VaultDescriptor,
}

impl SessionState {
    /// Active identity, if connected
    pub fn identity(&self) -> Option<IdentityId> {
        self.snapshot.identity_id
    }

    /// Deployed vault address on the active network
    pub fn vault(&self) -> Option<VaultAddress> {
        self.descriptor.address
    }
}

#[derive(Debug)]
struct SessionShared {
    registry: DeploymentRegistry,
    state: Mutable<SessionState>,
}

/// Entry point creating the process-wide session state.
#[derive(Debug)]
pub struct SessionContext;

impl SessionContext {
    /// Create a disconnected session and return its writer and reader.
    pub fn init(registry: DeploymentRegistry) -> (SessionHandle, SessionView) {
        let initial = SessionState {
            snapshot: SessionSnapshot::default(),
            descriptor: registry.descriptor(None),
        };
        let shared = Arc::new(SessionShared {
            registry,
            state: Mutable::new(initial),
        });
        (
            SessionHandle {
                shared: shared.clone(),
            },
            SessionView { shared },
        )
    }
}

/// Writer side of the session context, driven by wallet events.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    shared: Arc<SessionShared>,
}

impl SessionHandle {
    /// Switch the active network; the vault descriptor is re-derived.
    pub fn set_network(&self, network: Option<NetworkId>) {
        let descriptor = self.shared.registry.descriptor(network);
        let mut state = self.shared.state.lock_mut();
        if state.snapshot.network_id != network {
            info!(
                from = ?state.snapshot.network_id,
                to = ?network,
                vault = ?descriptor.address,
                "Session network changed"
            );
        }
        state.snapshot.network_id = network;
        state.descriptor = descriptor;
    }

    /// Switch the active signing identity.
    pub fn set_identity(&self, identity: Option<IdentityId>) {
        let mut state = self.shared.state.lock_mut();
        if state.snapshot.identity_id != identity {
            info!(from = ?state.snapshot.identity_id, to = ?identity, "Session identity changed");
        }
        state.snapshot.identity_id = identity;
    }

    /// Set network and identity in one update.
    pub fn connect(&self, network: NetworkId, identity: IdentityId) {
        let descriptor = self.shared.registry.descriptor(Some(network));
        let mut state = self.shared.state.lock_mut();
        info!(%network, %identity, vault = ?descriptor.address, "Session connected");
        *state = SessionState {
            snapshot: SessionSnapshot::connected(network, identity),
            descriptor,
        };
    }

    /// Clear network and identity.
    pub fn disconnect(&self) {
        let mut state = self.shared.state.lock_mut();
        info!("Session disconnected");
        *state = SessionState {
            snapshot: SessionSnapshot::default(),
            descriptor: self.shared.registry.descriptor(None),
        };
    }

    /// Read-only accessor over the same session.
    pub fn view(&self) -> SessionView {
        SessionView {
            shared: self.shared.clone(),
        }
    }
}

/// Read-only accessor over the live session.
#[derive(Debug, Clone)]
pub struct SessionView {
    shared: Arc<SessionShared>,
}

impl SessionView {
    /// Current network and identity.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.shared.state.get().snapshot
    }

    /// True iff network and identity both still equal `prior`.
    pub fn is_current(&self, prior: &SessionSnapshot) -> bool {
        self.snapshot() == *prior
    }

    /// Current snapshot together with the live vault descriptor.
    pub fn state(&self) -> SessionState {
        self.shared.state.get()
    }

    /// Live vault descriptor
    pub fn descriptor(&self) -> VaultDescriptor {
        self.state().descriptor
    }

    /// Changes of the session state, for UI consumers.
    pub fn signal(&self) -> impl Signal<Item = SessionState> {
        self.shared.state.signal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cipherwatt_testkit::{ALICE, BOB, HOLESKY, SEPOLIA, SEPOLIA_VAULT};

    fn registry() -> DeploymentRegistry {
        DeploymentRegistry::new().with_deployment(SEPOLIA, SEPOLIA_VAULT)
    }

    #[test]
    fn test_starts_disconnected() {
        let (_, view) = SessionContext::init(registry());
        assert_eq!(view.snapshot(), SessionSnapshot::default());
        assert!(!view.descriptor().is_deployed());
    }

    #[test]
    fn test_view_reflects_latest_values() {
        let (handle, view) = SessionContext::init(registry());
        handle.connect(SEPOLIA, ALICE);
        let before = view.snapshot();
        assert_eq!(view.descriptor().address, Some(SEPOLIA_VAULT));
        assert!(view.is_current(&before));

        handle.set_identity(Some(BOB));
        assert!(!view.is_current(&before));
        assert_eq!(view.snapshot().identity_id, Some(BOB));
    }

    #[test]
    fn test_network_change_rederives_descriptor() {
        let (handle, view) = SessionContext::init(registry());
        handle.connect(SEPOLIA, ALICE);
        let before = view.snapshot();

        handle.set_network(Some(HOLESKY));
        assert!(!view.is_current(&before));
        assert_eq!(view.descriptor().address, None);

        handle.set_network(Some(SEPOLIA));
        assert!(view.is_current(&before));
        assert_eq!(view.descriptor().address, Some(SEPOLIA_VAULT));
    }

    #[test]
    fn test_disconnect_clears_everything() {
        let (handle, view) = SessionContext::init(registry());
        handle.connect(SEPOLIA, ALICE);
        handle.disconnect();
        assert_eq!(view.snapshot(), SessionSnapshot::default());
        assert_eq!(handle.view().descriptor().address, None);
    }
}
