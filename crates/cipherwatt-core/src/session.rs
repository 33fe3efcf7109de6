//! Session snapshots
//!
//! A [`SessionSnapshot`] is the (network, identity) pair a client operated
//! under at one instant. Operations capture one at admission and compare it
//! against the live session at every checkpoint.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::identifiers::{IdentityId, NetworkId};

/// Immutable point-in-time view of the session context.
///
/// Two snapshots are equal iff both the network and the identity match,
/// including both being absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Active network, if a wallet is connected
    pub network_id: Option<NetworkId>,
    /// Active signing identity, if a wallet is connected
    pub identity_id: Option<IdentityId>,
}

impl SessionSnapshot {
    /// Create a snapshot from its parts.
    pub fn new(network_id: Option<NetworkId>, identity_id: Option<IdentityId>) -> Self {
        Self {
            network_id,
            identity_id,
        }
    }

    /// Snapshot of a fully connected session.
    pub fn connected(network_id: NetworkId, identity_id: IdentityId) -> Self {
        Self::new(Some(network_id), Some(identity_id))
    }

    /// True when both a network and an identity are present.
    pub fn is_connected(&self) -> bool {
        self.network_id.is_some() && self.identity_id.is_some()
    }
}

impl fmt::Display for SessionSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.network_id, self.identity_id) {
            (Some(network), Some(identity)) => write!(f, "{identity}@{network}"),
            (Some(network), None) => write!(f, "<no identity>@{network}"),
            (None, Some(identity)) => write!(f, "{identity}@<no network>"),
            (None, None) => write!(f, "<disconnected>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_requires_both_fields() {
        let alice = IdentityId::from_bytes([1; 20]);
        let bob = IdentityId::from_bytes([2; 20]);
        let base = SessionSnapshot::connected(NetworkId(1), alice);

        assert_eq!(base, SessionSnapshot::connected(NetworkId(1), alice));
        assert_ne!(base, SessionSnapshot::connected(NetworkId(2), alice));
        assert_ne!(base, SessionSnapshot::connected(NetworkId(1), bob));
        assert_ne!(base, SessionSnapshot::new(Some(NetworkId(1)), None));
    }

    #[test]
    fn test_disconnected_default() {
        let snapshot = SessionSnapshot::default();
        assert!(!snapshot.is_connected());
        assert_eq!(snapshot.to_string(), "<disconnected>");
    }
}
