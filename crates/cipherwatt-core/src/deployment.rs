//! Vault deployments per network
//!
//! The [`DeploymentRegistry`] maps network ids to the vault contract deployed
//! there. A [`VaultDescriptor`] is derived from it deterministically each time
//! the active network changes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::identifiers::{NetworkId, VaultAddress};
use crate::CipherwattError;

/// Operations exposed by a vault contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VaultOperation {
    /// Store an encrypted generation reading
    CreateGeneration,
    /// Store an encrypted consumption reading
    CreateConsumption,
    /// Read the ciphertext handle of a stored record
    ReadEncryptedValue,
}

impl fmt::Display for VaultOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateGeneration => write!(f, "createGeneration"),
            Self::CreateConsumption => write!(f, "createConsumption"),
            Self::ReadEncryptedValue => write!(f, "getEncryptedValue"),
        }
    }
}

/// Fixed set of operations supported by the vault contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationSchema {
    operations: &'static [VaultOperation],
}

/// Schema of the metering vault contract.
pub const VAULT_SCHEMA: OperationSchema = OperationSchema {
    operations: &[
        VaultOperation::CreateGeneration,
        VaultOperation::CreateConsumption,
        VaultOperation::ReadEncryptedValue,
    ],
};

impl OperationSchema {
    /// Whether the schema lists `operation`.
    pub fn supports(&self, operation: VaultOperation) -> bool {
        self.operations.contains(&operation)
    }

    /// All operations in declaration order.
    pub fn operations(&self) -> &'static [VaultOperation] {
        self.operations
    }
}

impl Default for OperationSchema {
    fn default() -> Self {
        VAULT_SCHEMA
    }
}

/// Vault contract as seen from the currently active network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VaultDescriptor {
    /// Deployed address, `None` when the vault is not deployed on this network
    pub address: Option<VaultAddress>,
    /// Operations the vault exposes
    pub schema: OperationSchema,
}

impl VaultDescriptor {
    /// Descriptor for a network without a deployment.
    pub fn undeployed() -> Self {
        Self {
            address: None,
            schema: VAULT_SCHEMA,
        }
    }

    /// Whether writes and reads are possible at all.
    pub fn is_deployed(&self) -> bool {
        self.address.is_some()
    }

    /// Address if deployed and `operation` is part of the schema.
    pub fn address_for(&self, operation: VaultOperation) -> Option<VaultAddress> {
        self.address.filter(|_| self.schema.supports(operation))
    }
}

/// Known vault deployments keyed by network.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeploymentRegistry {
    deployments: BTreeMap<NetworkId, VaultAddress>,
}

impl DeploymentRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry, rejecting networks listed twice.
    pub fn from_entries(
        entries: impl IntoIterator<Item = (NetworkId, VaultAddress)>,
    ) -> Result<Self, CipherwattError> {
        let mut registry = Self::new();
        for (network, address) in entries {
            if registry.deployments.insert(network, address).is_some() {
                return Err(CipherwattError::invalid(format!(
                    "duplicate deployment for {network}"
                )));
            }
        }
        Ok(registry)
    }

    /// Register (or replace) the deployment for a network.
    #[must_use]
    pub fn with_deployment(mut self, network: NetworkId, address: VaultAddress) -> Self {
        self.deployments.insert(network, address);
        self
    }

    /// Derive the descriptor for `network`.
    pub fn descriptor(&self, network: Option<NetworkId>) -> VaultDescriptor {
        VaultDescriptor {
            address: network.and_then(|n| self.deployments.get(&n).copied()),
            schema: VAULT_SCHEMA,
        }
    }

    /// Number of known deployments
    pub fn len(&self) -> usize {
        self.deployments.len()
    }

    /// Whether no deployment is known
    pub fn is_empty(&self) -> bool {
        self.deployments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vault(byte: u8) -> VaultAddress {
        VaultAddress::from_bytes([byte; 20])
    }

    #[test]
    fn test_descriptor_is_deterministic() {
        let registry = DeploymentRegistry::new().with_deployment(NetworkId(11155111), vault(1));
        let first = registry.descriptor(Some(NetworkId(11155111)));
        let second = registry.descriptor(Some(NetworkId(11155111)));
        assert_eq!(first, second);
        assert_eq!(first.address, Some(vault(1)));
    }

    #[test]
    fn test_unknown_network_is_undeployed() {
        let registry = DeploymentRegistry::new().with_deployment(NetworkId(1), vault(1));
        assert!(!registry.descriptor(Some(NetworkId(2))).is_deployed());
        assert!(!registry.descriptor(None).is_deployed());
    }

    #[test]
    fn test_duplicate_entries_rejected() {
        let result = DeploymentRegistry::from_entries([
            (NetworkId(1), vault(1)),
            (NetworkId(1), vault(2)),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_schema_operations() {
        let descriptor = DeploymentRegistry::new()
            .with_deployment(NetworkId(1), vault(3))
            .descriptor(Some(NetworkId(1)));
        for op in VAULT_SCHEMA.operations() {
            assert_eq!(descriptor.address_for(*op), Some(vault(3)));
        }
        assert_eq!(VaultOperation::ReadEncryptedValue.to_string(), "getEncryptedValue");
    }
}
