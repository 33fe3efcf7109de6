//! Shared fixtures
//!
//! Two networks (Sepolia with a deployed vault, Holesky without), two
//! identities and a [`TestEnvironment`] wiring every mock together.

use cipherwatt_core::{DeploymentRegistry, IdentityId, NetworkId, VaultAddress};
use std::sync::Arc;

use crate::{CiphertextBook, ControllableClock, MockDecryptor, MockEncryption, MockLedger, MockSigner};

/// Network with a vault deployment
pub const SEPOLIA: NetworkId = NetworkId(11_155_111);
/// Network without a vault deployment
pub const HOLESKY: NetworkId = NetworkId(17_000);
/// Vault deployed on [`SEPOLIA`]
pub const SEPOLIA_VAULT: VaultAddress = VaultAddress::from_bytes([0x5e; 20]);
/// First test identity
pub const ALICE: IdentityId = IdentityId::from_bytes([0xa1; 20]);
/// Second test identity
pub const BOB: IdentityId = IdentityId::from_bytes([0xb0; 20]);
/// Clock reading every environment starts at (2024-01-01T00:00:00Z)
pub const START_TIME: u64 = 1_704_067_200;

/// Identity with every byte set to `byte`
pub fn identity(byte: u8) -> IdentityId {
    IdentityId::from_bytes([byte; 20])
}

/// Vault address with every byte set to `byte`
pub fn vault(byte: u8) -> VaultAddress {
    VaultAddress::from_bytes([byte; 20])
}

/// Network id helper
pub fn network(id: u64) -> NetworkId {
    NetworkId(id)
}

/// Every mock collaborator, sharing one ciphertext book.
#[derive(Debug, Clone)]
pub struct TestEnvironment {
    /// Deployments: only [`SEPOLIA`] has a vault
    pub registry: DeploymentRegistry,
    /// Plaintexts behind produced handles
    pub book: CiphertextBook,
    /// Vault contract
    pub ledger: Arc<MockLedger>,
    /// Encryption engine
    pub encryption: Arc<MockEncryption>,
    /// Decrypt capability
    pub decryptor: Arc<MockDecryptor>,
    /// Interactive signer
    pub signer: Arc<MockSigner>,
    /// Wall clock
    pub clock: Arc<ControllableClock>,
}

impl Default for TestEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEnvironment {
    /// Fresh environment starting at [`START_TIME`]
    pub fn new() -> Self {
        let book = CiphertextBook::new();
        Self {
            registry: DeploymentRegistry::new().with_deployment(SEPOLIA, SEPOLIA_VAULT),
            ledger: Arc::new(MockLedger::new()),
            encryption: Arc::new(MockEncryption::new(book.clone())),
            decryptor: Arc::new(MockDecryptor::new(book.clone())),
            signer: Arc::new(MockSigner::new()),
            clock: Arc::new(ControllableClock::new(START_TIME)),
            book,
        }
    }
}
