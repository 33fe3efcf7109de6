#![deny(clippy::await_holding_lock)]
//! # Cipherwatt Core - Foundation Types
//!
//! Identifiers, session snapshots, vault deployment descriptors, fixed-point
//! scaling, decryption authorization types and the collaborator effect traits
//! consumed by the operation coordinator in `cipherwatt-app`.
//!
//! This crate performs no I/O of its own; every remote or interactive
//! capability is an effect trait implemented by the host (browser bindings)
//! or by `cipherwatt-testkit`.

pub mod authorization;
pub mod deployment;
pub mod effects;
pub mod errors;
pub mod identifiers;
pub mod records;
pub mod scaling;
pub mod session;

pub use authorization::{
    AuthorizationKey, AuthorizationRequest, AuthorizationSecret, DecryptionAuthorization,
    SECONDS_PER_DAY,
};
pub use deployment::{
    DeploymentRegistry, OperationSchema, VaultDescriptor, VaultOperation, VAULT_SCHEMA,
};
pub use effects::{
    DecryptEffects, EncryptedInput, EncryptionEffects, LedgerEffects, PhysicalTimeEffects,
    ReceiptStatus, SignatureStore, SignerEffects, SignerError, SystemClock, TransactionReceipt,
    WriteCall,
};
pub use errors::{CipherwattError, Result};
pub use identifiers::{
    CiphertextHandle, IdentityId, NetworkId, OperationId, RecordId, TransactionHandle,
    VaultAddress,
};
pub use records::{Record, RecordKind};
pub use scaling::{unscale, ScaledValue, ScalingError, SCALE_FACTOR};
pub use session::SessionSnapshot;
