//! Collaborator effect traits
//!
//! The coordinator never talks to the ledger, the encryption engine, the
//! relayer or the wallet directly. Each of these is an effect trait so hosts
//! can plug in browser bindings and tests can plug in deterministic mocks.
//!
//! # Effect Classification
//!
//! - **Remote**: [`LedgerEffects`], [`DecryptEffects`]
//! - **Local capability**: [`EncryptionEffects`], [`SignerEffects`]
//! - **Infrastructure**: [`SignatureStore`], [`PhysicalTimeEffects`]

pub mod decrypt;
pub mod encryption;
pub mod ledger;
pub mod signer;
pub mod time;

pub use decrypt::DecryptEffects;
pub use encryption::{EncryptedInput, EncryptionEffects};
pub use ledger::{LedgerEffects, ReceiptStatus, TransactionReceipt, WriteCall};
pub use signer::{SignatureStore, SignerEffects, SignerError};
pub use time::{PhysicalTimeEffects, SystemClock};
