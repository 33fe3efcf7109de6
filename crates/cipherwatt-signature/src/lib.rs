#![deny(clippy::await_holding_lock)]
//! # Cipherwatt Signature - Decryption Authorizations
//!
//! Everything needed to turn "the user wants to see a plaintext" into a
//! usable [`cipherwatt_core::DecryptionAuthorization`]:
//!
//! - [`keys`]: ephemeral Ed25519 key pairs for re-encryption
//! - [`manager`]: the cache-or-sign policy ([`SignatureManager`])
//! - [`store`]: in-memory and JSON-file signature stores

pub mod errors;
pub mod keys;
pub mod manager;
pub mod store;

pub use errors::AuthorizationError;
pub use keys::{generate_key_pair, key_pair_matches, EphemeralKeyPair};
pub use manager::{SignatureManager, DEFAULT_VALIDITY_DAYS};
pub use store::{opaque_key_name, FileSignatureStore, InMemorySignatureStore, CACHE_FILE_MODE};
