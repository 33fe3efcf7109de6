//! Coordinator workflows
//!
//! Each workflow is a free function over a [`VaultCoordinator`]: readiness
//! checks, single-flight admission, then a pipeline of guarded stages.
//!
//! [`VaultCoordinator`]: crate::coordinator::VaultCoordinator

pub mod decryption;
pub mod submission;

pub use decryption::{decrypt_record, decrypt_records};
pub use submission::create_record;
