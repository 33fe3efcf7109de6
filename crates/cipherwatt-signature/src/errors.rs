//! Authorization errors

use cipherwatt_core::SignerError;

/// Why a decryption authorization could not be produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthorizationError {
    /// The interactive signing step failed or was declined
    #[error("authorization unavailable: {0}")]
    Unavailable(#[from] SignerError),
    /// The signer returned something that is not a usable signature
    #[error("authorization signature invalid: {reason}")]
    InvalidSignature {
        /// What was wrong with it
        reason: String,
    },
    /// An authorization must cover at least one vault
    #[error("authorization requested for an empty resource set")]
    NoResources,
}
