//! Collaborator failures
//!
//! The ledger, the encryption engine, the decryption relayer, the wallet
//! signer and the signature cache all fail through [`CipherwattError`]. The
//! application layer attaches the pipeline stage and decides what the user
//! sees.

use serde::{Deserialize, Serialize};

/// Why a collaborator call did not produce a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum CipherwattError {
    /// Malformed address, handle or deployment entry
    #[error("invalid: {message}")]
    Invalid {
        /// What was rejected
        message: String,
    },

    /// Record, handle or receipt unknown to the ledger or relayer
    #[error("not found: {message}")]
    NotFound {
        /// What was looked up
        message: String,
    },

    /// Encryption or re-encryption failed
    #[error("crypto failure: {message}")]
    Crypto {
        /// Engine or relayer detail
        message: String,
    },

    /// RPC endpoint or relayer unreachable
    #[error("network unavailable: {message}")]
    Network {
        /// Transport detail
        message: String,
    },

    /// Signature cache document could not be encoded or decoded
    #[error("cache encoding failed: {message}")]
    Serialization {
        /// Codec detail
        message: String,
    },

    /// Signature cache could not be read or written
    #[error("cache storage failed: {message}")]
    Storage {
        /// I/O detail
        message: String,
    },
}

impl CipherwattError {
    /// Rejected input.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Unknown record or handle.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Encryption engine or relayer crypto failure.
    pub fn crypto(message: impl Into<String>) -> Self {
        Self::Crypto {
            message: message.into(),
        }
    }

    /// Unreachable endpoint.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }
}

/// Result of a collaborator call
pub type Result<T> = std::result::Result<T, CipherwattError>;

impl From<serde_json::Error> for CipherwattError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for CipherwattError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::not_found(err.to_string()),
            _ => Self::Storage {
                message: err.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_the_failure() {
        let err = CipherwattError::invalid("vault address too short");
        assert_eq!(err.to_string(), "invalid: vault address too short");
        assert_eq!(
            CipherwattError::network("rpc down").to_string(),
            "network unavailable: rpc down"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        assert!(matches!(
            CipherwattError::from(io_err),
            CipherwattError::NotFound { .. }
        ));

        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        assert!(matches!(
            CipherwattError::from(io_err),
            CipherwattError::Storage { .. }
        ));
    }

    #[test]
    fn test_cache_decode_failure_is_serialization() {
        let err = serde_json::from_str::<u32>("not json").unwrap_err();
        assert!(matches!(
            CipherwattError::from(err),
            CipherwattError::Serialization { .. }
        ));
    }
}
