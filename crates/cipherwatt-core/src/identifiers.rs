//! Core identifier types
//!
//! Opaque identifiers for networks, signing identities, vault contracts,
//! records and ciphertext handles. Byte-array identifiers render as
//! `0x`-prefixed lowercase hex and parse from the same form (the prefix is
//! optional on input).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::CipherwattError;

fn parse_hex_bytes<const N: usize>(kind: &str, s: &str) -> Result<[u8; N], CipherwattError> {
    let trimmed = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(trimmed)
        .map_err(|e| CipherwattError::invalid(format!("{kind} is not valid hex: {e}")))?;
    bytes.try_into().map_err(|b: Vec<u8>| {
        CipherwattError::invalid(format!("{kind} must be {} bytes, got {}", N, b.len()))
    })
}

macro_rules! hex_identifier {
    ($(#[$meta:meta])* $name:ident, $len:expr, $kind:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            /// Create from raw bytes
            pub const fn from_bytes(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            /// Get the raw bytes
            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{}", hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }

        impl FromStr for $name {
            type Err = CipherwattError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_hex_bytes::<$len>($kind, s).map(Self)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

hex_identifier!(
    /// Signing identity (wallet account address)
    IdentityId,
    20,
    "identity"
);

hex_identifier!(
    /// Address of a deployed vault contract on some network
    VaultAddress,
    20,
    "vault address"
);

hex_identifier!(
    /// Opaque handle referencing an encrypted value held by the ledger
    CiphertextHandle,
    32,
    "ciphertext handle"
);

hex_identifier!(
    /// Handle of a submitted write transaction
    TransactionHandle,
    32,
    "transaction handle"
);

/// Network (chain) identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkId(pub u64);

impl NetworkId {
    /// Get the numeric chain id
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "network-{}", self.0)
    }
}

impl From<u64> for NetworkId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Identifier the vault assigns to a stored record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl RecordId {
    /// Get the numeric record id
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "record-{}", self.0)
    }
}

impl From<u64> for RecordId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Correlation id attached to every coordinator operation for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationId(pub Uuid);

impl OperationId {
    /// Create a new random operation id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the inner UUID
    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for OperationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "op-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_display_and_parse() {
        let addr = VaultAddress::from_bytes([0xab; 20]);
        let rendered = addr.to_string();
        assert!(rendered.starts_with("0xabab"));
        assert_eq!(rendered.len(), 42);
        assert_eq!(rendered.parse::<VaultAddress>().unwrap(), addr);
    }

    #[test]
    fn test_parse_without_prefix() {
        let id: IdentityId = "11".repeat(20).parse().unwrap();
        assert_eq!(id, IdentityId::from_bytes([0x11; 20]));
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        let err = "0x1234".parse::<VaultAddress>().unwrap_err();
        assert!(err.to_string().contains("must be 20 bytes"));
    }

    #[test]
    fn test_parse_rejects_non_hex() {
        assert!("0xzz".parse::<CiphertextHandle>().is_err());
    }

    #[test]
    fn test_serde_uses_hex_strings() {
        let handle = CiphertextHandle::from_bytes([7; 32]);
        let json = serde_json::to_string(&handle).unwrap();
        assert_eq!(json, format!("\"0x{}\"", "07".repeat(32)));
        let back: CiphertextHandle = serde_json::from_str(&json).unwrap();
        assert_eq!(back, handle);
    }
}
