//! Record types
//!
//! The local, caller-owned view of a metering record. The vault only stores
//! the ciphertext; the plaintext value is known to the client until the page
//! is reloaded and afterwards only through decryption.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::deployment::VaultOperation;
use crate::identifiers::RecordId;

/// Direction of an energy reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    /// Energy produced (solar, wind, ...)
    Generation,
    /// Energy drawn (household, EV charging, ...)
    Consumption,
}

impl RecordKind {
    /// Vault write operation storing this kind of record.
    pub fn write_operation(&self) -> VaultOperation {
        match self {
            Self::Generation => VaultOperation::CreateGeneration,
            Self::Consumption => VaultOperation::CreateConsumption,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generation => write!(f, "generation"),
            Self::Consumption => write!(f, "consumption"),
        }
    }
}

/// Caller-side view of a stored record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Identifier assigned by the vault
    pub id: RecordId,
    /// Generation or consumption
    pub kind: RecordKind,
    /// Free-form source label ("Solar", "Heat pump", ...)
    pub source: String,
    /// Plaintext value, `None` until decrypted
    pub value: Option<f64>,
    /// Unix timestamp (seconds) of the reading
    pub timestamp: u64,
    /// Whether the stored value is encrypted on the ledger
    pub encrypted: bool,
}

impl Record {
    /// Record whose value is only known as ciphertext.
    pub fn sealed(id: RecordId, kind: RecordKind, source: impl Into<String>, timestamp: u64) -> Self {
        Self {
            id,
            kind,
            source: source.into(),
            value: None,
            timestamp,
            encrypted: true,
        }
    }

    /// Attach a decrypted value.
    #[must_use]
    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    /// Whether the plaintext is known locally.
    pub fn is_revealed(&self) -> bool {
        self.value.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_maps_to_write_operation() {
        assert_eq!(
            RecordKind::Generation.write_operation(),
            VaultOperation::CreateGeneration
        );
        assert_eq!(
            RecordKind::Consumption.write_operation(),
            VaultOperation::CreateConsumption
        );
    }

    #[test]
    fn test_sealed_record_reveal() {
        let record = Record::sealed(RecordId(4), RecordKind::Generation, "Solar", 1_700_000_000);
        assert!(!record.is_revealed());
        let record = record.with_value(42.7);
        assert!(record.is_revealed());
        assert!(record.encrypted);
    }
}
