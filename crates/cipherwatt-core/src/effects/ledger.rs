//! Remote ledger (vault contract) effects

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::deployment::VaultOperation;
use crate::effects::encryption::EncryptedInput;
use crate::identifiers::{CiphertextHandle, RecordId, TransactionHandle, VaultAddress};
use crate::records::RecordKind;
use crate::CipherwattError;

/// Arguments of a vault write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteCall {
    /// Contract method to invoke
    pub operation: VaultOperation,
    /// Source label stored in clear next to the ciphertext
    pub source: String,
    /// Encrypted value handle
    pub handle: CiphertextHandle,
    /// Input proof accompanying the handle
    pub proof: Vec<u8>,
}

impl WriteCall {
    /// Build the write for a record kind from an encrypted input.
    pub fn create(kind: RecordKind, source: impl Into<String>, input: EncryptedInput) -> Self {
        Self {
            operation: kind.write_operation(),
            source: source.into(),
            handle: input.handle,
            proof: input.proof,
        }
    }
}

/// Final state of a mined write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReceiptStatus {
    /// Executed successfully; the vault assigned `record_id`
    Confirmed {
        /// Identifier of the stored record
        record_id: RecordId,
    },
    /// Reverted by the contract
    Reverted {
        /// Revert reason, if the node reported one
        reason: Option<String>,
    },
}

/// Receipt returned once a write is mined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    /// Transaction this receipt belongs to
    pub transaction: TransactionHandle,
    /// Outcome
    pub status: ReceiptStatus,
}

impl TransactionReceipt {
    /// Record id if the write succeeded.
    pub fn record_id(&self) -> Option<RecordId> {
        match self.status {
            ReceiptStatus::Confirmed { record_id } => Some(record_id),
            ReceiptStatus::Reverted { .. } => None,
        }
    }
}

/// Remote vault contract.
#[async_trait]
pub trait LedgerEffects: Send + Sync {
    /// Submit a write and return its transaction handle without waiting for it.
    async fn submit_write(
        &self,
        vault: VaultAddress,
        call: WriteCall,
    ) -> Result<TransactionHandle, CipherwattError>;

    /// Wait until the transaction is mined.
    async fn await_confirmation(
        &self,
        vault: VaultAddress,
        transaction: TransactionHandle,
    ) -> Result<TransactionReceipt, CipherwattError>;

    /// Read-only call returning the ciphertext handle stored for a record.
    async fn read_encrypted_value(
        &self,
        vault: VaultAddress,
        record_id: RecordId,
    ) -> Result<CiphertextHandle, CipherwattError>;
}
