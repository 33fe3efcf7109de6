//! Mock vault contract

use async_trait::async_trait;
use cipherwatt_core::{
    CipherwattError, CiphertextHandle, LedgerEffects, ReceiptStatus, RecordId, TransactionHandle,
    TransactionReceipt, VaultAddress, WriteCall,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::{Gate, HookSlot};

#[derive(Debug, Default)]
struct LedgerState {
    next_record: u64,
    writes: Vec<(VaultAddress, WriteCall)>,
    pending: HashMap<TransactionHandle, (VaultAddress, WriteCall)>,
    records: HashMap<(VaultAddress, RecordId), CiphertextHandle>,
    revert_next: Option<String>,
}

/// In-memory vault that mines every write on confirmation.
#[derive(Debug)]
pub struct MockLedger {
    state: Mutex<LedgerState>,
    fail_submit: AtomicBool,
    fail_confirm: AtomicBool,
    fail_read: AtomicBool,
    submit_calls: AtomicU64,
    confirm_calls: AtomicU64,
    read_calls: AtomicU64,
    on_submit: HookSlot,
    on_confirm: HookSlot,
    on_read: HookSlot,
    confirmation_gate: Gate,
    read_gate: Gate,
}

impl Default for MockLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLedger {
    /// Create an empty ledger; record ids start at 1
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LedgerState {
                next_record: 1,
                ..LedgerState::default()
            }),
            fail_submit: AtomicBool::new(false),
            fail_confirm: AtomicBool::new(false),
            fail_read: AtomicBool::new(false),
            submit_calls: AtomicU64::new(0),
            confirm_calls: AtomicU64::new(0),
            read_calls: AtomicU64::new(0),
            on_submit: HookSlot::default(),
            on_confirm: HookSlot::default(),
            on_read: HookSlot::default(),
            confirmation_gate: Gate::new(),
            read_gate: Gate::new(),
        }
    }

    /// Seed a stored record
    pub fn insert_record(&self, vault: VaultAddress, record_id: RecordId, handle: CiphertextHandle) {
        self.state.lock().records.insert((vault, record_id), handle);
    }

    /// Make the next mined write revert with `reason`
    pub fn revert_next(&self, reason: impl Into<String>) {
        self.state.lock().revert_next = Some(reason.into());
    }

    /// Make submissions fail with a network error
    pub fn set_submit_failing(&self, fail: bool) {
        self.fail_submit.store(fail, Ordering::SeqCst);
    }

    /// Make confirmation waits fail with a network error
    pub fn set_confirm_failing(&self, fail: bool) {
        self.fail_confirm.store(fail, Ordering::SeqCst);
    }

    /// Make reads fail with a network error
    pub fn set_read_failing(&self, fail: bool) {
        self.fail_read.store(fail, Ordering::SeqCst);
    }

    /// Run `hook` inside every subsequent submission
    pub fn on_submit(&self, hook: impl Fn() + Send + Sync + 'static) {
        self.on_submit.set(hook);
    }

    /// Run `hook` inside every subsequent confirmation, after the gate
    pub fn on_confirm(&self, hook: impl Fn() + Send + Sync + 'static) {
        self.on_confirm.set(hook);
    }

    /// Run `hook` inside every subsequent read
    pub fn on_read(&self, hook: impl Fn() + Send + Sync + 'static) {
        self.on_read.set(hook);
    }

    /// Gate every confirmation wait passes through
    pub fn confirmation_gate(&self) -> &Gate {
        &self.confirmation_gate
    }

    /// Gate every read passes through
    pub fn read_gate(&self) -> &Gate {
        &self.read_gate
    }

    /// All submitted writes, in order
    pub fn writes(&self) -> Vec<(VaultAddress, WriteCall)> {
        self.state.lock().writes.clone()
    }

    /// Number of submissions
    pub fn submit_calls(&self) -> u64 {
        self.submit_calls.load(Ordering::SeqCst)
    }

    /// Number of confirmation waits
    pub fn confirm_calls(&self) -> u64 {
        self.confirm_calls.load(Ordering::SeqCst)
    }

    /// Number of reads
    pub fn read_calls(&self) -> u64 {
        self.read_calls.load(Ordering::SeqCst)
    }

    /// Total number of remote interactions of any kind
    pub fn remote_calls(&self) -> u64 {
        self.submit_calls() + self.confirm_calls() + self.read_calls()
    }
}

#[async_trait]
impl LedgerEffects for MockLedger {
    async fn submit_write(
        &self,
        vault: VaultAddress,
        call: WriteCall,
    ) -> Result<TransactionHandle, CipherwattError> {
        let sequence = self.submit_calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.on_submit.fire();
        if self.fail_submit.load(Ordering::SeqCst) {
            return Err(CipherwattError::network("rpc endpoint unreachable"));
        }

        let mut bytes = [0u8; 32];
        bytes[0] = 0x7a;
        bytes[24..].copy_from_slice(&sequence.to_be_bytes());
        let transaction = TransactionHandle::from_bytes(bytes);

        let mut state = self.state.lock();
        state.writes.push((vault, call.clone()));
        state.pending.insert(transaction, (vault, call));
        Ok(transaction)
    }

    async fn await_confirmation(
        &self,
        _vault: VaultAddress,
        transaction: TransactionHandle,
    ) -> Result<TransactionReceipt, CipherwattError> {
        self.confirm_calls.fetch_add(1, Ordering::SeqCst);
        self.confirmation_gate.pass().await;
        self.on_confirm.fire();
        if self.fail_confirm.load(Ordering::SeqCst) {
            return Err(CipherwattError::network("receipt polling timed out"));
        }

        let mut state = self.state.lock();
        let Some((vault, call)) = state.pending.remove(&transaction) else {
            return Err(CipherwattError::not_found(format!(
                "unknown transaction {transaction}"
            )));
        };
        if let Some(reason) = state.revert_next.take() {
            return Ok(TransactionReceipt {
                transaction,
                status: ReceiptStatus::Reverted {
                    reason: Some(reason),
                },
            });
        }
        let record_id = RecordId(state.next_record);
        state.next_record += 1;
        state.records.insert((vault, record_id), call.handle);
        Ok(TransactionReceipt {
            transaction,
            status: ReceiptStatus::Confirmed { record_id },
        })
    }

    async fn read_encrypted_value(
        &self,
        vault: VaultAddress,
        record_id: RecordId,
    ) -> Result<CiphertextHandle, CipherwattError> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        self.read_gate.pass().await;
        self.on_read.fire();
        if self.fail_read.load(Ordering::SeqCst) {
            return Err(CipherwattError::network("rpc endpoint unreachable"));
        }
        self.state
            .lock()
            .records
            .get(&(vault, record_id))
            .copied()
            .ok_or_else(|| CipherwattError::not_found(format!("{record_id} not found")))
    }
}
