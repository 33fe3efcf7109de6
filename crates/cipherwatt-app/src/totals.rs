//! Running aggregate totals
//!
//! Each confirmed creation adds its validated reading once. Duplicate
//! receipts are recognised against a bounded window of recently applied
//! transactions.

use std::collections::VecDeque;

use cipherwatt_core::{RecordKind, TransactionHandle};

/// Number of recently applied transactions remembered for deduplication.
pub const RECENT_TRANSACTIONS: usize = 64;

/// Generation and consumption sums over confirmed creations.
#[derive(Debug, Clone, Default)]
pub struct RunningTotals {
    generation: f64,
    consumption: f64,
    recent: VecDeque<TransactionHandle>,
    applied: u64,
}

impl RunningTotals {
    /// Zero totals
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `value` for a confirmed `transaction`.
    ///
    /// Returns `false` without changing anything if the transaction is among
    /// the last [`RECENT_TRANSACTIONS`] applied.
    pub fn apply(&mut self, kind: RecordKind, transaction: TransactionHandle, value: f64) -> bool {
        if self.recent.contains(&transaction) {
            return false;
        }
        if self.recent.len() == RECENT_TRANSACTIONS {
            self.recent.pop_front();
        }
        self.recent.push_back(transaction);
        self.applied += 1;

        match kind {
            RecordKind::Generation => self.generation += value,
            RecordKind::Consumption => self.consumption += value,
        }
        true
    }

    /// Sum of generation readings
    pub fn generation(&self) -> f64 {
        self.generation
    }

    /// Sum of consumption readings
    pub fn consumption(&self) -> f64 {
        self.consumption
    }

    /// Number of transactions applied
    pub fn applied_count(&self) -> u64 {
        self.applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tx(n: u64) -> TransactionHandle {
        let mut bytes = [0u8; 32];
        bytes[..8].copy_from_slice(&n.to_be_bytes());
        TransactionHandle::from_bytes(bytes)
    }

    #[test]
    fn test_duplicate_confirmation_applied_once() {
        let mut totals = RunningTotals::new();
        assert!(totals.apply(RecordKind::Generation, tx(1), 12.3));
        assert!(!totals.apply(RecordKind::Generation, tx(1), 12.3));
        assert_eq!(totals.generation(), 12.3);
        assert_eq!(totals.consumption(), 0.0);
        assert_eq!(totals.applied_count(), 1);
    }

    #[test]
    fn test_kinds_accumulate_separately() {
        let mut totals = RunningTotals::new();
        totals.apply(RecordKind::Generation, tx(1), 1.5);
        totals.apply(RecordKind::Consumption, tx(2), 4.5);
        totals.apply(RecordKind::Consumption, tx(3), 3.25);
        assert_eq!(totals.generation(), 1.5);
        assert_eq!(totals.consumption(), 7.75);
    }

    #[test]
    fn test_dedupe_window_is_bounded() {
        let mut totals = RunningTotals::new();
        for n in 0..(RECENT_TRANSACTIONS as u64 * 3) {
            assert!(totals.apply(RecordKind::Generation, tx(n), 1.0));
        }
        assert_eq!(totals.recent.len(), RECENT_TRANSACTIONS);

        let last = RECENT_TRANSACTIONS as u64 * 3 - 1;
        assert!(!totals.apply(RecordKind::Generation, tx(last), 1.0));
        assert_eq!(totals.applied_count(), RECENT_TRANSACTIONS as u64 * 3);
    }

    proptest! {
        #[test]
        fn prop_replayed_receipts_never_double_count(
            raws in proptest::collection::vec(0u32..100_000, 1..50),
        ) {
            let mut totals = RunningTotals::new();
            let mut expected = 0.0;
            for (i, raw) in raws.iter().enumerate() {
                let value = f64::from(*raw) / 10.0;
                expected += value;
                prop_assert!(totals.apply(RecordKind::Consumption, tx(i as u64), value));
                prop_assert!(!totals.apply(RecordKind::Consumption, tx(i as u64), value));
            }
            prop_assert_eq!(totals.consumption(), expected);
            prop_assert_eq!(totals.applied_count(), raws.len() as u64);
        }
    }
}
