//! Controllable wall clock

use cipherwatt_core::PhysicalTimeEffects;
use std::sync::atomic::{AtomicU64, Ordering};

/// Clock that only moves when the test moves it.
#[derive(Debug)]
pub struct ControllableClock {
    now: AtomicU64,
}

impl ControllableClock {
    /// Create a clock reading `start` seconds
    pub fn new(start: u64) -> Self {
        Self {
            now: AtomicU64::new(start),
        }
    }

    /// Advance by `secs` seconds
    pub fn advance_secs(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }

    /// Advance by whole days
    pub fn advance_days(&self, days: u64) {
        self.advance_secs(days * cipherwatt_core::SECONDS_PER_DAY);
    }

    /// Set the absolute time
    pub fn set(&self, secs: u64) {
        self.now.store(secs, Ordering::SeqCst);
    }
}

impl PhysicalTimeEffects for ControllableClock {
    fn now_secs(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
