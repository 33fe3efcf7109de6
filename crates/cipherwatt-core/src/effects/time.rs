//! Wall-clock time effects

use std::time::{SystemTime, UNIX_EPOCH};

/// Wall-clock source used for authorization validity windows.
pub trait PhysicalTimeEffects: Send + Sync {
    /// Current Unix timestamp in seconds.
    fn now_secs(&self) -> u64;
}

/// Clock backed by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl PhysicalTimeEffects for SystemClock {
    fn now_secs(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_past_2023() {
        assert!(SystemClock.now_secs() > 1_672_531_200);
    }
}
