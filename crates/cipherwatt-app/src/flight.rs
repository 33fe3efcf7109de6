//! Single-flight operation tracker
//!
//! At most one operation per [`OperationKind`] runs at a time. Admission is
//! [`SingleFlightTracker::try_acquire`]; the returned [`FlightPermit`] puts
//! the slot back to [`FlightState::Idle`] when dropped, so every exit path
//! (success, abandonment, error, unwinding) releases it.
//!
//! ```text
//!            start                      finish
//!   Idle ───────────────▶ Running ─────────────────▶ Idle
//!                            │ start
//!                            ▼
//!                   Err(AlreadyRunning)
//! ```

use std::fmt;

use cipherwatt_core::{OperationId, RecordId, SessionSnapshot};
use parking_lot::Mutex;
use tracing::debug;

/// Independent operation slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Record creation
    Create,
    /// Record decryption
    Decrypt,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Decrypt => write!(f, "decrypt"),
        }
    }
}

/// Invalid slot transition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlightError {
    /// The slot already has an operation
    #[error("operation {running} already in flight")]
    AlreadyRunning {
        /// Operation occupying the slot
        running: OperationId,
    },
}

/// State of one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlightState {
    /// Nothing in flight
    #[default]
    Idle,
    /// One operation in flight
    Running {
        /// Correlation id of the running operation
        operation: OperationId,
        /// Session the operation was admitted under
        snapshot: SessionSnapshot,
        /// Record being worked on, when there is one
        target: Option<RecordId>,
    },
}

impl FlightState {
    /// Idle → Running; fails if already running.
    pub fn start(
        self,
        operation: OperationId,
        snapshot: SessionSnapshot,
        target: Option<RecordId>,
    ) -> Result<Self, FlightError> {
        match self {
            Self::Idle => Ok(Self::Running {
                operation,
                snapshot,
                target,
            }),
            Self::Running { operation, .. } => Err(FlightError::AlreadyRunning { running: operation }),
        }
    }

    /// Any state → Idle.
    pub fn finish(self) -> Self {
        Self::Idle
    }

    /// Whether an operation is in flight
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }

    /// Record the running operation targets
    pub fn target(&self) -> Option<RecordId> {
        match self {
            Self::Running { target, .. } => *target,
            Self::Idle => None,
        }
    }

    fn operation(&self) -> Option<OperationId> {
        match self {
            Self::Running { operation, .. } => Some(*operation),
            Self::Idle => None,
        }
    }
}

/// One slot per [`OperationKind`].
#[derive(Debug, Default)]
pub struct SingleFlightTracker {
    create: Mutex<FlightState>,
    decrypt: Mutex<FlightState>,
}

impl SingleFlightTracker {
    /// Both slots idle
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, kind: OperationKind) -> &Mutex<FlightState> {
        match kind {
            OperationKind::Create => &self.create,
            OperationKind::Decrypt => &self.decrypt,
        }
    }

    /// Admit an operation of `kind`, or `None` if one is already running.
    pub fn try_acquire(
        &self,
        kind: OperationKind,
        snapshot: SessionSnapshot,
        target: Option<RecordId>,
    ) -> Option<FlightPermit<'_>> {
        let operation = OperationId::new();
        let mut slot = self.slot(kind).lock();
        match slot.start(operation, snapshot, target) {
            Ok(next) => {
                *slot = next;
                debug!(%kind, %operation, ?target, "Operation admitted");
                Some(FlightPermit {
                    tracker: self,
                    kind,
                    operation,
                })
            }
            Err(FlightError::AlreadyRunning { running }) => {
                debug!(%kind, %running, "Operation rejected: slot busy");
                None
            }
        }
    }

    /// Current state of the `kind` slot.
    pub fn state(&self, kind: OperationKind) -> FlightState {
        *self.slot(kind).lock()
    }

    /// Whether `kind` has an operation in flight.
    pub fn is_running(&self, kind: OperationKind) -> bool {
        self.state(kind).is_running()
    }

    /// Record currently being decrypted.
    pub fn decrypting_target(&self) -> Option<RecordId> {
        self.state(OperationKind::Decrypt).target()
    }

    fn release(&self, kind: OperationKind, operation: OperationId) {
        let mut slot = self.slot(kind).lock();
        if slot.operation() == Some(operation) {
            *slot = slot.finish();
            debug!(%kind, %operation, "Operation slot released");
        }
    }
}

/// Occupancy of one slot; releases it on drop.
#[must_use = "the slot is released as soon as the permit is dropped"]
#[derive(Debug)]
pub struct FlightPermit<'a> {
    tracker: &'a SingleFlightTracker,
    kind: OperationKind,
    operation: OperationId,
}

impl FlightPermit<'_> {
    /// Slot this permit occupies
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// Correlation id of the admitted operation
    pub fn operation(&self) -> OperationId {
        self.operation
    }
}

impl Drop for FlightPermit<'_> {
    fn drop(&mut self) {
        self.tracker.release(self.kind, self.operation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cipherwatt_testkit::{ALICE, SEPOLIA};

    fn snapshot() -> SessionSnapshot {
        SessionSnapshot::connected(SEPOLIA, ALICE)
    }

    #[test]
    fn test_state_transitions_are_total() {
        let op = OperationId::new();
        let running = FlightState::Idle.start(op, snapshot(), None).unwrap();
        assert!(running.is_running());
        assert_eq!(
            running.start(OperationId::new(), snapshot(), None),
            Err(FlightError::AlreadyRunning { running: op })
        );
        assert_eq!(running.finish(), FlightState::Idle);
        assert_eq!(FlightState::Idle.finish(), FlightState::Idle);
    }

    #[test]
    fn test_second_acquire_of_same_kind_rejected() {
        let tracker = SingleFlightTracker::new();
        let permit = tracker.try_acquire(OperationKind::Create, snapshot(), None);
        assert!(permit.is_some());
        assert!(tracker
            .try_acquire(OperationKind::Create, snapshot(), None)
            .is_none());
        assert!(tracker.is_running(OperationKind::Create));
    }

    #[test]
    fn test_kinds_are_independent() {
        let tracker = SingleFlightTracker::new();
        let _create = tracker
            .try_acquire(OperationKind::Create, snapshot(), None)
            .unwrap();
        let _decrypt = tracker
            .try_acquire(OperationKind::Decrypt, snapshot(), Some(RecordId(7)))
            .unwrap();
        assert_eq!(tracker.decrypting_target(), Some(RecordId(7)));
    }

    #[test]
    fn test_drop_releases_slot() {
        let tracker = SingleFlightTracker::new();
        let permit = tracker
            .try_acquire(OperationKind::Decrypt, snapshot(), Some(RecordId(1)))
            .unwrap();
        drop(permit);
        assert_eq!(tracker.state(OperationKind::Decrypt), FlightState::Idle);
        assert_eq!(tracker.decrypting_target(), None);
        assert!(tracker
            .try_acquire(OperationKind::Decrypt, snapshot(), None)
            .is_some());
    }

    #[test]
    fn test_unwinding_releases_slot() {
        let tracker = SingleFlightTracker::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _permit = tracker
                .try_acquire(OperationKind::Create, snapshot(), None)
                .unwrap();
            panic!("collaborator blew up");
        }));
        assert!(result.is_err());
        assert!(!tracker.is_running(OperationKind::Create));
    }
}
