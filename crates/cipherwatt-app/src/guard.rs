//! Staleness guard
//!
//! Captures the session at admission and re-reads the live session after
//! every suspension point. Each pipeline stage runs through
//! [`StalenessGuard::step`]: the collaborator call is awaited, then the
//! session is compared with the captured snapshot. Once it differs, the
//! operation stops with [`Abort::Stale`] and nothing further is applied.
//!
//! A collaborator failure observed after the session changed is also treated
//! as stale; the failure belongs to a context the user has already left.

use std::future::Future;

use cipherwatt_core::SessionSnapshot;
use tracing::debug;

use crate::errors::OperationError;
use crate::session::SessionView;

/// Why a guarded pipeline stopped early.
#[derive(Debug, Clone)]
pub enum Abort {
    /// Session changed; discard silently
    Stale {
        /// Checkpoint that noticed the change
        stage: &'static str,
    },
    /// A stage failed against the still-current session
    Failed(OperationError),
}

impl From<OperationError> for Abort {
    fn from(error: OperationError) -> Self {
        Self::Failed(error)
    }
}

/// Session snapshot plus a live view to compare it against.
#[derive(Debug, Clone)]
pub struct StalenessGuard<'a> {
    session: &'a SessionView,
    captured: SessionSnapshot,
}

impl<'a> StalenessGuard<'a> {
    /// Capture the current session.
    pub fn capture(session: &'a SessionView) -> Self {
        Self::anchored(session, session.snapshot())
    }

    /// Guard against a snapshot the caller already read.
    pub fn anchored(session: &'a SessionView, captured: SessionSnapshot) -> Self {
        Self { session, captured }
    }

    /// Snapshot taken at capture time
    pub fn captured(&self) -> SessionSnapshot {
        self.captured
    }

    /// Whether the live session still equals the captured one
    pub fn is_current(&self) -> bool {
        self.session.is_current(&self.captured)
    }

    /// Fail with [`Abort::Stale`] if the session moved.
    pub fn checkpoint(&self, stage: &'static str) -> Result<(), Abort> {
        if self.is_current() {
            Ok(())
        } else {
            debug!(
                stage,
                captured = %self.captured,
                live = %self.session.snapshot(),
                "Session changed; abandoning operation"
            );
            Err(Abort::Stale { stage })
        }
    }

    /// Await `stage`, then checkpoint.
    pub async fn step<T, F>(&self, stage: &'static str, stage_future: F) -> Result<T, Abort>
    where
        F: Future<Output = Result<T, OperationError>>,
    {
        let result = stage_future.await;
        self.checkpoint(stage)?;
        result.map_err(Abort::Failed)
    }
}
