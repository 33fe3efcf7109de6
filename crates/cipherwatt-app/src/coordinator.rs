//! # Vault Coordinator
//!
//! Frontend-facing facade over the submission and decryption workflows.
//! Holds the collaborators, the single-flight slots, the running totals and
//! the published [`CoordinatorStatus`].
//!
//! ## Status publication
//!
//! Status is republished after admission and after every operation ends.
//! `deployment_address` always follows the live session, so
//! [`VaultCoordinator::status_signal`] also fires on network changes.
//!
//! ```rust,ignore
//! let (session, view) = SessionContext::init(config.registry()?);
//! let coordinator = VaultCoordinator::new(view, collaborators);
//! session.connect(network, identity);
//!
//! if let Some(id) = coordinator.create_record(RecordKind::Generation, "Solar", 12.3).await?.completed() {
//!     let value = coordinator.decrypt_record(id).await?.completed();
//! }
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use cipherwatt_core::{
    DecryptEffects, EncryptionEffects, LedgerEffects, OperationId, RecordId, RecordKind,
    VaultOperation,
};
use cipherwatt_signature::SignatureManager;
use futures_signals::map_ref;
use futures_signals::signal::{Mutable, Signal};
use parking_lot::Mutex;
use tracing::{info, warn};

use crate::errors::{OperationError, OperationOutcome, Readiness};
use crate::flight::{OperationKind, SingleFlightTracker};
use crate::guard::Abort;
use crate::session::SessionView;
use crate::status::{CoordinatorStatus, StatusMessage};
use crate::totals::RunningTotals;
use crate::workflows::{decryption, submission};

/// External capabilities the coordinator drives.
#[derive(Clone)]
pub struct Collaborators {
    /// Vault contract
    pub ledger: Arc<dyn LedgerEffects>,
    /// Client-side encryption engine
    pub encryption: Arc<dyn EncryptionEffects>,
    /// Relayer decrypt capability
    pub decryptor: Arc<dyn DecryptEffects>,
    /// Decryption authorization cache and signer
    pub signatures: SignatureManager,
}

/// Client-side operation coordinator.
pub struct VaultCoordinator {
    pub(crate) session: SessionView,
    pub(crate) ledger: Arc<dyn LedgerEffects>,
    pub(crate) encryption: Arc<dyn EncryptionEffects>,
    pub(crate) decryptor: Arc<dyn DecryptEffects>,
    pub(crate) signatures: SignatureManager,
    pub(crate) flights: SingleFlightTracker,
    pub(crate) totals: Mutex<RunningTotals>,
    message: Mutex<Option<StatusMessage>>,
    status: Mutable<CoordinatorStatus>,
}

impl std::fmt::Debug for VaultCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultCoordinator")
            .field("session", &self.session.snapshot())
            .field("flights", &self.flights)
            .field("signatures", &self.signatures)
            .finish_non_exhaustive()
    }
}

impl VaultCoordinator {
    /// Create a coordinator reading the live session through `session`.
    pub fn new(session: SessionView, collaborators: Collaborators) -> Self {
        let coordinator = Self {
            session,
            ledger: collaborators.ledger,
            encryption: collaborators.encryption,
            decryptor: collaborators.decryptor,
            signatures: collaborators.signatures,
            flights: SingleFlightTracker::new(),
            totals: Mutex::new(RunningTotals::new()),
            message: Mutex::new(None),
            status: Mutable::new(CoordinatorStatus::default()),
        };
        coordinator.publish();
        coordinator
    }

    /// Live session this coordinator guards against
    pub fn session(&self) -> &SessionView {
        &self.session
    }

    /// Authorization manager used for decryption
    pub fn signatures(&self) -> &SignatureManager {
        &self.signatures
    }

    /// Encrypt `value` and store it as a new `kind` record.
    ///
    /// See [`submission::create_record`].
    pub async fn create_record(
        &self,
        kind: RecordKind,
        source: impl Into<String>,
        value: f64,
    ) -> Result<OperationOutcome<RecordId>, OperationError> {
        submission::create_record(self, kind, source.into(), value).await
    }

    /// Decrypt the value stored for `record_id`.
    ///
    /// See [`decryption::decrypt_record`].
    pub async fn decrypt_record(
        &self,
        record_id: RecordId,
    ) -> Result<OperationOutcome<f64>, OperationError> {
        decryption::decrypt_record(self, record_id).await
    }

    /// Decrypt several records under one authorization.
    ///
    /// See [`decryption::decrypt_records`].
    pub async fn decrypt_records(
        &self,
        record_ids: &[RecordId],
    ) -> Result<OperationOutcome<BTreeMap<RecordId, f64>>, OperationError> {
        decryption::decrypt_records(self, record_ids).await
    }

    /// Drop the cached decryption authorization of the active identity.
    pub async fn forget_authorization(&self) -> Result<bool, OperationError> {
        let state = self.session.state();
        let vault = state
            .descriptor
            .address_for(VaultOperation::ReadEncryptedValue)
            .ok_or(OperationError::not_ready(Readiness::Deployment))?;
        let identity = state
            .identity()
            .ok_or(OperationError::not_ready(Readiness::Identity))?;
        self.signatures
            .forget(&[vault], identity)
            .await
            .map_err(|e| OperationError::remote("forget", e))
    }

    /// Current status
    pub fn status(&self) -> CoordinatorStatus {
        self.current_status()
    }

    /// Status changes, including deployment changes from the session.
    pub fn status_signal(&self) -> impl Signal<Item = CoordinatorStatus> {
        map_ref! {
            let status = self.status.signal_cloned(),
            let session = self.session.signal() =>
            CoordinatorStatus {
                deployment_address: session.vault(),
                ..status.clone()
            }
        }
    }

    fn current_status(&self) -> CoordinatorStatus {
        let create = self.flights.state(OperationKind::Create);
        let decrypt = self.flights.state(OperationKind::Decrypt);
        let (total_generation, total_consumption) = {
            let totals = self.totals.lock();
            (totals.generation(), totals.consumption())
        };
        CoordinatorStatus {
            is_loading: create.is_running(),
            is_decrypting: decrypt.is_running(),
            decrypting_id: decrypt.target(),
            total_generation,
            total_consumption,
            deployment_address: self.session.state().vault(),
            status_message: self.message.lock().clone(),
        }
    }

    pub(crate) fn publish(&self) {
        self.status.set(self.current_status());
    }

    pub(crate) fn report(&self, message: Option<StatusMessage>) {
        *self.message.lock() = message;
        self.publish();
    }

    /// Record a failure that happened before admission.
    pub(crate) fn reject(&self, kind: OperationKind, error: OperationError) -> OperationError {
        warn!(%kind, category = %error.category(), error = %error, "Operation refused");
        self.report(Some(StatusMessage::error(error.user_message(), error.category())));
        error
    }

    /// Turn a finished pipeline into the caller-facing result.
    ///
    /// Must be called after the flight permit is dropped.
    pub(crate) fn conclude<T>(
        &self,
        kind: OperationKind,
        operation: OperationId,
        result: Result<T, Abort>,
        success: impl FnOnce(&T) -> String,
    ) -> Result<OperationOutcome<T>, OperationError> {
        match result {
            Ok(value) => {
                let text = success(&value);
                info!(%kind, %operation, message = %text, "Operation completed");
                self.report(Some(StatusMessage::info(text)));
                Ok(OperationOutcome::Completed(value))
            }
            Err(Abort::Stale { stage }) => {
                info!(%kind, %operation, stage, "Operation abandoned after session change");
                self.report(None);
                Ok(OperationOutcome::Abandoned)
            }
            Err(Abort::Failed(error)) => {
                warn!(%kind, %operation, category = %error.category(), error = %error, "Operation failed");
                self.report(Some(StatusMessage::error(error.user_message(), error.category())));
                Err(error)
            }
        }
    }
}
