//! Encrypted Submission Workflow
//!
//! Scales a reading, encrypts it for the active vault and identity, submits
//! the kind-specific write and waits for it to be mined. Totals only move
//! when the receipt arrives while the session is unchanged.
//!
//! ```text
//! readiness ─▶ validate ─▶ admit(Create)
//!   ─▶ encrypt ─[check]─▶ submit ─[check]─▶ confirm ─[check]─▶ totals += value
//! ```

use cipherwatt_core::{
    IdentityId, ReceiptStatus, RecordId, RecordKind, ScaledValue, VaultAddress, WriteCall,
};
use futures::TryFutureExt;
use tracing::{debug, info};

use crate::coordinator::VaultCoordinator;
use crate::errors::{OperationError, OperationOutcome, Readiness, ValidationError};
use crate::flight::OperationKind;
use crate::guard::{Abort, StalenessGuard};
use crate::session::SessionState;
use crate::status::StatusMessage;

/// Validated arguments of one submission.
#[derive(Debug, Clone)]
struct Submission {
    kind: RecordKind,
    source: String,
    reading: f64,
    value: ScaledValue,
    vault: VaultAddress,
    identity: IdentityId,
}

/// Create a record
///
/// **What it does**: Encrypts `value` and writes it to the vault as a `kind`
/// record labelled `source`
/// **Returns**: The record id the vault assigned, `Busy` if a create is
/// already running, `Abandoned` if the session changed mid-flight
/// **Errors**: `NotReady` and `Validation` before any remote call;
/// `RemoteUnavailable` or `RemoteRejection` from the ledger
pub async fn create_record(
    coordinator: &VaultCoordinator,
    kind: RecordKind,
    source: String,
    value: f64,
) -> Result<OperationOutcome<RecordId>, OperationError> {
    let state = coordinator.session.state();
    let submission = prepare(coordinator, &state, kind, source, value)
        .map_err(|e| coordinator.reject(OperationKind::Create, e))?;

    let Some(permit) = coordinator
        .flights
        .try_acquire(OperationKind::Create, state.snapshot, None)
    else {
        return Ok(OperationOutcome::Busy);
    };
    let operation = permit.operation();
    info!(
        %operation,
        %kind,
        source = %submission.source,
        value = %submission.value,
        "Creating record"
    );
    coordinator.report(Some(StatusMessage::info(format!("Submitting {kind} reading"))));

    let guard = StalenessGuard::anchored(&coordinator.session, state.snapshot);
    let result = submit(coordinator, &guard, submission).await;
    drop(permit);

    coordinator.conclude(OperationKind::Create, operation, result, |record_id| {
        format!("Stored {kind} {record_id}")
    })
}

fn prepare(
    coordinator: &VaultCoordinator,
    state: &SessionState,
    kind: RecordKind,
    source: String,
    value: f64,
) -> Result<Submission, OperationError> {
    let vault = state
        .descriptor
        .address_for(kind.write_operation())
        .ok_or(OperationError::not_ready(Readiness::Deployment))?;
    let identity = state
        .identity()
        .ok_or(OperationError::not_ready(Readiness::Identity))?;
    if !coordinator.encryption.is_ready() {
        return Err(OperationError::not_ready(Readiness::Encryption));
    }

    let scaled = ScaledValue::from_decimal(value).map_err(ValidationError::from)?;
    if source.trim().is_empty() {
        return Err(ValidationError::EmptySource.into());
    }

    Ok(Submission {
        kind,
        source,
        reading: value,
        value: scaled,
        vault,
        identity,
    })
}

async fn submit(
    coordinator: &VaultCoordinator,
    guard: &StalenessGuard<'_>,
    submission: Submission,
) -> Result<RecordId, Abort> {
    let Submission {
        kind,
        source,
        reading,
        value,
        vault,
        identity,
    } = submission;

    let input = guard
        .step(
            "encrypt",
            coordinator
                .encryption
                .build_encrypted_input(vault, identity, value)
                .map_err(|e| OperationError::remote("encrypt", e)),
        )
        .await?;
    debug!(handle = %input.handle, proof_len = input.proof.len(), "Encrypted input ready");

    let transaction = guard
        .step(
            "submit",
            coordinator
                .ledger
                .submit_write(vault, WriteCall::create(kind, source, input))
                .map_err(|e| OperationError::remote("submit", e)),
        )
        .await?;
    debug!(%transaction, "Write submitted");

    let receipt = guard
        .step(
            "confirm",
            coordinator
                .ledger
                .await_confirmation(vault, transaction)
                .map_err(|e| OperationError::remote("confirm", e)),
        )
        .await?;

    match receipt.status {
        ReceiptStatus::Confirmed { record_id } => {
            let applied = coordinator
                .totals
                .lock()
                .apply(kind, receipt.transaction, reading);
            if !applied {
                debug!(transaction = %receipt.transaction, "Confirmation already applied");
            }
            Ok(record_id)
        }
        ReceiptStatus::Reverted { reason } => Err(Abort::Failed(OperationError::RemoteRejection {
            transaction: receipt.transaction,
            reason,
        })),
    }
}
