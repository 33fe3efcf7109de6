//! Decryption Workflow
//!
//! Reads the ciphertext handle stored for a record, makes sure a usable
//! decryption authorization exists for the vault, asks the relayer for the
//! plaintext and undoes fixed-point scaling.
//!
//! ```text
//! readiness ─▶ admit(Decrypt, record)
//!   ─▶ read ─[check]─▶ authorize ─[check]─▶ decrypt ─[check]─▶ raw / 10
//! ```

use std::collections::{BTreeMap, BTreeSet};

use cipherwatt_core::{
    unscale, CipherwattError, CiphertextHandle, IdentityId, RecordId, VaultAddress,
    VaultOperation,
};
use futures::TryFutureExt;
use tracing::{debug, info};

use crate::coordinator::VaultCoordinator;
use crate::errors::{OperationError, OperationOutcome, Readiness};
use crate::flight::OperationKind;
use crate::guard::{Abort, StalenessGuard};
use crate::session::SessionState;
use crate::status::StatusMessage;

fn prerequisites(state: &SessionState) -> Result<(VaultAddress, IdentityId), OperationError> {
    let vault = state
        .descriptor
        .address_for(VaultOperation::ReadEncryptedValue)
        .ok_or(OperationError::not_ready(Readiness::Deployment))?;
    let identity = state
        .identity()
        .ok_or(OperationError::not_ready(Readiness::Identity))?;
    Ok((vault, identity))
}

/// Decrypt one record
///
/// **What it does**: Reveals the value stored for `record_id`, prompting the
/// identity for an authorization signature only when no cached one fits
/// **Returns**: The decimal value, `Busy` if a decrypt is already running,
/// `Abandoned` if the session changed mid-flight
/// **Errors**: `NotReady`; `RemoteUnavailable` from the ledger or relayer;
/// `Authorization` if signing was declined
pub async fn decrypt_record(
    coordinator: &VaultCoordinator,
    record_id: RecordId,
) -> Result<OperationOutcome<f64>, OperationError> {
    let state = coordinator.session.state();
    let (vault, identity) =
        prerequisites(&state).map_err(|e| coordinator.reject(OperationKind::Decrypt, e))?;

    let Some(permit) =
        coordinator
            .flights
            .try_acquire(OperationKind::Decrypt, state.snapshot, Some(record_id))
    else {
        return Ok(OperationOutcome::Busy);
    };
    let operation = permit.operation();
    info!(%operation, %record_id, "Decrypting record");
    coordinator.report(Some(StatusMessage::info(format!("Decrypting {record_id}"))));

    let guard = StalenessGuard::anchored(&coordinator.session, state.snapshot);
    let result = reveal(coordinator, &guard, record_id, vault, identity).await;
    drop(permit);

    coordinator.conclude(OperationKind::Decrypt, operation, result, |value| {
        format!("Decrypted {record_id}: {value}")
    })
}

async fn reveal(
    coordinator: &VaultCoordinator,
    guard: &StalenessGuard<'_>,
    record_id: RecordId,
    vault: VaultAddress,
    identity: IdentityId,
) -> Result<f64, Abort> {
    let handle = read_handle(coordinator, guard, vault, record_id).await?;

    let authorization = guard
        .step(
            "authorize",
            coordinator
                .signatures
                .ensure_authorization(&[vault], identity)
                .map_err(OperationError::from),
        )
        .await?;

    let raw = guard
        .step(
            "decrypt",
            coordinator
                .decryptor
                .decrypt(handle, vault, &authorization)
                .map_err(|e| OperationError::remote("decrypt", e)),
        )
        .await?;

    Ok(unscale(raw))
}

async fn read_handle(
    coordinator: &VaultCoordinator,
    guard: &StalenessGuard<'_>,
    vault: VaultAddress,
    record_id: RecordId,
) -> Result<CiphertextHandle, Abort> {
    let handle = guard
        .step(
            "read",
            coordinator
                .ledger
                .read_encrypted_value(vault, record_id)
                .map_err(|e| OperationError::remote("read", e)),
        )
        .await?;
    debug!(%record_id, %handle, "Read encrypted value");
    Ok(handle)
}

/// Decrypt several records
///
/// **What it does**: Reads every handle, obtains one authorization for the
/// vault and decrypts all handles in a single batched relayer call
/// **Returns**: Values keyed by record id; duplicates in `record_ids` are
/// decrypted once. Shares the decrypt slot with [`decrypt_record`]
/// **Errors**: As [`decrypt_record`]
pub async fn decrypt_records(
    coordinator: &VaultCoordinator,
    record_ids: &[RecordId],
) -> Result<OperationOutcome<BTreeMap<RecordId, f64>>, OperationError> {
    let state = coordinator.session.state();
    let (vault, identity) =
        prerequisites(&state).map_err(|e| coordinator.reject(OperationKind::Decrypt, e))?;

    let ids: BTreeSet<RecordId> = record_ids.iter().copied().collect();
    if ids.is_empty() {
        return Ok(OperationOutcome::Completed(BTreeMap::new()));
    }
    let target = match ids.len() {
        1 => ids.first().copied(),
        _ => None,
    };

    let Some(permit) = coordinator
        .flights
        .try_acquire(OperationKind::Decrypt, state.snapshot, target)
    else {
        return Ok(OperationOutcome::Busy);
    };
    let operation = permit.operation();
    info!(%operation, records = ids.len(), "Decrypting records");
    coordinator.report(Some(StatusMessage::info(format!(
        "Decrypting {} records",
        ids.len()
    ))));

    let guard = StalenessGuard::anchored(&coordinator.session, state.snapshot);
    let result = reveal_batch(coordinator, &guard, &ids, vault, identity).await;
    drop(permit);

    coordinator.conclude(OperationKind::Decrypt, operation, result, |values| {
        format!("Decrypted {} records", values.len())
    })
}

async fn reveal_batch(
    coordinator: &VaultCoordinator,
    guard: &StalenessGuard<'_>,
    ids: &BTreeSet<RecordId>,
    vault: VaultAddress,
    identity: IdentityId,
) -> Result<BTreeMap<RecordId, f64>, Abort> {
    let mut handles = Vec::with_capacity(ids.len());
    for record_id in ids {
        handles.push((*record_id, read_handle(coordinator, guard, vault, *record_id).await?));
    }

    let authorization = guard
        .step(
            "authorize",
            coordinator
                .signatures
                .ensure_authorization(&[vault], identity)
                .map_err(OperationError::from),
        )
        .await?;

    let pairs: Vec<(CiphertextHandle, VaultAddress)> =
        handles.iter().map(|(_, handle)| (*handle, vault)).collect();
    let plaintexts = guard
        .step(
            "decrypt",
            coordinator
                .decryptor
                .decrypt_batch(&pairs, &authorization)
                .map_err(|e| OperationError::remote("decrypt", e)),
        )
        .await?;

    handles
        .into_iter()
        .map(|(record_id, handle)| match plaintexts.get(&handle) {
            Some(raw) => Ok((record_id, unscale(*raw))),
            None => Err(Abort::Failed(OperationError::remote(
                "decrypt",
                CipherwattError::not_found(format!("relayer returned no plaintext for {record_id}")),
            ))),
        })
        .collect()
}
