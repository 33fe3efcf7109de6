//! Cache-or-sign behaviour of the signature manager.

use std::sync::Arc;

use assert_matches::assert_matches;
use cipherwatt_core::{
    AuthorizationKey, AuthorizationSecret, SignatureStore, SignerError, SECONDS_PER_DAY,
};
use cipherwatt_signature::{
    AuthorizationError, FileSignatureStore, InMemorySignatureStore, SignatureManager,
    DEFAULT_VALIDITY_DAYS,
};
use cipherwatt_testkit::{vault, ControllableClock, MockSigner, ALICE, BOB, START_TIME};

struct Fixture {
    store: Arc<InMemorySignatureStore>,
    signer: Arc<MockSigner>,
    clock: Arc<ControllableClock>,
    manager: SignatureManager,
}

fn fixture() -> Fixture {
    let store = Arc::new(InMemorySignatureStore::new());
    let signer = Arc::new(MockSigner::new());
    let clock = Arc::new(ControllableClock::new(START_TIME));
    let manager = SignatureManager::new(store.clone(), signer.clone(), clock.clone());
    Fixture {
        store,
        signer,
        clock,
        manager,
    }
}

#[tokio::test]
async fn test_first_request_signs_and_caches() {
    let f = fixture();
    let auth = f
        .manager
        .ensure_authorization(&[vault(1)], ALICE)
        .await
        .unwrap();

    assert_eq!(f.signer.calls(), 1);
    assert_eq!(auth.valid_from, START_TIME);
    assert_eq!(auth.valid_duration_days, DEFAULT_VALIDITY_DAYS);
    assert_eq!(auth.identity_id, ALICE);
    assert_eq!(auth.authorized_resources, vec![vault(1)]);
    assert!(!auth.signature.is_empty());
    assert_eq!(f.store.len(), 1);

    let request = &f.signer.requests()[0];
    assert_eq!(request.public_key, auth.public_key);
    assert_eq!(request.valid_from, START_TIME);
}

#[tokio::test]
async fn test_valid_cached_authorization_is_reused() {
    let f = fixture();
    let first = f
        .manager
        .ensure_authorization(&[vault(1), vault(2)], ALICE)
        .await
        .unwrap();

    f.clock.advance_days(3);
    let second = f
        .manager
        .ensure_authorization(&[vault(2), vault(1)], ALICE)
        .await
        .unwrap();

    assert_eq!(f.signer.calls(), 1);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_reuse_at_exact_window_end() {
    let f = fixture();
    f.manager
        .ensure_authorization(&[vault(1)], ALICE)
        .await
        .unwrap();

    f.clock
        .advance_secs(u64::from(DEFAULT_VALIDITY_DAYS) * SECONDS_PER_DAY);
    f.manager
        .ensure_authorization(&[vault(1)], ALICE)
        .await
        .unwrap();
    assert_eq!(f.signer.calls(), 1);
}

#[tokio::test]
async fn test_expired_authorization_triggers_one_new_signature() {
    let f = fixture();
    let first = f
        .manager
        .ensure_authorization(&[vault(1)], ALICE)
        .await
        .unwrap();

    f.clock
        .advance_secs(u64::from(DEFAULT_VALIDITY_DAYS) * SECONDS_PER_DAY + 1);
    let second = f
        .manager
        .ensure_authorization(&[vault(1)], ALICE)
        .await
        .unwrap();

    assert_eq!(f.signer.calls(), 2);
    assert_ne!(first.public_key, second.public_key);
    assert!(second.valid_from > first.valid_from);

    // The refreshed entry replaced the stale one.
    f.manager
        .ensure_authorization(&[vault(1)], ALICE)
        .await
        .unwrap();
    assert_eq!(f.signer.calls(), 2);
}

#[tokio::test]
async fn test_not_yet_valid_authorization_is_regenerated() {
    let f = fixture();
    f.manager
        .ensure_authorization(&[vault(1)], ALICE)
        .await
        .unwrap();

    // Clock moved backwards past valid_from.
    f.clock.set(START_TIME - 60);
    f.manager
        .ensure_authorization(&[vault(1)], ALICE)
        .await
        .unwrap();
    assert_eq!(f.signer.calls(), 2);
}

#[tokio::test]
async fn test_different_resource_set_signs_again() {
    let f = fixture();
    f.manager
        .ensure_authorization(&[vault(1)], ALICE)
        .await
        .unwrap();
    f.manager
        .ensure_authorization(&[vault(1), vault(2)], ALICE)
        .await
        .unwrap();
    assert_eq!(f.signer.calls(), 2);
}

#[tokio::test]
async fn test_identities_do_not_share_authorizations() {
    let f = fixture();
    f.manager
        .ensure_authorization(&[vault(1)], ALICE)
        .await
        .unwrap();
    let bob = f
        .manager
        .ensure_authorization(&[vault(1)], BOB)
        .await
        .unwrap();
    assert_eq!(bob.identity_id, BOB);
    assert_eq!(f.signer.calls(), 2);
}

#[tokio::test]
async fn test_mismatched_cached_entry_is_replaced() {
    let f = fixture();
    let mut tampered = f
        .manager
        .ensure_authorization(&[vault(1)], ALICE)
        .await
        .unwrap();

    // An entry whose resource set no longer matches its key is not reused.
    tampered.authorized_resources = vec![vault(9)];
    f.store
        .set(&AuthorizationKey::new(&[vault(1)], ALICE), tampered)
        .await
        .unwrap();

    let fresh = f
        .manager
        .ensure_authorization(&[vault(1)], ALICE)
        .await
        .unwrap();
    assert_eq!(fresh.authorized_resources, vec![vault(1)]);
    assert_eq!(f.signer.calls(), 2);
}

#[tokio::test]
async fn test_corrupted_key_pair_is_not_reused() {
    let f = fixture();
    let mut broken = f
        .manager
        .ensure_authorization(&[vault(1)], ALICE)
        .await
        .unwrap();
    broken.private_key = AuthorizationSecret::new(vec![0; 32]);
    f.store
        .set(&AuthorizationKey::new(&[vault(1)], ALICE), broken)
        .await
        .unwrap();

    f.manager
        .ensure_authorization(&[vault(1)], ALICE)
        .await
        .unwrap();
    assert_eq!(f.signer.calls(), 2);
}

#[tokio::test]
async fn test_declined_signature_is_unavailable_and_not_cached() {
    let f = fixture();
    f.signer.set_declining(true);

    let err = f
        .manager
        .ensure_authorization(&[vault(1)], ALICE)
        .await
        .unwrap_err();

    assert_matches!(err, AuthorizationError::Unavailable(SignerError::Declined));
    assert!(err.to_string().starts_with("authorization unavailable"));
    assert_eq!(f.signer.calls(), 1);
    assert!(f.store.is_empty());
}

#[tokio::test]
async fn test_empty_signature_is_invalid() {
    let f = fixture();
    f.signer.set_empty_signatures(true);

    let err = f
        .manager
        .ensure_authorization(&[vault(1)], ALICE)
        .await
        .unwrap_err();
    assert_matches!(err, AuthorizationError::InvalidSignature { .. });
    assert!(f.store.is_empty());
}

#[tokio::test]
async fn test_empty_resource_set_rejected() {
    let f = fixture();
    let err = f.manager.ensure_authorization(&[], ALICE).await.unwrap_err();
    assert_eq!(err, AuthorizationError::NoResources);
    assert_eq!(f.signer.calls(), 0);
}

#[tokio::test]
async fn test_forget_drops_cached_entry() {
    let f = fixture();
    f.manager
        .ensure_authorization(&[vault(1)], ALICE)
        .await
        .unwrap();

    assert!(f.manager.forget(&[vault(1)], ALICE).await.unwrap());
    assert!(!f.manager.forget(&[vault(1)], ALICE).await.unwrap());

    f.manager
        .ensure_authorization(&[vault(1)], ALICE)
        .await
        .unwrap();
    assert_eq!(f.signer.calls(), 2);
}

#[tokio::test]
async fn test_custom_validity_days() {
    let f = fixture();
    let manager = f.manager.clone().with_validity_days(1);
    let auth = manager
        .ensure_authorization(&[vault(1)], ALICE)
        .await
        .unwrap();
    assert_eq!(auth.valid_duration_days, 1);

    f.clock.advance_days(2);
    manager
        .ensure_authorization(&[vault(1)], ALICE)
        .await
        .unwrap();
    assert_eq!(f.signer.calls(), 2);
}

#[tokio::test]
async fn test_file_store_avoids_prompt_after_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("signatures.json");
    let signer = Arc::new(MockSigner::new());
    let clock = Arc::new(ControllableClock::new(START_TIME));

    let first = SignatureManager::new(
        Arc::new(FileSignatureStore::new(&path)),
        signer.clone(),
        clock.clone(),
    );
    let original = first
        .ensure_authorization(&[vault(1)], ALICE)
        .await
        .unwrap();

    let restarted = SignatureManager::new(
        Arc::new(FileSignatureStore::new(&path)),
        signer.clone(),
        clock.clone(),
    );
    let restored = restarted
        .ensure_authorization(&[vault(1)], ALICE)
        .await
        .unwrap();

    assert_eq!(signer.calls(), 1);
    assert_eq!(original, restored);
}
