//! Integration tests for session resolution and teardown
//!
//! These tests drive the controller against the scripted provider and
//! in-memory store, checking that every path terminates in a resolved
//! principal and that teardown ordering is observable.

use std::sync::Arc;
use std::time::Duration;
use zonal_core::effects::{AuthEvent, Credential, RecordStoreEffects};
use zonal_core::{Profile, Role, UserId, Zone, ZonalError};
use zonal_session::{IdentityStore, SessionController};
use zonal_testkit::{MemoryRecordStore, MockCredentialProvider};

type Controller = SessionController<MockCredentialProvider, MemoryRecordStore>;

fn setup() -> (Arc<MockCredentialProvider>, Arc<MemoryRecordStore>, Controller) {
    let provider = Arc::new(MockCredentialProvider::new());
    let store = Arc::new(MemoryRecordStore::new());
    let controller = SessionController::new(
        Arc::clone(&provider),
        Arc::clone(&store),
        IdentityStore::new(),
    );
    (provider, store, controller)
}

async fn seed_staff(
    provider: &MockCredentialProvider,
    store: &MemoryRecordStore,
    email: &str,
    zone: &str,
) -> UserId {
    let user_id = provider.register_user(email, "pw").await;
    store
        .seed_profile(Profile {
            user_id,
            email: email.to_string(),
            display_name: Some("Zone Staff".into()),
            role: Role::Staff,
            zone: Some(Zone::new(zone)),
        })
        .await;
    user_id
}

#[tokio::test]
async fn restore_without_session_resolves_unauthenticated() {
    let (_provider, _store, controller) = setup();

    let principal = controller.restore_session().await;

    assert!(principal.resolved);
    assert!(!principal.is_authenticated());
    assert!(controller.identity().snapshot().resolved);
}

#[tokio::test]
async fn restore_survives_provider_outage() {
    let (provider, _store, controller) = setup();
    provider.set_fail_restore(true);

    let principal = controller.restore_session().await;

    // Lookup errors are "no session", never a stuck Resolving state
    assert!(principal.resolved);
    assert!(!principal.is_authenticated());
}

#[tokio::test]
async fn restore_resolves_existing_session() {
    let (provider, store, controller) = setup();
    let user_id = seed_staff(&provider, &store, "staff@example.org", "Lagos").await;
    provider
        .set_restored(Some(Credential {
            user_id,
            email: "staff@example.org".into(),
        }))
        .await;

    let principal = controller.restore_session().await;

    assert!(principal.is_authenticated());
    assert_eq!(principal.role, Role::Staff);
    assert_eq!(principal.zone, Some(Zone::new("Lagos")));
}

#[tokio::test]
async fn restore_with_orphaned_credential_degrades_to_unauthenticated() {
    let (provider, _store, controller) = setup();
    let user_id = provider.register_user("ghost@example.org", "pw").await;
    provider
        .set_restored(Some(Credential {
            user_id,
            email: "ghost@example.org".into(),
        }))
        .await;

    let principal = controller.restore_session().await;

    assert!(principal.resolved);
    assert!(!principal.is_authenticated());
}

#[tokio::test]
async fn sign_in_publishes_full_principal() {
    let (provider, store, controller) = setup();
    seed_staff(&provider, &store, "staff@example.org", "Kano").await;

    let principal = controller
        .sign_in("staff@example.org", "pw")
        .await
        .expect("sign-in should resolve");

    assert!(principal.is_authenticated());
    assert_eq!(principal.zone, Some(Zone::new("Kano")));
    assert_eq!(controller.identity().snapshot(), principal);
}

#[tokio::test]
async fn sign_in_rejects_empty_inputs() {
    let (_provider, _store, controller) = setup();

    let err = controller.sign_in("", "pw").await.unwrap_err();
    assert!(matches!(err, ZonalError::CredentialInvalid { .. }));

    let err = controller.sign_in("a@b.c", "").await.unwrap_err();
    assert!(matches!(err, ZonalError::CredentialInvalid { .. }));
}

#[tokio::test]
async fn sign_in_with_wrong_password_fails_closed() {
    let (provider, store, controller) = setup();
    seed_staff(&provider, &store, "staff@example.org", "Kano").await;

    let err = controller
        .sign_in("staff@example.org", "wrong")
        .await
        .unwrap_err();

    assert!(matches!(err, ZonalError::CredentialInvalid { .. }));
    assert!(!controller.identity().snapshot().is_authenticated());
}

#[tokio::test]
async fn orphaned_credential_is_profile_not_found_and_torn_down() {
    let (provider, _store, controller) = setup();
    // Registered with the provider, but no profile row exists
    provider.register_user("orphan@example.org", "pw").await;

    let err = controller
        .sign_in("orphan@example.org", "pw")
        .await
        .unwrap_err();

    assert!(matches!(err, ZonalError::ProfileNotFound { .. }));
    // The valid-but-unusable provider session was signed out again
    assert_eq!(provider.sign_out_calls(), 1);
    let snapshot = controller.identity().snapshot();
    assert!(snapshot.resolved);
    assert!(!snapshot.is_authenticated());
}

#[tokio::test]
async fn sign_out_clears_identity_before_provider_teardown() {
    let (provider, store, controller) = setup();
    seed_staff(&provider, &store, "staff@example.org", "Lagos").await;
    controller
        .sign_in("staff@example.org", "pw")
        .await
        .expect("sign-in should resolve");

    controller.sign_out().await;

    let snapshot = controller.identity().snapshot();
    assert!(snapshot.resolved);
    assert!(!snapshot.is_authenticated());
    assert_eq!(snapshot.role, Role::Public);
    assert_eq!(snapshot.zone, None);
    assert_eq!(provider.sign_out_calls(), 1);
}

#[tokio::test]
async fn sign_up_with_zone_creates_staff_profile() {
    let (_provider, store, controller) = setup();

    let principal = controller
        .sign_up(
            "new@example.org",
            "pw",
            Some("New Staff".into()),
            Some(Zone::new("Kano")),
        )
        .await
        .expect("sign-up should resolve");

    assert!(principal.is_authenticated());
    assert_eq!(principal.role, Role::Staff);
    assert_eq!(principal.zone, Some(Zone::new("Kano")));

    // The profile row is durably in the store
    let user_id = principal.user_id.expect("authenticated principal has id");
    let profile = store
        .fetch_profile(&user_id)
        .await
        .expect("store is up")
        .expect("profile row exists");
    assert_eq!(profile.role, Role::Staff);
}

#[tokio::test]
async fn sign_up_insert_failure_tears_the_credential_down() {
    let (provider, store, controller) = setup();
    store.set_fail_inserts(true);

    let err = controller
        .sign_up("new@example.org", "pw", None, None)
        .await
        .unwrap_err();

    assert!(matches!(err, ZonalError::CredentialInvalid { .. }));
    assert_eq!(provider.sign_out_calls(), 1);
    assert!(!controller.identity().snapshot().is_authenticated());
}

#[tokio::test]
async fn auth_events_republish_and_clear() {
    let (provider, store, controller) = setup();
    let user_id = seed_staff(&provider, &store, "staff@example.org", "Lagos").await;

    let controller = Arc::new(controller);
    let watcher = Arc::clone(&controller);
    let events_task = tokio::spawn(async move { watcher.run_auth_events().await });
    // Let the event loop subscribe before emitting
    tokio::time::sleep(Duration::from_millis(5)).await;

    provider.emit(AuthEvent::TokenRefreshed(Credential {
        user_id,
        email: "staff@example.org".into(),
    }));
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(controller.identity().snapshot().is_authenticated());

    provider.emit(AuthEvent::SignedOut);
    tokio::time::sleep(Duration::from_millis(10)).await;
    let snapshot = controller.identity().snapshot();
    assert!(snapshot.resolved);
    assert!(!snapshot.is_authenticated());

    events_task.abort();
}
