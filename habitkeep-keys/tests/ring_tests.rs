//! DEK ring boot, reload, and misconfiguration behavior.

mod support;

use habitkeep_keys::{DekName, Kek, KeyError, KeyRing};
use support::{boot_ring, fresh_store};

#[tokio::test]
async fn boot_initializes_all_four_deks() {
    let store = fresh_store();
    let (ring, _) = boot_ring(&store).await;

    for name in DekName::ALL {
        let key = ring.key(name).await.unwrap();
        assert_eq!(key.as_bytes().len(), 32);
    }
}

#[tokio::test]
async fn deks_are_distinct_from_each_other() {
    let store = fresh_store();
    let (ring, _) = boot_ring(&store).await;

    let user = ring.key(DekName::UserDek).await.unwrap();
    let session = ring.key(DekName::SessionDek).await.unwrap();
    let settings = ring.key(DekName::SettingsDek).await.unwrap();
    let signing = ring.key(DekName::SigningKey).await.unwrap();

    assert_ne!(user.as_bytes(), session.as_bytes());
    assert_ne!(user.as_bytes(), settings.as_bytes());
    assert_ne!(user.as_bytes(), signing.as_bytes());
    assert_ne!(session.as_bytes(), settings.as_bytes());
}

#[tokio::test]
async fn reload_with_same_kek_returns_same_keys() {
    let store = fresh_store();
    let (ring, kek_hex) = boot_ring(&store).await;
    let before = ring.key(DekName::UserDek).await.unwrap();

    let reloaded = KeyRing::load_or_init(store.clone(), Kek::from_hex(&kek_hex).unwrap())
        .await
        .unwrap();
    let after = reloaded.key(DekName::UserDek).await.unwrap();

    assert_eq!(before.as_bytes(), after.as_bytes());
}

#[tokio::test]
async fn wrong_kek_is_a_fatal_config_error_not_a_fresh_ring() {
    let store = fresh_store();
    let (_ring, _) = boot_ring(&store).await;

    let (wrong_kek, _) = Kek::generate();
    let result = KeyRing::load_or_init(store.clone(), wrong_kek).await;

    match result {
        Err(KeyError::Config(msg)) => {
            assert!(msg.contains("does not decrypt"), "got: {msg}");
        }
        other => panic!("expected Config error, got: {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn signing_key_accessor_matches_ring_entry() {
    let store = fresh_store();
    let (ring, _) = boot_ring(&store).await;

    let a = ring.signing_key().await.unwrap();
    let b = ring.key(DekName::SigningKey).await.unwrap();
    assert_eq!(a.as_bytes(), b.as_bytes());
}

#[tokio::test]
async fn missing_kek_env_refuses_to_start() {
    // The variable is deliberately absent in the test environment.
    unsafe { std::env::remove_var(habitkeep_keys::KEK_ENV) };
    assert!(matches!(Kek::from_env(), Err(KeyError::Config(_))));
}
