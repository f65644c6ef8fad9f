//! Envelope store behavior: typed round-trips, absent-on-failure reads,
//! TTL passthrough.

use habitkeep_crypto::generate_random_key;
use habitkeep_kv::{EnvelopeStore, ManualClock, MemoryKv, SetOptions};
use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct Settings {
    theme: String,
    reminders_enabled: bool,
}

fn sample_settings() -> Settings {
    Settings {
        theme: "dark".to_string(),
        reminders_enabled: true,
    }
}

fn envelope() -> EnvelopeStore {
    EnvelopeStore::new(Arc::new(MemoryKv::new()))
}

#[tokio::test]
async fn typed_round_trip() {
    let store = envelope();
    let key = generate_random_key();
    let settings = sample_settings();

    store
        .set("user/u1/settings", &key, &settings, SetOptions::default())
        .await
        .unwrap();

    let read: Option<Settings> = store.get("user/u1/settings", &key).await.unwrap();
    assert_eq!(read, Some(settings));
}

#[tokio::test]
async fn missing_record_is_none() {
    let store = envelope();
    let key = generate_random_key();

    let read: Option<Settings> = store.get("user/nobody/settings", &key).await.unwrap();
    assert!(read.is_none());
}

#[tokio::test]
async fn wrong_key_reads_as_absent_not_error() {
    let store = envelope();
    let key = generate_random_key();
    let wrong = generate_random_key();

    store
        .set("user/u1/settings", &key, &sample_settings(), SetOptions::default())
        .await
        .unwrap();

    let read: Option<Settings> = store.get("user/u1/settings", &wrong).await.unwrap();
    assert!(read.is_none(), "wrong key must look like 'not found'");
}

#[tokio::test]
async fn corrupted_ciphertext_reads_as_absent() {
    let store = envelope();
    let key = generate_random_key();

    store
        .set("user/u1/settings", &key, &sample_settings(), SetOptions::default())
        .await
        .unwrap();

    let mut bytes = store.get_raw("user/u1/settings").await.unwrap().unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;
    store
        .set_raw("user/u1/settings", bytes, SetOptions::default())
        .await
        .unwrap();

    let read: Option<Settings> = store.get("user/u1/settings", &key).await.unwrap();
    assert!(read.is_none());
}

#[tokio::test]
async fn garbage_too_short_for_an_iv_reads_as_absent() {
    let store = envelope();
    let key = generate_random_key();

    store
        .set_raw("user/u1/settings", vec![1, 2, 3], SetOptions::default())
        .await
        .unwrap();

    let read: Option<Settings> = store.get("user/u1/settings", &key).await.unwrap();
    assert!(read.is_none());
}

#[tokio::test]
async fn two_writes_same_payload_differ_on_disk() {
    let store = envelope();
    let key = generate_random_key();
    let settings = sample_settings();

    store
        .set("a", &key, &settings, SetOptions::default())
        .await
        .unwrap();
    store
        .set("b", &key, &settings, SetOptions::default())
        .await
        .unwrap();

    let a = store.get_raw("a").await.unwrap().unwrap();
    let b = store.get_raw("b").await.unwrap().unwrap();
    assert_ne!(a, b, "fresh IV per write must change the ciphertext");
}

#[tokio::test]
async fn ttl_expires_record_independent_of_encryption() {
    let clock = Arc::new(ManualClock::new(chrono::Utc::now()));
    let kv = MemoryKv::with_clock(clock.clone());
    let store = EnvelopeStore::new(Arc::new(kv));
    let key = generate_random_key();

    store
        .set(
            "user/public_g1/settings",
            &key,
            &sample_settings(),
            SetOptions::expires_in(Duration::from_secs(60)),
        )
        .await
        .unwrap();

    let read: Option<Settings> = store.get("user/public_g1/settings", &key).await.unwrap();
    assert!(read.is_some());

    clock.advance(chrono::Duration::seconds(61));

    let read: Option<Settings> = store.get("user/public_g1/settings", &key).await.unwrap();
    assert!(read.is_none(), "guest record must vanish after its TTL");
}

#[tokio::test]
async fn list_keys_returns_only_matching_prefix() {
    let store = envelope();
    let key = generate_random_key();

    for path in ["user/u1/settings", "user/u1/content", "user/u2/settings"] {
        store
            .set(path, &key, &sample_settings(), SetOptions::default())
            .await
            .unwrap();
    }

    let keys = store.list_keys("user/u1/").await.unwrap();
    assert_eq!(keys, vec!["user/u1/content", "user/u1/settings"]);
}
