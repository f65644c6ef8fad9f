//! Facade CRUD, export, wipe, and guest TTL behavior.

mod support;

use habitkeep_kv::{ManualClock, MemoryKv};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use support::*;

#[tokio::test]
async fn settings_round_trip() {
    let service = fresh_service().await;
    let user = authed("1");

    assert!(service.get_settings(&user).await.unwrap().is_none());

    service.save_settings(&user, &sample_settings()).await.unwrap();
    assert_eq!(
        service.get_settings(&user).await.unwrap(),
        Some(sample_settings())
    );
}

#[tokio::test]
async fn content_and_entries_round_trip_in_date_order() {
    let service = fresh_service().await;
    let user = authed("1");

    service.save_content(&user, &sample_content()).await.unwrap();
    service
        .save_entries(
            &user,
            &[
                sample_entry("2026-08-02", 5),
                sample_entry("2026-08-01", 3),
                sample_entry("2026-08-03", 7),
            ],
        )
        .await
        .unwrap();

    assert_eq!(
        service.get_content(&user).await.unwrap(),
        Some(sample_content())
    );

    let entries = service.get_entries(&user).await.unwrap();
    let dates: Vec<&str> = entries.iter().map(|e| e.date.as_str()).collect();
    assert_eq!(dates, vec!["2026-08-01", "2026-08-02", "2026-08-03"]);
}

#[tokio::test]
async fn saving_an_entry_twice_keeps_the_last_write() {
    let service = fresh_service().await;
    let user = authed("1");

    service
        .save_entries(&user, &[sample_entry("2026-08-01", 3)])
        .await
        .unwrap();
    service
        .save_entries(&user, &[sample_entry("2026-08-01", 9)])
        .await
        .unwrap();

    let entries = service.get_entries(&user).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].values["water"], serde_json::json!(9));
}

#[tokio::test]
async fn profile_round_trip() {
    let service = fresh_service().await;
    let user = authed("1");

    service
        .save_user(&user, &sample_profile("1", "a@b.com"))
        .await
        .unwrap();
    let profile = service.get_user(&user).await.unwrap().unwrap();
    assert_eq!(profile.email, "a@b.com");
}

#[tokio::test]
async fn users_cannot_see_each_other() {
    let service = fresh_service().await;
    let alice = authed("alice");
    let bob = authed("bob");

    service.save_content(&alice, &sample_content()).await.unwrap();
    assert!(service.get_content(&bob).await.unwrap().is_none());
}

#[tokio::test]
async fn export_bundle_contains_everything() {
    let service = fresh_service().await;
    let user = authed("1");

    service
        .save_user(&user, &sample_profile("1", "a@b.com"))
        .await
        .unwrap();
    service.save_settings(&user, &sample_settings()).await.unwrap();
    service.save_content(&user, &sample_content()).await.unwrap();
    service
        .save_entries(&user, &[sample_entry("2026-08-01", 3)])
        .await
        .unwrap();

    let bundle = service.export_account(&user).await.unwrap();
    assert!(bundle.profile.is_some());
    assert_eq!(bundle.settings, Some(sample_settings()));
    assert_eq!(bundle.content, Some(sample_content()));
    assert_eq!(bundle.entries.len(), 1);
}

#[tokio::test]
async fn wipe_removes_all_records_and_the_uudek() {
    let service = fresh_service().await;
    let user = authed("1");

    service
        .save_user(&user, &sample_profile("1", "a@b.com"))
        .await
        .unwrap();
    service.save_settings(&user, &sample_settings()).await.unwrap();
    service.save_content(&user, &sample_content()).await.unwrap();
    service
        .save_entries(&user, &[sample_entry("2026-08-01", 3)])
        .await
        .unwrap();

    // profile + settings + content + entry + uuDEK
    let removed = service.wipe_user(&user).await.unwrap();
    assert_eq!(removed, 5);

    assert!(service.get_user(&user).await.unwrap().is_none());
    assert!(service.get_settings(&user).await.unwrap().is_none());
    assert!(service.get_content(&user).await.unwrap().is_none());
    assert!(service.get_entries(&user).await.unwrap().is_empty());
}

#[tokio::test]
async fn guest_data_expires_after_the_ttl() {
    let clock = Arc::new(ManualClock::new(chrono::Utc::now()));
    let backend = MemoryKv::with_clock(clock.clone());
    let service = service_over(Arc::new(backend)).await;

    let visitor = guest("g1");
    service.save_settings(&visitor, &sample_settings()).await.unwrap();
    service.save_content(&visitor, &sample_content()).await.unwrap();

    assert!(service.get_settings(&visitor).await.unwrap().is_some());

    // Default guest TTL is 14 days
    clock.advance(chrono::Duration::days(15));

    assert!(service.get_settings(&visitor).await.unwrap().is_none());
    assert!(service.get_content(&visitor).await.unwrap().is_none());
}

#[tokio::test]
async fn guests_with_the_same_id_share_a_scope_but_not_with_members() {
    let service = fresh_service().await;

    let first_visit = guest("1234");
    let second_visit = guest("1234");
    let member = authed("1234");

    service.save_content(&first_visit, &sample_content()).await.unwrap();

    // Accepted collision: the same raw id lands on the same scope
    assert!(service.get_content(&second_visit).await.unwrap().is_some());

    // The authenticated user with the same raw id sees nothing of it
    assert!(service.get_content(&member).await.unwrap().is_none());
}
