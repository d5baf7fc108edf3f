//! Guest registry behaviour.

mod common;

use assert_matches::assert_matches;

use common::harness;
use innkeep_core::error::CoreError;
use innkeep_core::guest::GuestContact;

#[tokio::test]
async fn same_email_reuses_record_and_refreshes_details() {
    let h = harness();
    let first = h
        .registry
        .create_or_get_guest("Aiko", "aiko@example.com", "")
        .await
        .unwrap();

    let again = h
        .registry
        .create_or_get_guest("Aiko Tanaka", "aiko@example.com", "+81-90-1234-5678")
        .await
        .unwrap();
    assert_eq!(again.id, first.id);
    assert_eq!(again.name, "Aiko Tanaka");
    assert_eq!(again.phone, "+81-90-1234-5678");

    // Blank values never overwrite stored ones.
    let third = h
        .registry
        .create_or_get_guest("", "aiko@example.com", "")
        .await
        .unwrap();
    assert_eq!(third.name, "Aiko Tanaka");
    assert_eq!(third.phone, "+81-90-1234-5678");
}

#[tokio::test]
async fn email_lookup_is_case_sensitive() {
    let h = harness();
    let lower = h
        .registry
        .create_or_get_guest("Aiko", "aiko@example.com", "")
        .await
        .unwrap();
    let upper = h
        .registry
        .create_or_get_guest("Aiko", "AIKO@example.com", "")
        .await
        .unwrap();
    assert_ne!(lower.id, upper.id);
}

#[tokio::test]
async fn malformed_email_is_rejected() {
    let h = harness();
    for email in ["", "aiko", "aiko@", "@example.com", "aiko@example", "a b@example.com"] {
        let err = h
            .registry
            .create_or_get_guest("Aiko", email, "")
            .await
            .unwrap_err();
        assert_matches!(err, CoreError::Validation(_), "email {email:?} should be rejected");
    }
}

#[tokio::test]
async fn update_enforces_unique_email() {
    let h = harness();
    let aiko = h.guest("aiko@example.com").await;
    h.guest("ben@example.com").await;

    let err = h
        .registry
        .update_guest(aiko.id, GuestContact::new("Aiko", "ben@example.com", ""))
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::Conflict(_));

    let updated = h
        .registry
        .update_guest(aiko.id, GuestContact::new("Aiko T", "aiko.t@example.com", "1"))
        .await
        .unwrap();
    assert_eq!(updated.email, "aiko.t@example.com");
    assert!(h
        .registry
        .find_by_email("aiko@example.com")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn list_guests_searches_and_paginates() {
    let h = harness();
    h.registry
        .create_or_get_guest("Aiko Tanaka", "aiko@example.com", "090-1")
        .await
        .unwrap();
    h.registry
        .create_or_get_guest("Ben Ito", "ben@example.com", "090-2")
        .await
        .unwrap();
    h.registry
        .create_or_get_guest("Chie Tanaka", "chie@example.com", "090-3")
        .await
        .unwrap();

    let page = h.registry.list_guests(Some("tanaka"), None, None).await.unwrap();
    assert_eq!(page.total, 2);

    let page = h.registry.list_guests(None, Some(2), Some(2)).await.unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.guests.len(), 1);
    assert_eq!(page.guests[0].name, "Chie Tanaka");
}

#[tokio::test]
async fn delete_is_blocked_by_bookings() {
    let h = harness();
    let room = h.room("101", 2, 80.0).await;
    let booked = h.guest("a@example.com").await;
    let idle = h.guest("b@example.com").await;
    let booking = h.book(&room, &booked, "2025-06-01", "2025-06-03").await.unwrap();

    let err = h.registry.delete_guest(booked.id).await.unwrap_err();
    assert_matches!(err, CoreError::Conflict(_));

    // History alone still blocks removal.
    h.manager.cancel_booking(booking.id, None).await.unwrap();
    let err = h.registry.delete_guest(booked.id).await.unwrap_err();
    assert_matches!(err, CoreError::Conflict(_));

    h.registry.delete_guest(idle.id).await.unwrap();
    let err = h.registry.get_guest(idle.id).await.unwrap_err();
    assert_matches!(err, CoreError::NotFound { entity: "Guest", .. });

    let err = h.registry.delete_guest(idle.id).await.unwrap_err();
    assert_matches!(err, CoreError::NotFound { .. });
}
