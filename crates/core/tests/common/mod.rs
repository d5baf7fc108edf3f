#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Utc};

use innkeep_core::availability::AvailabilityEngine;
use innkeep_core::booking::Booking;
use innkeep_core::clock::FixedClock;
use innkeep_core::config::BookingConfig;
use innkeep_core::error::CoreError;
use innkeep_core::guest::Guest;
use innkeep_core::inventory::RoomInventory;
use innkeep_core::lifecycle::{BookingChannel, BookingManager, CreateBooking};
use innkeep_core::memory::MemoryStore;
use innkeep_core::notify::RecordingNotifier;
use innkeep_core::registry::GuestRegistry;
use innkeep_core::room::{Room, RoomSpec};
use innkeep_core::types::{StayDate, Timestamp};

/// Noon UTC on 2025-05-20; every stay in these tests is in the future.
pub const NOW: &str = "2025-05-20T12:00:00Z";

pub fn at(rfc3339: &str) -> Timestamp {
    DateTime::parse_from_rfc3339(rfc3339)
        .unwrap()
        .with_timezone(&Utc)
}

pub fn d(s: &str) -> StayDate {
    s.parse().unwrap()
}

/// All core services wired over one `MemoryStore`.
pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub clock: Arc<FixedClock>,
    pub notifier: Arc<RecordingNotifier>,
    pub manager: BookingManager,
    pub inventory: RoomInventory,
    pub registry: GuestRegistry,
    pub availability: AvailabilityEngine,
}

pub fn harness() -> Harness {
    harness_with(BookingConfig::default())
}

pub fn harness_with(config: BookingConfig) -> Harness {
    let clock = Arc::new(FixedClock::new(at(NOW)));
    let store = Arc::new(MemoryStore::with_clock(clock.clone()));
    let notifier = Arc::new(RecordingNotifier::new());

    Harness {
        manager: BookingManager::new(store.clone(), notifier.clone(), clock.clone(), config),
        inventory: RoomInventory::new(store.clone(), clock.clone()),
        registry: GuestRegistry::new(store.clone()),
        availability: AvailabilityEngine::new(store.clone()),
        store,
        clock,
        notifier,
    }
}

pub fn room_spec(number: &str, capacity: i32, price: f64) -> RoomSpec {
    RoomSpec {
        room_number: number.to_string(),
        room_type: "double".to_string(),
        capacity,
        price_per_night: price,
        description: None,
        amenities: vec!["wifi".to_string()],
        image_url: None,
    }
}

impl Harness {
    pub async fn room(&self, number: &str, capacity: i32, price: f64) -> Room {
        self.inventory
            .create_room(room_spec(number, capacity, price))
            .await
            .unwrap()
    }

    pub async fn guest(&self, email: &str) -> Guest {
        self.registry
            .create_or_get_guest("Test Guest", email, "+81-90-0000-0000")
            .await
            .unwrap()
    }

    pub async fn book(
        &self,
        room: &Room,
        guest: &Guest,
        from: &str,
        to: &str,
    ) -> Result<Booking, CoreError> {
        self.manager
            .create_booking(CreateBooking {
                guest_id: guest.id,
                room_id: room.id,
                check_in: d(from),
                check_out: d(to),
                special_requests: None,
                guest_count: None,
                channel: BookingChannel::Direct,
            })
            .await
    }

    pub async fn book_pending(
        &self,
        room: &Room,
        guest: &Guest,
        from: &str,
        to: &str,
    ) -> Result<Booking, CoreError> {
        self.manager
            .create_booking(CreateBooking {
                guest_id: guest.id,
                room_id: room.id,
                check_in: d(from),
                check_out: d(to),
                special_requests: None,
                guest_count: None,
                channel: BookingChannel::AwaitingPayment,
            })
            .await
    }
}
