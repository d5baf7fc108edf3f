//! In-memory [`BookingStore`] for tests and single-instance demos.
//!
//! Records live behind a synchronous `RwLock` that is never held across an
//! `.await`. Compound operations (`reserve`, `revise`, `deactivate_room`)
//! additionally hold a per-room async mutex for the whole read-check-write
//! sequence, so two reservations on the same room are serialized while
//! different rooms proceed in parallel.
//!
//! The room locks live in this process only. Running several instances
//! against one `MemoryStore` is not possible, and the guarantee does not
//! extend beyond a single process; use the PostgreSQL store for that.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::availability::find_conflict;
use crate::booking::{Booking, BookingQuery, BookingRevision, BookingStatus, NewBooking, StatusChange};
use crate::clock::{Clock, SystemClock};
use crate::error::CoreError;
use crate::guest::{Guest, GuestContact};
use crate::room::{Room, RoomFilter, RoomSpec, RoomStatus};
use crate::stay::total_price;
use crate::store::{BookingStore, GuestPage, RoomDeactivation};
use crate::types::{DbId, StayDate};

#[derive(Default)]
struct Tables {
    rooms: BTreeMap<DbId, Room>,
    guests: BTreeMap<DbId, Guest>,
    bookings: BTreeMap<DbId, Booking>,
    next_room_id: DbId,
    next_guest_id: DbId,
    next_booking_id: DbId,
}

impl Tables {
    fn next_id(counter: &mut DbId) -> DbId {
        *counter += 1;
        *counter
    }
}

pub struct MemoryStore {
    tables: RwLock<Tables>,
    room_locks: Mutex<HashMap<DbId, Arc<tokio::sync::Mutex<()>>>>,
    clock: Arc<dyn Clock>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Stamp `created_at`/`updated_at` from `clock` instead of the system
    /// time.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            room_locks: Mutex::new(HashMap::new()),
            clock,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(|e| e.into_inner())
    }

    fn room_lock(&self, room_id: DbId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.room_locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.entry(room_id).or_default().clone()
    }

    fn email_taken(tables: &Tables, email: &str, except: Option<DbId>) -> bool {
        tables
            .guests
            .values()
            .any(|g| g.email == email && Some(g.id) != except)
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    // -- Rooms --------------------------------------------------------------

    async fn insert_room(&self, spec: &RoomSpec) -> Result<Room, CoreError> {
        let now = self.clock.now();
        let mut tables = self.write();
        if tables.rooms.values().any(|r| r.room_number == spec.room_number) {
            return Err(CoreError::Conflict(format!(
                "Room number '{}' already exists",
                spec.room_number
            )));
        }
        let id = Tables::next_id(&mut tables.next_room_id);
        let room = Room {
            id,
            room_number: spec.room_number.clone(),
            room_type: spec.room_type.clone(),
            capacity: spec.capacity,
            price_per_night: spec.price_per_night,
            status: RoomStatus::Active,
            description: spec.description.clone(),
            amenities: spec.amenities.clone(),
            image_url: spec.image_url.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.rooms.insert(id, room.clone());
        Ok(room)
    }

    async fn replace_room(&self, id: DbId, spec: &RoomSpec) -> Result<Option<Room>, CoreError> {
        let now = self.clock.now();
        let mut tables = self.write();
        if tables
            .rooms
            .values()
            .any(|r| r.room_number == spec.room_number && r.id != id)
        {
            return Err(CoreError::Conflict(format!(
                "Room number '{}' already exists",
                spec.room_number
            )));
        }
        let Some(room) = tables.rooms.get_mut(&id) else {
            return Ok(None);
        };
        room.room_number = spec.room_number.clone();
        room.room_type = spec.room_type.clone();
        room.capacity = spec.capacity;
        room.price_per_night = spec.price_per_night;
        room.description = spec.description.clone();
        room.amenities = spec.amenities.clone();
        room.image_url = spec.image_url.clone();
        room.updated_at = now;
        Ok(Some(room.clone()))
    }

    async fn find_room(&self, id: DbId) -> Result<Option<Room>, CoreError> {
        Ok(self.read().rooms.get(&id).cloned())
    }

    async fn list_rooms(&self, filter: &RoomFilter) -> Result<Vec<Room>, CoreError> {
        Ok(self
            .read()
            .rooms
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }

    async fn activate_room(&self, id: DbId) -> Result<Option<Room>, CoreError> {
        let now = self.clock.now();
        let mut tables = self.write();
        Ok(tables.rooms.get_mut(&id).map(|room| {
            room.status = RoomStatus::Active;
            room.updated_at = now;
            room.clone()
        }))
    }

    async fn deactivate_room(
        &self,
        id: DbId,
        today: StayDate,
    ) -> Result<RoomDeactivation, CoreError> {
        let lock = self.room_lock(id);
        let _guard = lock.lock().await;

        let now = self.clock.now();
        let mut tables = self.write();
        if !tables.rooms.contains_key(&id) {
            return Ok(RoomDeactivation::NotFound);
        }
        let active = tables
            .bookings
            .values()
            .filter(|b| b.room_id == id && b.status.blocks_inventory() && b.check_out > today)
            .count() as i64;
        if active > 0 {
            return Ok(RoomDeactivation::HasActiveBookings(active));
        }
        match tables.rooms.get_mut(&id) {
            Some(room) => {
                room.status = RoomStatus::Inactive;
                room.updated_at = now;
                Ok(RoomDeactivation::Deactivated(room.clone()))
            }
            None => Ok(RoomDeactivation::NotFound),
        }
    }

    // -- Guests -------------------------------------------------------------

    async fn insert_guest(&self, contact: &GuestContact) -> Result<Guest, CoreError> {
        let now = self.clock.now();
        let mut tables = self.write();
        if Self::email_taken(&tables, &contact.email, None) {
            return Err(CoreError::Conflict(format!(
                "Guest with email '{}' already exists",
                contact.email
            )));
        }
        let id = Tables::next_id(&mut tables.next_guest_id);
        let guest = Guest {
            id,
            name: contact.name.clone(),
            email: contact.email.clone(),
            phone: contact.phone.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.guests.insert(id, guest.clone());
        Ok(guest)
    }

    async fn update_guest(
        &self,
        id: DbId,
        contact: &GuestContact,
    ) -> Result<Option<Guest>, CoreError> {
        let now = self.clock.now();
        let mut tables = self.write();
        if Self::email_taken(&tables, &contact.email, Some(id)) {
            return Err(CoreError::Conflict(format!(
                "Guest with email '{}' already exists",
                contact.email
            )));
        }
        Ok(tables.guests.get_mut(&id).map(|guest| {
            guest.name = contact.name.clone();
            guest.email = contact.email.clone();
            guest.phone = contact.phone.clone();
            guest.updated_at = now;
            guest.clone()
        }))
    }

    async fn find_guest(&self, id: DbId) -> Result<Option<Guest>, CoreError> {
        Ok(self.read().guests.get(&id).cloned())
    }

    async fn find_guest_by_email(&self, email: &str) -> Result<Option<Guest>, CoreError> {
        Ok(self.read().guests.values().find(|g| g.email == email).cloned())
    }

    async fn list_guests(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<GuestPage, CoreError> {
        let needle = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);
        let tables = self.read();
        let matching: Vec<&Guest> = tables
            .guests
            .values()
            .filter(|g| match &needle {
                Some(n) => [&g.name, &g.email, &g.phone]
                    .iter()
                    .any(|field| field.to_lowercase().contains(n.as_str())),
                None => true,
            })
            .collect();

        let total = matching.len() as i64;
        let guests = matching
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect();
        Ok(GuestPage { guests, total })
    }

    async fn delete_guest(&self, id: DbId) -> Result<bool, CoreError> {
        let mut tables = self.write();
        if tables.bookings.values().any(|b| b.guest_id == id) {
            return Err(CoreError::Conflict(format!(
                "Guest {id} has booking history and cannot be deleted"
            )));
        }
        Ok(tables.guests.remove(&id).is_some())
    }

    // -- Bookings -----------------------------------------------------------

    async fn find_booking(&self, id: DbId) -> Result<Option<Booking>, CoreError> {
        Ok(self.read().bookings.get(&id).cloned())
    }

    async fn find_booking_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Booking>, CoreError> {
        Ok(self
            .read()
            .bookings
            .values()
            .find(|b| b.reference_number == reference)
            .cloned())
    }

    async fn list_bookings(&self, query: &BookingQuery) -> Result<Vec<Booking>, CoreError> {
        let mut bookings: Vec<Booking> = self
            .read()
            .bookings
            .values()
            .filter(|b| query.matches(b))
            .cloned()
            .collect();
        query.sort(&mut bookings);
        Ok(bookings)
    }

    async fn reserve(&self, booking: NewBooking) -> Result<Booking, CoreError> {
        let lock = self.room_lock(booking.room_id);
        let _guard = lock.lock().await;

        let now = self.clock.now();
        let mut tables = self.write();
        let unavailable = || CoreError::RoomUnavailable {
            room_id: booking.room_id,
            check_in: booking.stay.check_in(),
            check_out: booking.stay.check_out(),
        };

        let price_per_night = match tables.rooms.get(&booking.room_id) {
            Some(room) if room.is_active() => room.price_per_night,
            Some(_) => {
                tracing::debug!(room_id = booking.room_id, "Reservation on an inactive room");
                return Err(unavailable());
            }
            None => {
                return Err(CoreError::NotFound {
                    entity: "Room",
                    id: booking.room_id,
                })
            }
        };

        if let Some(existing) =
            find_conflict(tables.bookings.values(), booking.room_id, &booking.stay, None)
        {
            tracing::debug!(
                room_id = booking.room_id,
                conflicting_booking_id = existing.id,
                "Reservation overlaps an existing booking"
            );
            return Err(unavailable());
        }

        if tables
            .bookings
            .values()
            .any(|b| b.reference_number == booking.reference_number)
        {
            return Err(CoreError::Conflict(format!(
                "Reference number '{}' already exists",
                booking.reference_number
            )));
        }
        let id = Tables::next_id(&mut tables.next_booking_id);
        let record = Booking {
            id,
            guest_id: booking.guest_id,
            room_id: booking.room_id,
            check_in: booking.stay.check_in(),
            check_out: booking.stay.check_out(),
            status: booking.status,
            total_price: total_price(price_per_night, &booking.stay),
            special_requests: booking.special_requests,
            guest_count: booking.guest_count,
            reference_number: booking.reference_number,
            cancellation_fee: 0.0,
            cancellation_reason: None,
            cancelled_at: None,
            actual_check_in: None,
            actual_check_out: None,
            created_at: now,
            updated_at: now,
        };
        tables.bookings.insert(id, record.clone());
        Ok(record)
    }

    async fn revise(
        &self,
        id: DbId,
        editable: &[BookingStatus],
        revision: BookingRevision,
    ) -> Result<Option<Booking>, CoreError> {
        let Some(room_id) = self.read().bookings.get(&id).map(|b| b.room_id) else {
            return Ok(None);
        };
        let lock = self.room_lock(room_id);
        let _guard = lock.lock().await;

        let conflict = {
            let tables = self.read();
            find_conflict(tables.bookings.values(), room_id, &revision.stay, Some(id))
                .map(|b| b.id)
        };
        if conflict.is_some() {
            return Err(CoreError::RoomUnavailable {
                room_id,
                check_in: revision.stay.check_in(),
                check_out: revision.stay.check_out(),
            });
        }

        let now = self.clock.now();
        let mut tables = self.write();
        let Some(booking) = tables.bookings.get_mut(&id) else {
            return Ok(None);
        };
        if !editable.contains(&booking.status) {
            return Ok(None);
        }
        booking.check_in = revision.stay.check_in();
        booking.check_out = revision.stay.check_out();
        booking.total_price = revision.total_price;
        booking.guest_count = revision.guest_count;
        booking.special_requests = revision.special_requests;
        booking.updated_at = now;
        Ok(Some(booking.clone()))
    }

    async fn change_status(
        &self,
        id: DbId,
        expected: BookingStatus,
        change: StatusChange,
    ) -> Result<Option<Booking>, CoreError> {
        let now = self.clock.now();
        let mut tables = self.write();
        match tables.bookings.get_mut(&id) {
            Some(booking) if booking.status == expected => {
                change.apply_to(booking, now);
                Ok(Some(booking.clone()))
            }
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stay::StayRange;
    use assert_matches::assert_matches;

    fn d(s: &str) -> StayDate {
        s.parse().unwrap()
    }

    fn spec(number: &str) -> RoomSpec {
        RoomSpec {
            room_number: number.to_string(),
            room_type: "double".to_string(),
            capacity: 2,
            price_per_night: 80.0,
            description: None,
            amenities: vec![],
            image_url: None,
        }
    }

    fn new_booking(room_id: DbId, from: &str, to: &str, reference: &str) -> NewBooking {
        NewBooking {
            guest_id: 1,
            room_id,
            stay: StayRange::new(d(from), d(to)).unwrap(),
            status: BookingStatus::Confirmed,
            special_requests: None,
            guest_count: 1,
            reference_number: reference.to_string(),
        }
    }

    #[tokio::test]
    async fn duplicate_room_number_conflicts() {
        let store = MemoryStore::new();
        store.insert_room(&spec("101")).await.unwrap();
        let err = store.insert_room(&spec("101")).await.unwrap_err();
        assert_matches!(err, CoreError::Conflict(_));
    }

    #[tokio::test]
    async fn ids_are_sequential() {
        let store = MemoryStore::new();
        let a = store.insert_room(&spec("101")).await.unwrap();
        let b = store.insert_room(&spec("102")).await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));
    }

    #[tokio::test]
    async fn reserve_rejects_overlap() {
        let store = MemoryStore::new();
        let room = store.insert_room(&spec("101")).await.unwrap();
        store
            .reserve(new_booking(room.id, "2025-06-01", "2025-06-05", "BK-A"))
            .await
            .unwrap();

        let err = store
            .reserve(new_booking(room.id, "2025-06-04", "2025-06-06", "BK-B"))
            .await
            .unwrap_err();
        assert_matches!(err, CoreError::RoomUnavailable { .. });

        store
            .reserve(new_booking(room.id, "2025-06-05", "2025-06-07", "BK-C"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn revise_ignores_itself() {
        let store = MemoryStore::new();
        let room = store.insert_room(&spec("101")).await.unwrap();
        let booking = store
            .reserve(new_booking(room.id, "2025-06-01", "2025-06-05", "BK-A"))
            .await
            .unwrap();

        let revised = store
            .revise(
                booking.id,
                &[BookingStatus::Confirmed],
                BookingRevision {
                    stay: StayRange::new(d("2025-06-02"), d("2025-06-06")).unwrap(),
                    total_price: 320.0,
                    guest_count: 2,
                    special_requests: Some("Late arrival".into()),
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(revised.check_in, d("2025-06-02"));
        assert_eq!(revised.guest_count, 2);
    }

    #[tokio::test]
    async fn change_status_is_compare_and_set() {
        let store = MemoryStore::new();
        let room = store.insert_room(&spec("101")).await.unwrap();
        let booking = store
            .reserve(new_booking(room.id, "2025-06-01", "2025-06-05", "BK-A"))
            .await
            .unwrap();

        let stale = store
            .change_status(
                booking.id,
                BookingStatus::Pending,
                StatusChange::to(BookingStatus::Confirmed),
            )
            .await
            .unwrap();
        assert!(stale.is_none());

        let changed = store
            .change_status(
                booking.id,
                BookingStatus::Confirmed,
                StatusChange::to(BookingStatus::CheckedIn),
            )
            .await
            .unwrap();
        assert_eq!(changed.unwrap().status, BookingStatus::CheckedIn);
    }

    #[tokio::test]
    async fn deactivate_blocked_by_future_booking() {
        let store = MemoryStore::new();
        let room = store.insert_room(&spec("101")).await.unwrap();
        store
            .reserve(new_booking(room.id, "2025-06-01", "2025-06-05", "BK-A"))
            .await
            .unwrap();

        let outcome = store.deactivate_room(room.id, d("2025-06-03")).await.unwrap();
        assert_eq!(outcome, RoomDeactivation::HasActiveBookings(1));

        let outcome = store.deactivate_room(room.id, d("2025-06-05")).await.unwrap();
        assert_matches!(outcome, RoomDeactivation::Deactivated(r) if r.status == RoomStatus::Inactive);
    }

    #[tokio::test]
    async fn guest_search_is_case_insensitive() {
        let store = MemoryStore::new();
        store
            .insert_guest(&GuestContact::new("Aiko Tanaka", "aiko@example.com", "090"))
            .await
            .unwrap();
        store
            .insert_guest(&GuestContact::new("Ben Ito", "ben@example.com", ""))
            .await
            .unwrap();

        let page = store.list_guests(Some("TANAKA"), 20, 0).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.guests[0].name, "Aiko Tanaka");

        let page = store.list_guests(None, 1, 1).await.unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.guests[0].name, "Ben Ito");
    }
}
