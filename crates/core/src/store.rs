//! Persistence port for the reservation core.
//!
//! [`BookingStore`] is implemented by the in-memory
//! [`MemoryStore`](crate::memory::MemoryStore) and by the PostgreSQL store in
//! the `innkeep-db` crate. Beyond plain CRUD it exposes three compound
//! operations that must be atomic per room:
//!
//! - [`reserve`](BookingStore::reserve): room status and overlap check +
//!   pricing + insert.
//! - [`revise`](BookingStore::revise): overlap check (excluding the booking
//!   itself) + update.
//! - [`change_status`](BookingStore::change_status): compare-and-set on the
//!   current status.
//!
//! Two `reserve` calls for overlapping stays on the same room must never both
//! succeed; the loser receives [`CoreError::RoomUnavailable`].

use async_trait::async_trait;

use crate::booking::{Booking, BookingQuery, BookingRevision, BookingStatus, NewBooking, StatusChange};
use crate::error::CoreError;
use crate::guest::{Guest, GuestContact};
use crate::room::{Room, RoomFilter, RoomSpec};
use crate::types::{DbId, StayDate};

/// Outcome of [`BookingStore::deactivate_room`].
#[derive(Debug, Clone, PartialEq)]
pub enum RoomDeactivation {
    Deactivated(Room),
    /// The room still has this many blocking bookings checking out after
    /// the reference date.
    HasActiveBookings(i64),
    NotFound,
}

/// One page of a guest listing plus the unpaginated total.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct GuestPage {
    pub guests: Vec<Guest>,
    pub total: i64,
}

#[async_trait]
pub trait BookingStore: Send + Sync {
    // -- Rooms --------------------------------------------------------------

    /// Insert a room. Fails with [`CoreError::Conflict`] on a duplicate room
    /// number.
    async fn insert_room(&self, spec: &RoomSpec) -> Result<Room, CoreError>;

    /// Replace every admin-editable field. `None` if the room is unknown.
    async fn replace_room(&self, id: DbId, spec: &RoomSpec) -> Result<Option<Room>, CoreError>;

    async fn find_room(&self, id: DbId) -> Result<Option<Room>, CoreError>;

    /// Rooms matching `filter`, ordered by id.
    async fn list_rooms(&self, filter: &RoomFilter) -> Result<Vec<Room>, CoreError>;

    /// Mark a room active again. `None` if the room is unknown.
    async fn activate_room(&self, id: DbId) -> Result<Option<Room>, CoreError>;

    /// Mark a room inactive unless a blocking booking checks out after
    /// `today`. Serialized against `reserve` on the same room, so a
    /// reservation either lands first and blocks the deactivation or sees
    /// the room inactive.
    async fn deactivate_room(&self, id: DbId, today: StayDate)
        -> Result<RoomDeactivation, CoreError>;

    // -- Guests -------------------------------------------------------------

    /// Insert a guest. Fails with [`CoreError::Conflict`] if the email is
    /// already registered.
    async fn insert_guest(&self, contact: &GuestContact) -> Result<Guest, CoreError>;

    /// Overwrite a guest's contact details. `None` if the guest is unknown;
    /// [`CoreError::Conflict`] if the new email belongs to another guest.
    async fn update_guest(
        &self,
        id: DbId,
        contact: &GuestContact,
    ) -> Result<Option<Guest>, CoreError>;

    async fn find_guest(&self, id: DbId) -> Result<Option<Guest>, CoreError>;

    /// Exact (case-sensitive) email lookup.
    async fn find_guest_by_email(&self, email: &str) -> Result<Option<Guest>, CoreError>;

    /// Guests whose name, email or phone contains `search`
    /// (case-insensitive), ordered by id.
    async fn list_guests(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<GuestPage, CoreError>;

    /// Remove a guest with no booking history. Returns `false` if absent.
    async fn delete_guest(&self, id: DbId) -> Result<bool, CoreError>;

    // -- Bookings -----------------------------------------------------------

    async fn find_booking(&self, id: DbId) -> Result<Option<Booking>, CoreError>;

    async fn find_booking_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Booking>, CoreError>;

    async fn list_bookings(&self, query: &BookingQuery) -> Result<Vec<Booking>, CoreError>;

    /// Atomically verify that the room is active and that no blocking
    /// booking on it overlaps the stay, then insert the new booking priced
    /// at the room's current nightly rate. An inactive room yields
    /// [`CoreError::RoomUnavailable`].
    async fn reserve(&self, booking: NewBooking) -> Result<Booking, CoreError>;

    /// Atomically re-check availability (ignoring booking `id` itself) and
    /// write the revision. Returns `None` if the booking's status is no
    /// longer one of `editable`.
    async fn revise(
        &self,
        id: DbId,
        editable: &[BookingStatus],
        revision: BookingRevision,
    ) -> Result<Option<Booking>, CoreError>;

    /// Apply `change` only if the booking is still in `expected`. Returns
    /// `None` if the booking is missing or its status moved on.
    async fn change_status(
        &self,
        id: DbId,
        expected: BookingStatus,
        change: StatusChange,
    ) -> Result<Option<Booking>, CoreError>;
}
