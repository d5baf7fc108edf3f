//! Availability engine.
//!
//! A room is available for a stay when no blocking booking on that room
//! overlaps it (half-open `[check_in, check_out)` ranges; see
//! [`StayRange::overlaps`]). The engine answers preview questions for
//! callers; the authoritative check happens again inside
//! [`BookingStore::reserve`] so a preview can never race a write.

use std::collections::HashSet;
use std::sync::Arc;

use crate::booking::{Booking, BookingQuery};
use crate::error::CoreError;
use crate::room::{Room, RoomFilter};
use crate::stay::StayRange;
use crate::store::BookingStore;
use crate::types::{DbId, StayDate};

/// First blocking booking on `room_id` that overlaps `stay`, ignoring the
/// booking identified by `exclude`.
pub fn find_conflict<'a>(
    existing: impl IntoIterator<Item = &'a Booking>,
    room_id: DbId,
    stay: &StayRange,
    exclude: Option<DbId>,
) -> Option<&'a Booking> {
    existing.into_iter().find(|b| {
        b.room_id == room_id
            && b.status.blocks_inventory()
            && Some(b.id) != exclude
            && b.check_in < stay.check_out()
            && b.check_out > stay.check_in()
    })
}

/// Read-side availability queries over a [`BookingStore`].
#[derive(Clone)]
pub struct AvailabilityEngine {
    store: Arc<dyn BookingStore>,
}

impl AvailabilityEngine {
    pub fn new(store: Arc<dyn BookingStore>) -> Self {
        Self { store }
    }

    /// Whether `room_id` is free for `[check_in, check_out)`.
    ///
    /// `exclude_booking_id` lets a booking being revised ignore itself. Empty
    /// ranges are rejected with [`CoreError::InvalidDateRange`] rather than
    /// reported as available.
    pub async fn is_available(
        &self,
        room_id: DbId,
        check_in: StayDate,
        check_out: StayDate,
        exclude_booking_id: Option<DbId>,
    ) -> Result<bool, CoreError> {
        let stay = StayRange::new(check_in, check_out)?;

        if self.store.find_room(room_id).await?.is_none() {
            return Err(CoreError::NotFound {
                entity: "Room",
                id: room_id,
            });
        }

        let existing = self.overlapping(Some(room_id), &stay).await?;
        Ok(find_conflict(&existing, room_id, &stay, exclude_booking_id).is_none())
    }

    /// Active rooms free for the whole stay with at least `min_capacity`
    /// beds, ordered by room id.
    pub async fn list_available_rooms(
        &self,
        check_in: StayDate,
        check_out: StayDate,
        min_capacity: Option<i32>,
    ) -> Result<Vec<Room>, CoreError> {
        let stay = StayRange::new(check_in, check_out)?;

        let filter = RoomFilter {
            min_capacity,
            ..RoomFilter::active()
        };
        let rooms = self.store.list_rooms(&filter).await?;

        // One query for every overlapping booking instead of one per room.
        let busy: HashSet<DbId> = self
            .overlapping(None, &stay)
            .await?
            .iter()
            .map(|b| b.room_id)
            .collect();

        let mut available: Vec<Room> = rooms
            .into_iter()
            .filter(|room| !busy.contains(&room.id))
            .collect();
        available.sort_by_key(|room| room.id);

        tracing::debug!(
            %check_in,
            %check_out,
            available = available.len(),
            "Computed room availability"
        );
        Ok(available)
    }

    async fn overlapping(
        &self,
        room_id: Option<DbId>,
        stay: &StayRange,
    ) -> Result<Vec<Booking>, CoreError> {
        let query = BookingQuery {
            room_id,
            overlapping: Some(*stay),
            blocking_only: true,
            ..Default::default()
        };
        self.store.list_bookings(&query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::BookingStatus;
    use chrono::Utc;

    fn d(s: &str) -> StayDate {
        s.parse().unwrap()
    }

    fn booking(id: DbId, room_id: DbId, from: &str, to: &str, status: BookingStatus) -> Booking {
        Booking {
            id,
            guest_id: 1,
            room_id,
            check_in: d(from),
            check_out: d(to),
            status,
            total_price: 0.0,
            special_requests: None,
            guest_count: 1,
            reference_number: format!("BK-{id}"),
            cancellation_fee: 0.0,
            cancellation_reason: None,
            cancelled_at: None,
            actual_check_in: None,
            actual_check_out: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn overlapping_booking_conflicts() {
        let existing = [booking(1, 5, "2025-06-01", "2025-06-05", BookingStatus::Confirmed)];
        let stay = StayRange::new(d("2025-06-04"), d("2025-06-06")).unwrap();
        assert_eq!(find_conflict(&existing, 5, &stay, None).map(|b| b.id), Some(1));
    }

    #[test]
    fn back_to_back_is_free() {
        let existing = [booking(1, 5, "2025-06-01", "2025-06-05", BookingStatus::Confirmed)];
        let stay = StayRange::new(d("2025-06-05"), d("2025-06-07")).unwrap();
        assert!(find_conflict(&existing, 5, &stay, None).is_none());
    }

    #[test]
    fn other_rooms_ignored() {
        let existing = [booking(1, 6, "2025-06-01", "2025-06-05", BookingStatus::Confirmed)];
        let stay = StayRange::new(d("2025-06-02"), d("2025-06-03")).unwrap();
        assert!(find_conflict(&existing, 5, &stay, None).is_none());
    }

    #[test]
    fn cancelled_and_rejected_do_not_block() {
        let existing = [
            booking(1, 5, "2025-06-01", "2025-06-05", BookingStatus::Cancelled),
            booking(2, 5, "2025-06-01", "2025-06-05", BookingStatus::Rejected),
        ];
        let stay = StayRange::new(d("2025-06-02"), d("2025-06-03")).unwrap();
        assert!(find_conflict(&existing, 5, &stay, None).is_none());
    }

    #[test]
    fn pending_blocks() {
        let existing = [booking(1, 5, "2025-06-01", "2025-06-05", BookingStatus::Pending)];
        let stay = StayRange::new(d("2025-06-02"), d("2025-06-03")).unwrap();
        assert!(find_conflict(&existing, 5, &stay, None).is_some());
    }

    #[test]
    fn excluded_booking_ignored() {
        let existing = [booking(1, 5, "2025-06-01", "2025-06-05", BookingStatus::Confirmed)];
        let stay = StayRange::new(d("2025-06-02"), d("2025-06-06")).unwrap();
        assert!(find_conflict(&existing, 5, &stay, Some(1)).is_none());
        assert!(find_conflict(&existing, 5, &stay, Some(2)).is_some());
    }
}
