//! Booking lifecycle manager.
//!
//! [`BookingManager`] owns every booking mutation: creation, revision and the
//! status transitions defined in [`state_machine`]. Availability is checked
//! by the store inside the same atomic unit as the write, and status changes
//! are compare-and-set against the status the decision was based on, so a
//! concurrent writer can never be silently overwritten.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::booking::{
    generate_reference_number, state_machine, Booking, BookingAction, BookingOrder, BookingQuery,
    BookingRevision, BookingStatus, NewBooking, StatusChange,
};
use crate::clock::Clock;
use crate::config::BookingConfig;
use crate::error::CoreError;
use crate::guest::Guest;
use crate::notify::{BookingNotice, Notifier};
use crate::room::Room;
use crate::stay::{cancellation_fee, total_price, validate_stay_dates, StayRange};
use crate::store::BookingStore;
use crate::types::{DbId, StayDate, Timestamp};

/// Reason stored when a cancellation does not give one.
pub const DEFAULT_CANCELLATION_REASON: &str = "Guest requested cancellation";

/// Statuses in which a booking's dates and details may still be revised.
pub const EDITABLE_STATUSES: [BookingStatus; 2] = [BookingStatus::Pending, BookingStatus::Confirmed];

/// How a booking entered the system, which decides its initial status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingChannel {
    /// Staff or API booking, confirmed immediately.
    #[default]
    Direct,
    /// Held as pending until payment is confirmed.
    AwaitingPayment,
}

impl BookingChannel {
    pub fn initial_status(self) -> BookingStatus {
        match self {
            Self::Direct => BookingStatus::Confirmed,
            Self::AwaitingPayment => BookingStatus::Pending,
        }
    }
}

/// Input for [`BookingManager::create_booking`].
#[derive(Debug, Clone)]
pub struct CreateBooking {
    pub guest_id: DbId,
    pub room_id: DbId,
    pub check_in: StayDate,
    pub check_out: StayDate,
    pub special_requests: Option<String>,
    /// Defaults to 1 when absent.
    pub guest_count: Option<i32>,
    pub channel: BookingChannel,
}

/// Partial update for [`BookingManager::update_booking`]. `None` keeps the
/// stored value; an empty `special_requests` clears it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingChanges {
    pub check_in: Option<StayDate>,
    pub check_out: Option<StayDate>,
    pub special_requests: Option<String>,
    pub guest_count: Option<i32>,
}

/// A booking with its guest and room resolved.
#[derive(Debug, Clone, Serialize)]
pub struct BookingDetails {
    pub booking: Booking,
    pub guest: Guest,
    pub room: Room,
}

#[derive(Clone)]
pub struct BookingManager {
    store: Arc<dyn BookingStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    config: BookingConfig,
}

impl BookingManager {
    pub fn new(
        store: Arc<dyn BookingStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        config: BookingConfig,
    ) -> Self {
        Self {
            store,
            notifier,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &BookingConfig {
        &self.config
    }

    /// [`validate_stay_dates`] against today's date and the configured
    /// stay limits.
    pub fn validate_stay_dates(
        &self,
        check_in: StayDate,
        check_out: StayDate,
    ) -> Result<StayRange, CoreError> {
        validate_stay_dates(check_in, check_out, self.clock.today(), &self.config)
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    pub async fn create_booking(&self, request: CreateBooking) -> Result<Booking, CoreError> {
        let stay = self.validate_stay_dates(request.check_in, request.check_out)?;
        let guest_count = validate_guest_count(request.guest_count.unwrap_or(1))?;

        let room = self.room(request.room_id).await?;
        let guest = self.guest(request.guest_id).await?;

        // Fails fast; `reserve` re-checks under the room lock.
        if !room.is_active() {
            return Err(CoreError::RoomUnavailable {
                room_id: room.id,
                check_in: stay.check_in(),
                check_out: stay.check_out(),
            });
        }
        ensure_capacity(&room, guest_count)?;

        let new_booking = NewBooking {
            guest_id: guest.id,
            room_id: room.id,
            stay,
            status: request.channel.initial_status(),
            special_requests: normalize_requests(request.special_requests),
            guest_count,
            reference_number: generate_reference_number(),
        };

        let booking = match self.store.reserve(new_booking).await {
            Ok(booking) => booking,
            Err(e @ CoreError::RoomUnavailable { .. }) => {
                tracing::info!(
                    room_id = room.id,
                    check_in = %stay.check_in(),
                    check_out = %stay.check_out(),
                    "Booking rejected: room unavailable"
                );
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        tracing::info!(
            booking_id = booking.id,
            room_id = booking.room_id,
            guest_id = booking.guest_id,
            status = %booking.status,
            reference = %booking.reference_number,
            "Booking created"
        );

        self.notifier
            .dispatch(BookingNotice::created(booking.clone(), guest, room));
        Ok(booking)
    }

    /// Revise dates, guest count or special requests of a pending or
    /// confirmed booking.
    pub async fn update_booking(
        &self,
        id: DbId,
        changes: BookingChanges,
    ) -> Result<Booking, CoreError> {
        let current = self.booking(id).await?;
        if !EDITABLE_STATUSES.contains(&current.status) {
            return Err(CoreError::InvalidTransition {
                from: current.status,
                action: "modify",
            });
        }

        let check_in = changes.check_in.unwrap_or(current.check_in);
        let check_out = changes.check_out.unwrap_or(current.check_out);
        let dates_changed = check_in != current.check_in || check_out != current.check_out;

        let stay = if dates_changed {
            self.validate_stay_dates(check_in, check_out)?
        } else {
            current.stay()?
        };

        let room = self.room(current.room_id).await?;
        let guest_count = validate_guest_count(changes.guest_count.unwrap_or(current.guest_count))?;
        ensure_capacity(&room, guest_count)?;

        let price = if dates_changed {
            total_price(room.price_per_night, &stay)
        } else {
            current.total_price
        };

        let special_requests = match changes.special_requests {
            Some(requests) => normalize_requests(Some(requests)),
            None => current.special_requests.clone(),
        };

        let revision = BookingRevision {
            stay,
            total_price: price,
            guest_count,
            special_requests,
        };

        match self.store.revise(id, &EDITABLE_STATUSES, revision).await? {
            Some(booking) => {
                tracing::info!(booking_id = id, dates_changed, "Booking updated");
                Ok(booking)
            }
            None => Err(self.lost_race(id, "modify").await),
        }
    }

    /// `pending -> confirmed`; stands in for the payment step.
    pub async fn confirm_booking(&self, id: DbId) -> Result<Booking, CoreError> {
        self.advance(id, BookingAction::Confirm, |_, _| {}).await
    }

    /// `pending -> rejected`.
    pub async fn reject_booking(
        &self,
        id: DbId,
        reason: Option<String>,
    ) -> Result<Booking, CoreError> {
        let reason = normalize_requests(reason);
        self.advance(id, BookingAction::Reject, move |change, _| {
            change.cancellation_reason = reason;
        })
        .await
    }

    /// Cancel a pending or confirmed booking, charging the late-cancellation
    /// fee when inside the free-cancellation window.
    pub async fn cancel_booking(
        &self,
        id: DbId,
        reason: Option<String>,
    ) -> Result<Booking, CoreError> {
        let current = self.booking(id).await?;
        if current.status == BookingStatus::Cancelled {
            return Err(CoreError::AlreadyCancelled(id));
        }

        let reason = normalize_requests(reason)
            .unwrap_or_else(|| DEFAULT_CANCELLATION_REASON.to_string());

        let booking = self
            .advance_from(current, BookingAction::Cancel, move |change, now| {
                change.cancelled_at = Some(now);
                change.cancellation_reason = Some(reason);
            })
            .await?;

        self.notify_cancelled(&booking).await;
        Ok(booking)
    }

    /// Guest self-service cancellation. The booking must belong to `email`
    /// and carry `reference`; otherwise it is reported as not found.
    pub async fn cancel_as_guest(
        &self,
        id: DbId,
        email: &str,
        reference: &str,
        reason: Option<String>,
    ) -> Result<Booking, CoreError> {
        if !self.verify_ownership(id, email, reference).await? {
            return Err(CoreError::NotFound {
                entity: "Booking",
                id,
            });
        }
        self.cancel_booking(id, reason).await
    }

    /// `confirmed -> checked_in`, recording the arrival time.
    pub async fn check_in(&self, id: DbId) -> Result<Booking, CoreError> {
        self.advance(id, BookingAction::CheckIn, |change, now| {
            change.actual_check_in = Some(now);
        })
        .await
    }

    /// `checked_in -> completed`, recording the departure time.
    pub async fn check_out(&self, id: DbId) -> Result<Booking, CoreError> {
        self.advance(id, BookingAction::CheckOut, |change, now| {
            change.actual_check_out = Some(now);
        })
        .await
    }

    // -----------------------------------------------------------------------
    // Ownership
    // -----------------------------------------------------------------------

    /// True when booking `id` belongs to the guest with `email`
    /// (case-insensitive) and carries exactly `reference`.
    pub async fn verify_ownership(
        &self,
        id: DbId,
        email: &str,
        reference: &str,
    ) -> Result<bool, CoreError> {
        let Some(booking) = self.store.find_booking(id).await? else {
            return Ok(false);
        };
        if booking.reference_number != reference {
            return Ok(false);
        }
        Ok(self
            .store
            .find_guest(booking.guest_id)
            .await?
            .is_some_and(|guest| guest.email.eq_ignore_ascii_case(email.trim())))
    }

    /// Resolve a booking from the pair a guest holds: their email and the
    /// reference number.
    pub async fn lookup_by_reference(
        &self,
        email: &str,
        reference: &str,
    ) -> Result<BookingDetails, CoreError> {
        let not_found = || CoreError::NotFoundByKey {
            entity: "Booking",
            key: reference.to_string(),
        };

        let booking = self
            .store
            .find_booking_by_reference(reference.trim())
            .await?
            .ok_or_else(not_found)?;
        let guest = self.guest(booking.guest_id).await?;
        if !guest.email.eq_ignore_ascii_case(email.trim()) {
            return Err(not_found());
        }
        let room = self.room(booking.room_id).await?;
        Ok(BookingDetails {
            booking,
            guest,
            room,
        })
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub async fn get_booking(&self, id: DbId) -> Result<Booking, CoreError> {
        self.booking(id).await
    }

    pub async fn booking_details(&self, id: DbId) -> Result<BookingDetails, CoreError> {
        let booking = self.booking(id).await?;
        let guest = self.guest(booking.guest_id).await?;
        let room = self.room(booking.room_id).await?;
        Ok(BookingDetails {
            booking,
            guest,
            room,
        })
    }

    /// Non-cancelled bookings arriving on `date`.
    pub async fn bookings_on(&self, date: StayDate) -> Result<Vec<Booking>, CoreError> {
        self.store
            .list_bookings(&BookingQuery {
                check_in_on: Some(date),
                blocking_only: true,
                ..Default::default()
            })
            .await
    }

    /// Blocking bookings overlapping `[start, end)`.
    pub async fn bookings_between(
        &self,
        start: StayDate,
        end: StayDate,
    ) -> Result<Vec<Booking>, CoreError> {
        let range = StayRange::new(start, end)?;
        self.store
            .list_bookings(&BookingQuery {
                overlapping: Some(range),
                blocking_only: true,
                ..Default::default()
            })
            .await
    }

    /// All bookings, optionally narrowed to one status and/or to check-ins
    /// after today.
    pub async fn list_bookings(
        &self,
        status: Option<BookingStatus>,
        future_only: bool,
    ) -> Result<Vec<Booking>, CoreError> {
        self.store
            .list_bookings(&BookingQuery {
                statuses: status.into_iter().collect(),
                check_in_after: future_only.then(|| self.clock.today()),
                ..Default::default()
            })
            .await
    }

    /// A guest's bookings, newest check-in first.
    pub async fn bookings_for_guest(&self, guest_id: DbId) -> Result<Vec<Booking>, CoreError> {
        self.guest(guest_id).await?;
        self.store
            .list_bookings(&BookingQuery {
                guest_id: Some(guest_id),
                order: BookingOrder::CheckInDesc,
                ..Default::default()
            })
            .await
    }

    /// Confirmed bookings arriving after today.
    pub async fn upcoming_bookings(&self) -> Result<Vec<Booking>, CoreError> {
        self.store
            .list_bookings(&BookingQuery {
                statuses: vec![BookingStatus::Confirmed],
                check_in_after: Some(self.clock.today()),
                ..Default::default()
            })
            .await
    }

    /// Confirmed or checked-in stays spanning today.
    pub async fn current_bookings(&self) -> Result<Vec<Booking>, CoreError> {
        self.store
            .list_bookings(&BookingQuery {
                statuses: vec![BookingStatus::Confirmed, BookingStatus::CheckedIn],
                in_house_on: Some(self.clock.today()),
                ..Default::default()
            })
            .await
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    async fn advance<F>(&self, id: DbId, action: BookingAction, fill: F) -> Result<Booking, CoreError>
    where
        F: FnOnce(&mut StatusChange, Timestamp) + Send,
    {
        let current = self.booking(id).await?;
        self.advance_from(current, action, fill).await
    }

    /// Apply `action` to `current` through the state machine, then write it
    /// with a compare-and-set on `current.status`.
    async fn advance_from<F>(
        &self,
        current: Booking,
        action: BookingAction,
        fill: F,
    ) -> Result<Booking, CoreError>
    where
        F: FnOnce(&mut StatusChange, Timestamp) + Send,
    {
        let next = state_machine::transition(current.status, action)?;
        let now = self.clock.now();

        let mut change = StatusChange::to(next);
        fill(&mut change, now);
        // The fee is priced from the same row the compare-and-set guards.
        if action == BookingAction::Cancel {
            change.cancellation_fee = Some(cancellation_fee(
                current.total_price,
                current.check_in,
                now,
                &self.config,
            ));
        }

        match self
            .store
            .change_status(current.id, current.status, change)
            .await?
        {
            Some(booking) => {
                tracing::info!(
                    booking_id = booking.id,
                    from = %current.status,
                    to = %booking.status,
                    "Booking status changed"
                );
                Ok(booking)
            }
            None => Err(self.lost_race(current.id, action.verb()).await),
        }
    }

    /// Build the error for a write whose precondition no longer holds,
    /// using the booking's fresh state.
    async fn lost_race(&self, id: DbId, action: &'static str) -> CoreError {
        match self.store.find_booking(id).await {
            Ok(Some(fresh)) if fresh.status == BookingStatus::Cancelled && action == "cancel" => {
                CoreError::AlreadyCancelled(id)
            }
            Ok(Some(fresh)) => CoreError::InvalidTransition {
                from: fresh.status,
                action,
            },
            Ok(None) => CoreError::NotFound {
                entity: "Booking",
                id,
            },
            Err(e) => e,
        }
    }

    async fn notify_cancelled(&self, booking: &Booking) {
        let guest = self.store.find_guest(booking.guest_id).await;
        let room = self.store.find_room(booking.room_id).await;
        match (guest, room) {
            (Ok(Some(guest)), Ok(Some(room))) => self
                .notifier
                .dispatch(BookingNotice::cancelled(booking.clone(), guest, room)),
            (Err(e), _) | (_, Err(e)) => tracing::warn!(
                booking_id = booking.id,
                error = %e,
                "Skipping cancellation notice"
            ),
            _ => tracing::warn!(
                booking_id = booking.id,
                "Skipping cancellation notice: guest or room missing"
            ),
        }
    }

    async fn booking(&self, id: DbId) -> Result<Booking, CoreError> {
        self.store
            .find_booking(id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Booking",
                id,
            })
    }

    async fn room(&self, id: DbId) -> Result<Room, CoreError> {
        self.store
            .find_room(id)
            .await?
            .ok_or(CoreError::NotFound { entity: "Room", id })
    }

    async fn guest(&self, id: DbId) -> Result<Guest, CoreError> {
        self.store
            .find_guest(id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Guest",
                id,
            })
    }
}

fn validate_guest_count(count: i32) -> Result<i32, CoreError> {
    if count < 1 {
        return Err(CoreError::Validation(format!(
            "guest_count must be at least 1, got {count}"
        )));
    }
    Ok(count)
}

fn ensure_capacity(room: &Room, guest_count: i32) -> Result<(), CoreError> {
    if guest_count > room.capacity {
        return Err(CoreError::CapacityExceeded {
            room_id: room.id,
            capacity: room.capacity,
            requested: guest_count,
        });
    }
    Ok(())
}

/// Trim free text; blank becomes `None`.
fn normalize_requests(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}
