//! Booking records, the status state machine, and booking queries.
//!
//! Every mutating lifecycle operation goes through
//! [`state_machine::transition`]; there are no status checks anywhere else.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::stay::StayRange;
use crate::types::{DbId, StayDate, Timestamp};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Booking status. Discriminants match the `booking_statuses` seed data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i16)]
pub enum BookingStatus {
    Pending = 1,
    Confirmed = 2,
    Cancelled = 3,
    CheckedIn = 4,
    CheckedOut = 5,
    Completed = 6,
    Rejected = 7,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 7] = [
        Self::Pending,
        Self::Confirmed,
        Self::Cancelled,
        Self::CheckedIn,
        Self::CheckedOut,
        Self::Completed,
        Self::Rejected,
    ];

    /// Return the database status ID.
    pub fn id(self) -> i16 {
        self as i16
    }

    pub fn from_id(id: i16) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.id() == id)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::CheckedIn => "checked_in",
            Self::CheckedOut => "checked_out",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
        }
    }

    /// Whether a booking in this status holds its room.
    ///
    /// Everything except cancelled and rejected blocks, including `pending`:
    /// an unpaid reservation still reserves the room until it is rejected or
    /// cancelled.
    pub fn blocks_inventory(self) -> bool {
        !matches!(self, Self::Cancelled | Self::Rejected)
    }

    pub fn is_terminal(self) -> bool {
        state_machine::valid_transitions(self).is_empty()
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown booking status '{s}'")))
    }
}

/// Statuses that hold a room, in database-id form.
pub fn blocking_status_ids() -> Vec<i16> {
    BookingStatus::ALL
        .into_iter()
        .filter(|s| s.blocks_inventory())
        .map(BookingStatus::id)
        .collect()
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// A lifecycle move requested by a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingAction {
    Confirm,
    Reject,
    Cancel,
    CheckIn,
    CheckOut,
}

impl BookingAction {
    pub fn verb(self) -> &'static str {
        match self {
            Self::Confirm => "confirm",
            Self::Reject => "reject",
            Self::Cancel => "cancel",
            Self::CheckIn => "check in",
            Self::CheckOut => "check out",
        }
    }
}

pub mod state_machine {
    use super::{BookingAction, BookingStatus};
    use crate::error::CoreError;

    /// Moves available from `from`, with the status each one leads to.
    ///
    /// Terminal states (cancelled, rejected, completed, checked_out) return
    /// an empty slice.
    pub fn valid_transitions(from: BookingStatus) -> &'static [(BookingAction, BookingStatus)] {
        use BookingAction::*;
        use BookingStatus::*;
        match from {
            Pending => &[(Confirm, Confirmed), (Cancel, Cancelled), (Reject, Rejected)],
            Confirmed => &[(Cancel, Cancelled), (CheckIn, CheckedIn)],
            CheckedIn => &[(CheckOut, Completed)],
            Cancelled | Rejected | Completed | CheckedOut => &[],
        }
    }

    /// The status reached by applying `action` to `from`, if allowed.
    pub fn next_status(from: BookingStatus, action: BookingAction) -> Option<BookingStatus> {
        valid_transitions(from)
            .iter()
            .find(|(a, _)| *a == action)
            .map(|(_, to)| *to)
    }

    /// Validate a move, returning the target status or a descriptive error.
    pub fn transition(
        from: BookingStatus,
        action: BookingAction,
    ) -> Result<BookingStatus, CoreError> {
        next_status(from, action).ok_or(CoreError::InvalidTransition {
            from,
            action: action.verb(),
        })
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A stored booking. Guest and room are referenced by id only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Booking {
    pub id: DbId,
    pub guest_id: DbId,
    pub room_id: DbId,
    pub check_in: StayDate,
    pub check_out: StayDate,
    pub status: BookingStatus,
    pub total_price: f64,
    pub special_requests: Option<String>,
    pub guest_count: i32,
    pub reference_number: String,
    pub cancellation_fee: f64,
    pub cancellation_reason: Option<String>,
    pub cancelled_at: Option<Timestamp>,
    pub actual_check_in: Option<Timestamp>,
    pub actual_check_out: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Booking {
    pub fn stay(&self) -> Result<StayRange, CoreError> {
        StayRange::new(self.check_in, self.check_out)
    }

    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }
}

/// A booking ready to be inserted by [`BookingStore::reserve`](crate::store::BookingStore::reserve).
///
/// There is no price field: the store prices the stay from the room's
/// nightly rate while it holds the room, so a concurrent rate change
/// cannot leave the booking at a stale price.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub guest_id: DbId,
    pub room_id: DbId,
    pub stay: StayRange,
    pub status: BookingStatus,
    pub special_requests: Option<String>,
    pub guest_count: i32,
    pub reference_number: String,
}

/// Replacement values for an existing booking's stay and party details.
#[derive(Debug, Clone)]
pub struct BookingRevision {
    pub stay: StayRange,
    pub total_price: f64,
    pub guest_count: i32,
    pub special_requests: Option<String>,
}

/// Column changes written alongside a status transition.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
    pub status: BookingStatus,
    pub cancellation_fee: Option<f64>,
    pub cancellation_reason: Option<String>,
    pub cancelled_at: Option<Timestamp>,
    pub actual_check_in: Option<Timestamp>,
    pub actual_check_out: Option<Timestamp>,
}

impl StatusChange {
    /// A bare status change with no extra columns.
    pub fn to(status: BookingStatus) -> Self {
        Self {
            status,
            cancellation_fee: None,
            cancellation_reason: None,
            cancelled_at: None,
            actual_check_in: None,
            actual_check_out: None,
        }
    }

    /// Apply onto an in-memory record. `None` columns keep their value.
    pub fn apply_to(&self, booking: &mut Booking, now: Timestamp) {
        booking.status = self.status;
        if let Some(fee) = self.cancellation_fee {
            booking.cancellation_fee = fee;
        }
        if let Some(reason) = &self.cancellation_reason {
            booking.cancellation_reason = Some(reason.clone());
        }
        if self.cancelled_at.is_some() {
            booking.cancelled_at = self.cancelled_at;
        }
        if self.actual_check_in.is_some() {
            booking.actual_check_in = self.actual_check_in;
        }
        if self.actual_check_out.is_some() {
            booking.actual_check_out = self.actual_check_out;
        }
        booking.updated_at = now;
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Sort order for booking listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BookingOrder {
    #[default]
    CheckInAsc,
    CheckInDesc,
}

/// Filter for booking listings. Unset fields match everything.
///
/// Overlap filtering uses the same half-open semantics as the availability
/// engine.
#[derive(Debug, Clone, Default)]
pub struct BookingQuery {
    pub statuses: Vec<BookingStatus>,
    pub blocking_only: bool,
    pub guest_id: Option<DbId>,
    pub room_id: Option<DbId>,
    pub check_in_on: Option<StayDate>,
    pub check_in_after: Option<StayDate>,
    pub overlapping: Option<StayRange>,
    /// Stays in progress on this date (`check_in <= date < check_out`).
    pub in_house_on: Option<StayDate>,
    pub order: BookingOrder,
}

impl BookingQuery {
    pub fn matches(&self, booking: &Booking) -> bool {
        if !self.statuses.is_empty() && !self.statuses.contains(&booking.status) {
            return false;
        }
        if self.blocking_only && !booking.status.blocks_inventory() {
            return false;
        }
        if self.guest_id.is_some_and(|id| id != booking.guest_id) {
            return false;
        }
        if self.room_id.is_some_and(|id| id != booking.room_id) {
            return false;
        }
        if self.check_in_on.is_some_and(|d| d != booking.check_in) {
            return false;
        }
        if self.check_in_after.is_some_and(|d| booking.check_in <= d) {
            return false;
        }
        if let Some(range) = &self.overlapping {
            if !(booking.check_in < range.check_out() && booking.check_out > range.check_in()) {
                return false;
            }
        }
        if let Some(date) = self.in_house_on {
            if !(booking.check_in <= date && date < booking.check_out) {
                return false;
            }
        }
        true
    }

    /// Sort `bookings` per [`BookingQuery::order`], ties broken by id.
    pub fn sort(&self, bookings: &mut [Booking]) {
        match self.order {
            BookingOrder::CheckInAsc => bookings.sort_by_key(|b| (b.check_in, b.id)),
            BookingOrder::CheckInDesc => {
                bookings.sort_by(|a, b| b.check_in.cmp(&a.check_in).then(a.id.cmp(&b.id)))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Reference numbers
// ---------------------------------------------------------------------------

/// Prefix on every booking reference number.
pub const REFERENCE_PREFIX: &str = "BK-";

/// Random characters after the prefix.
pub const REFERENCE_LENGTH: usize = 10;

/// Generate an opaque reference number for guest self-service, e.g.
/// `BK-7QK2M9XHAD`.
pub fn generate_reference_number() -> String {
    let code: String = rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(REFERENCE_LENGTH)
        .map(|b| char::from(b).to_ascii_uppercase())
        .collect();
    format!("{REFERENCE_PREFIX}{code}")
}
