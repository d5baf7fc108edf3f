//! Booking rows.

use innkeep_core::booking::{Booking, BookingStatus};
use innkeep_core::error::CoreError;
use innkeep_core::types::{DbId, StayDate, Timestamp};
use sqlx::FromRow;

/// A row from the `bookings` table.
#[derive(Debug, Clone, FromRow)]
pub struct BookingRow {
    pub id: DbId,
    pub guest_id: DbId,
    pub room_id: DbId,
    pub check_in: StayDate,
    pub check_out: StayDate,
    pub status_id: i16,
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

impl TryFrom<BookingRow> for Booking {
    type Error = CoreError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let status = BookingStatus::from_id(row.status_id)
            .ok_or_else(|| super::unknown_status("booking", row.status_id))?;
        Ok(Booking {
            id: row.id,
            guest_id: row.guest_id,
            room_id: row.room_id,
            check_in: row.check_in,
            check_out: row.check_out,
            status,
            total_price: row.total_price,
            special_requests: row.special_requests,
            guest_count: row.guest_count,
            reference_number: row.reference_number,
            cancellation_fee: row.cancellation_fee,
            cancellation_reason: row.cancellation_reason,
            cancelled_at: row.cancelled_at,
            actual_check_in: row.actual_check_in,
            actual_check_out: row.actual_check_out,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
