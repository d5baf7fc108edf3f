//! Sink that writes each notice to the tracing log.
//!
//! Always installed, so a deployment without SMTP still records what would
//! have been sent.

use async_trait::async_trait;
use innkeep_core::booking::Booking;
use innkeep_core::guest::Guest;
use innkeep_core::room::Room;

use super::{NotificationSink, NotifyError};

#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn booking_created(
        &self,
        booking: &Booking,
        guest: &Guest,
        room: &Room,
    ) -> Result<(), NotifyError> {
        tracing::info!(
            booking_id = booking.id,
            reference = %booking.reference_number,
            guest_id = guest.id,
            room_number = %room.room_number,
            check_in = %booking.check_in,
            check_out = %booking.check_out,
            status = booking.status.as_str(),
            "Booking created"
        );
        Ok(())
    }

    async fn booking_cancelled(
        &self,
        booking: &Booking,
        guest: &Guest,
        room: &Room,
    ) -> Result<(), NotifyError> {
        tracing::info!(
            booking_id = booking.id,
            reference = %booking.reference_number,
            guest_id = guest.id,
            room_number = %room.room_number,
            cancellation_fee = booking.cancellation_fee,
            "Booking cancelled"
        );
        Ok(())
    }
}
