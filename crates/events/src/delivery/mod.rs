//! Delivery channels for booking notices.

use async_trait::async_trait;
use innkeep_core::booking::Booking;
use innkeep_core::guest::Guest;
use innkeep_core::room::Room;

pub mod email;
pub mod log;

/// Error type for notice delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error(transparent)]
    Email(#[from] email::EmailError),

    #[error("Guest {0} has no email address on record")]
    MissingRecipient(innkeep_core::types::DbId),
}

/// A destination for booking lifecycle notices.
///
/// Sinks run on the notification worker, never on the request path. An
/// error is logged by the worker and goes no further.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Short name used in log fields.
    fn name(&self) -> &'static str;

    async fn booking_created(
        &self,
        booking: &Booking,
        guest: &Guest,
        room: &Room,
    ) -> Result<(), NotifyError>;

    async fn booking_cancelled(
        &self,
        booking: &Booking,
        guest: &Guest,
        room: &Room,
    ) -> Result<(), NotifyError>;
}
