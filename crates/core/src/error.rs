use crate::booking::BookingStatus;
use crate::types::{DbId, StayDate};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Entity not found: {entity} matching {key}")]
    NotFoundByKey { entity: &'static str, key: String },

    #[error("Room {room_id} is not available from {check_in} to {check_out}")]
    RoomUnavailable {
        room_id: DbId,
        check_in: StayDate,
        check_out: StayDate,
    },

    #[error("Room {room_id} holds at most {capacity} guests, {requested} requested")]
    CapacityExceeded {
        room_id: DbId,
        capacity: i32,
        requested: i32,
    },

    #[error("Cannot {action} a booking that is {from}")]
    InvalidTransition {
        from: BookingStatus,
        action: &'static str,
    },

    #[error("Booking {0} is already cancelled")]
    AlreadyCancelled(DbId),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(String),
}
