//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument and return raw rows.

pub mod booking_repo;
pub mod guest_repo;
pub mod room_repo;

pub use booking_repo::{BookingRepo, ReviseOutcome};
pub use guest_repo::GuestRepo;
pub use room_repo::{Deactivation, RoomRepo};
