//! Innkeep reservation core.
//!
//! Pure domain logic for the guesthouse booking backend. This crate has no
//! internal workspace dependencies so the API, persistence and notification
//! layers can all build on it:
//!
//! - [`inventory`]: room records and the soft-delete rules around them.
//! - [`availability`]: the overlap primitive and room availability search.
//! - [`lifecycle`]: booking creation, revision and the status state machine.
//! - [`registry`]: guest identity resolution by email.
//! - [`store`]: the persistence port, with an in-memory implementation in
//!   [`memory`].
//! - [`notify`]: the non-blocking notification dispatch seam.

pub mod availability;
pub mod booking;
pub mod clock;
pub mod config;
pub mod error;
pub mod guest;
pub mod inventory;
pub mod lifecycle;
pub mod memory;
pub mod notify;
pub mod registry;
pub mod room;
pub mod stay;
pub mod store;
pub mod types;
