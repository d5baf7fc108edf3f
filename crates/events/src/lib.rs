//! Booking notification delivery.
//!
//! The lifecycle manager only knows the [`Notifier`](innkeep_core::notify::Notifier)
//! seam. This crate supplies the production side of it:
//!
//! - [`NotificationQueue`]: a bounded channel plus a worker task, so
//!   dispatching never blocks the request that created or cancelled a booking.
//! - [`delivery`]: the sinks the worker fans out to (SMTP email, log).

pub mod delivery;
pub mod queue;

pub use delivery::email::{EmailConfig, EmailDelivery};
pub use delivery::log::LogSink;
pub use delivery::{NotificationSink, NotifyError};
pub use queue::NotificationQueue;
