//! Notification dispatch seam.
//!
//! The lifecycle manager hands a [`BookingNotice`] to a [`Notifier`] after a
//! booking is created or cancelled. `dispatch` must return immediately:
//! delivery (email, logging) happens elsewhere and its failures never reach
//! the caller that made the booking.

use std::sync::Mutex;

use serde::Serialize;

use crate::booking::Booking;
use crate::guest::Guest;
use crate::room::Room;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    BookingCreated,
    BookingCancelled,
}

/// A lifecycle event with the records a sink needs to render it.
#[derive(Debug, Clone, Serialize)]
pub struct BookingNotice {
    pub kind: NoticeKind,
    pub booking: Booking,
    pub guest: Guest,
    pub room: Room,
}

impl BookingNotice {
    pub fn created(booking: Booking, guest: Guest, room: Room) -> Self {
        Self {
            kind: NoticeKind::BookingCreated,
            booking,
            guest,
            room,
        }
    }

    pub fn cancelled(booking: Booking, guest: Guest, room: Room) -> Self {
        Self {
            kind: NoticeKind::BookingCancelled,
            booking,
            guest,
            room,
        }
    }
}

pub trait Notifier: Send + Sync {
    /// Hand off a notice without waiting for delivery.
    fn dispatch(&self, notice: BookingNotice);
}

/// Discards every notice.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn dispatch(&self, _notice: BookingNotice) {}
}

/// Keeps every notice in memory, in dispatch order. Used by tests.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<BookingNotice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<BookingNotice> {
        self.notices
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn kinds(&self) -> Vec<NoticeKind> {
        self.notices().iter().map(|n| n.kind).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn dispatch(&self, notice: BookingNotice) {
        self.notices
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(notice);
    }
}
