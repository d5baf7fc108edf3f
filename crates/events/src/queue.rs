//! Bounded notification queue.
//!
//! [`NotificationQueue`] is the production [`Notifier`]: `dispatch` does a
//! `try_send` onto a bounded `tokio::sync::mpsc` channel and returns. A
//! single worker task drains the channel and hands each notice to every
//! configured [`NotificationSink`] in turn. When the queue is full the notice
//! is dropped with a warning; the booking it describes is already committed.
//!
//! The worker exits once every `NotificationQueue` clone has been dropped and
//! the remaining notices are delivered.

use std::sync::Arc;

use innkeep_core::notify::{BookingNotice, NoticeKind, Notifier};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::delivery::NotificationSink;

/// Default channel capacity.
pub const DEFAULT_CAPACITY: usize = 256;

#[derive(Clone)]
pub struct NotificationQueue {
    sender: mpsc::Sender<BookingNotice>,
}

impl NotificationQueue {
    /// Create the queue and spawn its worker on the current runtime.
    pub fn start(
        capacity: usize,
        sinks: Vec<Arc<dyn NotificationSink>>,
    ) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let worker = tokio::spawn(run_worker(receiver, sinks));
        (Self { sender }, worker)
    }
}

impl Notifier for NotificationQueue {
    fn dispatch(&self, notice: BookingNotice) {
        if let Err(e) = self.sender.try_send(notice) {
            let (reason, notice) = match e {
                mpsc::error::TrySendError::Full(n) => ("queue full", n),
                mpsc::error::TrySendError::Closed(n) => ("worker stopped", n),
            };
            tracing::warn!(
                booking_id = notice.booking.id,
                kind = ?notice.kind,
                reason,
                "Booking notice dropped"
            );
        }
    }
}

async fn run_worker(
    mut receiver: mpsc::Receiver<BookingNotice>,
    sinks: Vec<Arc<dyn NotificationSink>>,
) {
    tracing::debug!(sinks = sinks.len(), "Notification worker started");
    while let Some(notice) = receiver.recv().await {
        for sink in &sinks {
            let result = match notice.kind {
                NoticeKind::BookingCreated => {
                    sink.booking_created(&notice.booking, &notice.guest, &notice.room)
                        .await
                }
                NoticeKind::BookingCancelled => {
                    sink.booking_cancelled(&notice.booking, &notice.guest, &notice.room)
                        .await
                }
            };
            if let Err(e) = result {
                tracing::warn!(
                    error = %e,
                    sink = sink.name(),
                    booking_id = notice.booking.id,
                    kind = ?notice.kind,
                    "Notification delivery failed"
                );
            }
        }
    }
    tracing::info!("Notification queue closed, worker shutting down");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
