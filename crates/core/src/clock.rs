//! Time source abstraction.
//!
//! Business rules that depend on "now" (stay validation, the
//! free-cancellation window, check-in stamps) read it from a [`Clock`] so
//! tests can pin time with [`FixedClock`].

use std::sync::RwLock;

use chrono::{Duration, Utc};

use crate::types::{StayDate, Timestamp};

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;

    /// Today's calendar date in UTC.
    fn today(&self) -> StayDate {
        self.now().date_naive()
    }
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    time: RwLock<Timestamp>,
}

impl FixedClock {
    pub fn new(time: Timestamp) -> Self {
        Self {
            time: RwLock::new(time),
        }
    }

    pub fn set(&self, time: Timestamp) {
        *self.time.write().unwrap_or_else(|e| e.into_inner()) = time;
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self.time.write().unwrap_or_else(|e| e.into_inner());
        *guard += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        *self.time.read().unwrap_or_else(|e| e.into_inner())
    }
}
