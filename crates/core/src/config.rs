//! Booking policy configuration.
//!
//! [`BookingConfig`] is built once at startup (see the API crate's
//! `ServerConfig::from_env`) and injected into the
//! [`BookingManager`](crate::lifecycle::BookingManager). Nothing in this crate
//! reads the environment.

use crate::error::CoreError;

/// Default minimum stay length in nights.
pub const DEFAULT_MIN_STAY_NIGHTS: i64 = 1;

/// Default maximum stay length in nights.
pub const DEFAULT_MAX_STAY_NIGHTS: i64 = 14;

/// Default free-cancellation window in hours before check-in.
pub const DEFAULT_FREE_CANCELLATION_HOURS: i64 = 24;

/// Default share of the total price charged for a late cancellation.
pub const DEFAULT_CANCELLATION_FEE_RATE: f64 = 0.5;

/// Default hour of day (UTC) at which a stay begins.
pub const DEFAULT_CHECK_IN_HOUR: u32 = 0;

/// Business rules applied by the booking lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingConfig {
    pub min_stay_nights: i64,
    pub max_stay_nights: i64,
    pub free_cancellation_hours: i64,
    /// Fraction of `total_price` in `[0, 1]`.
    pub cancellation_fee_rate: f64,
    /// Hour (UTC, 0-23) used to turn a check-in date into an instant when
    /// measuring the free-cancellation window.
    pub check_in_hour: u32,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            min_stay_nights: DEFAULT_MIN_STAY_NIGHTS,
            max_stay_nights: DEFAULT_MAX_STAY_NIGHTS,
            free_cancellation_hours: DEFAULT_FREE_CANCELLATION_HOURS,
            cancellation_fee_rate: DEFAULT_CANCELLATION_FEE_RATE,
            check_in_hour: DEFAULT_CHECK_IN_HOUR,
        }
    }
}

impl BookingConfig {
    /// Reject policies that could never admit a booking or that charge
    /// outside `[0, total_price]`.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.min_stay_nights < 1 {
            return Err(CoreError::Validation(format!(
                "min_stay_nights must be at least 1, got {}",
                self.min_stay_nights
            )));
        }
        if self.max_stay_nights < self.min_stay_nights {
            return Err(CoreError::Validation(format!(
                "max_stay_nights ({}) must not be below min_stay_nights ({})",
                self.max_stay_nights, self.min_stay_nights
            )));
        }
        if self.free_cancellation_hours < 0 {
            return Err(CoreError::Validation(format!(
                "free_cancellation_hours must not be negative, got {}",
                self.free_cancellation_hours
            )));
        }
        if !(0.0..=1.0).contains(&self.cancellation_fee_rate) {
            return Err(CoreError::Validation(format!(
                "cancellation_fee_rate must be between 0 and 1, got {}",
                self.cancellation_fee_rate
            )));
        }
        if self.check_in_hour > 23 {
            return Err(CoreError::Validation(format!(
                "check_in_hour must be between 0 and 23, got {}",
                self.check_in_hour
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = BookingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.min_stay_nights, 1);
        assert_eq!(config.max_stay_nights, 14);
        assert_eq!(config.free_cancellation_hours, 24);
        assert_eq!(config.cancellation_fee_rate, 0.5);
    }

    #[test]
    fn max_below_min_rejected() {
        let config = BookingConfig {
            min_stay_nights: 3,
            max_stay_nights: 2,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_min_stay_rejected() {
        let config = BookingConfig {
            min_stay_nights: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn fee_rate_above_one_rejected() {
        let config = BookingConfig {
            cancellation_fee_rate: 1.5,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("cancellation_fee_rate"));
    }

    #[test]
    fn check_in_hour_out_of_range_rejected() {
        let config = BookingConfig {
            check_in_hour: 24,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
