//! Stay date ranges, stay-length validation and pricing.
//!
//! A stay is the half-open interval `[check_in, check_out)`: the first night
//! is `check_in`, the last night is `check_out - 1 day`. A checkout on day D
//! and a new check-in on day D therefore never collide.

use chrono::{NaiveTime, TimeZone, Utc};
use serde::Serialize;

use crate::config::BookingConfig;
use crate::error::CoreError;
use crate::types::{StayDate, Timestamp};

// ---------------------------------------------------------------------------
// StayRange
// ---------------------------------------------------------------------------

/// A non-empty half-open date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct StayRange {
    check_in: StayDate,
    check_out: StayDate,
}

impl StayRange {
    /// Build a range, rejecting `check_out <= check_in`.
    pub fn new(check_in: StayDate, check_out: StayDate) -> Result<Self, CoreError> {
        if check_out <= check_in {
            return Err(CoreError::InvalidDateRange(format!(
                "check-out ({check_out}) must be after check-in ({check_in})"
            )));
        }
        Ok(Self {
            check_in,
            check_out,
        })
    }

    pub fn check_in(&self) -> StayDate {
        self.check_in
    }

    pub fn check_out(&self) -> StayDate {
        self.check_out
    }

    /// Whole nights in the stay (always >= 1).
    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    /// `[a1, a2)` and `[b1, b2)` overlap iff `a1 < b2 && a2 > b1`.
    pub fn overlaps(&self, other: &StayRange) -> bool {
        self.check_in < other.check_out && self.check_out > other.check_in
    }

    /// Whether `date` is one of the nights of this stay.
    pub fn contains(&self, date: StayDate) -> bool {
        self.check_in <= date && date < self.check_out
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a requested stay against the booking policy.
///
/// `today` is the date-truncated "now"; time of day plays no part. Fails with
/// [`CoreError::InvalidDateRange`] when check-in is in the past, the range is
/// empty or inverted, or the night count falls outside
/// `[min_stay_nights, max_stay_nights]`.
pub fn validate_stay_dates(
    check_in: StayDate,
    check_out: StayDate,
    today: StayDate,
    config: &BookingConfig,
) -> Result<StayRange, CoreError> {
    if check_in < today {
        return Err(CoreError::InvalidDateRange(format!(
            "check-in ({check_in}) cannot be in the past"
        )));
    }

    let stay = StayRange::new(check_in, check_out)?;
    let nights = stay.nights();

    if nights < config.min_stay_nights {
        return Err(CoreError::InvalidDateRange(format!(
            "stay of {nights} night(s) is shorter than the minimum of {}",
            config.min_stay_nights
        )));
    }
    if nights > config.max_stay_nights {
        return Err(CoreError::InvalidDateRange(format!(
            "stay of {nights} night(s) exceeds the maximum of {}",
            config.max_stay_nights
        )));
    }

    Ok(stay)
}

// ---------------------------------------------------------------------------
// Pricing
// ---------------------------------------------------------------------------

/// Flat-rate price: `price_per_night * nights`.
pub fn total_price(price_per_night: f64, stay: &StayRange) -> f64 {
    price_per_night * stay.nights() as f64
}

/// The instant a stay starts: `check_in` at `check_in_hour:00` UTC.
pub fn check_in_instant(check_in: StayDate, check_in_hour: u32) -> Timestamp {
    let time = NaiveTime::from_hms_opt(check_in_hour.min(23), 0, 0).unwrap_or_default();
    Utc.from_utc_datetime(&check_in.and_time(time))
}

/// Fee charged when cancelling at `now`.
///
/// Uses full timestamps: the fee applies only while check-in is still ahead
/// and fewer than `free_cancellation_hours` remain. Once check-in has passed,
/// or with at least the window remaining, cancellation is free.
pub fn cancellation_fee(
    total_price: f64,
    check_in: StayDate,
    now: Timestamp,
    config: &BookingConfig,
) -> f64 {
    let starts_at = check_in_instant(check_in, config.check_in_hour);
    let hours_before = (starts_at - now).num_seconds() as f64 / 3600.0;
    let window = config.free_cancellation_hours as f64;

    if hours_before > 0.0 && hours_before < window {
        total_price * config.cancellation_fee_rate
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Duration;

    fn d(s: &str) -> StayDate {
        s.parse().unwrap()
    }

    // -----------------------------------------------------------------------
    // Overlap
    // -----------------------------------------------------------------------

    #[test]
    fn overlapping_ranges_detected() {
        let a = StayRange::new(d("2025-06-01"), d("2025-06-05")).unwrap();
        let b = StayRange::new(d("2025-06-04"), d("2025-06-06")).unwrap();
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn back_to_back_ranges_do_not_overlap() {
        let a = StayRange::new(d("2025-06-01"), d("2025-06-05")).unwrap();
        let b = StayRange::new(d("2025-06-05"), d("2025-06-07")).unwrap();
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn enclosing_range_overlaps() {
        let outer = StayRange::new(d("2025-06-01"), d("2025-06-10")).unwrap();
        let inner = StayRange::new(d("2025-06-03"), d("2025-06-04")).unwrap();
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    #[test]
    fn contains_excludes_checkout_day() {
        let stay = StayRange::new(d("2025-06-01"), d("2025-06-03")).unwrap();
        assert!(stay.contains(d("2025-06-01")));
        assert!(stay.contains(d("2025-06-02")));
        assert!(!stay.contains(d("2025-06-03")));
    }

    // -----------------------------------------------------------------------
    // Stay length
    // -----------------------------------------------------------------------

    #[test]
    fn zero_night_range_rejected() {
        let config = BookingConfig::default();
        let result = validate_stay_dates(d("2025-06-01"), d("2025-06-01"), d("2025-05-01"), &config);
        assert_matches!(result, Err(CoreError::InvalidDateRange(_)));
    }

    #[test]
    fn inverted_range_rejected() {
        let config = BookingConfig::default();
        let result = validate_stay_dates(d("2025-06-05"), d("2025-06-01"), d("2025-05-01"), &config);
        assert_matches!(result, Err(CoreError::InvalidDateRange(_)));
    }

    #[test]
    fn fourteen_nights_accepted_fifteen_rejected() {
        let config = BookingConfig::default();
        let today = d("2025-05-01");
        let ok = validate_stay_dates(d("2025-06-01"), d("2025-06-15"), today, &config).unwrap();
        assert_eq!(ok.nights(), 14);

        let too_long = validate_stay_dates(d("2025-06-01"), d("2025-06-16"), today, &config);
        assert_matches!(too_long, Err(CoreError::InvalidDateRange(msg)) if msg.contains("maximum"));
    }

    #[test]
    fn minimum_stay_enforced() {
        let config = BookingConfig {
            min_stay_nights: 2,
            ..Default::default()
        };
        let result = validate_stay_dates(d("2025-06-01"), d("2025-06-02"), d("2025-05-01"), &config);
        assert_matches!(result, Err(CoreError::InvalidDateRange(msg)) if msg.contains("minimum"));
    }

    #[test]
    fn check_in_today_accepted_yesterday_rejected() {
        let config = BookingConfig::default();
        let today = d("2025-06-01");
        assert!(validate_stay_dates(today, d("2025-06-02"), today, &config).is_ok());

        let past = validate_stay_dates(d("2025-05-31"), d("2025-06-02"), today, &config);
        assert_matches!(past, Err(CoreError::InvalidDateRange(msg)) if msg.contains("past"));
    }

    // -----------------------------------------------------------------------
    // Pricing
    // -----------------------------------------------------------------------

    #[test]
    fn total_price_is_rate_times_nights() {
        let stay = StayRange::new(d("2025-06-01"), d("2025-06-04")).unwrap();
        assert_eq!(total_price(120.0, &stay), 360.0);
    }

    #[test]
    fn fee_free_with_twenty_five_hours_left() {
        let config = BookingConfig::default();
        let check_in = d("2025-06-10");
        let now = check_in_instant(check_in, 0) - Duration::hours(25);
        assert_eq!(cancellation_fee(400.0, check_in, now, &config), 0.0);
    }

    #[test]
    fn fee_charged_with_twenty_three_hours_left() {
        let config = BookingConfig::default();
        let check_in = d("2025-06-10");
        let now = check_in_instant(check_in, 0) - Duration::hours(23);
        assert_eq!(cancellation_fee(400.0, check_in, now, &config), 200.0);
    }

    #[test]
    fn fee_free_after_check_in_passed() {
        let config = BookingConfig::default();
        let check_in = d("2025-06-10");
        let now = check_in_instant(check_in, 0) + Duration::hours(2);
        assert_eq!(cancellation_fee(400.0, check_in, now, &config), 0.0);
    }

    #[test]
    fn fee_window_respects_check_in_hour() {
        let config = BookingConfig {
            check_in_hour: 15,
            ..Default::default()
        };
        let check_in = d("2025-06-10");
        // 20:00 the evening before is 19 hours ahead of a 15:00 check-in.
        let now = Utc.with_ymd_and_hms(2025, 6, 9, 20, 0, 0).unwrap();
        assert_eq!(cancellation_fee(100.0, check_in, now, &config), 50.0);
    }
}
