//! Expiry handling
//!
//! Every expiry value inside the crate is a Unix timestamp in **seconds**.
//! Millisecond timestamps are converted once, in [`Expiry::from_timestamp`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Anything below this is taken to be seconds, anything above milliseconds.
const MILLIS_CUTOFF: u64 = 10_000_000_000;

/// Option expiry: display label plus Unix-seconds value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expiry {
    /// Display date (e.g. "27-03-2025")
    pub label: String,
    /// Unix seconds
    pub value: i64,
}

impl Expiry {
    /// Create from a value already known to be Unix seconds
    pub fn new(label: impl Into<String>, unix_seconds: i64) -> Self {
        Self {
            label: label.into(),
            value: unix_seconds,
        }
    }

    /// Create from a raw broker timestamp that may be seconds or milliseconds
    pub fn from_timestamp(label: impl Into<String>, raw: i64) -> Self {
        let seconds = if raw.unsigned_abs() >= MILLIS_CUTOFF {
            raw / 1000
        } else {
            raw
        };
        Self::new(label, seconds)
    }

    /// Create from a UTC datetime, labelled dd-mm-yyyy
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self::new(at.format("%d-%m-%Y").to_string(), at.timestamp())
    }

    /// Expiry instant
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.value, 0)
    }

    /// Seconds remaining until expiry (negative once expired)
    pub fn seconds_until(&self, now: DateTime<Utc>) -> i64 {
        self.value - now.timestamp()
    }

    /// Fractional calendar days to expiry, floored at zero
    pub fn days_to_expiry(&self, now: DateTime<Utc>) -> f64 {
        self.seconds_until(now).max(0) as f64 / SECONDS_PER_DAY
    }

    /// Time to expiry in years for a given day-count basis
    pub fn time_to_expiry(&self, now: DateTime<Utc>, days_per_year: f64) -> f64 {
        self.days_to_expiry(now) / days_per_year
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.seconds_until(now) <= 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_millis_normalised() {
        let secs = Expiry::from_timestamp("x", 1_743_060_600);
        let millis = Expiry::from_timestamp("x", 1_743_060_600_000);
        assert_eq!(secs.value, millis.value);
    }

    #[test]
    fn test_extreme_raw_timestamps() {
        assert_eq!(Expiry::from_timestamp("x", i64::MIN).value, i64::MIN / 1000);
        assert_eq!(Expiry::from_timestamp("x", i64::MAX).value, i64::MAX / 1000);
        assert_eq!(Expiry::from_timestamp("x", -1_743_060_600_000).value, -1_743_060_600);
    }

    #[test]
    fn test_time_to_expiry() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let expiry = Expiry::from_datetime(now + chrono::Duration::days(30));

        assert!((expiry.days_to_expiry(now) - 30.0).abs() < 1e-9);
        assert!((expiry.time_to_expiry(now, 365.0) - 30.0 / 365.0).abs() < 1e-12);
        assert_eq!(expiry.label, "31-03-2025");
    }

    #[test]
    fn test_expired_floors_at_zero() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let expiry = Expiry::from_datetime(now - chrono::Duration::hours(5));

        assert!(expiry.is_expired(now));
        assert_eq!(expiry.days_to_expiry(now), 0.0);
    }
}
