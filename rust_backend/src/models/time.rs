use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Julian Date of the Unix epoch (1970-01-01T00:00:00 UTC).
pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;

/// Offset between Kepler barycentric days (BKJD) and Julian Date.
pub const BKJD_OFFSET: f64 = 2_454_833.0;

/// A timestamp expressed as a Julian Date, in days.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct JulianDate(qtty::Days);

impl JulianDate {
    /// Create a new JD value.
    pub fn new(value: f64) -> Self {
        Self(qtty::Days::new(value))
    }

    /// Convert a Kepler BKJD stamp into a Julian Date.
    pub fn from_bkjd(bkjd: f64) -> Self {
        Self::new(bkjd + BKJD_OFFSET)
    }

    /// Raw JD value as f64.
    pub fn value(&self) -> f64 {
        self.0.value()
    }

    /// Days elapsed since `earlier`.
    pub fn since(&self, earlier: JulianDate) -> qtty::Days {
        self.0 - earlier.0
    }

    /// UTC calendar instant for this JD, millisecond resolution.
    ///
    /// Returns `None` for non-finite values or instants chrono cannot represent.
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        let value = self.value();
        if !value.is_finite() {
            return None;
        }
        let millis = ((value - UNIX_EPOCH_JD) * 86_400_000.0).round();
        if millis.abs() > i64::MAX as f64 {
            return None;
        }
        DateTime::from_timestamp_millis(millis as i64)
    }
}

impl From<f64> for JulianDate {
    fn from(v: f64) -> Self {
        JulianDate::new(v)
    }
}
