use serde::{Deserialize, Serialize};

/// One photometric measurement: `(time, flux, flux_err)`.
///
/// `time` is a Julian Date; `flux` is in normalized or raw instrumental units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesSample {
    pub time: f64,
    pub flux: f64,
    pub flux_err: f64,
}

impl TimeSeriesSample {
    pub fn new(time: f64, flux: f64, flux_err: f64) -> Self {
        Self {
            time,
            flux,
            flux_err,
        }
    }

    /// A sample is usable for noise simulation iff its uncertainty is finite
    /// and strictly positive.
    pub fn is_valid(&self) -> bool {
        self.flux_err.is_finite() && self.flux_err > 0.0
    }
}
