use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::sample::TimeSeriesSample;
use super::time::JulianDate;
use crate::algorithms::statistics;
use crate::error::{ErrorContext, ExplorerError, ExplorerResult};

/// A time-ordered flux series for one target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightCurve {
    pub target: String,
    pub samples: Vec<TimeSeriesSample>,
}

impl LightCurve {
    pub fn new(target: impl Into<String>, samples: Vec<TimeSeriesSample>) -> Self {
        Self {
            target: target.into(),
            samples,
        }
    }

    /// Build a light curve from three parallel columns.
    pub fn from_columns(
        target: impl Into<String>,
        time: &[f64],
        flux: &[f64],
        flux_err: &[f64],
    ) -> ExplorerResult<Self> {
        let target = target.into();
        if time.len() != flux.len() || time.len() != flux_err.len() {
            return Err(ExplorerError::invalid_input_with_context(
                format!(
                    "column lengths differ: time={}, flux={}, flux_err={}",
                    time.len(),
                    flux.len(),
                    flux_err.len()
                ),
                ErrorContext::new("light_curve_from_columns").with_target(target),
            ));
        }
        let samples = time
            .iter()
            .zip(flux)
            .zip(flux_err)
            .map(|((&t, &f), &e)| TimeSeriesSample::new(t, f, e))
            .collect();
        Ok(Self { target, samples })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn times(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.time).collect()
    }

    pub fn fluxes(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.flux).collect()
    }

    pub fn flux_errors(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.flux_err).collect()
    }

    /// Median of the finite flux values.
    pub fn median_flux(&self) -> Option<f64> {
        statistics::median(&self.fluxes())
    }

    /// Time between the first and last finite stamp.
    pub fn baseline(&self) -> qtty::Days {
        let (first, last) = self.time_bounds().unwrap_or((0.0, 0.0));
        JulianDate::new(last).since(JulianDate::new(first))
    }

    /// Median spacing between consecutive samples.
    pub fn median_cadence(&self) -> Option<qtty::Days> {
        statistics::median_cadence(&self.times()).map(qtty::Days::new)
    }

    /// First and last observation instants in UTC.
    pub fn observation_window(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let (first, last) = self.time_bounds()?;
        Some((
            JulianDate::new(first).to_utc()?,
            JulianDate::new(last).to_utc()?,
        ))
    }

    fn time_bounds(&self) -> Option<(f64, f64)> {
        let finite = self.samples.iter().map(|s| s.time).filter(|t| t.is_finite());
        let (min, max) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), t| {
            (lo.min(t), hi.max(t))
        });
        (min <= max).then_some((min, max))
    }
}
