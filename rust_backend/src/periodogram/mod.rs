//! Spectral transforms and periodogram post-processing.
//!
//! The [`SpectralTransform`] trait is the seam between the pipeline and the
//! code that turns a time series into a power spectrum. [`LombScargle`] is the
//! in-process implementation used by the session, the FAP estimator and the
//! CLI.

pub mod lomb_scargle;
pub mod smoothing;

pub use lomb_scargle::LombScargle;
pub use smoothing::{box_smooth, smoothing_window};

use serde::{Deserialize, Serialize};

use crate::error::ExplorerResult;
use crate::models::{Normalization, PowerSpectrum};

/// Optional frequency limits in cycles per day.
///
/// Missing limits fall back to the transform's own defaults (for
/// Lomb-Scargle: the grid spacing below and the Nyquist frequency above).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FrequencyBounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl FrequencyBounds {
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn unbounded() -> Self {
        Self::default()
    }
}

/// Everything a transform needs besides the data itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodogramRequest {
    pub normalization: Normalization,
    pub bounds: FrequencyBounds,
    pub oversample_factor: f64,
}

impl Default for PeriodogramRequest {
    fn default() -> Self {
        Self {
            normalization: Normalization::Psd,
            bounds: FrequencyBounds::unbounded(),
            oversample_factor: 1.0,
        }
    }
}

impl PeriodogramRequest {
    pub fn with_bounds(mut self, bounds: FrequencyBounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_normalization(mut self, normalization: Normalization) -> Self {
        self.normalization = normalization;
        self
    }

    pub fn with_oversample_factor(mut self, oversample_factor: f64) -> Self {
        self.oversample_factor = oversample_factor;
        self
    }
}

/// Time series → power spectrum.
///
/// Implementations must be deterministic: two calls with the same timestamps
/// and request return the same frequency grid, whatever the flux values.
/// The FAP estimator relies on this to line its median curve up with the
/// real periodogram bin for bin.
pub trait SpectralTransform {
    /// Short name used in log messages.
    fn name(&self) -> &str;

    /// Frequency bins the transform evaluates for these timestamps.
    fn frequency_grid(&self, times: &[f64], request: &PeriodogramRequest) -> ExplorerResult<Vec<f64>>;

    /// Power at every bin of [`frequency_grid`](Self::frequency_grid).
    fn power_spectrum(
        &self,
        times: &[f64],
        flux: &[f64],
        request: &PeriodogramRequest,
    ) -> ExplorerResult<PowerSpectrum>;
}
