//! Python-facing Data Transfer Objects (DTOs).
//!
//! Every `#[pyclass]` exposed to Python. Fields use PyO3-compatible
//! primitives only (String, f64, Vec, Option) so the frontend can hand them
//! straight to its plotting code.

use pyo3::prelude::*;
use serde::{Deserialize, Serialize};

/// One entry of an archive search.
#[pyclass(module = "keeplerite", get_all)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    pub target: String,
    pub description: String,
    /// "long", "short" or "fast"
    pub cadence: String,
    pub quarter: Option<u32>,
}

#[pymethods]
impl Dataset {
    fn __repr__(&self) -> String {
        format!(
            "Dataset(target='{}', description='{}', cadence='{}', quarter={:?})",
            self.target, self.description, self.cadence, self.quarter
        )
    }
}

/// Light-curve panel data.
#[pyclass(module = "keeplerite", get_all)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightCurveData {
    pub title: String,
    pub time: Vec<f64>,
    pub flux: Vec<f64>,
    pub flux_err: Vec<f64>,
    /// Quarters the curve was extracted from
    pub quarters: Vec<u32>,
}

#[pymethods]
impl LightCurveData {
    fn __len__(&self) -> usize {
        self.time.len()
    }

    fn __repr__(&self) -> String {
        format!(
            "LightCurveData(title='{}', samples={}, quarters={:?})",
            self.title,
            self.time.len(),
            self.quarters
        )
    }
}

/// Periodogram panel data.
///
/// In signal-to-noise mode `power` and `smoothed` are already divided by
/// the FAP curve and `fap` is `None`.
#[pyclass(module = "keeplerite", get_all)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodogramData {
    pub title: String,
    pub y_label: String,
    pub frequency: Vec<f64>,
    pub power: Vec<f64>,
    pub smoothed: Vec<f64>,
    pub fap: Option<Vec<f64>>,
    /// Matplotlib scale name
    pub scale: String,
    pub x_min: f64,
    pub x_max: f64,
    pub signal_to_noise: bool,
    /// Samples used for the periodogram
    pub retained: usize,
    /// Samples dropped for non-finite or non-positive values
    pub excluded: usize,
}

#[pymethods]
impl PeriodogramData {
    fn __len__(&self) -> usize {
        self.frequency.len()
    }

    fn __repr__(&self) -> String {
        format!(
            "PeriodogramData(title='{}', bins={}, scale='{}', signal_to_noise={})",
            self.title,
            self.frequency.len(),
            self.scale,
            self.signal_to_noise
        )
    }
}

/// Median pixel image with the active aperture.
#[pyclass(module = "keeplerite", get_all)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PixelImage {
    pub title: String,
    /// `rows × cols` median flux
    pub image: Vec<Vec<f64>>,
    pub aperture: Option<Vec<Vec<bool>>>,
}

#[pymethods]
impl PixelImage {
    fn __repr__(&self) -> String {
        let rows = self.image.len();
        let cols = self.image.first().map_or(0, Vec::len);
        format!("PixelImage(title='{}', shape=({}, {}))", self.title, rows, cols)
    }
}
