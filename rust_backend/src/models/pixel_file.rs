use ndarray::{Array2, Array3, Axis};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::dataset::Cadence;
use crate::algorithms::statistics;
use crate::error::{ErrorContext, ExplorerError, ExplorerResult};

/// Boolean pixel grid selecting which pixels are summed into the flux.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApertureMask {
    mask: Array2<bool>,
}

impl ApertureMask {
    pub fn new(mask: Array2<bool>) -> Self {
        Self { mask }
    }

    /// Build a mask from row vectors. Ragged rows are rejected.
    pub fn from_rows(rows: &[Vec<bool>]) -> ExplorerResult<Self> {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != n_cols) {
            return Err(ExplorerError::invalid_input(
                "aperture mask rows have different lengths",
            ));
        }
        let flat: Vec<bool> = rows.iter().flatten().copied().collect();
        let mask = Array2::from_shape_vec((n_rows, n_cols), flat)
            .map_err(|e| ExplorerError::invalid_input(format!("aperture mask shape: {}", e)))?;
        Ok(Self { mask })
    }

    /// Mask selecting every pixel.
    pub fn all(shape: (usize, usize)) -> Self {
        Self {
            mask: Array2::from_elem(shape, true),
        }
    }

    /// Mask selecting no pixel.
    pub fn none(shape: (usize, usize)) -> Self {
        Self {
            mask: Array2::from_elem(shape, false),
        }
    }

    /// `(rows, cols)`
    pub fn shape(&self) -> (usize, usize) {
        self.mask.dim()
    }

    pub fn pixel_count(&self) -> usize {
        self.mask.iter().filter(|&&selected| selected).count()
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.mask.get((row, col)).copied().unwrap_or(false)
    }

    pub fn as_array(&self) -> &Array2<bool> {
        &self.mask
    }

    pub fn to_rows(&self) -> Vec<Vec<bool>> {
        self.mask.outer_iter().map(|row| row.to_vec()).collect()
    }
}

/// Named aperture policies understood by the photometry collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AperturePolicy {
    /// The mission pipeline's optimal aperture shipped with the pixel file
    #[default]
    Pipeline,
    /// Bright region above a 3-sigma threshold, nearest the image centre
    Threshold,
    /// Every pixel in the stamp
    All,
}

impl AperturePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pipeline => "pipeline",
            Self::Threshold => "threshold",
            Self::All => "all",
        }
    }
}

impl fmt::Display for AperturePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AperturePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pipeline" => Ok(Self::Pipeline),
            "threshold" => Ok(Self::Threshold),
            "all" => Ok(Self::All),
            _ => Err(format!("Unknown aperture policy: {}", s)),
        }
    }
}

/// Aperture specification: a named policy or an explicit mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Aperture {
    Named(AperturePolicy),
    Custom(ApertureMask),
}

impl Default for Aperture {
    fn default() -> Self {
        Self::Named(AperturePolicy::Pipeline)
    }
}

impl fmt::Display for Aperture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(policy) => write!(f, "{}", policy),
            Self::Custom(mask) => write!(f, "custom({} px)", mask.pixel_count()),
        }
    }
}

/// Raw per-quarter imaging data for one target.
///
/// `flux` and `flux_err` are `cadences × rows × cols` cubes.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelFile {
    pub target: String,
    pub quarter: u32,
    pub cadence: Cadence,
    time: Vec<f64>,
    flux: Array3<f64>,
    flux_err: Array3<f64>,
    pipeline_mask: ApertureMask,
}

impl PixelFile {
    /// Assemble a pixel file, checking that every cube and the pipeline mask
    /// agree on shape.
    pub fn new(
        target: impl Into<String>,
        quarter: u32,
        cadence: Cadence,
        time: Vec<f64>,
        flux: Array3<f64>,
        flux_err: Array3<f64>,
        pipeline_mask: ApertureMask,
    ) -> ExplorerResult<Self> {
        let target = target.into();
        let context = || {
            ErrorContext::new("pixel_file_new")
                .with_target(target.clone())
                .with_quarter(quarter)
        };
        let (n_cadences, rows, cols) = flux.dim();
        if n_cadences != time.len() {
            return Err(ExplorerError::invalid_input_with_context(
                format!("{} timestamps for {} flux frames", time.len(), n_cadences),
                context(),
            ));
        }
        if flux_err.dim() != flux.dim() {
            return Err(ExplorerError::invalid_input_with_context(
                format!(
                    "flux_err shape {:?} differs from flux shape {:?}",
                    flux_err.dim(),
                    flux.dim()
                ),
                context(),
            ));
        }
        if pipeline_mask.shape() != (rows, cols) {
            return Err(ExplorerError::invalid_input_with_context(
                format!(
                    "pipeline mask shape {:?} differs from image shape {:?}",
                    pipeline_mask.shape(),
                    (rows, cols)
                ),
                context(),
            ));
        }
        Ok(Self {
            target,
            quarter,
            cadence,
            time,
            flux,
            flux_err,
            pipeline_mask,
        })
    }

    /// Build a pixel file from nested `[cadence][row][col]` vectors.
    pub fn from_frames(
        target: impl Into<String>,
        quarter: u32,
        cadence: Cadence,
        time: Vec<f64>,
        flux: &[Vec<Vec<f64>>],
        flux_err: &[Vec<Vec<f64>>],
        pipeline_mask: ApertureMask,
    ) -> ExplorerResult<Self> {
        let flux = cube_from_frames(flux, "flux")?;
        let flux_err = cube_from_frames(flux_err, "flux_err")?;
        Self::new(target, quarter, cadence, time, flux, flux_err, pipeline_mask)
    }

    pub fn time(&self) -> &[f64] {
        &self.time
    }

    pub fn flux(&self) -> &Array3<f64> {
        &self.flux
    }

    pub fn flux_err(&self) -> &Array3<f64> {
        &self.flux_err
    }

    pub fn pipeline_mask(&self) -> &ApertureMask {
        &self.pipeline_mask
    }

    pub fn n_cadences(&self) -> usize {
        self.time.len()
    }

    /// `(rows, cols)` of a single frame.
    pub fn image_shape(&self) -> (usize, usize) {
        let (_, rows, cols) = self.flux.dim();
        (rows, cols)
    }

    /// Per-pixel median over time, ignoring non-finite frames.
    /// Pixels without any finite value are NaN.
    pub fn median_image(&self) -> Array2<f64> {
        self.flux.map_axis(Axis(0), |lane| {
            statistics::median(&lane.to_vec()).unwrap_or(f64::NAN)
        })
    }
}

fn cube_from_frames(frames: &[Vec<Vec<f64>>], name: &str) -> ExplorerResult<Array3<f64>> {
    let n_frames = frames.len();
    let rows = frames.first().map_or(0, Vec::len);
    let cols = frames
        .first()
        .and_then(|frame| frame.first())
        .map_or(0, Vec::len);
    let rectangular = frames
        .iter()
        .all(|frame| frame.len() == rows && frame.iter().all(|row| row.len() == cols));
    if !rectangular {
        return Err(ExplorerError::invalid_input(format!(
            "{} frames are not all {}x{}",
            name, rows, cols
        )));
    }
    let flat: Vec<f64> = frames.iter().flatten().flatten().copied().collect();
    Array3::from_shape_vec((n_frames, rows, cols), flat)
        .map_err(|e| ExplorerError::invalid_input(format!("{} cube shape: {}", name, e)))
}
