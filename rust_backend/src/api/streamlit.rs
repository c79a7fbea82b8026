//! Streamlit API Functions.
//!
//! The frontend reruns its whole script on every widget change, so every
//! `KeplerSession` method takes the `(target, cadence)` it is drawing for.
//! The cadence may be left out, in which case `search.cadence` from the
//! config is used. The session cache then decides whether a new archive
//! search is needed.
//!
//! ## Design Patterns
//!
//! 1. Accept primitives (names, numbers, nested lists) as parameters
//! 2. Convert to internal types and fill unset options from the config
//! 3. Call the cached `TargetSession`
//! 4. Convert the product back to an API DTO

use std::path::PathBuf;

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::api::conversions::periodogram_data;
use crate::api::types as api;
use crate::archive::LocalArchive;
use crate::config::ExplorerConfig;
use crate::models::{
    Aperture, ApertureMask, AperturePolicy, Cadence, DatasetDescriptor, Normalization, PixelFile,
};
use crate::parsing::parse_archive_manifest;
use crate::services::{LightCurveOptions, PeriodogramOptions, Scale, SessionCache, TargetSession};

/// Register all API functions and classes with the Python module.
///
/// Called from lib.rs to populate the `keeplerite` module.
pub fn register_api_functions(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(parse_quarter, m)?)?;

    m.add_class::<KeplerSession>()?;
    m.add_class::<api::Dataset>()?;
    m.add_class::<api::LightCurveData>()?;
    m.add_class::<api::PeriodogramData>()?;
    m.add_class::<api::PixelImage>()?;

    Ok(())
}

fn parse_cadence(cadence: &str) -> PyResult<Cadence> {
    cadence.parse::<Cadence>().map_err(PyValueError::new_err)
}

/// Quarter number carried by a dataset description, if any.
///
/// Args:
///     description: Archive dataset label, e.g. "Kepler Q05 long cadence"
///
/// Returns:
///     The quarter, or None
#[pyfunction]
fn parse_quarter(description: &str) -> Option<u32> {
    crate::models::parse_quarter(description)
}

/// Interactive exploration state backed by a local archive.
#[pyclass(module = "keeplerite", unsendable)]
pub struct KeplerSession {
    archive: LocalArchive,
    cache: SessionCache<LocalArchive>,
}

impl KeplerSession {
    /// Session for `target`; without an explicit cadence the configured
    /// `search.cadence` applies.
    fn session(&mut self, target: &str, cadence: Option<&str>) -> PyResult<&mut TargetSession<LocalArchive>> {
        let cadence = self.cache.config().search.resolve_cadence(cadence)?;
        Ok(self.cache.get_or_open(target, cadence)?)
    }

    fn register(&mut self, descriptor: DatasetDescriptor, pixels: PixelFile) -> PyResult<()> {
        self.archive.register(descriptor, pixels)?;
        // a cached search no longer reflects the archive
        self.cache.invalidate();
        Ok(())
    }
}

#[pymethods]
impl KeplerSession {
    /// Create a session with the config at `config_path`, or the default
    /// `keeplerite.toml` lookup when not given.
    #[new]
    #[pyo3(signature = (config_path=None))]
    fn new(config_path: Option<PathBuf>) -> PyResult<Self> {
        let config = match config_path {
            Some(path) => ExplorerConfig::from_file(path)?,
            None => ExplorerConfig::from_default_location()?,
        };
        let archive = LocalArchive::new();
        Ok(Self {
            cache: SessionCache::new(archive.clone(), config),
            archive,
        })
    }

    /// Register every dataset of a JSON archive manifest.
    ///
    /// Returns:
    ///     Number of datasets registered
    fn load_manifest(&mut self, path: PathBuf) -> PyResult<usize> {
        let entries = parse_archive_manifest(&path)
            .map_err(|e| PyValueError::new_err(format!("{:#}", e)))?;
        let count = entries.len();
        for (descriptor, pixels) in entries {
            self.register(descriptor, pixels)?;
        }
        Ok(count)
    }

    /// Register one pixel file from nested lists.
    ///
    /// Args:
    ///     target: Target name
    ///     description: Dataset label; must carry a quarter such as "Q4"
    ///     cadence: "long", "short" or "fast"
    ///     time: Julian Dates, one per frame
    ///     flux: `[frame][row][col]` flux cube
    ///     flux_err: `[frame][row][col]` uncertainty cube
    ///     pipeline_mask: `[row][col]` mission aperture
    #[pyo3(signature = (target, description, cadence, time, flux, flux_err, pipeline_mask))]
    #[allow(clippy::too_many_arguments)]
    fn register_dataset(
        &mut self,
        target: &str,
        description: &str,
        cadence: &str,
        time: Vec<f64>,
        flux: Vec<Vec<Vec<f64>>>,
        flux_err: Vec<Vec<Vec<f64>>>,
        pipeline_mask: Vec<Vec<bool>>,
    ) -> PyResult<()> {
        let descriptor = DatasetDescriptor::new(target, description, parse_cadence(cadence)?);
        let quarter = descriptor.quarter.ok_or_else(|| {
            PyValueError::new_err(format!("No quarter in description '{}'", description))
        })?;
        let pixels = PixelFile::from_frames(
            target,
            quarter,
            descriptor.cadence,
            time,
            &flux,
            &flux_err,
            ApertureMask::from_rows(&pipeline_mask)?,
        )?;
        self.register(descriptor, pixels)
    }

    /// Search results for the target.
    #[pyo3(signature = (target, cadence=None))]
    fn datasets(&mut self, target: &str, cadence: Option<&str>) -> PyResult<Vec<api::Dataset>> {
        let session = self.session(target, cadence)?;
        Ok(session
            .search_result()
            .datasets
            .iter()
            .map(api::Dataset::from)
            .collect())
    }

    /// Sorted quarters available for the target.
    #[pyo3(signature = (target, cadence=None))]
    fn quarters(&mut self, target: &str, cadence: Option<&str>) -> PyResult<Vec<u32>> {
        Ok(self.session(target, cadence)?.quarters())
    }

    /// Load the pixel file of `quarter`.
    ///
    /// Raises LookupError when several datasets match and the configured
    /// policy does not pick one; use `load_dataset` with a chosen
    /// description instead.
    #[pyo3(signature = (target, quarter, cadence=None))]
    fn load_quarter(&mut self, target: &str, quarter: u32, cadence: Option<&str>) -> PyResult<()> {
        self.session(target, cadence)?.load_pixel_file(quarter)?;
        Ok(())
    }

    /// Load the pixel file of the search entry labelled `description`.
    #[pyo3(signature = (target, description, cadence=None))]
    fn load_dataset(&mut self, target: &str, description: &str, cadence: Option<&str>) -> PyResult<()> {
        let session = self.session(target, cadence)?;
        let descriptor = session
            .search_result()
            .datasets
            .iter()
            .find(|d| d.description == description)
            .cloned()
            .ok_or_else(|| PyValueError::new_err(format!("No dataset '{}'", description)))?;
        session.load_pixel_file_from(&descriptor)?;
        Ok(())
    }

    /// Select a named aperture ("pipeline", "threshold", "all") or, with
    /// `mask`, a custom one.
    #[pyo3(signature = (target, policy, mask=None, cadence=None))]
    fn set_aperture(
        &mut self,
        target: &str,
        policy: &str,
        mask: Option<Vec<Vec<bool>>>,
        cadence: Option<&str>,
    ) -> PyResult<()> {
        let aperture = match mask {
            Some(rows) => Aperture::Custom(ApertureMask::from_rows(&rows)?),
            None => Aperture::Named(policy.parse::<AperturePolicy>().map_err(PyValueError::new_err)?),
        };
        self.session(target, cadence)?.set_aperture(aperture);
        Ok(())
    }

    /// Use a flood-filled threshold mask at `sigma` robust deviations.
    #[pyo3(signature = (target, sigma, cadence=None))]
    fn set_threshold(&mut self, target: &str, sigma: f64, cadence: Option<&str>) -> PyResult<()> {
        self.session(target, cadence)?.set_threshold_aperture(sigma)?;
        Ok(())
    }

    /// Build the light curve. Unset options come from the config.
    #[pyo3(signature = (target, cadence=None, stitch=None, outlier_filter=None))]
    fn build_light_curve(
        &mut self,
        target: &str,
        cadence: Option<&str>,
        stitch: Option<bool>,
        outlier_filter: Option<f64>,
    ) -> PyResult<api::LightCurveData> {
        let mut options = LightCurveOptions::from(&self.cache.config().light_curve);
        if let Some(stitch) = stitch {
            options.stitch = stitch;
        }
        if outlier_filter.is_some() {
            options.outlier_filter = outlier_filter;
        }
        let product = self.session(target, cadence)?.build_light_curve(options)?;
        Ok(api::LightCurveData::from(product))
    }

    /// Compute the periodogram and its FAP curve, then return the panel
    /// data. Unset options come from the config.
    #[pyo3(signature = (
        target,
        cadence=None,
        min_frequency=None,
        max_frequency=None,
        realizations=None,
        normalization=None,
        smoothing=None,
        scale=None,
        signal_to_noise=None
    ))]
    #[allow(clippy::too_many_arguments)]
    fn compute_periodogram(
        &mut self,
        target: &str,
        cadence: Option<&str>,
        min_frequency: Option<f64>,
        max_frequency: Option<f64>,
        realizations: Option<usize>,
        normalization: Option<&str>,
        smoothing: Option<f64>,
        scale: Option<&str>,
        signal_to_noise: Option<bool>,
    ) -> PyResult<api::PeriodogramData> {
        let mut options = PeriodogramOptions::from(&self.cache.config().periodogram);
        if min_frequency.is_some() {
            options.request.bounds.min = min_frequency;
        }
        if max_frequency.is_some() {
            options.request.bounds.max = max_frequency;
        }
        if let Some(realizations) = realizations {
            options.realizations = realizations;
        }
        if let Some(name) = normalization {
            options.request.normalization =
                name.parse::<Normalization>().map_err(PyValueError::new_err)?;
        }
        self.session(target, cadence)?.compute_periodogram(options)?;
        self.periodogram(target, cadence, smoothing, scale, signal_to_noise)
    }

    /// Panel data for the last computed periodogram, re-rendered with new
    /// display options.
    #[pyo3(signature = (target, cadence=None, smoothing=None, scale=None, signal_to_noise=None))]
    fn periodogram(
        &mut self,
        target: &str,
        cadence: Option<&str>,
        smoothing: Option<f64>,
        scale: Option<&str>,
        signal_to_noise: Option<bool>,
    ) -> PyResult<api::PeriodogramData> {
        let mut display = self.cache.config().display.options();
        if let Some(width) = smoothing {
            display.smoothing = width;
        }
        if let Some(name) = scale {
            display.scale = name.parse::<Scale>().map_err(PyValueError::new_err)?;
        }
        if let Some(flag) = signal_to_noise {
            display.signal_to_noise = flag;
        }
        let session = self.session(target, cadence)?;
        let view = session.periodogram_view(&display)?;
        let validity = session
            .periodogram()
            .map(|product| product.validity)
            .unwrap_or_default();
        Ok(periodogram_data(view, validity))
    }

    /// Light-curve panel data for the current light curve.
    #[pyo3(signature = (target, cadence=None))]
    fn light_curve(&mut self, target: &str, cadence: Option<&str>) -> PyResult<Option<api::LightCurveData>> {
        Ok(self
            .session(target, cadence)?
            .light_curve()
            .map(api::LightCurveData::from))
    }

    /// Median image of the loaded pixel file.
    #[pyo3(signature = (target, cadence=None, show_aperture=true))]
    fn pixel_image(&mut self, target: &str, cadence: Option<&str>, show_aperture: bool) -> PyResult<api::PixelImage> {
        let view = self.session(target, cadence)?.pixel_file_view(show_aperture)?;
        Ok(view.into())
    }

    /// Reseed the FAP random generator of the target's session.
    #[pyo3(signature = (target, seed, cadence=None))]
    fn reseed(&mut self, target: &str, seed: u64, cadence: Option<&str>) -> PyResult<()> {
        self.session(target, cadence)?.reseed(seed);
        Ok(())
    }
}
