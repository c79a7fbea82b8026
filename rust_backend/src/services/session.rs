//! Per-target pipeline orchestration.
//!
//! A [`TargetSession`] walks one target through
//! pixel file → light curve → FAP + periodogram, holding at most one product
//! per stage. Recomputing a stage replaces its product and drops everything
//! downstream of it; a failed stage changes nothing.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use super::view::{DisplayOptions, LightCurveView, PeriodogramView, PixelFileView};
use crate::archive::{select_dataset, Archive};
use crate::config::{ExplorerConfig, LightCurveSettings, PeriodogramSettings};
use crate::error::{ErrorContext, ExplorerError, ExplorerResult};
use crate::fap::estimate_fap_curve;
use crate::models::{
    Aperture, ApertureMask, Cadence, DatasetDescriptor, FapCurve, LightCurve, PixelFile,
    PowerSpectrum, SearchResult,
};
use crate::periodogram::{LombScargle, PeriodogramRequest, SpectralTransform};
use crate::photometry::{threshold_mask, Photometry, SimpleAperturePhotometry};
use crate::transformations::{filter_outliers, normalize, partition_valid, stitch, ValidityReport};

/// How to build the light curve.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct LightCurveOptions {
    /// Stitch every dataset in the search result instead of the loaded quarter
    pub stitch: bool,
    /// Outlier band in percent around the median flux
    pub outlier_filter: Option<f64>,
}

impl From<&LightCurveSettings> for LightCurveOptions {
    fn from(settings: &LightCurveSettings) -> Self {
        Self {
            stitch: settings.stitch,
            outlier_filter: settings.outlier_filter(),
        }
    }
}

/// How to compute the periodogram and its FAP curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeriodogramOptions {
    pub request: PeriodogramRequest,
    pub realizations: usize,
}

impl From<&PeriodogramSettings> for PeriodogramOptions {
    fn from(settings: &PeriodogramSettings) -> Self {
        Self {
            request: settings.request(),
            realizations: settings.fap_realizations,
        }
    }
}

/// Light-curve product and how it was made.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LightCurveProduct {
    pub curve: LightCurve,
    /// Quarters the curve was extracted from
    pub quarters: Vec<u32>,
    pub options: LightCurveOptions,
}

/// Periodogram product: real spectrum and FAP curve on the same bins.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodogramProduct {
    pub spectrum: PowerSpectrum,
    pub fap: FapCurve,
    pub validity: ValidityReport,
    pub options: PeriodogramOptions,
}

/// Exploration state for one target.
pub struct TargetSession<A, P = SimpleAperturePhotometry, T = LombScargle> {
    target: String,
    cadence: Cadence,
    archive: A,
    photometry: P,
    transform: T,
    config: ExplorerConfig,
    rng: StdRng,
    search: SearchResult,
    aperture: Aperture,
    /// Set when the aperture is a threshold mask that must be re-derived
    /// for every pixel file
    threshold_sigma: Option<f64>,
    pixel_file: Option<PixelFile>,
    light_curve: Option<LightCurveProduct>,
    periodogram: Option<PeriodogramProduct>,
}

impl<A, P, T> std::fmt::Debug for TargetSession<A, P, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TargetSession")
            .field("target", &self.target)
            .field("cadence", &self.cadence)
            .field("datasets", &self.search.len())
            .field("aperture", &self.aperture)
            .field("threshold_sigma", &self.threshold_sigma)
            .field("pixel_file", &self.pixel_file.as_ref().map(|p| p.quarter))
            .field("light_curve", &self.light_curve.as_ref().map(|lc| lc.curve.len()))
            .field("periodogram", &self.periodogram.as_ref().map(|p| p.spectrum.len()))
            .finish()
    }
}

impl<A: Archive> TargetSession<A> {
    /// Open a session with the built-in photometry and Lomb-Scargle transform.
    pub fn open(archive: A, target: &str, cadence: Cadence, config: ExplorerConfig) -> ExplorerResult<Self> {
        Self::open_with(archive, SimpleAperturePhotometry, LombScargle, target, cadence, config)
    }
}

impl<A, P, T> TargetSession<A, P, T>
where
    A: Archive,
    P: Photometry,
    T: SpectralTransform,
{
    /// Search the archive for `target` and start a session on the result.
    ///
    /// Fails with [`ExplorerError::NoData`] when the archive has nothing for
    /// this target and cadence.
    pub fn open_with(
        archive: A,
        photometry: P,
        transform: T,
        target: &str,
        cadence: Cadence,
        config: ExplorerConfig,
    ) -> ExplorerResult<Self> {
        let target = target.trim();
        if target.is_empty() {
            return Err(ExplorerError::invalid_input_with_context(
                "target name is empty",
                ErrorContext::new("open_session"),
            ));
        }
        config.validate()?;

        let search = archive
            .search(target, cadence)
            .map_err(|e| e.with_operation("open_session").with_target(target))?;
        if search.is_empty() {
            return Err(ExplorerError::no_data_with_context(
                format!("archive has no {} cadence data", cadence),
                ErrorContext::new("open_session").with_target(target),
            ));
        }
        log::info!(
            "Session: opened '{}' ({} cadence), {} datasets over quarters {:?}",
            target,
            cadence,
            search.len(),
            search.quarters()
        );

        let rng = match config.periodogram.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let (aperture, threshold_sigma) = match config.light_curve.aperture.named_aperture() {
            Some(aperture) => (aperture, None),
            None => (Aperture::default(), Some(config.light_curve.threshold_sigma)),
        };

        Ok(Self {
            target: target.to_string(),
            cadence,
            archive,
            photometry,
            transform,
            config,
            rng,
            search,
            aperture,
            threshold_sigma,
            pixel_file: None,
            light_curve: None,
            periodogram: None,
        })
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    pub fn search_result(&self) -> &SearchResult {
        &self.search
    }

    /// Sorted quarters available for this target.
    pub fn quarters(&self) -> Vec<u32> {
        self.search.quarters()
    }

    pub fn aperture(&self) -> &Aperture {
        &self.aperture
    }

    /// Sigma of the active threshold aperture, if one is active.
    pub fn threshold_sigma(&self) -> Option<f64> {
        self.threshold_sigma
    }

    pub fn pixel_file(&self) -> Option<&PixelFile> {
        self.pixel_file.as_ref()
    }

    pub fn light_curve(&self) -> Option<&LightCurveProduct> {
        self.light_curve.as_ref()
    }

    pub fn periodogram(&self) -> Option<&PeriodogramProduct> {
        self.periodogram.as_ref()
    }

    /// Restart the random stream used for FAP estimation.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    fn context(&self, operation: &str) -> ErrorContext {
        ErrorContext::new(operation).with_target(self.target.clone())
    }

    /// Load the pixel file of `quarter`, resolving several matches with the
    /// configured ambiguity policy.
    pub fn load_pixel_file(&mut self, quarter: u32) -> ExplorerResult<&PixelFile> {
        let matches = self.search.filter_quarter(quarter);
        let descriptor = select_dataset(
            &matches,
            self.config.search.ambiguity_policy,
            self.context("load_pixel_file").with_quarter(quarter),
        )?
        .clone();
        self.load_pixel_file_from(&descriptor)
    }

    /// Load the pixel file behind a specific search entry, typically one the
    /// caller picked after a [`ExplorerError::SelectionRequired`].
    pub fn load_pixel_file_from(&mut self, descriptor: &DatasetDescriptor) -> ExplorerResult<&PixelFile> {
        let pixels = self
            .archive
            .download(descriptor)
            .map_err(|e| e.with_target(self.target.clone()))?;
        let aperture = match self.threshold_sigma {
            Some(sigma) => Aperture::Custom(threshold_mask(&pixels, sigma)?),
            None => self.aperture.clone(),
        };

        log::info!(
            "Session: loaded '{}' Q{} ({} cadences, {}x{} pixels)",
            self.target,
            pixels.quarter,
            pixels.n_cadences(),
            pixels.image_shape().0,
            pixels.image_shape().1
        );
        self.aperture = aperture;
        self.light_curve = None;
        self.periodogram = None;
        Ok(&*self.pixel_file.insert(pixels))
    }

    /// Use `aperture` for every following light curve.
    pub fn set_aperture(&mut self, aperture: Aperture) {
        log::debug!("Session: aperture for '{}' set to {}", self.target, aperture);
        self.aperture = aperture;
        self.threshold_sigma = None;
        self.light_curve = None;
        self.periodogram = None;
    }

    /// Use a threshold mask at `sigma` for every following light curve.
    ///
    /// The mask is re-derived from each pixel file it is applied to.
    pub fn set_threshold_aperture(&mut self, sigma: f64) -> ExplorerResult<()> {
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(ExplorerError::invalid_input_with_context(
                format!("threshold must be positive, got {}", sigma),
                self.context("set_threshold_aperture"),
            ));
        }
        if let Some(pixels) = &self.pixel_file {
            self.aperture = Aperture::Custom(threshold_mask(pixels, sigma)?);
        }
        log::debug!("Session: threshold aperture at {} sigma for '{}'", sigma, self.target);
        self.threshold_sigma = Some(sigma);
        self.light_curve = None;
        self.periodogram = None;
        Ok(())
    }

    fn mask_for(&self, pixels: &PixelFile) -> ExplorerResult<ApertureMask> {
        match self.threshold_sigma {
            Some(sigma) => threshold_mask(pixels, sigma),
            None => self.photometry.resolve_aperture(pixels, &self.aperture),
        }
    }

    fn ensure_pixel_file(&mut self) -> ExplorerResult<()> {
        if self.pixel_file.is_some() {
            return Ok(());
        }
        let first = self.search.quarters().first().copied().ok_or_else(|| {
            ExplorerError::no_data_with_context(
                "no dataset carries a quarter",
                self.context("build_light_curve"),
            )
        })?;
        log::info!("Session: no pixel file loaded for '{}', loading Q{}", self.target, first);
        self.load_pixel_file(first)?;
        Ok(())
    }

    /// Build the light curve from the loaded pixel file, or from every
    /// dataset when stitching. Loads the lowest quarter first if no pixel
    /// file is loaded yet.
    pub fn build_light_curve(&mut self, options: LightCurveOptions) -> ExplorerResult<&LightCurveProduct> {
        self.ensure_pixel_file()?;
        let (curve, quarters) = if options.stitch {
            self.extract_stitched()?
        } else {
            self.extract_single()?
        };
        let curve = match options.outlier_filter {
            Some(percent) => filter_outliers(&curve, percent)?,
            None => curve,
        };

        log::info!(
            "Session: light curve for '{}' built from quarters {:?}, {} samples",
            self.target,
            quarters,
            curve.len()
        );
        self.periodogram = None;
        Ok(&*self.light_curve.insert(LightCurveProduct {
            curve,
            quarters,
            options,
        }))
    }

    fn extract_single(&self) -> ExplorerResult<(LightCurve, Vec<u32>)> {
        let pixels = self.pixel_file.as_ref().ok_or_else(|| {
            ExplorerError::missing_product("no pixel file loaded").with_target(self.target.clone())
        })?;
        let mask = self.mask_for(pixels)?;
        let raw = self.photometry.extract(pixels, &mask)?;
        Ok((normalize(&raw)?, vec![pixels.quarter]))
    }

    fn extract_stitched(&self) -> ExplorerResult<(LightCurve, Vec<u32>)> {
        let mut segments = Vec::with_capacity(self.search.len());
        let mut quarters = Vec::with_capacity(self.search.len());
        for descriptor in &self.search.datasets {
            let pixels = self
                .archive
                .download(descriptor)
                .map_err(|e| e.with_operation("stitch").with_target(self.target.clone()))?;
            let mask = self.mask_for(&pixels)?;
            segments.push(self.photometry.extract(&pixels, &mask)?);
            quarters.push(pixels.quarter);
        }
        quarters.sort_unstable();
        quarters.dedup();
        Ok((stitch(&segments)?, quarters))
    }

    /// Compute the FAP curve and the real periodogram from the valid samples
    /// of the current light curve. Builds the light curve with the configured
    /// defaults first if there is none.
    pub fn compute_periodogram(&mut self, options: PeriodogramOptions) -> ExplorerResult<&PeriodogramProduct> {
        if self.light_curve.is_none() {
            let defaults = LightCurveOptions::from(&self.config.light_curve);
            self.build_light_curve(defaults)?;
        }
        let lc = match &self.light_curve {
            Some(product) => &product.curve,
            None => {
                return Err(ExplorerError::missing_product("no light curve")
                    .with_target(self.target.clone()))
            }
        };

        let estimate = estimate_fap_curve(
            lc,
            &self.transform,
            &options.request,
            options.realizations,
            &mut self.rng,
        )?;
        let (valid, _) = partition_valid(lc);
        let spectrum = self
            .transform
            .power_spectrum(&valid.times(), &valid.fluxes(), &options.request)
            .map_err(|e| e.with_operation("compute_periodogram").with_target(self.target.clone()))?;
        if spectrum.len() != estimate.curve.len() {
            return Err(ExplorerError::Transform {
                message: format!(
                    "periodogram has {} bins but FAP curve has {}",
                    spectrum.len(),
                    estimate.curve.len()
                ),
                context: self.context("compute_periodogram"),
            });
        }

        if let Some((frequency, power)) = spectrum.peak() {
            log::info!(
                "Session: periodogram for '{}' over {} bins, peak {:.4e} at {:.3} /d",
                self.target,
                spectrum.len(),
                power,
                frequency
            );
        }
        Ok(&*self.periodogram.insert(PeriodogramProduct {
            spectrum,
            fap: estimate.curve,
            validity: estimate.validity,
            options,
        }))
    }

    /// Render request for the periodogram panel.
    pub fn periodogram_view(&self, display: &DisplayOptions) -> ExplorerResult<PeriodogramView> {
        let product = self.periodogram.as_ref().ok_or_else(|| ExplorerError::MissingProduct {
            message: "compute the periodogram first".to_string(),
            context: self.context("periodogram_view"),
        })?;
        let bounds = product.options.request.bounds;
        let x_limits = bounds.min.zip(bounds.max);
        PeriodogramView::build(&self.target, &product.spectrum, &product.fap, display, x_limits)
    }

    /// Render request for the light-curve panel.
    pub fn light_curve_view(&self) -> ExplorerResult<LightCurveView> {
        self.light_curve
            .as_ref()
            .map(|product| LightCurveView::from(&product.curve))
            .ok_or_else(|| ExplorerError::MissingProduct {
                message: "build the light curve first".to_string(),
                context: self.context("light_curve_view"),
            })
    }

    /// Render request for the pixel-file panel, optionally with the aperture.
    pub fn pixel_file_view(&self, show_aperture: bool) -> ExplorerResult<PixelFileView> {
        let pixels = self.pixel_file.as_ref().ok_or_else(|| ExplorerError::MissingProduct {
            message: "load a pixel file first".to_string(),
            context: self.context("pixel_file_view"),
        })?;
        let mask = if show_aperture {
            Some(self.mask_for(pixels)?)
        } else {
            None
        };
        Ok(PixelFileView::build(pixels, mask.as_ref()))
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod session_tests;
