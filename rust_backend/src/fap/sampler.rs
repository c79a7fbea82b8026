use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::algorithms::median;
use crate::error::{ErrorContext, ExplorerError, ExplorerResult};
use crate::models::TimeSeriesSample;

/// One synthetic constant-star light curve.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticRealization<'a> {
    pub times: &'a [f64],
    pub flux: Vec<f64>,
}

/// Draws flux series from per-sample Gaussian noise models anchored at the
/// median flux.
///
/// Sample `i` of every realization is drawn from
/// `Normal(median_flux, flux_err[i])`, independently across samples and
/// realizations.
#[derive(Debug, Clone)]
pub struct FluxSampler {
    times: Vec<f64>,
    median_flux: f64,
    noise: Vec<Normal<f64>>,
}

impl FluxSampler {
    /// Build the noise models. Every sample must carry a finite, strictly
    /// positive uncertainty.
    pub fn new(samples: &[TimeSeriesSample]) -> ExplorerResult<Self> {
        let context = || ErrorContext::new("flux_sampler");
        if samples.is_empty() {
            return Err(ExplorerError::invalid_input_with_context(
                "cannot sample from an empty series",
                context(),
            ));
        }
        if let Some((idx, bad)) = samples.iter().enumerate().find(|(_, s)| !s.is_valid()) {
            return Err(ExplorerError::invalid_input_with_context(
                format!("sample {} has unusable uncertainty {}", idx, bad.flux_err),
                context(),
            ));
        }

        let fluxes: Vec<f64> = samples.iter().map(|s| s.flux).collect();
        let median_flux = median(&fluxes).ok_or_else(|| {
            ExplorerError::invalid_input_with_context("no finite flux to anchor the noise model", context())
        })?;

        let noise = samples
            .iter()
            .map(|s| {
                Normal::new(median_flux, s.flux_err).map_err(|e| {
                    ExplorerError::invalid_input_with_context(
                        format!("noise model for sd {}: {}", s.flux_err, e),
                        context(),
                    )
                })
            })
            .collect::<ExplorerResult<Vec<_>>>()?;

        Ok(Self {
            times: samples.iter().map(|s| s.time).collect(),
            median_flux,
            noise,
        })
    }

    pub fn median_flux(&self) -> f64 {
        self.median_flux
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Draw `repetitions` realizations sharing this sampler's timestamps.
    pub fn draw<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        repetitions: usize,
    ) -> ExplorerResult<Vec<SyntheticRealization<'_>>> {
        if repetitions < 1 {
            return Err(ExplorerError::invalid_input_with_context(
                "at least one realization is required",
                ErrorContext::new("flux_sampler"),
            ));
        }
        Ok((0..repetitions)
            .map(|_| SyntheticRealization {
                times: &self.times,
                flux: self.noise.iter().map(|model| model.sample(rng)).collect(),
            })
            .collect())
    }
}
