//! False-alarm-probability noise floor.
//!
//! A FAP curve answers "how much periodogram power would a perfectly
//! constant star show here, given these timestamps and these error bars?".
//! The [`FluxSampler`] draws constant-star realizations from the measured
//! uncertainties, and the [`PeriodogramAverager`] reduces their periodograms
//! to a per-bin median.
//!
//! Only valid samples (finite, strictly positive `flux_err`) take part. The
//! real periodogram must be computed from the same valid subset and the same
//! [`PeriodogramRequest`] for the two curves to line up bin for bin.
//!
//! # Example
//!
//! ```
//! use keeplerite::fap::estimate_fap_curve;
//! use keeplerite::models::LightCurve;
//! use keeplerite::periodogram::{LombScargle, PeriodogramRequest};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! # fn example() -> keeplerite::ExplorerResult<()> {
//! let time: Vec<f64> = (0..50).map(|i| i as f64 * 0.02).collect();
//! let lc = LightCurve::from_columns("Kepler-8", &time, &vec![1.0; 50], &vec![0.01; 50])?;
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let estimate = estimate_fap_curve(&lc, &LombScargle, &PeriodogramRequest::default(), 10, &mut rng)?;
//! assert_eq!(estimate.curve.realizations, 10);
//! # Ok(())
//! # }
//! ```

pub mod averager;
pub mod sampler;


pub use averager::{PeriodogramAverager, RECOMMENDED_MIN_REALIZATIONS};
pub use sampler::{FluxSampler, SyntheticRealization};

use rand::Rng;
use serde::Serialize;

use crate::error::{ErrorContext, ExplorerError, ExplorerResult};
use crate::models::{FapCurve, LightCurve};
use crate::periodogram::{PeriodogramRequest, SpectralTransform};
use crate::transformations::{partition_valid, ValidityReport};

/// FAP curve plus how many input samples it was built from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FapEstimate {
    pub curve: FapCurve,
    pub validity: ValidityReport,
}

/// Estimate the FAP curve of `lc` from `realizations` synthetic series.
///
/// Invalid samples are dropped first. Fails with
/// [`ExplorerError::InvalidInput`] when `realizations` is zero or no valid
/// sample remains; transform failures are returned as-is.
pub fn estimate_fap_curve<T, R>(
    lc: &LightCurve,
    transform: &T,
    request: &PeriodogramRequest,
    realizations: usize,
    rng: &mut R,
) -> ExplorerResult<FapEstimate>
where
    T: SpectralTransform + ?Sized,
    R: Rng + ?Sized,
{
    let context = || ErrorContext::new("estimate_fap").with_target(lc.target.clone());
    if realizations == 0 {
        return Err(ExplorerError::invalid_input_with_context(
            "realization count must be at least 1",
            context(),
        ));
    }

    let (valid, validity) = partition_valid(lc);
    if validity.excluded > 0 {
        log::warn!(
            "Excluded {} of {} samples of '{}' with unusable uncertainties",
            validity.excluded,
            validity.total(),
            lc.target
        );
    }
    if valid.is_empty() {
        return Err(ExplorerError::invalid_input_with_context(
            "no sample has a usable uncertainty",
            context(),
        ));
    }

    log::info!(
        "Estimating FAP curve for '{}': {} realizations of {} samples",
        lc.target,
        realizations,
        valid.len()
    );
    let sampler = FluxSampler::new(&valid.samples).map_err(|e| e.with_target(lc.target.clone()))?;
    let synthetic = sampler.draw(rng, realizations)?;
    let curve = PeriodogramAverager::new(transform, *request)
        .average(&synthetic)
        .map_err(|e| e.with_target(lc.target.clone()))?;

    Ok(FapEstimate { curve, validity })
}
