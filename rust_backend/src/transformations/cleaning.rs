use serde::{Deserialize, Serialize};

use crate::error::{ErrorContext, ExplorerError, ExplorerResult};
use crate::models::LightCurve;

/// Outcome of splitting a light curve into usable and unusable samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidityReport {
    pub retained: usize,
    pub excluded: usize,
}

impl ValidityReport {
    pub fn total(&self) -> usize {
        self.retained + self.excluded
    }
}

/// Keep only samples with a finite, strictly positive uncertainty and a
/// finite time and flux.
///
/// The noise simulation and the real periodogram both run on this subset so
/// they share one set of timestamps. Order is preserved and
/// `retained + excluded` always equals the input length.
pub fn partition_valid(lc: &LightCurve) -> (LightCurve, ValidityReport) {
    let samples: Vec<_> = lc
        .samples
        .iter()
        .copied()
        .filter(|s| s.is_valid() && s.flux.is_finite() && s.time.is_finite())
        .collect();
    let report = ValidityReport {
        retained: samples.len(),
        excluded: lc.len() - samples.len(),
    };
    (LightCurve::new(lc.target.clone(), samples), report)
}

/// Divide flux and uncertainty by the median finite flux.
pub fn normalize(lc: &LightCurve) -> ExplorerResult<LightCurve> {
    let median = lc.median_flux().ok_or_else(|| {
        ExplorerError::invalid_input_with_context(
            "light curve has no finite flux to normalize by",
            ErrorContext::new("normalize").with_target(lc.target.clone()),
        )
    })?;
    if median == 0.0 {
        return Err(ExplorerError::invalid_input_with_context(
            "median flux is zero",
            ErrorContext::new("normalize").with_target(lc.target.clone()),
        ));
    }
    let samples = lc
        .samples
        .iter()
        .map(|s| {
            let mut s = *s;
            s.flux /= median;
            s.flux_err /= median.abs();
            s
        })
        .collect();
    Ok(LightCurve::new(lc.target.clone(), samples))
}
