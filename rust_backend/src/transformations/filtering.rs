use crate::error::{ErrorContext, ExplorerError, ExplorerResult};
use crate::models::LightCurve;

/// Remove samples whose flux strays more than `percentage` percent from the
/// median flux.
///
/// A sample is kept when `1 - p/100 <= flux / median <= 1 + p/100`. Samples
/// with non-finite flux are always dropped.
pub fn filter_outliers(lc: &LightCurve, percentage: f64) -> ExplorerResult<LightCurve> {
    let context = || ErrorContext::new("filter_outliers").with_target(lc.target.clone());
    if !percentage.is_finite() || percentage <= 0.0 || percentage > 100.0 {
        return Err(ExplorerError::invalid_input_with_context(
            format!("outlier percentage must be in (0, 100], got {}", percentage),
            context(),
        ));
    }
    let median = lc.median_flux().ok_or_else(|| {
        ExplorerError::invalid_input_with_context("light curve has no finite flux", context())
    })?;
    if median == 0.0 {
        return Err(ExplorerError::invalid_input_with_context("median flux is zero", context()));
    }

    let lower = 1.0 - percentage / 100.0;
    let upper = 1.0 + percentage / 100.0;
    let samples: Vec<_> = lc
        .samples
        .iter()
        .copied()
        .filter(|s| {
            let relative = s.flux / median;
            relative >= lower && relative <= upper
        })
        .collect();

    log::debug!(
        "Outlier filter ({}%) kept {} of {} samples for '{}'",
        percentage,
        samples.len(),
        lc.len(),
        lc.target
    );
    Ok(LightCurve::new(lc.target.clone(), samples))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve(flux: &[f64]) -> LightCurve {
        let time: Vec<f64> = (0..flux.len()).map(|i| i as f64).collect();
        LightCurve::from_columns("t", &time, flux, &vec![0.01; flux.len()]).unwrap()
    }

    #[test]
    fn test_band_is_inclusive() {
        let lc = curve(&[0.8, 1.0, 1.2, 1.21, 0.79]);
        let filtered = filter_outliers(&lc, 20.0).unwrap();
        assert_eq!(filtered.fluxes(), vec![0.8, 1.0, 1.2]);
    }

    #[test]
    fn test_relative_to_median_not_unity() {
        let lc = curve(&[100.0, 105.0, 140.0, 95.0, 100.0]);
        let filtered = filter_outliers(&lc, 10.0).unwrap();
        assert_eq!(filtered.len(), 4);
    }

    #[test]
    fn test_nan_flux_dropped() {
        let lc = curve(&[1.0, f64::NAN, 1.0]);
        assert_eq!(filter_outliers(&lc, 100.0).unwrap().len(), 2);
    }

    #[test]
    fn test_invalid_percentage() {
        let lc = curve(&[1.0]);
        for bad in [0.0, -5.0, 150.0, f64::NAN] {
            assert!(matches!(
                filter_outliers(&lc, bad),
                Err(ExplorerError::InvalidInput { .. })
            ));
        }
    }
}
