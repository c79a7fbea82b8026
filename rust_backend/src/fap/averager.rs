use ndarray::{Array2, ArrayView1, Axis};

use super::sampler::SyntheticRealization;
use crate::algorithms::statistics::median_in_place;
use crate::error::{ErrorContext, ExplorerError, ExplorerResult};
use crate::models::FapCurve;
use crate::periodogram::{PeriodogramRequest, SpectralTransform};

/// Below this many realizations the per-bin median is noisy.
pub const RECOMMENDED_MIN_REALIZATIONS: usize = 10;

/// Reduces the periodograms of many synthetic series to a per-bin median.
pub struct PeriodogramAverager<'a, T: SpectralTransform + ?Sized> {
    transform: &'a T,
    request: PeriodogramRequest,
}

impl<'a, T: SpectralTransform + ?Sized> PeriodogramAverager<'a, T> {
    pub fn new(transform: &'a T, request: PeriodogramRequest) -> Self {
        Self { transform, request }
    }

    /// Compute one spectrum per realization, stack them into an `R × B`
    /// matrix and take the median down each column.
    ///
    /// With a single realization the result is that realization's spectrum.
    pub fn average(&self, realizations: &[SyntheticRealization<'_>]) -> ExplorerResult<FapCurve> {
        let context = || ErrorContext::new("average_periodograms");
        let Some(first) = realizations.first() else {
            return Err(ExplorerError::invalid_input_with_context(
                "at least one realization is required",
                context(),
            ));
        };
        if realizations.len() < RECOMMENDED_MIN_REALIZATIONS {
            log::warn!(
                "FAP curve from only {} realizations (>= {} recommended); expect a noisy noise floor",
                realizations.len(),
                RECOMMENDED_MIN_REALIZATIONS
            );
        }

        let reference = self
            .transform
            .power_spectrum(first.times, &first.flux, &self.request)?;
        let bins = reference.len();
        let mut stack = Array2::<f64>::zeros((realizations.len(), bins));
        stack.row_mut(0).assign(&ArrayView1::from(reference.power.as_slice()));

        for (r, realization) in realizations.iter().enumerate().skip(1) {
            let spectrum = self
                .transform
                .power_spectrum(realization.times, &realization.flux, &self.request)?;
            if spectrum.len() != bins {
                return Err(ExplorerError::Transform {
                    message: format!(
                        "{} returned {} bins for realization {} but {} for the first",
                        self.transform.name(),
                        spectrum.len(),
                        r,
                        bins
                    ),
                    context: context(),
                });
            }
            stack.row_mut(r).assign(&ArrayView1::from(spectrum.power.as_slice()));
        }

        let power = stack
            .map_axis(Axis(0), |column| {
                let mut values = column.to_vec();
                median_in_place(&mut values).unwrap_or(f64::NAN)
            })
            .to_vec();

        log::debug!(
            "Averaged {} {} periodograms over {} bins",
            realizations.len(),
            self.transform.name(),
            bins
        );
        Ok(FapCurve {
            frequency: reference.frequency,
            power,
            realizations: realizations.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Normalization, PowerSpectrum};

    /// Returns the flux itself as power on a fixed grid.
    struct Echo;

    impl SpectralTransform for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        fn frequency_grid(&self, times: &[f64], _: &PeriodogramRequest) -> ExplorerResult<Vec<f64>> {
            Ok((1..=times.len()).map(|k| k as f64).collect())
        }

        fn power_spectrum(
            &self,
            times: &[f64],
            flux: &[f64],
            request: &PeriodogramRequest,
        ) -> ExplorerResult<PowerSpectrum> {
            PowerSpectrum::new(self.frequency_grid(times, request)?, flux.to_vec(), Normalization::Psd)
        }
    }

    #[test]
    fn test_median_per_bin() {
        let times = [0.0, 1.0];
        let realizations = vec![
            SyntheticRealization { times: &times, flux: vec![1.0, 9.0] },
            SyntheticRealization { times: &times, flux: vec![5.0, 3.0] },
            SyntheticRealization { times: &times, flux: vec![2.0, 4.0] },
        ];
        let curve = PeriodogramAverager::new(&Echo, PeriodogramRequest::default())
            .average(&realizations)
            .unwrap();
        assert_eq!(curve.frequency, vec![1.0, 2.0]);
        assert_eq!(curve.power, vec![2.0, 4.0]);
        assert_eq!(curve.realizations, 3);
    }

    #[test]
    fn test_single_realization_passthrough() {
        let times = [0.0, 1.0, 2.0];
        let realizations = vec![SyntheticRealization { times: &times, flux: vec![0.3, 0.1, 0.2] }];
        let curve = PeriodogramAverager::new(&Echo, PeriodogramRequest::default())
            .average(&realizations)
            .unwrap();
        assert_eq!(curve.power, vec![0.3, 0.1, 0.2]);
    }

    #[test]
    fn test_no_realizations_rejected() {
        let result = PeriodogramAverager::new(&Echo, PeriodogramRequest::default()).average(&[]);
        assert!(matches!(result, Err(ExplorerError::InvalidInput { .. })));
    }

    #[test]
    fn test_inputs_untouched() {
        let times = [0.0, 1.0];
        let realizations = vec![
            SyntheticRealization { times: &times, flux: vec![1.0, 2.0] },
            SyntheticRealization { times: &times, flux: vec![3.0, 4.0] },
        ];
        let before = realizations.clone();
        PeriodogramAverager::new(&Echo, PeriodogramRequest::default())
            .average(&realizations)
            .unwrap();
        assert_eq!(realizations, before);
    }
}
