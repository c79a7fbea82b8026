use std::f64::consts::PI;

use super::{PeriodogramRequest, SpectralTransform};
use crate::algorithms::median_cadence;
use crate::error::{ErrorContext, ExplorerError, ExplorerResult};
use crate::models::{Normalization, PowerSpectrum};

/// Floor for the orthogonal cos²/sin² sums so degenerate sampling does not
/// divide by zero.
const MIN_TRIG_SUM: f64 = 1e-15;

/// Classical floating-mean Lomb-Scargle periodogram on a regular frequency
/// grid.
///
/// Grid spacing is `1 / (baseline · oversample)`. Without explicit bounds the
/// grid starts at one spacing and stops below the Nyquist frequency of the
/// median cadence.
#[derive(Debug, Clone, Copy, Default)]
pub struct LombScargle;

impl LombScargle {
    pub fn new() -> Self {
        Self
    }

    fn spacing(times: &[f64], request: &PeriodogramRequest) -> ExplorerResult<f64> {
        if times.len() < 2 {
            return Err(invalid(format!(
                "need at least 2 samples, got {}",
                times.len()
            )));
        }
        if times.iter().any(|t| !t.is_finite()) {
            return Err(invalid("timestamps must be finite"));
        }
        let oversample = request.oversample_factor;
        if !oversample.is_finite() || oversample <= 0.0 {
            return Err(invalid(format!(
                "oversample factor must be positive, got {}",
                oversample
            )));
        }
        let (lo, hi) = times
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &t| {
                (lo.min(t), hi.max(t))
            });
        let baseline = hi - lo;
        if baseline <= 0.0 {
            return Err(invalid("timestamps span zero time"));
        }
        Ok(1.0 / (baseline * oversample))
    }
}

impl SpectralTransform for LombScargle {
    fn name(&self) -> &str {
        "lomb-scargle"
    }

    fn frequency_grid(&self, times: &[f64], request: &PeriodogramRequest) -> ExplorerResult<Vec<f64>> {
        let df = Self::spacing(times, request)?;
        let min = request.bounds.min.unwrap_or(df);
        let max = match request.bounds.max {
            Some(max) => max,
            None => {
                let cadence = median_cadence(times)
                    .ok_or_else(|| invalid("cannot derive Nyquist frequency without a cadence"))?;
                0.5 / cadence
            }
        };

        if !min.is_finite() || !max.is_finite() || min <= 0.0 || max <= 0.0 {
            return Err(invalid(format!(
                "frequency bounds must be positive, got [{}, {}]",
                min, max
            )));
        }
        if min >= max {
            return Err(invalid(format!(
                "minimum frequency {} is not below maximum {}",
                min, max
            )));
        }

        let n_bins = ((max - min) / df).ceil() as usize;
        let grid: Vec<f64> = (0..n_bins)
            .map(|k| min + k as f64 * df)
            .take_while(|&f| f < max)
            .collect();
        if grid.is_empty() {
            return Err(invalid(format!(
                "no frequency bin of width {} fits in [{}, {})",
                df, min, max
            )));
        }
        Ok(grid)
    }

    fn power_spectrum(
        &self,
        times: &[f64],
        flux: &[f64],
        request: &PeriodogramRequest,
    ) -> ExplorerResult<PowerSpectrum> {
        if times.len() != flux.len() {
            return Err(invalid(format!(
                "{} timestamps for {} flux values",
                times.len(),
                flux.len()
            )));
        }
        if flux.iter().any(|f| !f.is_finite()) {
            return Err(invalid("flux values must be finite"));
        }
        let frequency = self.frequency_grid(times, request)?;
        let df = Self::spacing(times, request)?;

        let n = times.len() as f64;
        let mean = flux.iter().sum::<f64>() / n;
        let centred: Vec<f64> = flux.iter().map(|f| f - mean).collect();
        // Shift to the first timestamp; Julian dates lose precision inside sin/cos.
        let t0 = times[0];
        let shifted: Vec<f64> = times.iter().map(|t| t - t0).collect();

        let scale = match request.normalization {
            Normalization::Psd => 1.0 / (n * request.oversample_factor * df),
            Normalization::Standard => {
                let variance = centred.iter().map(|y| y * y).sum::<f64>() / (n - 1.0);
                if variance > 0.0 {
                    0.5 / variance
                } else {
                    0.0
                }
            }
        };

        let power: Vec<f64> = frequency
            .iter()
            .map(|&f| scale * orthogonal_power(&shifted, &centred, 2.0 * PI * f))
            .collect();

        if power.iter().any(|p| !p.is_finite()) {
            return Err(ExplorerError::Transform {
                message: "non-finite power in Lomb-Scargle output".to_string(),
                context: ErrorContext::new("power_spectrum"),
            });
        }
        PowerSpectrum::new(frequency, power, request.normalization)
    }
}

/// `YC²/CC + YS²/SS` at angular frequency `omega`, with the time offset τ
/// that makes the sine and cosine terms orthogonal.
fn orthogonal_power(times: &[f64], centred: &[f64], omega: f64) -> f64 {
    let (sin2, cos2) = times.iter().fold((0.0, 0.0), |(s, c), &t| {
        let arg = 2.0 * omega * t;
        (s + arg.sin(), c + arg.cos())
    });
    let tau = sin2.atan2(cos2) / (2.0 * omega);

    let mut yc = 0.0;
    let mut ys = 0.0;
    let mut cc = 0.0;
    let mut ss = 0.0;
    for (&t, &y) in times.iter().zip(centred) {
        let (s, c) = (omega * (t - tau)).sin_cos();
        yc += y * c;
        ys += y * s;
        cc += c * c;
        ss += s * s;
    }
    yc * yc / cc.max(MIN_TRIG_SUM) + ys * ys / ss.max(MIN_TRIG_SUM)
}

fn invalid(message: impl Into<String>) -> ExplorerError {
    ExplorerError::invalid_input_with_context(message, ErrorContext::new("lomb_scargle"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::periodogram::FrequencyBounds;
    use approx::assert_relative_eq;

    fn regular_times(n: usize, step: f64) -> Vec<f64> {
        (0..n).map(|i| 2_454_833.0 + i as f64 * step).collect()
    }

    fn unit_baseline() -> Vec<f64> {
        (0..11).map(|i| i as f64 * 0.1).collect()
    }

    #[test]
    fn test_default_grid_runs_to_nyquist() {
        // 100 samples at 0.1 d: baseline 9.9 d, Nyquist 5 /d
        let times = regular_times(100, 0.1);
        let grid = LombScargle
            .frequency_grid(&times, &PeriodogramRequest::default())
            .unwrap();
        let df = 1.0 / 9.9;
        assert_relative_eq!(grid[0], df, epsilon = 1e-9);
        assert_relative_eq!(grid[1] - grid[0], df, epsilon = 1e-9);
        assert!(*grid.last().unwrap() < 5.0);
        assert_eq!(grid.len(), 49);
    }

    #[test]
    fn test_bounded_grid_bin_count() {
        let times = unit_baseline(); // df 1 /d
        let request = PeriodogramRequest::default().with_bounds(FrequencyBounds::new(1.0, 4.5));
        let grid = LombScargle.frequency_grid(&times, &request).unwrap();
        assert_eq!(grid, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_oversampling_refines_grid() {
        let times = unit_baseline();
        let request = PeriodogramRequest::default()
            .with_bounds(FrequencyBounds::new(1.0, 2.0))
            .with_oversample_factor(4.0);
        let grid = LombScargle.frequency_grid(&times, &request).unwrap();
        assert_eq!(grid.len(), 4);
        assert_relative_eq!(grid[3], 1.75, epsilon = 1e-12);
    }

    #[test]
    fn test_sine_peak_recovered() {
        let times = regular_times(400, 0.02);
        let flux: Vec<f64> = times
            .iter()
            .map(|t| 1.0 + 0.01 * (2.0 * PI * 3.0 * (t - times[0])).sin())
            .collect();
        let request = PeriodogramRequest::default().with_oversample_factor(5.0);
        let spectrum = LombScargle.power_spectrum(&times, &flux, &request).unwrap();
        let (peak_frequency, _) = spectrum.peak().unwrap();
        assert!((peak_frequency - 3.0).abs() < 0.05, "peak at {}", peak_frequency);
    }

    #[test]
    fn test_psd_scales_with_square_of_amplitude() {
        let times = regular_times(64, 0.05);
        let flux: Vec<f64> = times.iter().map(|t| (t * 7.3).sin() + (t * 1.1).cos()).collect();
        let scaled: Vec<f64> = flux.iter().map(|f| 3.0 * f + 10.0).collect();
        let request = PeriodogramRequest::default();
        let a = LombScargle.power_spectrum(&times, &flux, &request).unwrap();
        let b = LombScargle.power_spectrum(&times, &scaled, &request).unwrap();
        for (pa, pb) in a.power.iter().zip(&b.power) {
            assert_relative_eq!(*pb, 9.0 * pa, max_relative = 1e-9);
        }
    }

    #[test]
    fn test_standard_normalization_is_scale_free() {
        let times = regular_times(64, 0.05);
        let flux: Vec<f64> = times.iter().map(|t| (t * 4.0).sin()).collect();
        let scaled: Vec<f64> = flux.iter().map(|f| 5.0 * f).collect();
        let request = PeriodogramRequest::default().with_normalization(Normalization::Standard);
        let a = LombScargle.power_spectrum(&times, &flux, &request).unwrap();
        let b = LombScargle.power_spectrum(&times, &scaled, &request).unwrap();
        for (pa, pb) in a.power.iter().zip(&b.power) {
            assert_relative_eq!(*pa, *pb, max_relative = 1e-9);
        }
    }

    #[test]
    fn test_constant_flux_has_zero_power() {
        let times = regular_times(20, 0.1);
        let spectrum = LombScargle
            .power_spectrum(&times, &[2.0; 20], &PeriodogramRequest::default())
            .unwrap();
        assert!(spectrum.power.iter().all(|&p| p == 0.0));
    }

    #[test]
    fn test_rejects_degenerate_input() {
        let request = PeriodogramRequest::default();
        let ls = LombScargle;
        assert!(ls.frequency_grid(&[1.0], &request).is_err());
        assert!(ls.frequency_grid(&[1.0, 1.0, 1.0], &request).is_err());

        let times = regular_times(11, 0.1);
        for bounds in [
            FrequencyBounds::new(0.0, 2.0),
            FrequencyBounds::new(-1.0, 2.0),
            FrequencyBounds::new(3.0, 3.0),
            FrequencyBounds::new(4.0, 2.0),
        ] {
            let result = ls.frequency_grid(&times, &request.with_bounds(bounds));
            assert!(matches!(result, Err(ExplorerError::InvalidInput { .. })));
        }
    }

    #[test]
    fn test_length_mismatch_and_nan_flux() {
        let times = regular_times(5, 0.1);
        let request = PeriodogramRequest::default();
        assert!(LombScargle.power_spectrum(&times, &[1.0; 4], &request).is_err());
        let mut flux = vec![1.0; 5];
        flux[2] = f64::NAN;
        assert!(LombScargle.power_spectrum(&times, &flux, &request).is_err());
    }
}
