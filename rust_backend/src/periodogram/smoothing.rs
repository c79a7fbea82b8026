use crate::error::{ErrorContext, ExplorerError, ExplorerResult};
use crate::models::PowerSpectrum;

/// Odd number of bins covering `width` cycles/day at spacing `spacing`.
pub fn smoothing_window(width: f64, spacing: f64) -> ExplorerResult<usize> {
    if !width.is_finite() || width <= 0.0 {
        return Err(ExplorerError::invalid_input_with_context(
            format!("smoothing width must be positive, got {}", width),
            ErrorContext::new("box_smooth"),
        ));
    }
    if !spacing.is_finite() || spacing <= 0.0 {
        return Err(ExplorerError::invalid_input_with_context(
            format!("frequency spacing must be positive, got {}", spacing),
            ErrorContext::new("box_smooth"),
        ));
    }
    let window = ((width / spacing).ceil() as usize).max(1);
    Ok(if window % 2 == 0 { window + 1 } else { window })
}

/// Centred moving average of `values` over a box `width` wide in frequency.
///
/// The box is truncated at the edges; non-finite values are skipped and a
/// box holding none gives NaN.
pub fn box_smooth(values: &[f64], spacing: f64, width: f64) -> ExplorerResult<Vec<f64>> {
    let half = smoothing_window(width, spacing)? / 2;

    let mut sums = Vec::with_capacity(values.len() + 1);
    let mut counts = Vec::with_capacity(values.len() + 1);
    sums.push(0.0);
    counts.push(0usize);
    for &v in values {
        let finite = v.is_finite();
        sums.push(sums[sums.len() - 1] + if finite { v } else { 0.0 });
        counts.push(counts[counts.len() - 1] + usize::from(finite));
    }

    Ok((0..values.len())
        .map(|i| {
            let lo = i.saturating_sub(half);
            let hi = (i + half + 1).min(values.len());
            let count = counts[hi] - counts[lo];
            if count == 0 {
                f64::NAN
            } else {
                (sums[hi] - sums[lo]) / count as f64
            }
        })
        .collect())
}

impl PowerSpectrum {
    /// Box-smoothed copy of the power values.
    pub fn smoothed(&self, width: f64) -> ExplorerResult<Vec<f64>> {
        let spacing = self.frequency_spacing().ok_or_else(|| {
            ExplorerError::invalid_input_with_context(
                "cannot smooth a spectrum with fewer than 2 bins",
                ErrorContext::new("box_smooth"),
            )
        })?;
        box_smooth(&self.power, spacing, width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Normalization;

    #[test]
    fn test_window_is_odd() {
        assert_eq!(smoothing_window(1.0, 0.5).unwrap(), 3);
        assert_eq!(smoothing_window(1.0, 0.3).unwrap(), 5);
        assert_eq!(smoothing_window(0.01, 1.0).unwrap(), 1);
    }

    #[test]
    fn test_box_smooth_centred_and_truncated() {
        let smoothed = box_smooth(&[3.0, 0.0, 3.0, 6.0], 1.0, 3.0).unwrap();
        assert_eq!(smoothed, vec![1.5, 2.0, 3.0, 4.5]);
    }

    #[test]
    fn test_width_one_bin_is_identity() {
        let values = vec![1.0, 5.0, 2.0];
        assert_eq!(box_smooth(&values, 1.0, 0.5).unwrap(), values);
    }

    #[test]
    fn test_non_finite_skipped() {
        let smoothed = box_smooth(&[f64::NAN, 2.0, f64::NAN], 1.0, 1.0).unwrap();
        assert!(smoothed[0].is_nan());
        assert_eq!(smoothed[1], 2.0);
        let smoothed = box_smooth(&[f64::NAN, 2.0, 4.0], 1.0, 3.0).unwrap();
        assert_eq!(smoothed, vec![2.0, 3.0, 3.0]);
    }

    #[test]
    fn test_invalid_width() {
        assert!(box_smooth(&[1.0], 1.0, 0.0).is_err());
        assert!(box_smooth(&[1.0], 1.0, f64::NAN).is_err());
    }

    #[test]
    fn test_spectrum_smoothed() {
        let spectrum =
            PowerSpectrum::new(vec![1.0, 2.0, 3.0], vec![0.0, 3.0, 0.0], Normalization::Psd).unwrap();
        assert_eq!(spectrum.smoothed(3.0).unwrap(), vec![1.5, 1.0, 1.5]);
        let single = PowerSpectrum::new(vec![1.0], vec![1.0], Normalization::Psd).unwrap();
        assert!(single.smoothed(1.0).is_err());
    }
}
