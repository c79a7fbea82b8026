/// Scale factor turning a median absolute deviation into a Gaussian sigma.
pub const MAD_TO_SIGMA: f64 = 1.4826;

/// Median of the finite values in `data`.
///
/// Non-finite values are dropped before ordering. Returns `None` when no
/// finite value remains.
pub fn median(data: &[f64]) -> Option<f64> {
    let mut values: Vec<f64> = data.iter().copied().filter(|x| x.is_finite()).collect();
    median_in_place(&mut values)
}

/// Median of an already-owned buffer of finite values. Reorders `values`.
pub(crate) fn median_in_place(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;

    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) * 0.5)
    } else {
        Some(values[mid])
    }
}

/// Median absolute deviation around the median of the finite values.
pub fn median_absolute_deviation(data: &[f64]) -> Option<f64> {
    let med = median(data)?;
    let mut deviations: Vec<f64> = data
        .iter()
        .copied()
        .filter(|x| x.is_finite())
        .map(|x| (x - med).abs())
        .collect();
    median_in_place(&mut deviations)
}

/// Median spacing between consecutive timestamps.
///
/// Only strictly positive, finite steps count, so duplicated or unsorted
/// stamps do not collapse the cadence to zero.
pub fn median_cadence(times: &[f64]) -> Option<f64> {
    if times.len() < 2 {
        return None;
    }
    let mut steps: Vec<f64> = times
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|dt| dt.is_finite() && *dt > 0.0)
        .collect();
    median_in_place(&mut steps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_median_odd_count() {
        assert_eq!(median(&[5.0, 1.0, 3.0]), Some(3.0));
    }

    #[test]
    fn test_median_even_count() {
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
    }

    #[test]
    fn test_median_ignores_non_finite() {
        assert_eq!(median(&[f64::NAN, 1.0, f64::INFINITY, 2.0, 3.0]), Some(2.0));
    }

    #[test]
    fn test_median_empty() {
        assert_eq!(median(&[]), None);
        assert_eq!(median(&[f64::NAN]), None);
    }

    #[test]
    fn test_mad() {
        // deviations from 3: 2, 1, 0, 1, 2 -> median 1
        assert_eq!(median_absolute_deviation(&[1.0, 2.0, 3.0, 4.0, 5.0]), Some(1.0));
    }

    #[test]
    fn test_median_cadence_skips_gaps_and_duplicates() {
        let times = [0.0, 0.5, 0.5, 1.0, 1.5, 10.0];
        assert_eq!(median_cadence(&times), Some(0.5));
    }

    #[test]
    fn test_median_cadence_too_short() {
        assert_eq!(median_cadence(&[1.0]), None);
    }

    proptest! {
        #[test]
        fn prop_median_within_range(values in proptest::collection::vec(-1e6..1e6f64, 1..64)) {
            let med = median(&values).unwrap();
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            prop_assert!(med >= min && med <= max);
        }
    }
}
