use std::collections::VecDeque;

use ndarray::Array2;

use crate::algorithms::{median, median_absolute_deviation, MAD_TO_SIGMA};
use crate::error::{ErrorContext, ExplorerError, ExplorerResult};
use crate::models::{ApertureMask, PixelFile};

/// Threshold used by the named `threshold` aperture policy.
pub const THRESHOLD_POLICY_SIGMA: f64 = 3.0;

const NEIGHBOURS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Threshold mask over the per-pixel median image of `pixels`.
pub fn threshold_mask(pixels: &PixelFile, sigma: f64) -> ExplorerResult<ApertureMask> {
    threshold_mask_from_image(&pixels.median_image(), sigma)
        .map_err(|e| e.with_target(pixels.target.clone()))
}

/// Select pixels brighter than `median + sigma · σ_MAD` of `image`, keeping
/// only the 4-connected region closest to the image centre.
///
/// The result is empty when no pixel clears the cut.
pub fn threshold_mask_from_image(image: &Array2<f64>, sigma: f64) -> ExplorerResult<ApertureMask> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(ExplorerError::invalid_input_with_context(
            format!("threshold must be positive, got {}", sigma),
            ErrorContext::new("threshold_mask"),
        ));
    }
    let values: Vec<f64> = image.iter().copied().collect();
    let (Some(centre_value), Some(mad)) = (median(&values), median_absolute_deviation(&values)) else {
        return Ok(ApertureMask::none(image.dim()));
    };
    let cut = centre_value + sigma * MAD_TO_SIGMA * mad;
    let above = image.mapv(|v| v.is_finite() && v >= cut);

    let Some(seed) = nearest_to_centre(&above) else {
        return Ok(ApertureMask::none(image.dim()));
    };
    Ok(ApertureMask::new(flood_fill(&above, seed)))
}

fn nearest_to_centre(selected: &Array2<bool>) -> Option<(usize, usize)> {
    let (rows, cols) = selected.dim();
    let centre_row = (rows as f64 - 1.0) / 2.0;
    let centre_col = (cols as f64 - 1.0) / 2.0;
    selected
        .indexed_iter()
        .filter(|(_, selected)| **selected)
        .map(|((r, c), _)| {
            let distance = (r as f64 - centre_row).powi(2) + (c as f64 - centre_col).powi(2);
            ((r, c), distance)
        })
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(index, _)| index)
}

fn flood_fill(selected: &Array2<bool>, seed: (usize, usize)) -> Array2<bool> {
    let (rows, cols) = selected.dim();
    let mut region = Array2::from_elem((rows, cols), false);
    let mut queue = VecDeque::from([seed]);
    region[seed] = true;

    while let Some((r, c)) = queue.pop_front() {
        for (dr, dc) in NEIGHBOURS {
            let (Some(nr), Some(nc)) = (r.checked_add_signed(dr), c.checked_add_signed(dc)) else {
                continue;
            };
            if nr < rows && nc < cols && selected[(nr, nc)] && !region[(nr, nc)] {
                region[(nr, nc)] = true;
                queue.push_back((nr, nc));
            }
        }
    }
    region
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_keeps_central_region_only() {
        // two bright blobs; only the one touching the centre survives
        let image = array![
            [50.0, 1.0, 2.0, 1.0, 2.0],
            [2.0, 1.0, 2.0, 1.0, 1.0],
            [1.0, 2.0, 40.0, 30.0, 2.0],
            [2.0, 1.0, 35.0, 2.0, 1.0],
            [1.0, 2.0, 1.0, 1.0, 2.0],
        ];
        let mask = threshold_mask_from_image(&image, 3.0).unwrap();
        assert_eq!(mask.pixel_count(), 3);
        assert!(mask.contains(2, 2));
        assert!(mask.contains(2, 3));
        assert!(mask.contains(3, 2));
        assert!(!mask.contains(0, 0));
    }

    #[test]
    fn test_diagonal_pixels_are_not_connected() {
        let image = array![
            [1.0, 2.0, 1.0],
            [2.0, 9.0, 1.0],
            [1.0, 2.0, 9.0],
        ];
        let mask = threshold_mask_from_image(&image, 1.0).unwrap();
        assert_eq!(mask.pixel_count(), 1);
        assert!(mask.contains(1, 1));
    }

    #[test]
    fn test_off_centre_source_is_found() {
        let image = array![
            [0.0, 1.0, 0.0, 1.0],
            [1.0, 0.0, 1.0, 0.0],
            [0.0, 1.0, 0.0, 1.0],
            [8.0, 9.0, 1.0, 0.0],
        ];
        let mask = threshold_mask_from_image(&image, 2.0).unwrap();
        assert_eq!(mask.pixel_count(), 2);
        assert!(mask.contains(3, 1));
    }

    #[test]
    fn test_lower_threshold_grows_aperture() {
        let image = array![
            [1.0, 2.0, 3.0, 2.0, 1.0],
            [2.0, 4.0, 6.0, 4.0, 2.0],
            [3.0, 6.0, 9.0, 6.0, 3.0],
            [2.0, 4.0, 6.0, 4.0, 2.0],
            [1.0, 2.0, 3.0, 2.0, 1.0],
        ];
        let tight = threshold_mask_from_image(&image, 3.0).unwrap();
        let loose = threshold_mask_from_image(&image, 1.0).unwrap();
        assert!(loose.pixel_count() > tight.pixel_count());
        assert!(tight.contains(2, 2));
    }

    #[test]
    fn test_all_nan_image_gives_empty_mask() {
        let image = Array2::from_elem((3, 3), f64::NAN);
        let mask = threshold_mask_from_image(&image, 1.0).unwrap();
        assert_eq!(mask.pixel_count(), 0);
        assert_eq!(mask.shape(), (3, 3));
    }

    #[test]
    fn test_invalid_sigma() {
        let image = Array2::from_elem((2, 2), 1.0);
        assert!(threshold_mask_from_image(&image, 0.0).is_err());
        assert!(threshold_mask_from_image(&image, f64::INFINITY).is_err());
    }
}
