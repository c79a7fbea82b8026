use ndarray::Zip;

use super::aperture::{threshold_mask, THRESHOLD_POLICY_SIGMA};
use super::Photometry;
use crate::error::{ErrorContext, ExplorerError, ExplorerResult};
use crate::models::{Aperture, ApertureMask, AperturePolicy, LightCurve, PixelFile, TimeSeriesSample};

/// Plain aperture sum: flux is the sum of the finite masked pixels and the
/// uncertainty their errors added in quadrature.
///
/// A cadence where no masked pixel is finite gives a NaN sample, which the
/// validity filter later drops.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleAperturePhotometry;

impl SimpleAperturePhotometry {
    pub fn new() -> Self {
        Self
    }
}

impl Photometry for SimpleAperturePhotometry {
    fn resolve_aperture(&self, pixels: &PixelFile, aperture: &Aperture) -> ExplorerResult<ApertureMask> {
        match aperture {
            Aperture::Named(AperturePolicy::Pipeline) => Ok(pixels.pipeline_mask().clone()),
            Aperture::Named(AperturePolicy::Threshold) => threshold_mask(pixels, THRESHOLD_POLICY_SIGMA),
            Aperture::Named(AperturePolicy::All) => Ok(ApertureMask::all(pixels.image_shape())),
            Aperture::Custom(mask) => {
                check_shape(pixels, mask)?;
                Ok(mask.clone())
            }
        }
    }

    fn extract(&self, pixels: &PixelFile, mask: &ApertureMask) -> ExplorerResult<LightCurve> {
        check_shape(pixels, mask)?;
        if mask.pixel_count() == 0 {
            return Err(ExplorerError::invalid_input_with_context(
                "aperture mask selects no pixels",
                context(pixels),
            ));
        }
        if pixels.n_cadences() == 0 {
            return Err(ExplorerError::Photometry {
                message: "pixel file has no cadences".to_string(),
                context: context(pixels),
            });
        }

        let selection = mask.as_array();
        let samples: Vec<TimeSeriesSample> = pixels
            .flux()
            .outer_iter()
            .zip(pixels.flux_err().outer_iter())
            .zip(pixels.time())
            .map(|((frame, err_frame), &time)| {
                let mut flux = 0.0;
                let mut variance = 0.0;
                let mut used = 0usize;
                Zip::from(&frame)
                    .and(&err_frame)
                    .and(selection)
                    .for_each(|&f, &e, &selected| {
                        if selected && f.is_finite() {
                            flux += f;
                            variance += e * e;
                            used += 1;
                        }
                    });
                if used == 0 {
                    TimeSeriesSample::new(time, f64::NAN, f64::NAN)
                } else {
                    TimeSeriesSample::new(time, flux, variance.sqrt())
                }
            })
            .collect();

        log::debug!(
            "Extracted {} cadences for '{}' Q{} through {} pixels",
            samples.len(),
            pixels.target,
            pixels.quarter,
            mask.pixel_count()
        );
        Ok(LightCurve::new(pixels.target.clone(), samples))
    }
}

fn check_shape(pixels: &PixelFile, mask: &ApertureMask) -> ExplorerResult<()> {
    if mask.shape() != pixels.image_shape() {
        return Err(ExplorerError::invalid_input_with_context(
            format!(
                "aperture mask shape {:?} does not match image shape {:?}",
                mask.shape(),
                pixels.image_shape()
            ),
            context(pixels),
        ));
    }
    Ok(())
}

fn context(pixels: &PixelFile) -> ErrorContext {
    ErrorContext::new("extract_light_curve")
        .with_target(pixels.target.clone())
        .with_quarter(pixels.quarter)
}
