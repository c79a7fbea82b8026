//! Pixel data → light curve.
//!
//! [`Photometry`] resolves an [`Aperture`] against a pixel file and sums the
//! selected pixels into a flux series. [`SimpleAperturePhotometry`] is the
//! straightforward sum-of-pixels implementation.

pub mod aperture;
pub mod simple;

pub use aperture::{threshold_mask, threshold_mask_from_image, THRESHOLD_POLICY_SIGMA};
pub use simple::SimpleAperturePhotometry;

use crate::error::ExplorerResult;
use crate::models::{Aperture, ApertureMask, LightCurve, PixelFile};

/// Photometry collaborator.
pub trait Photometry {
    /// Turn an aperture specification into a concrete mask for `pixels`.
    fn resolve_aperture(&self, pixels: &PixelFile, aperture: &Aperture) -> ExplorerResult<ApertureMask>;

    /// Sum the masked pixels of every cadence into a light curve.
    fn extract(&self, pixels: &PixelFile, mask: &ApertureMask) -> ExplorerResult<LightCurve>;

    /// [`resolve_aperture`](Self::resolve_aperture) followed by
    /// [`extract`](Self::extract).
    fn light_curve(&self, pixels: &PixelFile, aperture: &Aperture) -> ExplorerResult<LightCurve> {
        let mask = self.resolve_aperture(pixels, aperture)?;
        self.extract(pixels, &mask)
    }
}
