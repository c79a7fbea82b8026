//! Render requests.
//!
//! Drawing happens in the frontend. These structs carry everything a plot
//! needs (curves, axis scale, limits, labels) as plain data.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ErrorContext, ExplorerError, ExplorerResult};
use crate::models::{signal_to_noise, ApertureMask, FapCurve, LightCurve, Normalization, PixelFile, PowerSpectrum};

/// Y-axis scale of the periodogram plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    Linear,
    #[default]
    Log,
    Symlog,
    Asinh,
    Logit,
}

impl Scale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Log => "log",
            Self::Symlog => "symlog",
            Self::Asinh => "asinh",
            Self::Logit => "logit",
        }
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "linear" => Ok(Self::Linear),
            "log" => Ok(Self::Log),
            "symlog" => Ok(Self::Symlog),
            "asinh" => Ok(Self::Asinh),
            "logit" => Ok(Self::Logit),
            _ => Err(format!("Unknown scale: {}", s)),
        }
    }
}

/// Periodogram display controls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayOptions {
    /// Box-kernel width in cycles/day
    pub smoothing: f64,
    pub scale: Scale,
    /// Plot power divided by the FAP curve instead of raw power
    pub signal_to_noise: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            smoothing: 10.0,
            scale: Scale::Log,
            signal_to_noise: false,
        }
    }
}

/// Everything needed to draw the periodogram panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodogramView {
    pub title: String,
    pub y_label: String,
    pub frequency: Vec<f64>,
    /// Raw power, or raw S/N in signal-to-noise mode
    pub power: Vec<f64>,
    /// Box-smoothed power, or its S/N in signal-to-noise mode
    pub smoothed: Vec<f64>,
    /// Noise floor; absent in signal-to-noise mode
    pub fap: Option<Vec<f64>>,
    pub scale: Scale,
    pub x_limits: (f64, f64),
    pub signal_to_noise: bool,
}

impl PeriodogramView {
    /// Assemble the view for `target` from a spectrum and its FAP curve.
    ///
    /// `x_limits` defaults to the first and last bin when not given.
    pub fn build(
        target: &str,
        spectrum: &PowerSpectrum,
        fap: &FapCurve,
        display: &DisplayOptions,
        x_limits: Option<(f64, f64)>,
    ) -> ExplorerResult<Self> {
        let smoothed = spectrum
            .smoothed(display.smoothing)
            .map_err(|e| e.with_operation("periodogram_view").with_target(target))?;
        let x_limits = match x_limits {
            Some(limits) => limits,
            None => match (spectrum.frequency.first(), spectrum.frequency.last()) {
                (Some(&lo), Some(&hi)) => (lo, hi),
                _ => {
                    return Err(ExplorerError::invalid_input_with_context(
                        "empty spectrum",
                        ErrorContext::new("periodogram_view").with_target(target),
                    ))
                }
            },
        };

        let (power, smoothed, fap_curve, y_label) = if display.signal_to_noise {
            (
                spectrum.signal_to_noise(fap)?,
                signal_to_noise(&smoothed, fap)?,
                None,
                "Signal to Noise Ratio".to_string(),
            )
        } else {
            let label = match spectrum.normalization {
                Normalization::Psd => "Power Spectral Density",
                Normalization::Standard => "Normalized Power",
            };
            (spectrum.power.clone(), smoothed, Some(fap.power.clone()), label.to_string())
        };

        Ok(Self {
            title: format!("Periodogram of {}", target),
            y_label,
            frequency: spectrum.frequency.clone(),
            power,
            smoothed,
            fap: fap_curve,
            scale: display.scale,
            x_limits,
            signal_to_noise: display.signal_to_noise,
        })
    }
}

/// Light-curve panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LightCurveView {
    pub title: String,
    pub time: Vec<f64>,
    pub flux: Vec<f64>,
    pub flux_err: Vec<f64>,
}

impl From<&LightCurve> for LightCurveView {
    fn from(lc: &LightCurve) -> Self {
        Self {
            title: format!("Lightcurve of {}", lc.target),
            time: lc.times(),
            flux: lc.fluxes(),
            flux_err: lc.flux_errors(),
        }
    }
}

/// Pixel-file panel: median image with the aperture overlaid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PixelFileView {
    pub title: String,
    pub image: Vec<Vec<f64>>,
    pub aperture: Option<Vec<Vec<bool>>>,
}

impl PixelFileView {
    pub fn build(pixels: &PixelFile, aperture: Option<&ApertureMask>) -> Self {
        Self {
            title: format!("Target Pixel File of {}, Quarter {}", pixels.target, pixels.quarter),
            image: pixels
                .median_image()
                .outer_iter()
                .map(|row| row.to_vec())
                .collect(),
            aperture: aperture.map(ApertureMask::to_rows),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Cadence;

    fn spectrum() -> PowerSpectrum {
        PowerSpectrum::new(vec![1.0, 2.0, 3.0], vec![2.0, 8.0, 2.0], Normalization::Psd).unwrap()
    }

    fn fap() -> FapCurve {
        FapCurve {
            frequency: vec![1.0, 2.0, 3.0],
            power: vec![2.0, 2.0, 1.0],
            realizations: 10,
        }
    }

    #[test]
    fn test_raw_view_includes_fap() {
        let display = DisplayOptions {
            smoothing: 0.5,
            ..Default::default()
        };
        let view = PeriodogramView::build("Kepler-8", &spectrum(), &fap(), &display, Some((1.0, 150.0))).unwrap();
        assert_eq!(view.title, "Periodogram of Kepler-8");
        assert_eq!(view.y_label, "Power Spectral Density");
        assert_eq!(view.power, vec![2.0, 8.0, 2.0]);
        assert_eq!(view.smoothed, view.power);
        assert_eq!(view.fap, Some(vec![2.0, 2.0, 1.0]));
        assert_eq!(view.x_limits, (1.0, 150.0));
        assert_eq!(view.scale, Scale::Log);
    }

    #[test]
    fn test_signal_to_noise_view_is_pointwise() {
        let display = DisplayOptions {
            smoothing: 3.0,
            scale: Scale::Linear,
            signal_to_noise: true,
        };
        let view = PeriodogramView::build("Kepler-8", &spectrum(), &fap(), &display, None).unwrap();
        assert_eq!(view.power, vec![1.0, 4.0, 2.0]);
        // smoothed power is [5, 4, 5]
        assert_eq!(view.smoothed, vec![2.5, 2.0, 5.0]);
        assert_eq!(view.fap, None);
        assert_eq!(view.y_label, "Signal to Noise Ratio");
        assert_eq!(view.x_limits, (1.0, 3.0));
    }

    #[test]
    fn test_bad_smoothing_rejected() {
        let display = DisplayOptions {
            smoothing: -1.0,
            ..Default::default()
        };
        let err = PeriodogramView::build("Kepler-8", &spectrum(), &fap(), &display, None).unwrap_err();
        assert!(matches!(err, ExplorerError::InvalidInput { .. }));
        assert_eq!(err.context().target.as_deref(), Some("Kepler-8"));
    }

    #[test]
    fn test_scale_parsing() {
        assert_eq!("SymLog".parse::<Scale>().unwrap(), Scale::Symlog);
        assert!("functionlog".parse::<Scale>().is_err());
        assert_eq!(Scale::default().to_string(), "log");
    }

    #[test]
    fn test_light_curve_view_title() {
        let lc = LightCurve::from_columns("KIC 1", &[0.0], &[1.0], &[0.1]).unwrap();
        let view = LightCurveView::from(&lc);
        assert_eq!(view.title, "Lightcurve of KIC 1");
        assert_eq!(view.flux, vec![1.0]);
    }

    #[test]
    fn test_pixel_file_view_title_and_overlay() {
        let frame = vec![vec![vec![1.0, 2.0]]];
        let err = vec![vec![vec![0.1, 0.1]]];
        let mask = ApertureMask::from_rows(&[vec![true, false]]).unwrap();
        let pixels =
            PixelFile::from_frames("Kepler-8", 5, Cadence::Long, vec![0.0], &frame, &err, mask.clone()).unwrap();
        let view = PixelFileView::build(&pixels, Some(&mask));
        assert_eq!(view.title, "Target Pixel File of Kepler-8, Quarter 5");
        assert_eq!(view.image, vec![vec![1.0, 2.0]]);
        assert_eq!(view.aperture, Some(vec![vec![true, false]]));
        assert!(PixelFileView::build(&pixels, None).aperture.is_none());
    }
}
