use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ExplorerError, ExplorerResult};

/// Power normalization of a periodogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Normalization {
    /// Power spectral density, flux² per unit frequency
    #[default]
    Psd,
    /// Dimensionless power normalized by the flux variance
    Standard,
}

impl fmt::Display for Normalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Psd => f.write_str("psd"),
            Self::Standard => f.write_str("standard"),
        }
    }
}

impl FromStr for Normalization {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "psd" => Ok(Self::Psd),
            "standard" => Ok(Self::Standard),
            _ => Err(format!("Unknown normalization: {}", s)),
        }
    }
}

/// Ordered `(frequency, power)` pairs. Frequencies are in cycles per day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerSpectrum {
    pub frequency: Vec<f64>,
    pub power: Vec<f64>,
    pub normalization: Normalization,
}

impl PowerSpectrum {
    pub fn new(
        frequency: Vec<f64>,
        power: Vec<f64>,
        normalization: Normalization,
    ) -> ExplorerResult<Self> {
        if frequency.len() != power.len() {
            return Err(ExplorerError::invalid_input(format!(
                "{} frequencies for {} power values",
                frequency.len(),
                power.len()
            )));
        }
        Ok(Self {
            frequency,
            power,
            normalization,
        })
    }

    /// Number of frequency bins.
    pub fn len(&self) -> usize {
        self.frequency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequency.is_empty()
    }

    /// Mean spacing between adjacent bins, `None` with fewer than two bins.
    pub fn frequency_spacing(&self) -> Option<f64> {
        if self.frequency.len() < 2 {
            return None;
        }
        let span = self.frequency[self.frequency.len() - 1] - self.frequency[0];
        Some(span / (self.frequency.len() - 1) as f64)
    }

    /// `(frequency, power)` of the strongest finite bin.
    pub fn peak(&self) -> Option<(f64, f64)> {
        self.frequency
            .iter()
            .zip(&self.power)
            .filter(|(_, p)| p.is_finite())
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(&f, &p)| (f, p))
    }

    /// Point-wise ratio of this spectrum to a FAP noise floor.
    pub fn signal_to_noise(&self, fap: &FapCurve) -> ExplorerResult<Vec<f64>> {
        signal_to_noise(&self.power, fap)
    }
}

/// Per-bin median power across synthetic constant-flux realizations.
///
/// Index-aligned with the real periodogram computed from the same timestamps
/// and frequency bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FapCurve {
    pub frequency: Vec<f64>,
    pub power: Vec<f64>,
    /// Number of synthetic realizations the median was taken over
    pub realizations: usize,
}

impl FapCurve {
    pub fn len(&self) -> usize {
        self.power.len()
    }

    pub fn is_empty(&self) -> bool {
        self.power.is_empty()
    }

    /// Median of the curve itself, a single scalar noise level.
    pub fn median_level(&self) -> Option<f64> {
        crate::algorithms::median(&self.power)
    }
}

/// Divide `values` by the FAP curve bin by bin.
///
/// A zero noise bin gives 0 when the value is also 0 and `+inf` otherwise.
pub fn signal_to_noise(values: &[f64], fap: &FapCurve) -> ExplorerResult<Vec<f64>> {
    if values.len() != fap.len() {
        return Err(ExplorerError::invalid_input(format!(
            "spectrum has {} bins but FAP curve has {}",
            values.len(),
            fap.len()
        )));
    }
    Ok(values
        .iter()
        .zip(&fap.power)
        .map(|(&value, &noise)| {
            if noise == 0.0 {
                if value == 0.0 {
                    0.0
                } else {
                    f64::INFINITY
                }
            } else {
                value / noise
            }
        })
        .collect())
}
