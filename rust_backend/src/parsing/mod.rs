//! Parsers for light-curve and archive-manifest JSON files.
//!
//! # Parsers
//!
//! - [`json_parser`]: Parse a single light curve (`time`/`flux`/`flux_err` columns)
//! - [`manifest`]: Parse a list of datasets with their pixel cubes for
//!   [`LocalArchive`](crate::archive::LocalArchive)
//!
//! JSON has no NaN, so `null` entries in numeric arrays are read as NaN.
//!
//! # Example
//!
//! ```no_run
//! use keeplerite::parsing::json_parser::parse_light_curve_json;
//! use std::path::Path;
//!
//! let lc = parse_light_curve_json(Path::new("kepler8.json"))
//!     .expect("Failed to parse light curve");
//! ```

pub mod json_parser;
pub mod manifest;

#[cfg(test)]
mod json_parser_tests;

pub use json_parser::{parse_light_curve_json, parse_light_curve_json_str};
pub use manifest::{parse_archive_manifest, parse_archive_manifest_str};

use serde::{Deserialize, Serialize};

use crate::models::JulianDate;

/// Time system of the timestamps in a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFormat {
    /// Julian date
    #[default]
    Jd,
    /// Barycentric Kepler Julian date (JD − 2454833)
    Bkjd,
}

impl TimeFormat {
    pub(crate) fn to_jd(self, times: Vec<f64>) -> Vec<f64> {
        match self {
            Self::Jd => times,
            Self::Bkjd => times
                .into_iter()
                .map(|t| JulianDate::from_bkjd(t).value())
                .collect(),
        }
    }
}

pub(crate) fn nulls_to_nan(values: Vec<Option<f64>>) -> Vec<f64> {
    values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect()
}
