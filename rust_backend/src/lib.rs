//! Keeplerite: exploration backend for Kepler photometry.
//!
//! Given a target name the pipeline searches an archive for per-quarter
//! pixel files, extracts a light curve through an aperture, computes a
//! Lomb-Scargle periodogram and estimates a false-alarm-probability (FAP)
//! noise floor by Monte Carlo resampling of the flux uncertainties.
//!
//! The stateful flow lives in [`services::TargetSession`]; the stateless
//! building blocks are usable on their own:
//!
//! - [`archive`]: dataset search and download
//! - [`photometry`]: aperture resolution and light-curve extraction
//! - [`transformations`]: validity filtering, normalization, stitching
//! - [`periodogram`]: spectral transforms and smoothing
//! - [`fap`]: synthetic realizations and the median noise curve
//!
//! Python bindings are compiled with the `python` feature.

#[cfg(feature = "python")]
use pyo3::prelude::*;

pub mod algorithms;
pub mod archive;
pub mod config;
pub mod error;
pub mod fap;
pub mod models;
pub mod parsing;
pub mod periodogram;
pub mod photometry;
pub mod services;
pub mod transformations;

#[cfg(feature = "python")]
pub mod api;

pub use error::{ErrorContext, ExplorerError, ExplorerResult};

/// Keeplerite Python module, consumed by the Streamlit frontend.
#[cfg(feature = "python")]
#[pymodule]
fn keeplerite(m: &Bound<'_, PyModule>) -> PyResult<()> {
    api::register_api_functions(m)
}
