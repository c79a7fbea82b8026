//! Conversions between internal products and API DTOs.
//!
//! ## Conversion Strategy
//!
//! - `From<&InternalType> for ApiType`: infallible conversion to DTOs
//! - Enums become their lowercase names
//! - `ExplorerError` becomes the closest Python exception class

use pyo3::exceptions::{PyLookupError, PyRuntimeError, PyValueError};
use pyo3::PyErr;

use crate::api::types as api;
use crate::error::ExplorerError;
use crate::models::DatasetDescriptor;
use crate::services::{LightCurveProduct, PeriodogramView, PixelFileView};
use crate::transformations::ValidityReport;

impl From<&DatasetDescriptor> for api::Dataset {
    fn from(descriptor: &DatasetDescriptor) -> Self {
        api::Dataset {
            target: descriptor.target.clone(),
            description: descriptor.description.clone(),
            cadence: descriptor.cadence.to_string(),
            quarter: descriptor.quarter,
        }
    }
}

impl From<&LightCurveProduct> for api::LightCurveData {
    fn from(product: &LightCurveProduct) -> Self {
        api::LightCurveData {
            title: format!("Lightcurve of {}", product.curve.target),
            time: product.curve.times(),
            flux: product.curve.fluxes(),
            flux_err: product.curve.flux_errors(),
            quarters: product.quarters.clone(),
        }
    }
}

impl From<PixelFileView> for api::PixelImage {
    fn from(view: PixelFileView) -> Self {
        api::PixelImage {
            title: view.title,
            image: view.image,
            aperture: view.aperture,
        }
    }
}

/// Flatten a periodogram view and the validity counts of its light curve.
pub fn periodogram_data(view: PeriodogramView, validity: ValidityReport) -> api::PeriodogramData {
    api::PeriodogramData {
        title: view.title,
        y_label: view.y_label,
        frequency: view.frequency,
        power: view.power,
        smoothed: view.smoothed,
        fap: view.fap,
        scale: view.scale.to_string(),
        x_min: view.x_limits.0,
        x_max: view.x_limits.1,
        signal_to_noise: view.signal_to_noise,
        retained: validity.retained,
        excluded: validity.excluded,
    }
}

impl From<ExplorerError> for PyErr {
    fn from(err: ExplorerError) -> Self {
        let message = err.to_string();
        match err {
            ExplorerError::InvalidInput { .. } | ExplorerError::Configuration { .. } => {
                PyValueError::new_err(message)
            }
            ExplorerError::NoData { .. }
            | ExplorerError::AmbiguousData { .. }
            | ExplorerError::SelectionRequired { .. }
            | ExplorerError::MissingProduct { .. } => PyLookupError::new_err(message),
            ExplorerError::Retrieval { .. }
            | ExplorerError::Photometry { .. }
            | ExplorerError::Transform { .. } => PyRuntimeError::new_err(message),
        }
    }
}
