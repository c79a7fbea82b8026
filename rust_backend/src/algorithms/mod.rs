//! Numerical helpers shared across the pipeline.
//!
//! # Components
//!
//! - [`statistics`]: NaN-aware medians, median absolute deviation and cadence
//!
//! # Example
//!
//! ```
//! use keeplerite::algorithms::median;
//!
//! assert_eq!(median(&[3.0, 1.0, f64::NAN, 2.0]), Some(2.0));
//! ```

pub mod statistics;

pub use statistics::{median, median_absolute_deviation, median_cadence, MAD_TO_SIGMA};
