//! Light-curve cleaning, filtering and stitching.
//!
//! # Modules
//!
//! - [`cleaning`]: Drop samples with unusable uncertainties, normalize flux
//! - [`filtering`]: Remove flux outliers around the median
//! - [`stitching`]: Join per-quarter light curves into one series
//!
//! # Example
//!
//! ```
//! use keeplerite::models::LightCurve;
//! use keeplerite::transformations::{filter_outliers, normalize, partition_valid};
//!
//! # fn example() -> keeplerite::ExplorerResult<()> {
//! let lc = LightCurve::from_columns(
//!     "Kepler-8",
//!     &[0.0, 0.1, 0.2, 0.3],
//!     &[100.0, 101.0, 160.0, 99.0],
//!     &[1.0, 1.0, 1.0, 0.0],
//! )?;
//! let (valid, report) = partition_valid(&lc);
//! assert_eq!(report.excluded, 1);
//!
//! let normalized = normalize(&valid)?;
//! let filtered = filter_outliers(&normalized, 20.0)?;
//! assert_eq!(filtered.len(), 2);
//! # Ok(())
//! # }
//! ```

pub mod cleaning;
pub mod filtering;
pub mod stitching;

pub use cleaning::{normalize, partition_valid, ValidityReport};
pub use filtering::filter_outliers;
pub use stitching::stitch;
