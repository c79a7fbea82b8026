//! Data model of the exploration pipeline.
//!
//! - [`dataset`]: archive search results and quarter parsing
//! - [`pixel_file`]: per-quarter pixel cubes and aperture specifications
//! - [`sample`] / [`light_curve`]: photometric time series
//! - [`spectrum`]: periodograms and FAP noise floors
//! - [`time`]: Julian Date handling

pub mod dataset;
pub mod light_curve;
pub mod pixel_file;
pub mod sample;
pub mod spectrum;
pub mod time;

pub use dataset::*;
pub use light_curve::*;
pub use pixel_file::*;
pub use sample::*;
pub use spectrum::*;
pub use time::*;
