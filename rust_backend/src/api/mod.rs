//! # API Module
//!
//! This module is the only entry point for Python (Streamlit) integration.
//! It keeps the PyO3 bindings apart from the pipeline so the following can
//! change freely:
//!
//! - Internal models (`ndarray` cubes, `qtty` durations)
//! - Session orchestration and caching
//! - Collaborator implementations (archive, photometry, transform)
//!
//! ## Architecture
//!
//! - [`types`]: Python-facing DTOs with `#[pyclass]` derives (primitives only)
//! - [`conversions`]: Conversions from internal products and errors to DTOs
//! - [`streamlit`]: The `KeplerSession` class and `#[pyfunction]` exports
//!
//! ## Design Principles
//!
//! 1. **Isolation**: PyO3 dependencies only in this module
//! 2. **Conversion**: Arrays and quantities become `Vec<f64>`/`f64` at the boundary
//! 3. **Simplicity**: DTOs mirror what the frontend draws, not internal structure

pub mod conversions;
pub mod streamlit;
pub mod types;

pub use streamlit::register_api_functions;
pub use types::*;
