//! Curve model registry.
//!
//! Models are small, pure functions over `(x, params)` so that the fitter,
//! evaluator, exporter and renderers stay model-agnostic.

pub mod model;

pub use model::*;
