//! Curve fitting orchestration.
//!
//! Responsibilities:
//!
//! - validate samples against the model arity
//! - run the Levenberg–Marquardt solver from the default starting point
//! - derive the parameter covariance at the optimum

pub mod fitter;

pub use fitter::*;
