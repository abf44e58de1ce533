//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the sample set read from the input file (`SampleSet`)
//! - fit outputs (`FitResult`, `GoodnessOfFit`)
//! - the run configuration (`RunConfig`) and the curve JSON schema (`CurveFile`)

pub mod types;

pub use types::*;
