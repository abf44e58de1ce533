//! `curvefit` library crate.
//!
//! The binary (`curvefit`) is a thin wrapper around this library so that:
//!
//! - the pipeline is testable without spawning processes
//! - exit-code mapping lives in one place (`error`)
//! - renderers and exporters stay reusable from other front-ends

pub mod logging;

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
pub mod tui;
