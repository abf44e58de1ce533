//! Mathematical utilities: covariance estimation and evenly spaced grids.

pub mod covariance;
pub mod grid;

pub use covariance::*;
pub use grid::*;
