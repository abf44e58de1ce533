//! Diagnostic plot data and the JPEG renderer.
//!
//! The fitted curve is sampled on 100 evenly spaced points from 0 to max(x);
//! both the saved image and the interactive terminal view consume the same
//! [`FitPlot`] description.

use std::path::{Path, PathBuf};

use crate::domain::{CURVE_GRID_POINTS, CurveGrid, FitResult, GoodnessOfFit, SampleSet};
use crate::math::{linspace, padded_bounds};

pub mod bitmap;

pub use bitmap::*;

/// Everything a renderer needs: observations, fitted curve, caption data.
#[derive(Debug, Clone)]
pub struct FitPlot {
    pub points: Vec<(f64, f64)>,
    pub curve: Vec<(f64, f64)>,
    pub equation: String,
    pub r_squared: f64,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

impl FitPlot {
    pub fn new(samples: &SampleSet, grid: &CurveGrid, equation: &str, goodness: &GoodnessOfFit) -> Self {
        let points: Vec<(f64, f64)> = samples.iter().collect();
        let curve: Vec<(f64, f64)> = grid.x.iter().copied().zip(grid.y.iter().copied()).collect();

        let x_bounds = padded_bounds(points.iter().chain(curve.iter()).map(|p| p.0), 0.05);
        let y_bounds = padded_bounds(points.iter().chain(curve.iter()).map(|p| p.1), 0.08);

        Self {
            points,
            curve,
            equation: equation.to_string(),
            r_squared: goodness.r_squared,
            x_bounds,
            y_bounds,
        }
    }

    pub fn caption(&self) -> String {
        format!("{}  (R² = {:.4})", self.equation, self.r_squared)
    }
}

/// Sample the fitted curve on `CURVE_GRID_POINTS` points over `[0, max(x)]`.
pub fn fitted_grid(fit: &FitResult, samples: &SampleSet) -> CurveGrid {
    let x = linspace(0.0, samples.x_max(), CURVE_GRID_POINTS);
    let y = x.iter().map(|&xi| fit.predict(xi)).collect();
    CurveGrid { x, y }
}

/// `{dir}/{stem}_fit.jpg` next to the input file.
pub fn plot_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "curvefit".to_string());
    input.with_file_name(format!("{stem}_fit.jpg"))
}
