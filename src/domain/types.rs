//! Shared domain types.
//!
//! These types are kept lightweight so they can be:
//!
//! - used in-memory during fitting and evaluation
//! - exported to CSV/JSON
//! - handed by reference to the renderers

use std::path::PathBuf;

use chrono::{DateTime, Local};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::CurveModel;

/// Default R² acceptance threshold.
pub const DEFAULT_R2_THRESHOLD: f64 = 0.95;

/// Default solver patience (max evaluations = patience · (arity + 1)).
pub const DEFAULT_PATIENCE: usize = 100;

/// Number of points in the densely sampled fitted curve.
pub const CURVE_GRID_POINTS: usize = 100;

/// Ordered (x, y) samples, in file order.
///
/// Invariant: `x.len() == y.len() >= 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSet {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl SampleSet {
    /// Build a sample set from parallel vectors.
    ///
    /// Returns `None` when the vectors are empty or have different lengths.
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Option<Self> {
        if x.is_empty() || x.len() != y.len() {
            return None;
        }
        Some(Self { x, y })
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Never true for a set built with [`SampleSet::new`].
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }

    /// Largest x value (NaN-free samples assumed).
    pub fn x_max(&self) -> f64 {
        self.x.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }
}

/// Output of the fit orchestrator for one model.
#[derive(Debug, Clone)]
pub struct FitResult {
    pub model: CurveModel,
    /// Fitted parameters (`model.arity()` values).
    pub params: Vec<f64>,
    /// Parameter covariance (`arity × arity`). `+∞` entries mean it could not
    /// be estimated (as many samples as parameters).
    pub covariance: DMatrix<f64>,
    /// Residual sum of squares at the optimum.
    pub rss: f64,
    /// Number of residual evaluations used by the solver.
    pub evaluations: usize,
    /// Human-readable solver termination reason.
    pub termination: String,
}

impl FitResult {
    /// Evaluate the fitted curve at `x`.
    pub fn predict(&self, x: f64) -> f64 {
        self.model.predict(x, &self.params)
    }

    /// One-sigma parameter uncertainties (square roots of the covariance diagonal).
    pub fn standard_errors(&self) -> Vec<f64> {
        self.covariance.diagonal().iter().map(|v| v.sqrt()).collect()
    }

    pub fn equation(&self) -> Result<String, AppError> {
        self.model.format_equation(&self.params)
    }
}

/// Goodness-of-fit summary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoodnessOfFit {
    pub rss: f64,
    pub tss: f64,
    pub r_squared: f64,
}

/// A full run's configuration as understood by the pipeline.
///
/// Derived from CLI arguments (plus environment and defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input_path: PathBuf,
    pub model: CurveModel,
    /// Open the interactive terminal view after rendering.
    pub show_plot: bool,
    pub output_path: PathBuf,
    /// Optional curve JSON export.
    pub curve_json: Option<PathBuf>,
    pub r2_threshold: f64,
    pub patience: usize,
}

/// A saved curve file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveFile {
    pub tool: String,
    pub generated_at: DateTime<Local>,
    pub model: CurveModel,
    pub equation: String,
    pub params: Vec<f64>,
    pub standard_errors: Vec<Option<f64>>,
    /// Row-major covariance; non-finite entries are stored as `null`.
    pub covariance: Vec<Vec<Option<f64>>>,
    pub goodness: GoodnessOfFit,
    pub n_samples: usize,
    pub grid: CurveGrid,
}

/// Densely sampled fitted curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveGrid {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_set_rejects_empty_and_ragged_input() {
        assert!(SampleSet::new(vec![], vec![]).is_none());
        assert!(SampleSet::new(vec![1.0, 2.0], vec![1.0]).is_none());

        let s = SampleSet::new(vec![1.0, 4.0, 2.0], vec![3.0, 5.0, 7.0]).unwrap();
        assert_eq!(s.len(), 3);
        assert!(!s.is_empty());
        assert_eq!(s.x_max(), 4.0);
        assert_eq!(s.iter().nth(1), Some((4.0, 5.0)));
    }

    #[test]
    fn standard_errors_are_sqrt_of_covariance_diagonal() {
        let fit = FitResult {
            model: CurveModel::Linear,
            params: vec![2.0, 0.0],
            covariance: DMatrix::from_row_slice(2, 2, &[4.0, 0.5, 0.5, 9.0]),
            rss: 0.0,
            evaluations: 3,
            termination: "converged".to_string(),
        };
        assert_eq!(fit.standard_errors(), vec![2.0, 3.0]);
        assert_eq!(fit.predict(1.5), 3.0);
    }
}
