//! Read/write curve JSON files.
//!
//! Curve JSON is the portable representation of a fit:
//! - model key, equation, parameters, standard errors and covariance
//! - goodness of fit and sample count
//! - a precomputed fitted grid for quick plotting
//!
//! The schema is defined by `domain::CurveFile`.

use std::fs::File;
use std::path::Path;

use chrono::Local;
use tracing::info;

use crate::domain::{CurveFile, CurveGrid, FitResult, GoodnessOfFit};
use crate::error::AppError;

/// Build the curve document for a finished fit.
pub fn curve_file(
    fit: &FitResult,
    goodness: &GoodnessOfFit,
    equation: &str,
    n_samples: usize,
    grid: CurveGrid,
) -> CurveFile {
    let covariance = fit
        .covariance
        .row_iter()
        .map(|row| row.iter().copied().map(finite).collect())
        .collect();

    CurveFile {
        tool: "curvefit".to_string(),
        generated_at: Local::now(),
        model: fit.model,
        equation: equation.to_string(),
        params: fit.params.clone(),
        standard_errors: fit.standard_errors().into_iter().map(finite).collect(),
        covariance,
        goodness: *goodness,
        n_samples,
        grid,
    }
}

/// Write a curve JSON file.
pub fn write_curve_json(path: &Path, curve: &CurveFile) -> Result<(), AppError> {
    let file = File::create(path).map_err(AppError::write(path))?;
    serde_json::to_writer_pretty(file, curve).map_err(|e| AppError::WriteError {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    info!(path = %path.display(), "curve JSON exported");
    Ok(())
}

/// Read a curve JSON file.
pub fn read_curve_json(path: &Path) -> Result<CurveFile, AppError> {
    let file = File::open(path).map_err(|source| AppError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(file).map_err(|e| AppError::ReadError {
        path: path.to_path_buf(),
        source: e.into(),
    })
}

// JSON has no representation for inf/NaN.
fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}
