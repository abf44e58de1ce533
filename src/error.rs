//! Error taxonomy and the process exit-code contract.
//!
//! Every failure in the pipeline is an [`AppError`] variant returned with `?`.
//! Only `main` turns an error into a process exit code, via [`AppError::exit_code`].

use std::path::PathBuf;

use thiserror::Error;

/// Process exit statuses.
///
/// The numeric values are part of the external interface and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    InvalidArgs,
    MissingParameter,
    NoContents,
    UnfoundFile,
    LargeResidual,
    Unexpected,
}

impl ExitStatus {
    pub fn code(self) -> i32 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::InvalidArgs => 1,
            ExitStatus::MissingParameter => 2,
            ExitStatus::NoContents => 3,
            ExitStatus::UnfoundFile => 4,
            ExitStatus::LargeResidual => 5,
            ExitStatus::Unexpected => 999,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Missing required argument: {0}")]
    MissingParameter(String),

    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("Unknown model '{0}' (expected one of: linear, square, quadratic, parabolic, sin)")]
    UnknownModel(String),

    #[error("Model {model} expects {expected} parameters, got {actual}")]
    InvalidModel {
        model: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Input file '{}' does not exist", .0.display())]
    UnfoundFile(PathBuf),

    #[error("Failed to read '{}': {source}", path.display())]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed row at line {line}: {message}")]
    MalformedRow { line: u64, message: String },

    #[error("No valid (x, y) rows in '{}'", .0.display())]
    EmptyDataset(PathBuf),

    #[error("Fit did not converge: {0}")]
    FitDidNotConverge(String),

    #[error("R² is undefined: all observed y values are identical")]
    DegenerateData,

    #[error("Poor fit: R² = {r_squared:.6} is below the acceptance threshold {threshold}")]
    PoorFit { r_squared: f64, threshold: f64 },

    #[error("Failed to write '{}': {source}", path.display())]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to render plot: {0}")]
    Render(String),

    #[error("Terminal error: {0}")]
    Terminal(String),

    #[error("Failed to set up run log '{}': {source}", path.display())]
    Logging {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AppError {
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            AppError::MissingParameter(_) => ExitStatus::MissingParameter,
            AppError::InvalidArgs(_) | AppError::UnknownModel(_) => ExitStatus::InvalidArgs,
            AppError::EmptyDataset(_) => ExitStatus::NoContents,
            AppError::UnfoundFile(_) => ExitStatus::UnfoundFile,
            AppError::PoorFit { .. } => ExitStatus::LargeResidual,
            AppError::InvalidModel { .. }
            | AppError::ReadError { .. }
            | AppError::MalformedRow { .. }
            | AppError::FitDidNotConverge(_)
            | AppError::DegenerateData
            | AppError::WriteError { .. }
            | AppError::Render(_)
            | AppError::Terminal(_)
            | AppError::Logging { .. } => ExitStatus::Unexpected,
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.exit_status().code()
    }

    /// Build a `WriteError` for `path` (for use with `map_err`).
    pub fn write(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> AppError {
        let path = path.into();
        move |source| AppError::WriteError { path, source }
    }
}
