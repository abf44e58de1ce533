//! The fit pipeline shared by the CLI entry point and the tests.
//!
//! load -> fit -> evaluate -> export -> render
//!
//! The acceptance threshold is checked by the caller, after the artifacts
//! exist, so a poor fit still leaves its parameters and image behind.

use std::path::PathBuf;

use tracing::info;

use crate::domain::{FitResult, GoodnessOfFit, RunConfig};
use crate::error::AppError;
use crate::fit::FitOptions;
use crate::io::ingest::IngestedData;
use crate::plot::FitPlot;

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestedData,
    pub fit: FitResult,
    pub goodness: GoodnessOfFit,
    pub equation: String,
    pub plot: FitPlot,
    pub plot_path: PathBuf,
}

/// Execute the pipeline for `config` and return the computed outputs.
pub fn run_pipeline(config: &RunConfig) -> Result<RunOutput, AppError> {
    let ingest = crate::io::load_samples(&config.input_path)?;
    let samples = &ingest.samples;

    let opts = FitOptions {
        patience: config.patience,
        ..FitOptions::default()
    };
    let fit = crate::fit::fit_model(config.model, samples, &opts)?;
    let equation = fit.equation()?;
    info!(model = config.model.key(), "fitted curve: {equation}");

    let goodness = crate::report::goodness_of_fit(samples, |x| fit.predict(x))?;

    crate::io::write_params_csv(&config.output_path, &fit.params)?;

    let grid = crate::plot::fitted_grid(&fit, samples);
    let plot = FitPlot::new(samples, &grid, &equation, &goodness);
    let plot_path = crate::plot::plot_path(&config.input_path);
    crate::plot::render_fit_image(&plot_path, &plot)?;

    if let Some(path) = &config.curve_json {
        let curve = crate::io::curve_file(&fit, &goodness, &equation, samples.len(), grid);
        crate::io::write_curve_json(path, &curve)?;
    }

    Ok(RunOutput {
        ingest,
        fit,
        goodness,
        equation,
        plot,
        plot_path,
    })
}
