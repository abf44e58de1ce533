//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments into a validated `RunConfig`
//! - opens the per-run log
//! - runs the fit pipeline and prints the summary
//! - shows the interactive plot when asked
//! - applies the R² acceptance threshold

use std::ffi::OsString;

use tracing::{error, info, warn};

use crate::cli::{Cli, Parsed};
use crate::domain::RunConfig;
use crate::error::{AppError, ExitStatus};
use crate::logging::RunLog;
use crate::models::CurveModel;
use crate::tui::FitView;

pub mod pipeline;

/// Entry point for the `curvefit` binary.
pub fn run() -> Result<(), AppError> {
    // Optional; a missing .env is not an error.
    dotenvy::dotenv().ok();
    run_with_args(std::env::args_os())
}

/// Run with an explicit argv (first element is the program name).
pub fn run_with_args<I, T>(argv: I) -> Result<(), AppError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match crate::cli::parse_args(argv)? {
        Parsed::Run(cli) => cli,
        Parsed::Info(text) => {
            print!("{text}");
            return Ok(());
        }
    };

    // Everything up to here touches no files.
    let config = run_config_from_args(cli)?;
    if !config.input_path.is_file() {
        return Err(AppError::UnfoundFile(config.input_path));
    }

    let log = RunLog::open(&config.input_path)?;
    log.in_scope(|| execute(&config))
}

/// Validate parsed arguments and resolve defaults.
pub fn run_config_from_args(cli: Cli) -> Result<RunConfig, AppError> {
    let model: CurveModel = cli.model.parse()?;

    if !(cli.threshold.is_finite() && (0.0..=1.0).contains(&cli.threshold)) {
        return Err(AppError::InvalidArgs(format!(
            "threshold must be within [0, 1], got {}",
            cli.threshold
        )));
    }
    if cli.patience == 0 {
        return Err(AppError::InvalidArgs("patience must be at least 1".to_string()));
    }

    let output_path = cli
        .output
        .unwrap_or_else(|| crate::io::default_output_path(&cli.input));

    Ok(RunConfig {
        show_plot: cli.show_plot.trim() == "1",
        input_path: cli.input,
        model,
        output_path,
        curve_json: cli.curve_json,
        r2_threshold: cli.threshold,
        patience: cli.patience,
    })
}

/// Run inside the log scope, logging the outcome before it propagates.
fn execute(config: &RunConfig) -> Result<(), AppError> {
    info!(
        input = %config.input_path.display(),
        model = config.model.key(),
        output = %config.output_path.display(),
        "run started"
    );

    let result = fit_and_report(config, crate::tui::show);
    match &result {
        Ok(()) => info!("run finished"),
        Err(err @ AppError::PoorFit { .. }) => error!("{err}"),
        Err(err) if err.exit_status() == ExitStatus::Unexpected => crate::critical!("{err}"),
        Err(err) => error!("{err}"),
    }
    result
}

/// `display` is the interactive view. Its failure (no terminal, for one) is
/// logged and does not replace the run outcome.
fn fit_and_report<D>(config: &RunConfig, display: D) -> Result<(), AppError>
where
    D: FnOnce(&FitView<'_>) -> Result<(), AppError>,
{
    let run = pipeline::run_pipeline(config)?;

    println!(
        "{}",
        crate::report::format_run_summary(&run.ingest, &run.fit, &run.goodness, &run.equation, config)
    );
    println!("Plot: {}", run.plot_path.display());

    if config.show_plot {
        let title = format!(
            "{} ({})",
            config.input_path.display(),
            config.model.display_name()
        );
        if let Err(err) = display(&FitView {
            title,
            plot: &run.plot,
        }) {
            warn!("interactive plot unavailable: {err}");
        }
    }

    crate::report::check_threshold(&run.goodness, config.r2_threshold)
}
