//! Command-line parsing.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! fitting code. Positional arguments:
//!
//! ```text
//! curvefit <INPUT_CSV> <MODEL> [SHOW_PLOT] [OUTPUT_CSV]
//! ```

use std::path::PathBuf;

use clap::Parser;
use clap::error::ErrorKind;

use crate::domain::{DEFAULT_PATIENCE, DEFAULT_R2_THRESHOLD};
use crate::error::AppError;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "curvefit",
    version,
    about = "Fit a linear, square, quadratic or sinusoidal curve to x,y samples"
)]
pub struct Cli {
    /// Comma-separated input file: a header line, then `x,y` rows.
    #[arg(value_name = "INPUT_CSV")]
    pub input: PathBuf,

    /// Curve model: linear, square, quadratic (or parabolic), sin.
    #[arg(value_name = "MODEL")]
    pub model: String,

    /// `1` opens the interactive plot view after the image is saved; any
    /// other value (including `-1`) leaves it closed.
    #[arg(value_name = "SHOW_PLOT", default_value = "0", allow_hyphen_values = true)]
    pub show_plot: String,

    /// Destination for the fitted parameters (default: `<input>_params.csv`).
    #[arg(value_name = "OUTPUT_CSV")]
    pub output: Option<PathBuf>,

    /// Minimum acceptable R².
    #[arg(long, env = "CURVEFIT_R2_THRESHOLD", default_value_t = DEFAULT_R2_THRESHOLD)]
    pub threshold: f64,

    /// Solver patience (max evaluations = patience × (parameters + 1)).
    #[arg(long, default_value_t = DEFAULT_PATIENCE)]
    pub patience: usize,

    /// Also export the fit (params, covariance, R², fitted grid) as JSON.
    #[arg(long = "curve-json", value_name = "JSON")]
    pub curve_json: Option<PathBuf>,
}

/// Result of parsing argv.
#[derive(Debug)]
pub enum Parsed {
    Run(Cli),
    /// `--help` / `--version`: text to print, then exit successfully.
    Info(String),
}

/// Parse `argv`, mapping clap failures onto the exit-code taxonomy.
pub fn parse_args<I, T>(argv: I) -> Result<Parsed, AppError>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    match Cli::try_parse_from(argv) {
        Ok(cli) => Ok(Parsed::Run(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => Ok(Parsed::Info(err.to_string())),
            ErrorKind::MissingRequiredArgument
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                Err(AppError::MissingParameter(first_line(&err.to_string())))
            }
            _ => Err(AppError::InvalidArgs(first_line(&err.to_string()))),
        },
    }
}

fn first_line(s: &str) -> String {
    s.lines().next().unwrap_or_default().trim_start_matches("error: ").to_string()
}
