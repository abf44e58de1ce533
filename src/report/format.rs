//! Formatted terminal output for a finished run.
//!
//! Formatting lives here so the fitting and evaluation code stays free of
//! presentation concerns.

use nalgebra::DMatrix;

use crate::domain::{FitResult, GoodnessOfFit, RunConfig};
use crate::io::ingest::IngestedData;

/// Format the full run summary (dataset stats + fitted parameters + R²).
pub fn format_run_summary(
    ingest: &IngestedData,
    fit: &FitResult,
    goodness: &GoodnessOfFit,
    equation: &str,
    config: &RunConfig,
) -> String {
    let mut out = String::new();

    out.push_str("=== curvefit ===\n");
    out.push_str(&format!("Input: {}\n", config.input_path.display()));
    out.push_str(&format!("Header: {}\n", ingest.header.join(", ")));
    out.push_str(&format!(
        "Rows: read={} | used={} | skipped={}\n",
        ingest.rows_read,
        ingest.samples.len(),
        ingest.skipped_lines.len()
    ));

    out.push_str(&format!(
        "\nModel: {} ({})\n",
        fit.model.display_name(),
        fit.model.key()
    ));
    out.push_str(&format!("Equation: {equation}\n"));
    out.push_str(&format!("params: {}\n", fmt_vec(&fit.params)));
    out.push_str(&format!("std errors: {}\n", fmt_vec(&fit.standard_errors())));
    out.push_str("covariance:\n");
    out.push_str(&fmt_matrix(&fit.covariance));
    out.push_str(&format!(
        "Solver: {} evaluations ({})\n",
        fit.evaluations, fit.termination
    ));

    out.push_str(&format!(
        "\nRSS={:.6e} TSS={:.6e} R²={:.6} (threshold {})\n",
        goodness.rss, goodness.tss, goodness.r_squared, config.r2_threshold
    ));

    out
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{x:.6e}")).collect();
    format!("[{}]", parts.join(", "))
}

fn fmt_matrix(m: &DMatrix<f64>) -> String {
    let mut out = String::new();
    for row in m.row_iter() {
        let values: Vec<f64> = row.iter().copied().collect();
        out.push_str("  ");
        out.push_str(&fmt_vec(&values));
        out.push('\n');
    }
    out
}
