//! Export fitted parameters to CSV.
//!
//! Layout: one header row `param0,param1,...` and one row of values. Values
//! are written in Rust's shortest round-trip representation, so reading the
//! file back reproduces the parameters exactly.

use std::fs::File;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::AppError;

/// `{dir}/{stem}_params.csv` next to the input file.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "curvefit".to_string());
    input.with_file_name(format!("{stem}_params.csv"))
}

/// Write the parameter vector, replacing any existing file at `path`.
pub fn write_params_csv(path: &Path, params: &[f64]) -> Result<(), AppError> {
    let file = File::create(path).map_err(AppError::write(path))?;
    let mut writer = csv::Writer::from_writer(file);

    let header: Vec<String> = (0..params.len()).map(|i| format!("param{i}")).collect();
    let values: Vec<String> = params.iter().map(|v| format!("{v:?}")).collect();

    writer
        .write_record(&header)
        .and_then(|_| writer.write_record(&values))
        .map_err(|e| csv_write_error(path, e))?;
    writer.flush().map_err(AppError::write(path))?;

    info!(path = %path.display(), n_params = params.len(), "parameters exported");
    Ok(())
}

/// Read a parameter vector written by [`write_params_csv`].
pub fn read_params_csv(path: &Path) -> Result<Vec<f64>, AppError> {
    let file = File::open(path).map_err(|source| AppError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let record = match reader.records().next() {
        Some(Ok(record)) => record,
        Some(Err(e)) => {
            return Err(AppError::MalformedRow {
                line: 2,
                message: format!("CSV parse error: {e}"),
            });
        }
        None => return Err(AppError::EmptyDataset(path.to_path_buf())),
    };

    record
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            raw.parse::<f64>().map_err(|e| AppError::MalformedRow {
                line: 2,
                message: format!("param{i} value '{raw}' is not a number ({e})"),
            })
        })
        .collect()
}

fn csv_write_error(path: &Path, err: csv::Error) -> AppError {
    let source = match err.into_kind() {
        csv::ErrorKind::Io(io) => io,
        other => std::io::Error::other(format!("{other:?}")),
    };
    AppError::WriteError {
        path: path.to_path_buf(),
        source,
    }
}
