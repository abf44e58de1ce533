//! CSV ingest.
//!
//! Turns a `header + x,y rows` file into a [`SampleSet`]:
//!
//! - the header line is logged and otherwise ignored
//! - rows with fewer than two fields are skipped with a warning
//! - the first two fields of every other row must parse as floats; the first
//!   failure aborts the whole load (`MalformedRow`)
//! - an input without a single valid pair is rejected (`EmptyDataset`)

use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

use csv::StringRecord;
use tracing::{info, warn};

use crate::domain::SampleSet;
use crate::error::AppError;

/// Ingest output: samples plus bookkeeping for the run summary.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub samples: SampleSet,
    /// Header fields as read (not interpreted).
    pub header: Vec<String>,
    /// Data rows seen after the header.
    pub rows_read: usize,
    /// 1-based line numbers of rows skipped for having fewer than two fields.
    pub skipped_lines: Vec<u64>,
}

/// Load `(x, y)` samples from a comma-separated file.
pub fn load_samples(path: &Path) -> Result<IngestedData, AppError> {
    let file = File::open(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => AppError::UnfoundFile(path.to_path_buf()),
        _ => AppError::ReadError {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let header: Vec<String> = reader
        .headers()
        .map_err(|e| AppError::MalformedRow {
            line: 1,
            message: format!("unreadable header: {e}"),
        })?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();
    info!(?header, path = %path.display(), "reading samples");

    let mut x = Vec::new();
    let mut y = Vec::new();
    let mut rows_read = 0usize;
    let mut skipped_lines = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        rows_read += 1;
        // Fallback when the reader cannot report a position: header is line 1.
        let fallback_line = idx as u64 + 2;

        let record = result.map_err(|e| AppError::MalformedRow {
            line: e.position().map(|p| p.line()).unwrap_or(fallback_line),
            message: format!("CSV parse error: {e}"),
        })?;
        let line = record.position().map(|p| p.line()).unwrap_or(fallback_line);

        if record.len() < 2 {
            let row: Vec<&str> = record.iter().collect();
            warn!(line, ?row, "skipping row with fewer than 2 fields");
            skipped_lines.push(line);
            continue;
        }

        let (xi, yi) = parse_pair(&record, line)?;
        info!(line, x = xi, y = yi, "sample");
        x.push(xi);
        y.push(yi);
    }

    let samples = SampleSet::new(x, y).ok_or_else(|| AppError::EmptyDataset(path.to_path_buf()))?;
    info!(
        rows_read,
        rows_used = samples.len(),
        skipped = skipped_lines.len(),
        "samples loaded"
    );

    Ok(IngestedData {
        samples,
        header,
        rows_read,
        skipped_lines,
    })
}

fn parse_pair(record: &StringRecord, line: u64) -> Result<(f64, f64), AppError> {
    let field = |idx: usize, name: &str| -> Result<f64, AppError> {
        let raw = record.get(idx).unwrap_or("");
        raw.parse::<f64>().map_err(|e| AppError::MalformedRow {
            line,
            message: format!("{name} value '{raw}' is not a number ({e})"),
        })
    };
    Ok((field(0, "x")?, field(1, "y")?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use tempfile::NamedTempFile;

    fn csv_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn loads_pairs_in_file_order() {
        let file = csv_file("x,y\n1,2\n2, 4.5\n-3e-1,6\n");
        let data = load_samples(file.path()).unwrap();

        assert_eq!(data.header, vec!["x", "y"]);
        assert_eq!(data.samples.x(), &[1.0, 2.0, -0.3]);
        assert_eq!(data.samples.y(), &[2.0, 4.5, 6.0]);
        assert_eq!(data.rows_read, 3);
        assert!(data.skipped_lines.is_empty());
    }

    #[test]
    fn short_rows_are_skipped_and_extra_fields_ignored() {
        let file = csv_file("time,value,note\n1,2,a\n7\n3,4\n");
        let data = load_samples(file.path()).unwrap();

        assert_eq!(data.samples.x(), &[1.0, 3.0]);
        assert_eq!(data.samples.y(), &[2.0, 4.0]);
        assert_eq!(data.skipped_lines, vec![3]);
    }

    #[test]
    fn non_numeric_field_is_malformed_row() {
        let file = csv_file("x,y\n1,2\n2,abc\n3,6\n");
        let err = load_samples(file.path()).unwrap_err();

        match err {
            AppError::MalformedRow { line, ref message } => {
                assert_eq!(line, 3);
                assert!(message.contains("abc"), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(err.exit_code(), 999);
    }

    #[test]
    fn header_only_file_is_empty_dataset() {
        let file = csv_file("x,y\n");
        let err = load_samples(file.path()).unwrap_err();
        assert!(matches!(err, AppError::EmptyDataset(_)));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn only_short_rows_is_empty_dataset() {
        let file = csv_file("x,y\n1\n2\n");
        let err = load_samples(file.path()).unwrap_err();
        assert!(matches!(err, AppError::EmptyDataset(_)));
    }

    #[test]
    fn missing_file_is_unfound() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_samples(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, AppError::UnfoundFile(_)));
        assert_eq!(err.exit_code(), 4);
    }
}
