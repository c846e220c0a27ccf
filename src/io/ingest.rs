//! Sample ingest and validation.
//!
//! Input is a headerless two-column table: column 0 = x, column 1 = y.
//!
//! Design goals:
//! - **Fatal startup error** for a missing/unreadable file (exit code 2)
//! - **Row-level validation**: skip bad rows, but report what happened
//! - **Deterministic behavior**: samples keep file order
//! - **Separation of concerns**: no fitting logic here

use std::fs::File;
use std::path::Path;

use crate::domain::{DatasetStats, PARAM_LEN, Sample};
use crate::error::AppError;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: validated samples + stats + row errors.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub samples: Vec<Sample>,
    pub stats: DatasetStats,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
    /// Informational note about the dataset (e.g. underdetermined fits).
    pub note: Option<String>,
}

/// Load and validate the two-column sample file.
pub fn load_samples(path: &Path) -> Result<IngestedData, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(2, format!("Failed to open data file '{}': {e}", path.display()))
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut samples = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        let line = idx + 1;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record) {
            Ok(Some(sample)) => samples.push(sample),
            Ok(None) => {} // blank row
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    let rows_used = samples.len();
    let stats = compute_stats(&samples).ok_or_else(|| {
        AppError::new(
            3,
            format!("No valid samples in '{}' after validation.", path.display()),
        )
    })?;

    let note = if rows_used < PARAM_LEN {
        Some(format!(
            "only {rows_used} samples for {PARAM_LEN} free parameters; the fit is underdetermined"
        ))
    } else {
        None
    };

    Ok(IngestedData {
        samples,
        stats,
        row_errors,
        rows_read,
        rows_used,
        note,
    })
}

fn parse_row(record: &csv::StringRecord) -> Result<Option<Sample>, String> {
    // A completely blank row is not an error.
    if record.iter().all(|f| f.is_empty()) {
        return Ok(None);
    }
    if record.len() < 2 {
        return Err(format!("expected 2 columns, found {}", record.len()));
    }

    let x = parse_number(record.get(0).unwrap_or(""), "x")?;
    let y = parse_number(record.get(1).unwrap_or(""), "y")?;
    Ok(Some(Sample { x, y }))
}

fn parse_number(field: &str, name: &str) -> Result<f64, String> {
    let v: f64 = field
        .parse()
        .map_err(|_| format!("invalid {name} value '{field}'"))?;
    if !v.is_finite() {
        return Err(format!("non-finite {name} value '{field}'"));
    }
    Ok(v)
}

fn compute_stats(samples: &[Sample]) -> Option<DatasetStats> {
    if samples.is_empty() {
        return None;
    }
    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for s in samples {
        x_min = x_min.min(s.x);
        x_max = x_max.max(s.x);
        y_min = y_min.min(s.y);
        y_max = y_max.max(s.y);
    }
    Some(DatasetStats {
        n_points: samples.len(),
        x_min,
        x_max,
        y_min,
        y_max,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        let unique = format!(
            "knee_ingest_{}_{}.csv",
            std::process::id(),
            contents.len()
        );
        path.push(unique);
        let mut f = File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_two_column_csv_without_header() {
        let path = write_temp("0,0\n1,1\n2,4\n3,9\n4,14\n5,19\n");
        let data = load_samples(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(data.rows_used, 6);
        assert!(data.row_errors.is_empty());
        assert_eq!(data.samples[2], Sample { x: 2.0, y: 4.0 });
        assert_eq!(data.stats.x_min, 0.0);
        assert_eq!(data.stats.x_max, 5.0);
        assert_eq!(data.stats.y_max, 19.0);
        assert!(data.note.is_some()); // 6 samples < 7 parameters
    }

    #[test]
    fn bad_rows_are_reported_not_fatal() {
        let path = write_temp("0,0\nnot,numbers\n2,4\n3\n4,NaN\n5,19\n6,22\n7,25\n");
        let data = load_samples(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(data.rows_used, 5);
        assert_eq!(data.row_errors.len(), 3);
        assert_eq!(data.row_errors[0].line, 2);
        assert_eq!(data.row_errors[1].line, 4);
        assert!(data.row_errors[2].message.contains("non-finite"));
    }

    #[test]
    fn missing_file_is_a_startup_error() {
        let err = load_samples(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn all_rows_invalid_is_a_data_error() {
        let path = write_temp("a,b\nc,d\n");
        let err = load_samples(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert_eq!(err.exit_code(), 3);
    }
}
