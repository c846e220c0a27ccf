//! Export per-sample results to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream
//! scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::SampleResidual;
use crate::error::AppError;

/// Write per-sample results to a CSV file.
pub fn write_results_csv(path: &Path, residuals: &[SampleResidual]) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display()))
    })?;

    writeln!(file, "x,y_obs,y_fit,residual,segment")
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for r in residuals {
        writeln!(
            file,
            "{:.10},{:.10},{:.10},{:.10},{}",
            r.sample.x,
            r.sample.y,
            r.y_fit,
            r.residual,
            r.segment.label(),
        )
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Sample, Segment};

    #[test]
    fn writes_header_and_rows() {
        let mut path = std::env::temp_dir();
        path.push(format!("knee_export_{}.csv", std::process::id()));

        let residuals = vec![SampleResidual {
            sample: Sample { x: 1.0, y: 2.0 },
            y_fit: 1.5,
            residual: 0.5,
            segment: Segment::First,
        }];
        write_results_csv(&path, &residuals).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let mut lines = contents.lines();
        assert_eq!(lines.next().unwrap(), "x,y_obs,y_fit,residual,segment");
        let row = lines.next().unwrap();
        assert!(row.starts_with("1.0000000000,2.0000000000,1.5000000000,0.5000000000,seg1"));
    }
}
