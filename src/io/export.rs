//! Export per-observation results to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::FittedModel;
use crate::error::AppError;
use crate::report::prediction_rows;

/// Write one line per observation to a CSV file.
pub fn write_results_csv(path: &Path, model: &FittedModel) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut out = BufWriter::new(file);
    write_results(&mut out, model)?;
    out.flush()
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV: {e}")))
}

/// Columns: `index,actual,predicted,error,pct_error` (index is 1-based).
pub fn write_results<W: Write>(out: &mut W, model: &FittedModel) -> Result<(), AppError> {
    writeln!(out, "index,actual,predicted,error,pct_error")
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for r in prediction_rows(model) {
        writeln!(
            out,
            "{},{:.6},{:.6},{:.6},{:.4}",
            r.index, r.actual, r.predicted, r.error, r.pct_error,
        )
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}
