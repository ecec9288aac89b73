//! Back substitution for `R·x = b` with `R` upper triangular.

use log::debug;
use thiserror::Error;

use crate::math::matrix::Matrix;

/// Smallest pivot magnitude accepted on the diagonal of `R`.
pub const MIN_PIVOT: f64 = 1e-10;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    #[error("Singular system: pivot {pivot:e} at row {row}")]
    Singular { row: usize, pivot: f64 },
    #[error("Expected a square matrix, got {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },
    #[error("Right-hand side has length {found}, expected {expected}")]
    RhsLength { expected: usize, found: usize },
}

/// Solve `R·x = b` from the last row upward.
///
/// Entries of `R` below the diagonal are ignored.
pub fn back_substitute(r: &Matrix, b: &[f64]) -> Result<Vec<f64>, SolveError> {
    let (rows, cols) = r.shape();
    if rows != cols {
        return Err(SolveError::NotSquare { rows, cols });
    }
    if b.len() != rows {
        return Err(SolveError::RhsLength {
            expected: rows,
            found: b.len(),
        });
    }

    let k = rows;
    let mut x = vec![0.0; k];
    for i in (0..k).rev() {
        let row = r.row(i);
        let mut sum = b[i];
        for j in (i + 1)..k {
            sum -= row[j] * x[j];
        }
        let pivot = row[i];
        if !(pivot.abs() >= MIN_PIVOT) {
            debug!("solve: singular pivot {pivot:e} at row {i}");
            return Err(SolveError::Singular { row: i, pivot });
        }
        x[i] = sum / pivot;
    }
    Ok(x)
}
