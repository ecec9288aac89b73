//! Linear algebra kernel: dot product, transpose and matrix multiply.
//!
//! These are pure functions over [`Matrix`] and slices. Shape mismatches are
//! reported as [`LinalgError`] rather than panicking so that a bad input can
//! never take down a training run.

use thiserror::Error;

use crate::math::matrix::Matrix;

/// Shape errors raised by the kernel and the matrix constructors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LinalgError {
    #[error("Vector length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },
    #[error("Cannot multiply {left_rows}x{left_cols} by {right_rows}x{right_cols}: inner dimensions differ")]
    InnerDimension {
        left_rows: usize,
        left_cols: usize,
        right_rows: usize,
        right_cols: usize,
    },
    #[error("Buffer of length {len} does not match a {rows}x{cols} matrix")]
    BufferSize { rows: usize, cols: usize, len: usize },
}

/// Inner product of two equal-length vectors.
pub fn dot(a: &[f64], b: &[f64]) -> Result<f64, LinalgError> {
    if a.len() != b.len() {
        return Err(LinalgError::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    Ok(a.iter().zip(b).map(|(x, y)| x * y).sum())
}

/// `M'`.
pub fn transpose(m: &Matrix) -> Matrix {
    let (rows, cols) = m.shape();
    let mut out = Matrix::zeros(cols, rows);
    for i in 0..rows {
        for (j, &v) in m.row(i).iter().enumerate() {
            out[(j, i)] = v;
        }
    }
    out
}

/// `C = A·B` for `A: p×q`, `B: q×r`.
pub fn multiply(a: &Matrix, b: &Matrix) -> Result<Matrix, LinalgError> {
    if a.cols() != b.rows() {
        return Err(LinalgError::InnerDimension {
            left_rows: a.rows(),
            left_cols: a.cols(),
            right_rows: b.rows(),
            right_cols: b.cols(),
        });
    }

    let mut out = Matrix::zeros(a.rows(), b.cols());
    // i-k-j order walks both `b` and `out` along contiguous rows.
    for i in 0..a.rows() {
        for (k, &a_ik) in a.row(i).iter().enumerate() {
            for (j, &b_kj) in b.row(k).iter().enumerate() {
                out[(i, j)] += a_ik * b_kj;
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_of_equal_length_vectors() {
        let v = dot(&[1.0, 2.0, 3.0], &[4.0, -5.0, 6.0]).unwrap();
        assert!((v - 12.0).abs() < 1e-12);
    }

    #[test]
    fn dot_rejects_length_mismatch() {
        let err = dot(&[1.0, 2.0], &[1.0]).unwrap_err();
        assert_eq!(err, LinalgError::LengthMismatch { left: 2, right: 1 });
    }

    #[test]
    fn transpose_swaps_shape_and_entries() {
        let m = Matrix::from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        let t = transpose(&m);
        assert_eq!(t.shape(), (3, 2));
        assert_eq!(t.row(0), &[1.0, 4.0]);
        assert_eq!(t.row(2), &[3.0, 6.0]);
        assert_eq!(transpose(&t), m);
    }

    #[test]
    fn multiply_small_matrices() {
        let a = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]).unwrap();
        let b = Matrix::from_rows(&[vec![7.0, 8.0, 9.0], vec![10.0, 11.0, 12.0]]).unwrap();
        let c = multiply(&a, &b).unwrap();
        let expected = Matrix::from_rows(&[
            vec![27.0, 30.0, 33.0],
            vec![61.0, 68.0, 75.0],
            vec![95.0, 106.0, 117.0],
        ])
        .unwrap();
        assert_eq!(c, expected);
    }

    #[test]
    fn multiply_by_column_vector() {
        let a = Matrix::from_rows(&[vec![1.0, 0.0], vec![0.0, 2.0]]).unwrap();
        let y = Matrix::column_vector(&[3.0, 4.0]);
        let c = multiply(&a, &y).unwrap();
        assert_eq!(c.into_vec(), vec![3.0, 8.0]);
    }

    #[test]
    fn multiply_propagates_non_finite_through_zero_entries() {
        // 0 * inf and 0 * NaN are NaN; a zero in `a` must not hide them.
        let a = Matrix::from_rows(&[vec![0.0, 1.0], vec![1.0, 0.0]]).unwrap();
        let b = Matrix::column_vector(&[f64::INFINITY, 2.0]);
        let c = multiply(&a, &b).unwrap().into_vec();
        assert!(c[0].is_nan());
        assert_eq!(c[1], f64::INFINITY);

        let b = Matrix::column_vector(&[1.0, f64::NAN]);
        let c = multiply(&a, &b).unwrap().into_vec();
        assert!(c[0].is_nan());
        assert!(c[1].is_nan());
    }

    #[test]
    fn multiply_rejects_inner_dimension_mismatch() {
        let a = Matrix::zeros(2, 3);
        let b = Matrix::zeros(2, 3);
        assert!(matches!(
            multiply(&a, &b),
            Err(LinalgError::InnerDimension { left_cols: 3, right_rows: 2, .. })
        ));
    }
}
