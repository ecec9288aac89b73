//! Thin QR decomposition of a tall design matrix.
//!
//! Given `X` (`n × k`, `k ≤ n`) we produce `Q` (`n × k`, orthonormal columns)
//! and `R` (`k × k`, upper triangular) with `X = Q·R`.
//!
//! Two methods share one contract:
//!
//! - **Modified Gram-Schmidt** (default). Each column is orthogonalised
//!   against the already accepted columns, one projection at a time, using the
//!   partially reduced vector for every subsequent projection.
//! - **Householder**, delegated to `nalgebra`. More stable on ill-conditioned
//!   inputs. Signs are normalised so that `R` has a positive diagonal, exactly
//!   like the Gram-Schmidt output.
//!
//! In both cases a diagonal entry of `R` below [`MIN_NORM`] means the column
//! lies (numerically) in the span of the previous ones; the decomposition is
//! abandoned and no partial factors are returned.

use log::debug;
use thiserror::Error;

use crate::domain::Decomposition;
use crate::math::kernel::{dot, LinalgError};
use crate::math::matrix::Matrix;

/// Smallest residual column norm accepted as linearly independent.
pub const MIN_NORM: f64 = 1e-10;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum QrError {
    #[error("Column {column} is collinear with the preceding columns (residual norm {norm:e})")]
    Collinearity { column: usize, norm: f64 },
    #[error("Cannot decompose a {rows}x{cols} matrix: more columns than rows")]
    Underdetermined { rows: usize, cols: usize },
    #[error("Cannot decompose an empty matrix")]
    Empty,
    #[error(transparent)]
    Linalg(#[from] LinalgError),
}

/// `Q` and `R` factors of a successful decomposition.
#[derive(Debug, Clone)]
pub struct QrFactors {
    pub q: Matrix,
    pub r: Matrix,
}

/// Decompose `x` with the selected method.
pub fn decompose(x: &Matrix, method: Decomposition) -> Result<QrFactors, QrError> {
    check_shape(x)?;
    debug!(
        "qr: decomposing {}x{} matrix with {}",
        x.rows(),
        x.cols(),
        method.display_name()
    );
    match method {
        Decomposition::GramSchmidt => gram_schmidt(x),
        Decomposition::Householder => householder(x),
    }
}

/// Modified Gram-Schmidt QR. Each accepted column is written straight into `Q`.
fn gram_schmidt(x: &Matrix) -> Result<QrFactors, QrError> {
    let (n, k) = x.shape();
    let mut q = Matrix::zeros(n, k);
    let mut r = Matrix::zeros(k, k);

    for j in 0..k {
        let mut v = x.column(j);

        for i in 0..j {
            let r_ij = column_dot(&q, i, &v);
            r[(i, j)] = r_ij;
            for (t, v_t) in v.iter_mut().enumerate() {
                *v_t -= r_ij * q[(t, i)];
            }
        }

        let norm = dot(&v, &v)?.sqrt();
        // `!(norm >= MIN_NORM)` also catches a NaN norm.
        if !(norm >= MIN_NORM) {
            debug!("qr: column {j} rejected, residual norm {norm:e}");
            return Err(QrError::Collinearity { column: j, norm });
        }

        r[(j, j)] = norm;
        for v_t in v.iter_mut() {
            *v_t /= norm;
        }
        q.set_column(j, &v);
    }

    Ok(QrFactors { q, r })
}

/// `Q[:, i] · v` without copying the column out.
fn column_dot(q: &Matrix, i: usize, v: &[f64]) -> f64 {
    v.iter().enumerate().map(|(t, v_t)| q[(t, i)] * v_t).sum()
}

/// Householder QR via `nalgebra`, normalised to a positive `R` diagonal.
fn householder(x: &Matrix) -> Result<QrFactors, QrError> {
    let qr = x.to_nalgebra().qr();
    let mut q = Matrix::from_nalgebra(&qr.q());
    let mut r = Matrix::from_nalgebra(&qr.r());
    let k = x.cols();

    for j in 0..k {
        let d = r[(j, j)];
        let norm = d.abs();
        if !(norm >= MIN_NORM) {
            debug!("qr: column {j} rejected, |R[j][j]| = {norm:e}");
            return Err(QrError::Collinearity { column: j, norm });
        }
        if d < 0.0 {
            // Flip row j of R and column j of Q together; Q·R is unchanged.
            for c in j..k {
                r[(j, c)] = -r[(j, c)];
            }
            for i in 0..q.rows() {
                q[(i, j)] = -q[(i, j)];
            }
        }
    }

    Ok(QrFactors { q, r })
}

fn check_shape(x: &Matrix) -> Result<(), QrError> {
    if x.rows() == 0 || x.cols() == 0 {
        return Err(QrError::Empty);
    }
    if x.cols() > x.rows() {
        return Err(QrError::Underdetermined {
            rows: x.rows(),
            cols: x.cols(),
        });
    }
    Ok(())
}
