//! Least-squares training of a multiple linear regression.
//!
//! Given rows, a target column and an ordered feature list we:
//!
//! - build the design matrix `X` (intercept column first) and target `y`
//! - reject degenerate inputs (too few rows, non-finite values, constant target)
//! - factor `X = Q·R` and solve `R·β = Qᵗ·y` by back substitution
//! - compute in-sample predictions and fit metrics
//!
//! Each call is independent: nothing is cached between calls and the inputs
//! are only read, so separate calls may run on separate threads.

use log::{debug, info};
use thiserror::Error;

use crate::domain::{Decomposition, FittedModel, INTERCEPT, Row};
use crate::fit::metrics::{FitMetrics, population_variance};
use crate::fit::predictor::evaluate;
use crate::math::{LinalgError, Matrix, QrError, SolveError, back_substitute, decompose, multiply, transpose};

/// Target variance below which the fit is considered degenerate.
pub const MIN_TARGET_VARIANCE: f64 = 1e-10;

/// Options that affect how the linear system is solved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FitOptions {
    pub decomposition: Decomposition,
    /// Divide each feature column by its Euclidean norm before decomposing.
    ///
    /// The collinearity and pivot thresholds are absolute, so columns with very
    /// large or very small magnitudes can trip (or slip past) them. Scaling
    /// makes the thresholds relative. Coefficients are reported unscaled.
    pub scale_columns: bool,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrainError {
    #[error("Select at least one feature column")]
    NoFeatures,
    #[error("Target column `{column}` cannot also be a feature")]
    TargetInFeatures { column: String },
    #[error("At least {required} rows are required, got {rows}")]
    InsufficientRows { rows: usize, required: usize },
    #[error("Row {row} has no value for column `{column}`")]
    MissingColumn { column: String, row: usize },
    #[error("Invalid value in column `{column}` at row {row}: {value}")]
    InvalidValue { column: String, row: usize, value: f64 },
    #[error("Target has no variance (variance {variance:e})")]
    NoVariance { variance: f64 },
    #[error("Feature `{feature}` is collinear with the other columns; try removing it")]
    Collinearity { column: usize, feature: String },
    #[error("Singular system while solving for `{feature}` (row {row})")]
    SingularSystem { row: usize, feature: String },
    #[error("Coefficient for `{feature}` is not finite; try rescaling or selecting other features")]
    NonFiniteCoefficient { index: usize, feature: String },
    #[error(transparent)]
    Linalg(#[from] LinalgError),
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Train with default options (Gram-Schmidt, no column scaling).
pub fn train(rows: &[Row], target: &str, features: &[String]) -> Result<FittedModel, TrainError> {
    train_with(rows, target, features, &FitOptions::default())
}

/// Train a model of `target` on `features` (in that coefficient order).
pub fn train_with(
    rows: &[Row],
    target: &str,
    features: &[String],
    opts: &FitOptions,
) -> Result<FittedModel, TrainError> {
    if features.is_empty() {
        return Err(TrainError::NoFeatures);
    }
    if features.iter().any(|f| f == target) {
        return Err(TrainError::TargetInFeatures {
            column: target.to_string(),
        });
    }

    let n = rows.len();
    let k = features.len() + 1;
    let required = features.len() + 2;
    if n < required {
        return Err(TrainError::InsufficientRows { rows: n, required });
    }

    let mut names = Vec::with_capacity(k);
    names.push(INTERCEPT.to_string());
    names.extend(features.iter().cloned());

    debug!(
        "train: n={n} k={k} target=`{target}` method={} scale_columns={}",
        opts.decomposition.display_name(),
        opts.scale_columns
    );

    let x = build_design(rows, features)?;
    let y = build_target(rows, target)?;

    let variance = population_variance(&y);
    if !(variance >= MIN_TARGET_VARIANCE) {
        return Err(TrainError::NoVariance { variance });
    }
    debug!("train: target variance {variance:.6e}");

    let scales = if opts.scale_columns {
        column_scales(&x)
    } else {
        vec![1.0; k]
    };
    let scaled;
    let x_work = if opts.scale_columns {
        scaled = apply_scales(&x, &scales);
        &scaled
    } else {
        &x
    };

    let factors = decompose(x_work, opts.decomposition).map_err(|e| map_qr_error(e, &names))?;

    let qty = multiply(&transpose(&factors.q), &Matrix::column_vector(&y))?.into_vec();
    let mut beta = back_substitute(&factors.r, &qty).map_err(|e| map_solve_error(e, &names))?;
    for (b, s) in beta.iter_mut().zip(&scales) {
        *b /= s;
    }

    if let Some(index) = beta.iter().position(|b| !b.is_finite()) {
        return Err(TrainError::NonFiniteCoefficient {
            index,
            feature: names[index].clone(),
        });
    }
    debug!("train: coefficients {beta:?}");

    let predictions: Vec<f64> = x.iter_rows().map(|row| evaluate(&beta, &row[1..])).collect();
    let metrics = FitMetrics::compute(&y, &predictions);

    info!(
        "trained `{target}` on {} feature(s): n={n} R2={:.4} RMSE={:.4} MAE={:.4}",
        features.len(),
        metrics.r2,
        metrics.rmse,
        metrics.mae
    );

    Ok(FittedModel {
        coefficients: beta,
        features: names,
        r2: metrics.r2,
        rmse: metrics.rmse,
        mae: metrics.mae,
        predictions,
        actual: y,
    })
}

/// `n × (1 + |features|)` design matrix with a leading column of ones.
fn build_design(rows: &[Row], features: &[String]) -> Result<Matrix, TrainError> {
    let k = features.len() + 1;
    let mut x = Matrix::zeros(rows.len(), k);
    for (i, row) in rows.iter().enumerate() {
        x[(i, 0)] = 1.0;
        for (j, feature) in features.iter().enumerate() {
            x[(i, j + 1)] = read_value(row, feature, i)?;
        }
    }
    Ok(x)
}

fn build_target(rows: &[Row], target: &str) -> Result<Vec<f64>, TrainError> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| read_value(row, target, i))
        .collect()
}

fn read_value(row: &Row, column: &str, index: usize) -> Result<f64, TrainError> {
    let value = *row.get(column).ok_or_else(|| TrainError::MissingColumn {
        column: column.to_string(),
        row: index,
    })?;
    if !value.is_finite() {
        return Err(TrainError::InvalidValue {
            column: column.to_string(),
            row: index,
            value,
        });
    }
    Ok(value)
}

/// Euclidean norm of every feature column; the intercept keeps a scale of 1.
fn column_scales(x: &Matrix) -> Vec<f64> {
    (0..x.cols())
        .map(|j| {
            if j == 0 {
                return 1.0;
            }
            let norm = x.column(j).iter().map(|v| v * v).sum::<f64>().sqrt();
            // An all-zero column keeps scale 1 so the decomposer still rejects it.
            if norm.is_finite() && norm > 0.0 { norm } else { 1.0 }
        })
        .collect()
}

fn apply_scales(x: &Matrix, scales: &[f64]) -> Matrix {
    let mut out = x.clone();
    for i in 0..x.rows() {
        for (j, s) in scales.iter().enumerate() {
            out[(i, j)] /= s;
        }
    }
    out
}

fn map_qr_error(err: QrError, names: &[String]) -> TrainError {
    match err {
        QrError::Collinearity { column, .. } => TrainError::Collinearity {
            column,
            feature: column_name(names, column),
        },
        QrError::Linalg(e) => TrainError::Linalg(e),
        other => TrainError::Internal(other.to_string()),
    }
}

fn map_solve_error(err: SolveError, names: &[String]) -> TrainError {
    match err {
        SolveError::Singular { row, .. } => TrainError::SingularSystem {
            row,
            feature: column_name(names, row),
        },
        other => TrainError::Internal(other.to_string()),
    }
}

fn column_name(names: &[String], idx: usize) -> String {
    names.get(idx).cloned().unwrap_or_else(|| format!("column {idx}"))
}
