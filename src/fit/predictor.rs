//! Model evaluation at new input points.
//!
//! A fitted model is `ŷ = β0 + Σ βi·xi`. The trainer computes its in-sample
//! predictions with [`evaluate`] as well, so predicting a training row gives
//! bit-for-bit the value stored in [`FittedModel::predictions`].

use std::collections::HashMap;

use thiserror::Error;

use crate::domain::FittedModel;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictError {
    #[error("Model expects {expected} feature values, got {found}")]
    LengthMismatch { expected: usize, found: usize },
    #[error("Missing value for feature `{0}`")]
    MissingFeature(String),
    #[error("Feature `{0}` was not used to train this model")]
    UnknownFeature(String),
}

/// `coefficients[0] + Σ coefficients[i]·values[i-1]`.
///
/// Callers guarantee `values.len() + 1 == coefficients.len()`.
pub(crate) fn evaluate(coefficients: &[f64], values: &[f64]) -> f64 {
    let mut sum = coefficients[0];
    for (beta, x) in coefficients[1..].iter().zip(values) {
        sum += beta * x;
    }
    sum
}

/// Predict from feature values ordered like [`FittedModel::feature_names`].
pub fn predict(model: &FittedModel, values: &[f64]) -> Result<f64, PredictError> {
    let expected = model.coefficients.len().saturating_sub(1);
    if model.coefficients.is_empty() || values.len() != expected {
        return Err(PredictError::LengthMismatch {
            expected,
            found: values.len(),
        });
    }
    Ok(evaluate(&model.coefficients, values))
}

/// Predict from a name -> value map covering exactly the model's features.
pub fn predict_named(model: &FittedModel, values: &HashMap<String, f64>) -> Result<f64, PredictError> {
    let names = model.feature_names();
    if let Some(unknown) = values.keys().find(|k| !names.contains(*k)) {
        return Err(PredictError::UnknownFeature(unknown.clone()));
    }
    let ordered = names
        .iter()
        .map(|name| {
            values
                .get(name)
                .copied()
                .ok_or_else(|| PredictError::MissingFeature(name.clone()))
        })
        .collect::<Result<Vec<f64>, _>>()?;
    predict(model, &ordered)
}

impl FittedModel {
    /// See [`predict`].
    pub fn predict(&self, values: &[f64]) -> Result<f64, PredictError> {
        predict(self, values)
    }
}
