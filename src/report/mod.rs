//! Reporting utilities: per-observation results and formatted terminal output.

pub mod format;

pub use format::*;

use crate::domain::FittedModel;

/// One observation's actual value next to the model's prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRow {
    /// 1-based observation number.
    pub index: usize,
    pub actual: f64,
    pub predicted: f64,
    /// `actual - predicted`.
    pub error: f64,
    /// `error / actual · 100`, or 0 when the actual value is 0.
    pub pct_error: f64,
}

pub fn percent_error(actual: f64, predicted: f64) -> f64 {
    if actual == 0.0 {
        0.0
    } else {
        (actual - predicted) / actual * 100.0
    }
}

/// Pair each in-sample prediction with its observed value.
pub fn prediction_rows(model: &FittedModel) -> Vec<PredictionRow> {
    model
        .actual
        .iter()
        .zip(&model.predictions)
        .enumerate()
        .map(|(i, (actual, predicted))| PredictionRow {
            index: i + 1,
            actual: *actual,
            predicted: *predicted,
            error: actual - predicted,
            pct_error: percent_error(*actual, *predicted),
        })
        .collect()
}
