//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during training and prediction
//! - exported to JSON/CSV
//! - reloaded later for prediction without the original dataset

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Name of the intercept entry in [`FittedModel::features`].
pub const INTERCEPT: &str = "Intercept";

/// One observation: column name -> numeric value.
///
/// Categorical columns have already been replaced by their integer codes.
pub type Row = HashMap<String, f64>;

/// QR decomposition method used by the trainer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Decomposition {
    /// Modified Gram-Schmidt orthogonalisation.
    #[default]
    GramSchmidt,
    /// Householder reflections (via nalgebra).
    Householder,
}

impl Decomposition {
    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            Decomposition::GramSchmidt => "QR (Gram-Schmidt)",
            Decomposition::Householder => "QR (Householder)",
        }
    }
}

/// Whether a column held numbers or labels in the source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

/// A rectangular numeric table plus the label encodings of its categorical columns.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// Column names in file order.
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    /// Categorical column -> labels, indexed by integer code.
    pub encodings: BTreeMap<String, Vec<String>>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn column_kind(&self, name: &str) -> ColumnKind {
        if self.encodings.contains_key(name) {
            ColumnKind::Categorical
        } else {
            ColumnKind::Numeric
        }
    }

    pub fn numeric_columns(&self) -> Vec<&str> {
        self.columns_of_kind(ColumnKind::Numeric)
    }

    pub fn categorical_columns(&self) -> Vec<&str> {
        self.columns_of_kind(ColumnKind::Categorical)
    }

    fn columns_of_kind(&self, kind: ColumnKind) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| self.column_kind(c) == kind)
            .map(String::as_str)
            .collect()
    }

    /// Every column except `target`, in file order.
    pub fn default_features(&self, target: &str) -> Vec<String> {
        self.columns.iter().filter(|c| *c != target).cloned().collect()
    }

    /// Label of a categorical code (the value is rounded to the nearest code).
    pub fn label_for(&self, column: &str, value: f64) -> Option<&str> {
        label_for(&self.encodings, column, value)
    }
}

/// Look up the label for a (possibly fractional) categorical code.
pub fn label_for<'a>(
    encodings: &'a BTreeMap<String, Vec<String>>,
    column: &str,
    value: f64,
) -> Option<&'a str> {
    let labels = encodings.get(column)?;
    let code = value.round();
    if !(code >= 0.0) || code as usize >= labels.len() {
        return None;
    }
    labels.get(code as usize).map(String::as_str)
}

/// Look up the integer code of a categorical label.
pub fn code_for(encodings: &BTreeMap<String, Vec<String>>, column: &str, label: &str) -> Option<f64> {
    let labels = encodings.get(column)?;
    labels
        .iter()
        .position(|l| l == label.trim())
        .map(|idx| idx as f64)
}

/// Output of one successful training call.
///
/// `coefficients[0]` is the intercept; `coefficients[i]` belongs to
/// `features[i]`, and `features[0]` is always [`INTERCEPT`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedModel {
    pub coefficients: Vec<f64>,
    pub features: Vec<String>,
    pub r2: f64,
    pub rmse: f64,
    pub mae: f64,
    pub predictions: Vec<f64>,
    pub actual: Vec<f64>,
}

impl FittedModel {
    /// Feature names in coefficient order, without the intercept.
    pub fn feature_names(&self) -> &[String] {
        self.features.get(1..).unwrap_or(&[])
    }

    pub fn intercept(&self) -> f64 {
        self.coefficients.first().copied().unwrap_or(0.0)
    }

    /// Number of observations the model was trained on.
    pub fn n(&self) -> usize {
        self.actual.len()
    }

    /// `actual - predicted` per observation.
    pub fn residuals(&self) -> Vec<f64> {
        self.actual
            .iter()
            .zip(&self.predictions)
            .map(|(a, p)| a - p)
            .collect()
    }
}

/// Observed span of a feature, used to pick default prediction inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRange {
    pub name: String,
    pub min: f64,
    pub max: f64,
    pub midpoint: f64,
}

/// A saved model file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelFile {
    pub tool: String,
    pub trained_at: DateTime<Utc>,
    pub target: String,
    pub decomposition: Decomposition,
    #[serde(default)]
    pub scale_columns: bool,
    pub model: FittedModel,
    pub ranges: Vec<FeatureRange>,
    /// Encodings of the categorical features only.
    #[serde(default)]
    pub encodings: BTreeMap<String, Vec<String>>,
}

/// Where the training table comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    Csv(PathBuf),
    /// The built-in example table.
    Demo,
    Synthetic {
        rows: usize,
        features: usize,
        noise: f64,
        seed: u64,
    },
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub source: DataSource,
    /// `None` means the source's default target (`anxiety` for the example
    /// table, `y` for synthetic data, the last column of a file).
    pub target: Option<String>,
    /// `None` means every column except the target.
    pub features: Option<Vec<String>>,
    pub decomposition: Decomposition,
    pub scale_columns: bool,

    /// Limit for the predictions table (`None` prints every row).
    pub table_rows: Option<usize>,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_model: Option<PathBuf>,
    pub export_results: Option<PathBuf>,
}
