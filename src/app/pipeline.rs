//! Shared load -> train logic used by every subcommand.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! data source -> target/feature resolution -> training -> feature ranges
//!
//! The handlers in `app` can then focus on presentation and exports.

use std::collections::HashMap;

use log::info;

use crate::data::{EXAMPLE_TARGET, SYNTHETIC_TARGET, example_dataset, generate};
use crate::domain::{DataSource, Dataset, FeatureRange, FitConfig, FittedModel, ModelFile, code_for};
use crate::error::AppError;
use crate::fit::{FitOptions, PredictError, SweepEntry, best_entry, drop_one_selections, predict_named, train_many, train_with};
use crate::io::{feature_ranges, load_dataset};

/// A dataset plus what its source knows about it.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub dataset: Dataset,
    pub default_target: Option<String>,
    /// Coefficients the synthetic generator used (intercept first).
    pub true_coefficients: Option<Vec<f64>>,
}

/// All computed outputs of a single `mlr fit` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub data: LoadedData,
    pub target: String,
    pub features: Vec<String>,
    pub options: FitOptions,
    pub model: FittedModel,
    pub ranges: Vec<FeatureRange>,
}

/// All computed outputs of a single `mlr compare` run.
#[derive(Debug, Clone)]
pub struct CompareOutput {
    pub target: String,
    pub entries: Vec<SweepEntry>,
    pub best: Option<usize>,
}

/// A prediction and the full, ordered set of inputs it used.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionOutput {
    pub inputs: Vec<(String, f64)>,
    pub value: f64,
}

pub fn options_from_config(config: &FitConfig) -> FitOptions {
    FitOptions {
        decomposition: config.decomposition,
        scale_columns: config.scale_columns,
    }
}

/// Load (or generate) the dataset a run asks for.
pub fn load_source(source: &DataSource) -> Result<LoadedData, AppError> {
    match source {
        DataSource::Csv(path) => {
            let dataset = load_dataset(path)?;
            let default_target = dataset.columns.last().cloned();
            Ok(LoadedData {
                dataset,
                default_target,
                true_coefficients: None,
            })
        }
        DataSource::Demo => Ok(LoadedData {
            dataset: example_dataset(),
            default_target: Some(EXAMPLE_TARGET.to_string()),
            true_coefficients: None,
        }),
        DataSource::Synthetic {
            rows,
            features,
            noise,
            seed,
        } => {
            let data = generate(*rows, *features, *noise, *seed)?;
            info!("generated {rows} synthetic rows with {features} features (noise {noise}, seed {seed})");
            Ok(LoadedData {
                dataset: data.dataset,
                default_target: Some(SYNTHETIC_TARGET.to_string()),
                true_coefficients: Some(data.coefficients),
            })
        }
    }
}

/// The requested target, or the source default; it must be a column.
pub fn resolve_target(config: &FitConfig, data: &LoadedData) -> Result<String, AppError> {
    let target = config
        .target
        .clone()
        .or_else(|| data.default_target.clone())
        .ok_or_else(|| AppError::new(2, "No target column: pass --target."))?;
    if !data.dataset.has_column(&target) {
        return Err(unknown_column(&target, &data.dataset));
    }
    Ok(target)
}

/// The requested features, or every column except the target; all must be columns.
pub fn resolve_features(config: &FitConfig, dataset: &Dataset, target: &str) -> Result<Vec<String>, AppError> {
    let features = match &config.features {
        Some(list) => list
            .iter()
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect(),
        None => dataset.default_features(target),
    };
    if let Some(missing) = features.iter().find(|f| !dataset.has_column(f)) {
        return Err(unknown_column(missing, dataset));
    }
    Ok(features)
}

/// Execute the full fitting pipeline and return the computed outputs.
pub fn run_fit(config: &FitConfig) -> Result<RunOutput, AppError> {
    let data = load_source(&config.source)?;
    let target = resolve_target(config, &data)?;
    let features = resolve_features(config, &data.dataset, &target)?;
    let options = options_from_config(config);

    let model = train_with(&data.dataset.rows, &target, &features, &options)?;
    let ranges = feature_ranges(&data.dataset, &features);

    Ok(RunOutput {
        data,
        target,
        features,
        options,
        model,
        ranges,
    })
}

/// Train the full selection and every drop-one subset.
pub fn run_compare(config: &FitConfig) -> Result<CompareOutput, AppError> {
    let data = load_source(&config.source)?;
    let target = resolve_target(config, &data)?;
    let features = resolve_features(config, &data.dataset, &target)?;
    let options = options_from_config(config);

    let selections = drop_one_selections(&features);
    let entries = train_many(&data.dataset.rows, &target, &selections, &options);
    let best = best_entry(&entries);

    Ok(CompareOutput { target, entries, best })
}

/// Evaluate a saved model from `name=value` assignments.
///
/// Values parse as numbers, or as labels of a categorical feature. Features
/// without an assignment take the midpoint of their training range.
pub fn run_predict(file: &ModelFile, assignments: &[(String, String)]) -> Result<PredictionOutput, AppError> {
    let names = file.model.feature_names();

    let mut values: HashMap<String, f64> = HashMap::new();
    for (name, raw) in assignments {
        if !names.contains(name) {
            return Err(PredictError::UnknownFeature(name.clone()).into());
        }
        let value = match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => v,
            _ => code_for(&file.encodings, name, raw).ok_or_else(|| {
                AppError::new(2, format!("Invalid value for `{name}`: '{raw}'"))
            })?,
        };
        values.insert(name.clone(), value);
    }

    for name in names {
        if values.contains_key(name) {
            continue;
        }
        if let Some(range) = file.ranges.iter().find(|r| &r.name == name) {
            values.insert(name.clone(), range.midpoint);
        }
    }

    let value = predict_named(&file.model, &values)?;
    let inputs = names
        .iter()
        .filter_map(|n| values.get(n).map(|v| (n.clone(), *v)))
        .collect();
    Ok(PredictionOutput { inputs, value })
}

fn unknown_column(name: &str, dataset: &Dataset) -> AppError {
    AppError::new(
        2,
        format!(
            "Unknown column `{name}`. Available: {}",
            dataset.columns.join(", ")
        ),
    )
}
