//! Read/write model JSON files.
//!
//! A model file is the portable form of a trained model:
//! - coefficients, feature names and fit metrics
//! - the target name and how the system was solved
//! - per-feature ranges (default inputs for `predict`)
//! - label encodings of categorical features
//!
//! The schema is defined by `domain::ModelFile`.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use chrono::Utc;

use crate::domain::{FeatureRange, FittedModel, INTERCEPT, ModelFile};
use crate::error::AppError;
use crate::fit::FitOptions;

/// Value of the `tool` field in files this crate writes.
pub const TOOL_NAME: &str = "mlr";

/// Assemble a model file stamped with the current time.
///
/// Only the encodings of the model's own features are kept.
pub fn build_model_file(
    target: &str,
    opts: &FitOptions,
    model: &FittedModel,
    ranges: Vec<FeatureRange>,
    encodings: &BTreeMap<String, Vec<String>>,
) -> ModelFile {
    let encodings = model
        .feature_names()
        .iter()
        .filter_map(|name| encodings.get(name).map(|labels| (name.clone(), labels.clone())))
        .collect();

    ModelFile {
        tool: TOOL_NAME.to_string(),
        trained_at: Utc::now(),
        target: target.to_string(),
        decomposition: opts.decomposition,
        scale_columns: opts.scale_columns,
        model: model.clone(),
        ranges,
        encodings,
    }
}

/// Write a model JSON file.
pub fn write_model_file(path: &Path, file: &ModelFile) -> Result<(), AppError> {
    let out = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create model JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(out, file)
        .map_err(|e| AppError::new(2, format!("Failed to write model JSON: {e}")))?;
    Ok(())
}

/// Read and validate a model JSON file.
pub fn read_model_file(path: &Path) -> Result<ModelFile, AppError> {
    let input = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open model JSON '{}': {e}", path.display())))?;
    let file: ModelFile =
        serde_json::from_reader(input).map_err(|e| AppError::new(2, format!("Invalid model JSON: {e}")))?;
    validate(&file)?;
    Ok(file)
}

fn validate(file: &ModelFile) -> Result<(), AppError> {
    let model = &file.model;
    if model.coefficients.len() < 2 || model.coefficients.len() != model.features.len() {
        return Err(AppError::new(
            2,
            format!(
                "Invalid model JSON: {} coefficients for {} feature names.",
                model.coefficients.len(),
                model.features.len()
            ),
        ));
    }
    if model.features[0] != INTERCEPT {
        return Err(AppError::new(2, "Invalid model JSON: first feature must be the intercept."));
    }
    if let Some(idx) = model.coefficients.iter().position(|c| !c.is_finite()) {
        return Err(AppError::new(
            2,
            format!("Invalid model JSON: coefficient for `{}` is not finite.", model.features[idx]),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Decomposition;

    fn model() -> FittedModel {
        FittedModel {
            coefficients: vec![1.0, 2.0, 0.5],
            features: vec![INTERCEPT.to_string(), "x".to_string(), "city".to_string()],
            r2: 0.9,
            rmse: 0.1,
            mae: 0.05,
            predictions: vec![1.0, 3.0],
            actual: vec![1.1, 2.9],
        }
    }

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("mlr-{}-{name}", std::process::id()))
    }

    #[test]
    fn build_keeps_only_feature_encodings() {
        let mut enc = BTreeMap::new();
        enc.insert("city".to_string(), vec!["Lima".to_string()]);
        enc.insert("unused".to_string(), vec!["a".to_string()]);
        let opts = FitOptions {
            decomposition: Decomposition::Householder,
            scale_columns: true,
        };
        let file = build_model_file("y", &opts, &model(), vec![], &enc);
        assert_eq!(file.tool, TOOL_NAME);
        assert_eq!(file.decomposition, Decomposition::Householder);
        assert!(file.scale_columns);
        assert_eq!(file.encodings.keys().map(String::as_str).collect::<Vec<_>>(), vec!["city"]);
    }

    #[test]
    fn written_file_reads_back() {
        let path = temp_path("model.json");
        let ranges = vec![FeatureRange {
            name: "x".to_string(),
            min: 0.0,
            max: 4.0,
            midpoint: 2.0,
        }];
        let file = build_model_file("y", &FitOptions::default(), &model(), ranges, &BTreeMap::new());
        write_model_file(&path, &file).unwrap();

        let back = read_model_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(back.model, file.model);
        assert_eq!(back.ranges, file.ranges);
        assert_eq!(back.trained_at, file.trained_at);
        assert_eq!(back.target, "y");
    }

    #[test]
    fn rejects_inconsistent_models() {
        let mut file = build_model_file("y", &FitOptions::default(), &model(), vec![], &BTreeMap::new());
        file.model.coefficients.pop();
        assert!(validate(&file).is_err());

        let mut file = build_model_file("y", &FitOptions::default(), &model(), vec![], &BTreeMap::new());
        file.model.features[0] = "x0".to_string();
        assert!(validate(&file).is_err());
    }

    #[test]
    fn missing_file_is_input_error() {
        let err = read_model_file(&temp_path("does-not-exist.json")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
