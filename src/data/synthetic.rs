//! Seeded synthetic linear data.
//!
//! Features `x1..xp` are drawn uniformly from `[-10, 10]`, true coefficients
//! uniformly from `[-5, 5]`, and the target is `y = β·[1, x] + ε` with
//! `ε ~ Normal(0, noise)`. With `noise == 0` the data is exactly linear.

use std::collections::BTreeMap;

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{Dataset, Row};
use crate::error::AppError;

/// Name of the generated target column.
pub const SYNTHETIC_TARGET: &str = "y";

const FEATURE_SPAN: f64 = 10.0;
const COEFFICIENT_SPAN: f64 = 5.0;

#[derive(Debug, Clone)]
pub struct SyntheticData {
    pub dataset: Dataset,
    /// Intercept first, then one coefficient per feature.
    pub coefficients: Vec<f64>,
}

pub fn feature_name(index: usize) -> String {
    format!("x{}", index + 1)
}

pub fn generate(rows: usize, features: usize, noise: f64, seed: u64) -> Result<SyntheticData, AppError> {
    if rows == 0 {
        return Err(AppError::new(2, "Synthetic row count must be > 0."));
    }
    if features == 0 {
        return Err(AppError::new(2, "Synthetic feature count must be > 0."));
    }
    if !(noise.is_finite() && noise >= 0.0) {
        return Err(AppError::new(2, format!("Invalid noise level: {noise}")));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, noise)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let coefficients: Vec<f64> = (0..=features)
        .map(|_| rng.gen_range(-COEFFICIENT_SPAN..=COEFFICIENT_SPAN))
        .collect();
    let names: Vec<String> = (0..features).map(feature_name).collect();

    let mut out = Vec::with_capacity(rows);
    for _ in 0..rows {
        let mut row = Row::with_capacity(features + 1);
        let mut y = coefficients[0];
        for (name, beta) in names.iter().zip(&coefficients[1..]) {
            let x = rng.gen_range(-FEATURE_SPAN..=FEATURE_SPAN);
            y += beta * x;
            row.insert(name.clone(), x);
        }
        if noise > 0.0 {
            y += normal.sample(&mut rng);
        }
        row.insert(SYNTHETIC_TARGET.to_string(), y);
        out.push(row);
    }

    let mut columns = names;
    columns.push(SYNTHETIC_TARGET.to_string());

    Ok(SyntheticData {
        dataset: Dataset {
            columns,
            rows: out,
            encodings: BTreeMap::new(),
        },
        coefficients,
    })
}
