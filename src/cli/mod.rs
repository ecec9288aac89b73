//! Command-line parsing for the regression tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the modeling/math code.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::domain::Decomposition;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "mlr", version, about = "Multiple linear regression via QR decomposition")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` overrides this.
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Preview a dataset: column kinds and the first rows.
    Data(SourceArgs),
    /// Train a model, print the summary, predictions and plot, and optionally export.
    Fit(FitArgs),
    /// Train the full feature set and every drop-one subset, side by side.
    Compare(CompareArgs),
    /// Evaluate a saved model at new feature values.
    Predict(PredictArgs),
}

/// Where the data comes from.
///
/// `--synthetic` wins over `--demo`, which wins over `--csv` / `MLR_DATA`.
#[derive(Debug, Args, Clone)]
pub struct SourceArgs {
    /// CSV or TSV file with a header row.
    #[arg(long, value_name = "PATH", env = "MLR_DATA")]
    pub csv: Option<PathBuf>,

    /// Use the built-in example dataset (target `anxiety`).
    #[arg(long, conflicts_with = "synthetic")]
    pub demo: bool,

    /// Generate this many rows of synthetic linear data (target `y`).
    #[arg(long, value_name = "ROWS")]
    pub synthetic: Option<usize>,

    /// Number of synthetic features `x1..xP`.
    #[arg(long, value_name = "P", default_value_t = 3)]
    pub synthetic_features: usize,

    /// Standard deviation of the synthetic noise (0 = exact linear data).
    #[arg(long, default_value_t = 0.5)]
    pub noise: f64,

    /// Random seed for synthetic data.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

/// Which model to train.
#[derive(Debug, Args, Clone)]
pub struct ModelArgs {
    /// Target column (defaults depend on the data source).
    #[arg(short = 't', long)]
    pub target: Option<String>,

    /// Comma-separated feature columns (default: every column except the target).
    #[arg(short = 'f', long, value_delimiter = ',')]
    pub features: Option<Vec<String>>,

    /// QR decomposition method.
    #[arg(long, value_enum, default_value_t = Decomposition::GramSchmidt)]
    pub method: Decomposition,

    /// Normalize feature columns before decomposing (helps badly scaled data).
    #[arg(long)]
    pub scale_columns: bool,
}

/// Options for `mlr fit`.
#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub model: ModelArgs,

    /// Show only the first N rows of the predictions table.
    #[arg(long, value_name = "N")]
    pub rows: Option<usize>,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 60)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Save the trained model to JSON (for `mlr predict`).
    #[arg(long, value_name = "JSON")]
    pub export_model: Option<PathBuf>,

    /// Export per-observation results to CSV.
    #[arg(long, value_name = "CSV")]
    pub export_results: Option<PathBuf>,
}

/// Options for `mlr compare`.
#[derive(Debug, Args, Clone)]
pub struct CompareArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub model: ModelArgs,
}

/// Options for `mlr predict`.
#[derive(Debug, Args, Clone)]
pub struct PredictArgs {
    /// Model JSON file produced by `mlr fit --export-model`.
    #[arg(long, value_name = "JSON")]
    pub model: PathBuf,

    /// Feature value as `name=value` (repeatable). Categorical features accept
    /// their label. Unset features use the midpoint of the training range.
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    pub set: Vec<(String, String)>,
}

fn parse_assignment(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{s}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing feature name in '{s}'"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}
