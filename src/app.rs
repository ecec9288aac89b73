//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - sets up logging
//! - loads or generates data and trains models
//! - prints reports/plots
//! - writes optional exports

use clap::Parser;
use env_logger::Env;
use log::info;

use crate::cli::{Command, CompareArgs, FitArgs, ModelArgs, PredictArgs, SourceArgs};
use crate::domain::{DataSource, FitConfig};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `mlr` binary.
pub fn run() -> Result<(), AppError> {
    // Before parsing so `MLR_DATA` can come from `.env`.
    dotenvy::dotenv().ok();
    let cli = crate::cli::Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Data(args) => handle_data(args),
        Command::Fit(args) => handle_fit(args),
        Command::Compare(args) => handle_compare(args),
        Command::Predict(args) => handle_predict(args),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();
}

fn handle_data(args: SourceArgs) -> Result<(), AppError> {
    let data = pipeline::load_source(&source_from_args(&args)?)?;
    println!(
        "{}",
        crate::report::format_dataset_preview(&data.dataset, crate::report::PREVIEW_ROWS)
    );
    if let Some(target) = &data.default_target {
        println!("Default target: {target}");
    }
    Ok(())
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args)?;
    let run = pipeline::run_fit(&config)?;

    println!(
        "{}",
        crate::report::format_model_summary(&run.model, &run.target, &run.options)
    );
    if let Some(truth) = &run.data.true_coefficients {
        println!("{}", crate::report::format_coefficient_check(&run.model, truth));
    }
    println!(
        "{}",
        crate::report::format_predictions_table(&run.model, config.table_rows)
    );

    if config.plot {
        let plot = crate::plot::render_fit_plot(&run.model, config.plot_width, config.plot_height);
        println!("{plot}");
    }

    // Optional exports.
    if let Some(path) = &config.export_results {
        crate::io::write_results_csv(path, &run.model)?;
        info!("wrote results to {}", path.display());
    }
    if let Some(path) = &config.export_model {
        let file = crate::io::build_model_file(
            &run.target,
            &run.options,
            &run.model,
            run.ranges.clone(),
            &run.data.dataset.encodings,
        );
        crate::io::write_model_file(path, &file)?;
        info!("wrote model to {}", path.display());
    }

    Ok(())
}

fn handle_compare(args: CompareArgs) -> Result<(), AppError> {
    let config = compare_config_from_args(&args)?;
    let out = pipeline::run_compare(&config)?;
    println!(
        "{}",
        crate::report::format_sweep(&out.target, &out.entries, out.best)
    );
    Ok(())
}

fn handle_predict(args: PredictArgs) -> Result<(), AppError> {
    let file = crate::io::read_model_file(&args.model)?;
    let out = pipeline::run_predict(&file, &args.set)?;
    println!(
        "{}",
        crate::report::format_prediction(&file.target, &out.inputs, out.value, &file.encodings)
    );
    Ok(())
}

pub fn fit_config_from_args(args: &FitArgs) -> Result<FitConfig, AppError> {
    let mut config = base_config(&args.source, &args.model)?;
    config.table_rows = args.rows;
    config.plot = !args.no_plot;
    config.plot_width = args.width;
    config.plot_height = args.height;
    config.export_model = args.export_model.clone();
    config.export_results = args.export_results.clone();
    Ok(config)
}

pub fn compare_config_from_args(args: &CompareArgs) -> Result<FitConfig, AppError> {
    base_config(&args.source, &args.model)
}

fn base_config(source: &SourceArgs, model: &ModelArgs) -> Result<FitConfig, AppError> {
    Ok(FitConfig {
        source: source_from_args(source)?,
        target: model.target.clone(),
        features: model.features.clone(),
        decomposition: model.method,
        scale_columns: model.scale_columns,
        table_rows: None,
        plot: false,
        plot_width: 60,
        plot_height: 20,
        export_model: None,
        export_results: None,
    })
}

/// Resolve the data source: `--synthetic`, then `--demo`, then `--csv` / `MLR_DATA`.
pub fn source_from_args(args: &SourceArgs) -> Result<DataSource, AppError> {
    if let Some(rows) = args.synthetic {
        return Ok(DataSource::Synthetic {
            rows,
            features: args.synthetic_features,
            noise: args.noise,
            seed: args.seed,
        });
    }
    if args.demo {
        return Ok(DataSource::Demo);
    }
    match &args.csv {
        Some(path) => Ok(DataSource::Csv(path.clone())),
        None => Err(AppError::new(
            2,
            "No data source: pass --csv PATH, --demo or --synthetic N (or set MLR_DATA).",
        )),
    }
}
