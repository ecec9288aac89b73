//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - input tables (`Row`, `Dataset`) and their categorical encodings
//! - the training output (`FittedModel`) and its saved form (`ModelFile`)
//! - run configuration (`FitConfig`, `DataSource`, `Decomposition`)

pub mod types;

pub use types::*;
