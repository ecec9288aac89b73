//! `mlr-engine` library crate.
//!
//! Least-squares multiple linear regression solved by QR decomposition and
//! back substitution. The binary (`mlr`) is a thin wrapper around this library
//! so that:
//!
//! - core logic is testable without spawning processes
//! - the numerical core (`math`, `fit`) is usable without the CLI layers

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod plot;
pub mod report;
