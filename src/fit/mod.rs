//! Regression training orchestration.
//!
//! Responsibilities:
//!
//! - build the design matrix and validate inputs (`trainer`)
//! - compute fit metrics (`metrics`)
//! - evaluate a fitted model at new points (`predictor`)
//! - train several feature selections in parallel (`sweep`)

pub mod metrics;
pub mod predictor;
pub mod sweep;
pub mod trainer;

pub use metrics::*;
pub use predictor::*;
pub use sweep::*;
pub use trainer::*;
