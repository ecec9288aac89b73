//! Binary-boundary error: a message plus the process exit code.
//!
//! Exit codes:
//! - `2`: bad input, configuration or I/O
//! - `3`: the data cannot be fitted
//! - `4`: internal failure

use crate::fit::{PredictError, TrainError};

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<TrainError> for AppError {
    fn from(err: TrainError) -> Self {
        let code = match err {
            TrainError::Linalg(_) | TrainError::Internal(_) => 4,
            _ => 3,
        };
        AppError::new(code, format!("Training failed: {err}"))
    }
}

impl From<PredictError> for AppError {
    fn from(err: PredictError) -> Self {
        AppError::new(2, format!("Prediction failed: {err}"))
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn train_errors_map_to_fit_exit_code() {
        let err: AppError = TrainError::NoVariance { variance: 0.0 }.into();
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("no variance"));

        let err: AppError = TrainError::Internal("boom".to_string()).into();
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn predict_errors_are_input_errors() {
        let err: AppError = PredictError::MissingFeature("gpa".to_string()).into();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("gpa"));
    }
}
