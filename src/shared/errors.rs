//! Error handling for the application

use thiserror::Error;

/// A raw record that cannot become a `Product`
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("missing or empty field: {0}")]
    MissingField(&'static str),
}

/// Failure inside one section of a trend report
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("non-finite {field} for product {product_id}")]
    NonFiniteValue {
        field: &'static str,
        product_id: String,
    },

    #[error("statistic could not be computed: {0}")]
    CalculationFailed(String),
}

/// Alert registration errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlertError {
    #[error("invalid alert type: {0} (expected below, above or change)")]
    InvalidAlertType(String),

    #[error("invalid alert target: {0}")]
    InvalidTarget(f64),

    #[error("invalid alert: {0} (expected product_id:type:target)")]
    InvalidFormat(String),
}

/// General application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Sink error: {0}")]
    SinkError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Alert error: {0}")]
    Alert(#[from] AlertError),
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}
