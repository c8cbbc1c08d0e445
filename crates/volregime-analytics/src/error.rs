//! Error types for regime statistics.
//!
//! All of them are data-quality or programming errors: callers surface them
//! immediately and never retry.

use polars::prelude::PolarsError;
use thiserror::Error;

/// Result type for analytics operations.
pub type Result<T> = std::result::Result<T, AnalyticsError>;

/// Errors that can occur while deriving regime statistics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalyticsError {
    /// Malformed argument, e.g. a non-positive price or a window below 2
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Not enough observations for the statistic
    #[error("Insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Required number of observations
        required: usize,
        /// Actual number of observations
        actual: usize,
    },

    /// Dataframe computation failed
    #[error("Computation failed: {0}")]
    Compute(String),
}

impl From<PolarsError> for AnalyticsError {
    fn from(err: PolarsError) -> Self {
        Self::Compute(err.to_string())
    }
}
