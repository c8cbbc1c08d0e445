//! Error types for data operations.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while building, caching or converting price data.
///
/// Failures of the retrying fetch itself are reported through
/// [`FetchError`](crate::fetcher::FetchError) instead.
#[derive(Debug, Error)]
pub enum DataError {
    /// Price series violates its ordering invariant
    #[error("Invalid price series for {symbol}: {reason}")]
    InvalidSeries {
        /// Symbol the series belongs to
        symbol: String,
        /// What was wrong with it
        reason: String,
    },

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Data parsing error
    #[error("Data parsing error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Time conversion error
    #[error("Time conversion error: {0}")]
    TimeConversion(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
