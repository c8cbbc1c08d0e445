//! Market data provider boundary.

use crate::series::PricePoint;
use chrono::NaiveDate;
use std::future::Future;
use thiserror::Error;

/// Maximum length of provider diagnostics surfaced to users.
pub const MAX_DIAGNOSTIC_CHARS: usize = 100;

/// Markers that identify a throttling response in provider error text.
const RATE_LIMIT_MARKERS: [&str; 4] = ["rate limit", "too many requests", "429", "rate limited"];

/// A source of daily closing prices.
///
/// Implementations return the raw series as the provider delivers it. An empty
/// vector is a valid answer and means "no data, but no error either".
pub trait PriceProvider {
    /// Fetch daily closing prices for `symbol` from `start` until today.
    fn daily_closes(
        &self,
        symbol: &str,
        start: NaiveDate,
    ) -> impl Future<Output = Result<Vec<PricePoint>, ProviderError>>;
}

impl<P: PriceProvider + ?Sized> PriceProvider for &P {
    fn daily_closes(
        &self,
        symbol: &str,
        start: NaiveDate,
    ) -> impl Future<Output = Result<Vec<PricePoint>, ProviderError>> {
        (**self).daily_closes(symbol, start)
    }
}

/// Error reported by a [`PriceProvider`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ProviderError {
    /// Raw provider message
    pub message: String,
    /// HTTP status code, when the provider exposes one
    pub status: Option<u16>,
}

impl ProviderError {
    /// Error carrying only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }

    /// Error carrying a message and an HTTP status code.
    pub fn with_status(message: impl Into<String>, status: u16) -> Self {
        Self {
            message: message.into(),
            status: Some(status),
        }
    }

    /// Whether this error signals throttling.
    ///
    /// A 429 status, or throttle wording in the message whatever the status
    /// (see [`is_rate_limit_message`]).
    pub fn is_rate_limited(&self) -> bool {
        self.status == Some(429) || is_rate_limit_message(&self.message)
    }

    /// Message cut down to [`MAX_DIAGNOSTIC_CHARS`] characters.
    pub fn diagnostic(&self) -> String {
        truncate_chars(&self.message, MAX_DIAGNOSTIC_CHARS)
    }
}

/// Heuristic rate-limit detection on free-form provider error text.
///
/// Case-insensitive substring match against a fixed set of markers. This is
/// brittle: a provider rewording its messages silently disables it, so prefer
/// a status code via [`ProviderError::with_status`] whenever one is available.
pub fn is_rate_limit_message(message: &str) -> bool {
    let lowered = message.to_lowercase();
    RATE_LIMIT_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
}

/// Truncate on a character boundary.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
