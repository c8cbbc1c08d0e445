//! Daily closes from Yahoo Finance.

use crate::error::DataError;
use crate::provider::{PriceProvider, ProviderError};
use crate::series::{PricePoint, PriceSeries};
use chrono::{DateTime, NaiveDate};
use yahoo_finance_api as yahoo;

/// Yahoo Finance implementation of [`PriceProvider`].
///
/// Returns adjusted closes. A single request per call; retrying and pacing are
/// the job of [`ResilientFetcher`](crate::fetcher::ResilientFetcher).
pub struct YahooQuoteProvider {
    provider: yahoo::YahooConnector,
}

impl std::fmt::Debug for YahooQuoteProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YahooQuoteProvider").finish_non_exhaustive()
    }
}

impl YahooQuoteProvider {
    /// Create a new Yahoo Finance quote provider.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new() -> Result<Self, ProviderError> {
        let provider =
            yahoo::YahooConnector::new().map_err(|e| ProviderError::new(e.to_string()))?;
        Ok(Self { provider })
    }

    async fn fetch_points(
        &self,
        symbol: &str,
        start: NaiveDate,
    ) -> Result<Vec<PricePoint>, ProviderError> {
        let start_time = to_offset_datetime(start).map_err(|e| ProviderError::new(e.to_string()))?;
        let end_time = time::OffsetDateTime::now_utc();
        if start_time > end_time {
            return Ok(Vec::new());
        }

        let response = self
            .provider
            .get_quote_history(symbol, start_time, end_time)
            .await
            .map_err(|e| ProviderError::new(e.to_string()))?;

        let quotes = response
            .quotes()
            .map_err(|e| ProviderError::new(e.to_string()))?;

        let mut points = Vec::with_capacity(quotes.len());
        for quote in &quotes {
            let date = session_date(quote.timestamp)?;
            // Yahoo occasionally pads a series with empty bars
            if quote.adjclose.is_finite() && quote.adjclose > 0.0 {
                points.push(PricePoint::new(date, quote.adjclose));
            }
        }

        // Intraday refreshes can duplicate the latest session
        Ok(PriceSeries::from_unordered(symbol, points).points().to_vec())
    }
}

impl PriceProvider for YahooQuoteProvider {
    async fn daily_closes(
        &self,
        symbol: &str,
        start: NaiveDate,
    ) -> Result<Vec<PricePoint>, ProviderError> {
        self.fetch_points(symbol, start).await
    }
}

/// UTC calendar date of a bar's unix timestamp.
fn session_date(timestamp: i64) -> Result<NaiveDate, ProviderError> {
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.date_naive())
        .ok_or_else(|| ProviderError::new(format!("bad timestamp: {timestamp}")))
}

/// Midnight UTC of `date` as a `time` timestamp, as `yahoo_finance_api` expects.
fn to_offset_datetime(date: NaiveDate) -> Result<time::OffsetDateTime, DataError> {
    let timestamp = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| DataError::TimeConversion(format!("invalid date {date}")))?
        .and_utc()
        .timestamp();
    time::OffsetDateTime::from_unix_timestamp(timestamp)
        .map_err(|e| DataError::TimeConversion(e.to_string()))
}
