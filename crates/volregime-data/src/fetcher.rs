//! Resilient price fetching with bounded retries.
//!
//! [`ResilientFetcher`] wraps a [`PriceProvider`] in an explicit attempt loop.
//! Each attempt ends in success or in one of three misses (empty result,
//! throttled, other error), and the miss decides how long to wait before the
//! next attempt:
//!
//! | before attempt | previous miss | wait |
//! |---|---|---|
//! | 0 | - | `politeness_delay` |
//! | n >= 1 | empty / other error | `base_backoff * 2^n` |
//! | n >= 1 | rate limited | none (the throttle wait already ran) |
//!
//! A rate-limited attempt `n` that still has budget waits
//! `rate_limit_base * 2^n` right away, which is a separate, larger backoff
//! family than the generic one.
//!
//! Every wait is a `tokio` timer. Dropping the returned future cancels the
//! fetch mid-backoff, so callers can bound total latency with
//! `tokio::time::timeout`.

use crate::notify::{Advisory, FailureReason, Notifier, TracingNotifier};
use crate::provider::{PriceProvider, ProviderError, truncate_chars};
use crate::series::PriceSeries;
use chrono::{Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Failure of a [`ResilientFetcher::fetch`] call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Provider kept throttling. The message is deliberately generic.
    #[error("Market data rate limit reached; wait 1-2 minutes and try again")]
    RateLimited,

    /// Provider or network failure on every attempt.
    #[error("Error downloading data: {message}")]
    Provider {
        /// Provider diagnostic, at most 100 characters
        message: String,
    },

    /// Provider answered but had no prices for the symbol.
    #[error("No price data returned for {symbol}")]
    NoData {
        /// Requested symbol
        symbol: String,
    },

    /// Symbol is unusable. Not retried.
    #[error("Invalid symbol: {0:?}")]
    InvalidSymbol(String),
}

impl FetchError {
    /// Failure class reported to notifiers.
    pub const fn reason(&self) -> FailureReason {
        match self {
            Self::RateLimited => FailureReason::RateLimited,
            Self::Provider { .. } | Self::InvalidSymbol(_) => FailureReason::ProviderError,
            Self::NoData { .. } => FailureReason::NoData,
        }
    }

    /// Detail safe to show to a user. Rate limits never carry one.
    pub fn detail(&self) -> Option<String> {
        match self {
            Self::Provider { message } => Some(message.clone()),
            Self::InvalidSymbol(symbol) => Some(format!("invalid symbol {symbol:?}")),
            Self::RateLimited | Self::NoData { .. } => None,
        }
    }
}

/// Retry and backoff settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Total attempts including the first (default: 3)
    pub max_attempts: u32,
    /// Wait before the very first request (default: 500ms)
    pub politeness_delay: Duration,
    /// Generic backoff base; attempt `n` waits `base * 2^n` (default: 3s)
    pub base_backoff: Duration,
    /// Rate-limit backoff base; throttled attempt `n` waits `base * 2^n` (default: 5s)
    pub rate_limit_base: Duration,
    /// Lookback used as a last resort when the final attempt comes back
    /// empty. `None` disables the fallback. (default: 5 years)
    pub fallback_lookback_years: Option<u32>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            politeness_delay: Duration::from_millis(500),
            base_backoff: Duration::from_secs(3),
            rate_limit_base: Duration::from_secs(5),
            fallback_lookback_years: Some(5),
        }
    }
}

impl FetchConfig {
    /// Config with a different attempt budget.
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }

    /// Generic backoff before attempt `attempt` (>= 1).
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_backoff.saturating_mul(1 << attempt.min(16))
    }

    /// Wait after a throttled attempt `attempt`.
    pub fn rate_limit_wait(&self, attempt: u32) -> Duration {
        self.rate_limit_base.saturating_mul(1 << attempt.min(16))
    }
}

/// Outcome of one attempt that did not produce prices.
#[derive(Debug)]
enum Miss {
    Empty,
    RateLimited,
    Other(String),
}

impl From<ProviderError> for Miss {
    fn from(err: ProviderError) -> Self {
        if err.is_rate_limited() {
            Self::RateLimited
        } else {
            Self::Other(err.message)
        }
    }
}

/// Fetches a [`PriceSeries`] with bounded retries and exponential backoff.
#[derive(Debug)]
pub struct ResilientFetcher<P, N = TracingNotifier> {
    provider: P,
    notifier: N,
    config: FetchConfig,
}

impl<P: PriceProvider> ResilientFetcher<P, TracingNotifier> {
    /// Fetcher with default settings that reports advisories through `tracing`.
    pub fn new(provider: P) -> Self {
        Self::with_notifier(provider, TracingNotifier)
    }
}

impl<P: PriceProvider, N: Notifier> ResilientFetcher<P, N> {
    /// Fetcher with default settings and a custom notifier.
    pub fn with_notifier(provider: P, notifier: N) -> Self {
        Self {
            provider,
            notifier,
            config: FetchConfig::default(),
        }
    }

    /// Replace the retry settings.
    pub fn with_config(mut self, config: FetchConfig) -> Self {
        self.config = config;
        self
    }

    /// Current retry settings.
    pub const fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Fetch daily closes for `symbol` since `start`.
    ///
    /// # Errors
    /// Returns [`FetchError`] once the attempt budget is spent, or immediately
    /// for an empty symbol. A failed fetch is never an empty series.
    pub async fn fetch(&self, symbol: &str, start: NaiveDate) -> Result<PriceSeries, FetchError> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(FetchError::InvalidSymbol(symbol.to_string()));
        }

        let max_attempts = self.config.max_attempts.max(1);
        let mut advised = false;
        let mut previous: Option<Miss> = None;

        for attempt in 0..max_attempts {
            let delay = match (attempt, &previous) {
                (0, _) => self.config.politeness_delay,
                (_, Some(Miss::RateLimited)) => Duration::ZERO,
                _ => self.config.backoff(attempt),
            };
            pause(delay).await;

            let is_last = attempt + 1 == max_attempts;
            debug!(symbol, attempt, %start, "requesting daily closes");

            let mut miss = match self.request(symbol, start).await {
                Ok(series) => {
                    info!(symbol, attempt, points = series.len(), "fetched price series");
                    return Ok(series);
                }
                Err(miss) => miss,
            };

            if is_last && matches!(miss, Miss::Empty) {
                if let Some(fallback_start) = self.fallback_start(start) {
                    debug!(symbol, %fallback_start, "final attempt empty, trying shorter lookback");
                    pause(self.config.politeness_delay).await;
                    match self.request(symbol, fallback_start).await {
                        Ok(series) => return Ok(series),
                        Err(fallback_miss) => miss = fallback_miss,
                    }
                }
            }

            match &miss {
                Miss::Empty => debug!(symbol, attempt, "provider returned no prices"),
                Miss::RateLimited if !is_last => {
                    let wait = self.config.rate_limit_wait(attempt);
                    warn!(
                        symbol,
                        attempt,
                        wait_secs = wait.as_secs_f64(),
                        "rate limited, backing off"
                    );
                    if !advised {
                        self.advise(&Advisory::RateLimitRetry { wait });
                        advised = true;
                    }
                    pause(wait).await;
                }
                Miss::RateLimited => {}
                Miss::Other(message) => {
                    debug!(symbol, attempt, error = %message, "provider error");
                }
            }

            previous = Some(miss);
        }

        let err = match previous {
            Some(Miss::RateLimited) => FetchError::RateLimited,
            Some(Miss::Other(message)) => FetchError::Provider {
                message: truncate_chars(&message, crate::provider::MAX_DIAGNOSTIC_CHARS),
            },
            Some(Miss::Empty) | None => FetchError::NoData {
                symbol: symbol.to_string(),
            },
        };
        warn!(symbol, error = %err, "giving up after {max_attempts} attempts");
        self.advise(&Advisory::FetchFailed {
            reason: err.reason(),
            detail: err.detail(),
        });
        Err(err)
    }

    async fn request(&self, symbol: &str, start: NaiveDate) -> Result<PriceSeries, Miss> {
        let points = self.provider.daily_closes(symbol, start).await?;
        if points.is_empty() {
            return Err(Miss::Empty);
        }
        PriceSeries::new(symbol, points).map_err(|e| Miss::Other(e.to_string()))
    }

    /// Start of the last-resort window, if it is shorter than the request.
    fn fallback_start(&self, start: NaiveDate) -> Option<NaiveDate> {
        let years = self.config.fallback_lookback_years?;
        let fallback = Utc::now()
            .date_naive()
            .checked_sub_months(Months::new(years.saturating_mul(12)))?;
        (fallback > start).then_some(fallback)
    }

    fn advise(&self, advisory: &Advisory) {
        if let Err(err) = self.notifier.notify(advisory) {
            debug!(%err, "discarding undeliverable advisory");
        }
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        sleep(delay).await;
    }
}
