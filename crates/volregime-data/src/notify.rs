//! Advisories surfaced to the UI layer while fetching.
//!
//! Delivery is best-effort: the fetcher catches and discards any
//! [`NotifyError`], so a broken UI channel never fails a fetch.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, warn};

/// Why a fetch ultimately failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    /// Provider kept throttling until the attempt budget ran out
    RateLimited,
    /// Any other provider or network error
    ProviderError,
    /// Provider answered without error but returned no prices
    NoData,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::RateLimited => "rate limited",
            Self::ProviderError => "provider error",
            Self::NoData => "no data",
        };
        f.write_str(text)
    }
}

/// A user-facing event emitted by the fetcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Advisory {
    /// Throttled; the fetcher is waiting before retrying. Emitted at most
    /// once per fetch.
    RateLimitRetry {
        /// How long the fetcher will wait
        wait: Duration,
    },
    /// The fetch gave up.
    FetchFailed {
        /// Failure class
        reason: FailureReason,
        /// Sanitized, truncated provider detail. Never set for rate limits.
        detail: Option<String>,
    },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RateLimitRetry { wait } => {
                write!(f, "Rate limited. Retrying in {} seconds...", wait.as_secs())
            }
            Self::FetchFailed {
                reason: FailureReason::RateLimited,
                ..
            } => f.write_str(
                "Market data rate limit reached. Please wait 1-2 minutes and try again.",
            ),
            Self::FetchFailed {
                reason,
                detail: Some(detail),
            } => write!(f, "Could not load data ({reason}): {detail}"),
            Self::FetchFailed {
                reason,
                detail: None,
            } => write!(f, "Could not load data ({reason})"),
        }
    }
}

/// Error raised by a notifier that could not deliver an advisory.
#[derive(Debug, Error)]
#[error("notification failed: {0}")]
pub struct NotifyError(pub String);

impl From<std::io::Error> for NotifyError {
    fn from(err: std::io::Error) -> Self {
        Self(err.to_string())
    }
}

/// Receiver of fetch advisories.
pub trait Notifier {
    /// Deliver an advisory.
    fn notify(&self, advisory: &Advisory) -> Result<(), NotifyError>;
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn notify(&self, advisory: &Advisory) -> Result<(), NotifyError> {
        (**self).notify(advisory)
    }
}

/// Notifier that forwards advisories to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, advisory: &Advisory) -> Result<(), NotifyError> {
        match advisory {
            Advisory::RateLimitRetry { .. } => warn!("{advisory}"),
            Advisory::FetchFailed { .. } => error!("{advisory}"),
        }
        Ok(())
    }
}
