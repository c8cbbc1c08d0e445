#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/volregime/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cache;
pub mod error;
pub mod fetcher;
pub mod notify;
pub mod provider;
pub mod series;
pub mod yahoo;

pub use error::{DataError, Result};
pub use fetcher::{FetchConfig, FetchError, ResilientFetcher};
pub use notify::{Advisory, FailureReason, Notifier, NotifyError, TracingNotifier};
pub use provider::{PriceProvider, ProviderError, is_rate_limit_message};
pub use series::{DataRange, PricePoint, PriceSeries};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
