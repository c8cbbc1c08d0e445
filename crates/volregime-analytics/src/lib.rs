#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/volregime/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod classifier;
pub mod error;
pub mod quantile;
pub mod regions;
pub mod returns;
pub mod summary;
pub mod transitions;
pub mod volatility;

pub use classifier::{
    ClassifierConfig, RegimeLabel, RegimePoint, RegimeSeries, RegimeThresholds, classify,
    classify_with,
};
pub use error::{AnalyticsError, Result};
pub use quantile::{quantile, quantiles};
pub use regions::{Region, Regions, extract_regions};
pub use returns::{ReturnPoint, ReturnSeries, compute_returns};
pub use summary::{RegimeStats, RegimeSummary, summarize};
pub use transitions::{TransitionMatrix, estimate_transitions};
pub use volatility::{
    TRADING_DAYS_PER_YEAR, VolatilityPoint, VolatilitySeries, compute_volatility,
};
