#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/volregime/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod pipeline;

// Re-export main types from sub-crates
pub use volregime_analytics as analytics;
pub use volregime_data as data;
pub use volregime_output as output;

pub use pipeline::{
    AnalysisConfig, DEFAULT_START_DATE, DEFAULT_WINDOW, PipelineError, RegimeAnalysis,
    SUGGESTED_WINDOWS,
};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
