//! Glue between the command line and the volregime crates.

pub(crate) mod cache_manager;
pub(crate) mod data_pipeline;
pub(crate) mod terminal_notifier;
