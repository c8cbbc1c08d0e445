//! Caching layer for fetched price series.

pub mod sqlite;

pub use sqlite::{CacheStats, DEFAULT_TTL, PriceCache};
