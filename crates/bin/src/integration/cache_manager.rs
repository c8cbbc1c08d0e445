//! Cache manager for price data.
//!
//! Opens the SQLite price cache at a platform-specific default location.

use std::path::PathBuf;
use volregime_data::DataError;
use volregime_data::cache::PriceCache;

/// Get the default cache directory path.
///
/// Uses platform-specific cache directories:
/// - Linux: `~/.cache/volregime/`
/// - macOS: `~/Library/Caches/volregime/`
/// - Windows: `%LOCALAPPDATA%\volregime\`
pub(crate) fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("volregime")
}

/// Get the cache database path.
pub(crate) fn cache_path() -> PathBuf {
    default_cache_dir().join("volregime.db")
}

/// Open the cache, creating the directory if needed.
pub(crate) fn open_cache() -> Result<PriceCache, DataError> {
    let path = cache_path();

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    PriceCache::new(&path)
}
