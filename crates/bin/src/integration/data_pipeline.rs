//! Cache-aware price loading.
//!
//! Serves a fresh cached series when one exists, otherwise fetches through
//! the resilient fetcher and stores the result. Cache trouble never fails the
//! run; it only costs a network round trip.

use chrono::NaiveDate;
use indicatif::ProgressBar;
use tracing::{debug, warn};
use volregime_data::cache::PriceCache;
use volregime_data::{FetchError, Notifier, PriceProvider, PriceSeries, ResilientFetcher};

/// How the cache participates in a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CacheMode {
    /// Whether to use the cache at all.
    pub(crate) use_cache: bool,
    /// Whether to skip cached reads (results are still stored).
    pub(crate) force_refresh: bool,
}

impl Default for CacheMode {
    fn default() -> Self {
        Self {
            use_cache: true,
            force_refresh: false,
        }
    }
}

/// Load closes for `symbol`, consulting `cache` first.
pub(crate) async fn load_prices<P, N>(
    fetcher: &ResilientFetcher<P, N>,
    cache: Option<&PriceCache>,
    symbol: &str,
    start: NaiveDate,
    mode: CacheMode,
    progress: Option<&ProgressBar>,
) -> Result<PriceSeries, FetchError>
where
    P: PriceProvider,
    N: Notifier,
{
    let cache = cache.filter(|_| mode.use_cache);

    if let Some(cache) = cache.filter(|_| !mode.force_refresh) {
        match cache.get(symbol, start) {
            Ok(Some(series)) => {
                debug!(symbol, points = series.len(), "cache hit");
                if let Some(pb) = progress {
                    pb.set_message("Loading from cache...");
                }
                return Ok(series);
            }
            Ok(None) => debug!(symbol, "cache miss"),
            Err(e) => warn!(symbol, error = %e, "cache read failed"),
        }
    }

    if let Some(pb) = progress {
        pb.set_message(format!("Fetching {symbol} from Yahoo Finance..."));
    }
    let series = fetcher.fetch(symbol, start).await?;

    if let Some(cache) = cache
        && let Err(e) = cache.put(start, &series)
    {
        warn!(symbol, error = %e, "failed to cache prices");
    }

    Ok(series)
}
