//! SQLite caching layer for fetched price series.

use crate::error::{DataError, Result};
use crate::series::{PricePoint, PriceSeries};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default time-to-live for cached series (2 hours).
pub const DEFAULT_TTL: Duration = Duration::from_secs(2 * 60 * 60);

/// SQLite cache of price series keyed by symbol and requested start date.
///
/// Entries older than the TTL are treated as absent but left in place until
/// overwritten or cleared.
#[derive(Debug)]
pub struct PriceCache {
    conn: Connection,
    ttl: Duration,
}

impl PriceCache {
    /// Open (or create) a cache at `path` with the default TTL.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let cache = Self {
            conn,
            ttl: DEFAULT_TTL,
        };
        cache.initialize_schema()?;
        Ok(cache)
    }

    /// Create an in-memory cache (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let cache = Self {
            conn,
            ttl: DEFAULT_TTL,
        };
        cache.initialize_schema()?;
        Ok(cache)
    }

    /// Replace the time-to-live.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Current time-to-live.
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    fn initialize_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS price_series (
                symbol TEXT NOT NULL,
                start_date TEXT NOT NULL,
                data TEXT NOT NULL,
                points INTEGER NOT NULL,
                cached_at TEXT NOT NULL,
                PRIMARY KEY (symbol, start_date)
            )",
            [],
        )?;
        Ok(())
    }

    /// Cached series for `symbol` requested from `start`, if one is fresh.
    pub fn get(&self, symbol: &str, start: NaiveDate) -> Result<Option<PriceSeries>> {
        self.get_at(symbol, start, Utc::now())
    }

    fn get_at(
        &self,
        symbol: &str,
        start: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Option<PriceSeries>> {
        let row: Option<(String, String)> = self
            .conn
            .query_row(
                "SELECT data, cached_at FROM price_series
                 WHERE symbol = ?1 AND start_date = ?2",
                params![symbol, start.to_string()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((data, cached_at)) = row else {
            return Ok(None);
        };

        let cached_at = DateTime::parse_from_rfc3339(&cached_at)
            .map_err(|e| DataError::Parse(format!("Invalid cached_at timestamp: {}", e)))?
            .with_timezone(&Utc);
        let age = now.signed_duration_since(cached_at);
        let ttl = chrono::Duration::from_std(self.ttl)
            .map_err(|e| DataError::TimeConversion(e.to_string()))?;
        if age > ttl {
            return Ok(None);
        }

        let points: Vec<PricePoint> = serde_json::from_str(&data)?;
        PriceSeries::new(symbol, points).map(Some)
    }

    /// Store a series fetched from `start`, replacing any previous entry.
    pub fn put(&self, start: NaiveDate, series: &PriceSeries) -> Result<()> {
        self.put_at(start, series, Utc::now())
    }

    fn put_at(&self, start: NaiveDate, series: &PriceSeries, now: DateTime<Utc>) -> Result<()> {
        let data = serde_json::to_string(series.points())?;
        self.conn.execute(
            "INSERT OR REPLACE INTO price_series (symbol, start_date, data, points, cached_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                series.symbol(),
                start.to_string(),
                data,
                series.len() as i64,
                timestamp(now),
            ],
        )?;
        Ok(())
    }

    /// Remove every entry for `symbol`.
    pub fn clear_symbol(&self, symbol: &str) -> Result<()> {
        self.conn.execute(
            "DELETE FROM price_series WHERE symbol = ?1",
            params![symbol],
        )?;
        Ok(())
    }

    /// Remove all cached data.
    pub fn clear_all(&self) -> Result<()> {
        self.conn.execute("DELETE FROM price_series", [])?;
        Ok(())
    }

    /// Entry counts, fresh and total.
    pub fn get_stats(&self) -> Result<CacheStats> {
        self.get_stats_at(Utc::now())
    }

    fn get_stats_at(&self, now: DateTime<Utc>) -> Result<CacheStats> {
        let ttl = chrono::Duration::from_std(self.ttl)
            .map_err(|e| DataError::TimeConversion(e.to_string()))?;
        let cutoff = timestamp(now - ttl);

        let (entries, symbols, points): (i64, i64, Option<i64>) = self.conn.query_row(
            "SELECT COUNT(*), COUNT(DISTINCT symbol), SUM(points) FROM price_series",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;
        let fresh_entries: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM price_series WHERE cached_at >= ?1",
            params![cutoff],
            |row| row.get(0),
        )?;

        Ok(CacheStats {
            entries: entries as usize,
            fresh_entries: fresh_entries as usize,
            symbols: symbols as usize,
            price_points: points.unwrap_or(0) as usize,
        })
    }
}

/// Fixed-width RFC 3339 so stored timestamps compare correctly as text.
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Stored series, fresh or not
    pub entries: usize,
    /// Series still within the TTL
    pub fresh_entries: usize,
    /// Distinct symbols
    pub symbols: usize,
    /// Total stored price points
    pub price_points: usize,
}
