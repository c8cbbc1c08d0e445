//! Daily price series.

use crate::error::{DataError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single daily closing price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Trading date
    pub date: NaiveDate,
    /// Closing price (adjusted for splits and dividends when the provider offers it)
    pub price: f64,
}

impl PricePoint {
    /// Create a new price point.
    pub const fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }
}

/// Ordered daily closing prices for one instrument.
///
/// Dates are strictly increasing. The series is immutable once built; every
/// downstream stage derives new series from it instead of editing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPriceSeries")]
pub struct PriceSeries {
    symbol: String,
    points: Vec<PricePoint>,
}

/// Unvalidated wire form, checked through [`PriceSeries::new`].
#[derive(Deserialize)]
struct RawPriceSeries {
    symbol: String,
    points: Vec<PricePoint>,
}

impl TryFrom<RawPriceSeries> for PriceSeries {
    type Error = DataError;

    fn try_from(raw: RawPriceSeries) -> Result<Self> {
        Self::new(raw.symbol, raw.points)
    }
}

impl PriceSeries {
    /// Build a series, rejecting duplicate or out-of-order dates.
    ///
    /// Price positivity is not checked here; return computation rejects
    /// non-positive prices because that is where the logarithm is taken.
    pub fn new(symbol: impl Into<String>, points: Vec<PricePoint>) -> Result<Self> {
        let symbol = symbol.into();
        if let Some(pair) = points.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(DataError::InvalidSeries {
                symbol,
                reason: format!(
                    "dates must be strictly increasing, found {} followed by {}",
                    pair[0].date, pair[1].date
                ),
            });
        }
        Ok(Self { symbol, points })
    }

    /// Build a series from unordered points: sorts by date and keeps the last
    /// point seen for any repeated date.
    pub fn from_unordered(symbol: impl Into<String>, mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|p| p.date);
        // dedup_by keeps the first of a run; reverse so the latest quote wins
        points.reverse();
        points.dedup_by_key(|p| p.date);
        points.reverse();
        Self {
            symbol: symbol.into(),
            points,
        }
    }

    /// Instrument symbol.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// All points in date order.
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Number of trading days.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First and last date plus trading day count, `None` for an empty series.
    pub fn range(&self) -> Option<DataRange> {
        let first = self.points.first()?;
        let last = self.points.last()?;
        Some(DataRange {
            start: first.date,
            end: last.date,
            trading_days: self.points.len(),
        })
    }

    /// Most recent closing price.
    pub fn last_price(&self) -> Option<f64> {
        self.points.last().map(|p| p.price)
    }
}

/// Span of dates covered by a price series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataRange {
    /// First trading date
    pub start: NaiveDate,
    /// Last trading date
    pub end: NaiveDate,
    /// Number of trading days in the series
    pub trading_days: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn test_new_accepts_increasing_dates() {
        let series = PriceSeries::new(
            "SPY",
            vec![PricePoint::new(date(2), 100.0), PricePoint::new(date(3), 101.0)],
        )
        .unwrap();

        assert_eq!(series.symbol(), "SPY");
        assert_eq!(series.len(), 2);
        assert_eq!(series.last_price(), Some(101.0));
    }

    #[test]
    fn test_new_rejects_duplicate_dates() {
        let result = PriceSeries::new(
            "SPY",
            vec![PricePoint::new(date(2), 100.0), PricePoint::new(date(2), 101.0)],
        );
        assert!(matches!(result, Err(DataError::InvalidSeries { .. })));
    }

    #[test]
    fn test_new_rejects_decreasing_dates() {
        let result = PriceSeries::new(
            "SPY",
            vec![PricePoint::new(date(3), 100.0), PricePoint::new(date(2), 101.0)],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_from_unordered_sorts_and_keeps_latest_duplicate() {
        let series = PriceSeries::from_unordered(
            "SPY",
            vec![
                PricePoint::new(date(4), 104.0),
                PricePoint::new(date(2), 100.0),
                PricePoint::new(date(2), 100.5),
                PricePoint::new(date(3), 103.0),
            ],
        );

        let prices: Vec<f64> = series.points().iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![100.5, 103.0, 104.0]);
    }

    #[test]
    fn test_range() {
        let series = PriceSeries::new(
            "SPY",
            vec![
                PricePoint::new(date(2), 100.0),
                PricePoint::new(date(3), 101.0),
                PricePoint::new(date(5), 99.0),
            ],
        )
        .unwrap();

        let range = series.range().unwrap();
        assert_eq!(range.start, date(2));
        assert_eq!(range.end, date(5));
        assert_eq!(range.trading_days, 3);

        let empty = PriceSeries::new("SPY", vec![]).unwrap();
        assert!(empty.range().is_none());
    }

    #[test]
    fn test_deserialize_validates_order() {
        let json = |first: &str, second: &str| {
            serde_json::json!({
                "symbol": "SPY",
                "points": [
                    { "date": first, "price": 1.0 },
                    { "date": second, "price": 2.0 },
                ],
            })
        };

        let series: PriceSeries = serde_json::from_value(json("2024-01-02", "2024-01-03")).unwrap();
        assert_eq!(series.len(), 2);

        let bad = json("2024-01-03", "2024-01-02").to_string();
        assert!(serde_json::from_str::<PriceSeries>(&bad).is_err());
    }
}
