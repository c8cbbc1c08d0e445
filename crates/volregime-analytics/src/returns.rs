//! Daily log returns.

use crate::error::{AnalyticsError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use volregime_data::PriceSeries;

/// Log return for one trading day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnPoint {
    /// Trading date the return ends on
    pub date: NaiveDate,
    /// `ln(price[t] / price[t-1])`
    pub value: f64,
}

/// Daily log returns, one entry shorter than the price series they come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnSeries {
    points: Vec<ReturnPoint>,
}

impl ReturnSeries {
    /// Wrap precomputed returns. Dates are assumed to be increasing.
    pub const fn from_points(points: Vec<ReturnPoint>) -> Self {
        Self { points }
    }

    /// All returns in date order.
    pub fn points(&self) -> &[ReturnPoint] {
        &self.points
    }

    /// Return values without dates.
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Number of returns.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether there are no returns.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Compute daily log returns. The first date is dropped since it has no
/// antecedent.
///
/// # Errors
/// Returns [`AnalyticsError::InvalidInput`] if any price is non-positive or
/// non-finite. The whole series is rejected; offending points are never
/// silently dropped.
pub fn compute_returns(prices: &PriceSeries) -> Result<ReturnSeries> {
    if let Some(bad) = prices
        .points()
        .iter()
        .find(|p| !(p.price.is_finite() && p.price > 0.0))
    {
        return Err(AnalyticsError::InvalidInput(format!(
            "price on {} must be positive and finite, got {}",
            bad.date, bad.price
        )));
    }

    let points = prices
        .points()
        .windows(2)
        .map(|w| ReturnPoint {
            date: w[1].date,
            value: (w[1].price / w[0].price).ln(),
        })
        .collect();

    Ok(ReturnSeries { points })
}
