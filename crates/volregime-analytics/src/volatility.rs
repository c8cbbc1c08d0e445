//! Rolling Annualized Volatility
//!
//! Sample standard deviation of log returns over a trailing window, scaled by
//! `sqrt(252)`. Positions without a full window are explicitly missing rather
//! than zero, so a short history can never masquerade as a calm market.

use crate::error::{AnalyticsError, Result};
use crate::returns::ReturnSeries;
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Assumed trading days per year.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Annualized volatility for one trading day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolatilityPoint {
    /// Trading date
    pub date: NaiveDate,
    /// Annualized volatility, `None` while the window is still filling
    pub value: Option<f64>,
}

/// Rolling volatility aligned one-to-one with the return series it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolatilitySeries {
    window: usize,
    points: Vec<VolatilityPoint>,
}

impl VolatilitySeries {
    /// Wrap precomputed volatility values.
    pub const fn from_points(window: usize, points: Vec<VolatilityPoint>) -> Self {
        Self { window, points }
    }

    /// Rolling window length in days.
    pub const fn window(&self) -> usize {
        self.window
    }

    /// All points in date order, including the missing prefix.
    pub fn points(&self) -> &[VolatilityPoint] {
        &self.points
    }

    /// Non-missing values in date order.
    pub fn defined_values(&self) -> Vec<f64> {
        self.points.iter().filter_map(|p| p.value).collect()
    }

    /// Number of points, missing ones included.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Compute rolling annualized volatility.
///
/// `vol[t] = stdev(returns[t-window+1..=t]) * sqrt(252)` with the sample
/// (n-1) standard deviation. The first `window - 1` points are missing; if the
/// window is longer than the series, every point is.
///
/// # Errors
/// Returns [`AnalyticsError::InvalidInput`] if `window < 2`.
pub fn compute_volatility(returns: &ReturnSeries, window: usize) -> Result<VolatilitySeries> {
    if window < 2 {
        return Err(AnalyticsError::InvalidInput(format!(
            "volatility window must be at least 2, got {window}"
        )));
    }

    if returns.len() < window {
        let points = returns
            .points()
            .iter()
            .map(|p| VolatilityPoint {
                date: p.date,
                value: None,
            })
            .collect();
        return Ok(VolatilitySeries { window, points });
    }

    let rolling_std = col("returns").rolling_std(RollingOptionsFixedWindow {
        window_size: window,
        min_periods: window,
        ..Default::default()
    });
    let frame = DataFrame::new(vec![Series::new("returns".into(), returns.values()).into()])?
        .lazy()
        .select([(rolling_std * lit(TRADING_DAYS_PER_YEAR.sqrt())).alias("volatility")])
        .collect()?;
    let values = frame.column("volatility")?.f64()?;

    let points = returns
        .points()
        .iter()
        .zip(values.iter())
        .map(|(point, value)| VolatilityPoint {
            date: point.date,
            // a flat window can round to a tiny negative variance
            value: value.map(|v| v.max(0.0)),
        })
        .collect();

    Ok(VolatilitySeries { window, points })
}
