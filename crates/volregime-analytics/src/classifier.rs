//! Regime Classification
//!
//! Partitions a volatility series into three ordinal regimes using the
//! series' own empirical quantiles:
//!
//! 1. Compute `p33` and `p67` once over every non-missing value
//! 2. Label each day: `vol <= p33` is Low, `vol <= p67` is Medium, otherwise High
//! 3. Days without a volatility value stay unlabeled
//!
//! When volatility is nearly constant `p33 == p67` and the Medium band
//! collapses to a single point. That is valid output, not an error.

use crate::error::{AnalyticsError, Result};
use crate::quantile::quantiles;
use crate::volatility::VolatilitySeries;
use chrono::NaiveDate;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Minimum number of volatility observations needed for quantiles.
pub const MIN_OBSERVATIONS: usize = 2;

/// Volatility regime, ordered by increasing severity.
#[derive(
    Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum RegimeLabel {
    /// Bottom third of the volatility distribution
    Low,
    /// Middle third
    Medium,
    /// Top third
    High,
}

impl RegimeLabel {
    /// All labels in severity order. This is also the fixed row and column
    /// order of the transition matrix.
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    /// Position of this label in [`RegimeLabel::ALL`].
    pub const fn index(self) -> usize {
        match self {
            Self::Low => 0,
            Self::Medium => 1,
            Self::High => 2,
        }
    }
}

/// Configuration for quantile classification
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Upper quantile of the Low band (default: 0.33)
    pub low_quantile: f64,
    /// Upper quantile of the Medium band (default: 0.67)
    pub high_quantile: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            low_quantile: 0.33,
            high_quantile: 0.67,
        }
    }
}

impl ClassifierConfig {
    fn validate(&self) -> Result<()> {
        let in_range = |q: f64| (0.0..=1.0).contains(&q);
        if !in_range(self.low_quantile) || !in_range(self.high_quantile) {
            return Err(AnalyticsError::InvalidInput(
                "quantiles must lie in [0, 1]".to_string(),
            ));
        }
        if self.low_quantile > self.high_quantile {
            return Err(AnalyticsError::InvalidInput(
                "low_quantile must not exceed high_quantile".to_string(),
            ));
        }
        Ok(())
    }
}

/// Volatility cut points used for one classification pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegimeThresholds {
    /// Upper bound (inclusive) of the Low band
    pub low: f64,
    /// Upper bound (inclusive) of the Medium band
    pub high: f64,
}

impl RegimeThresholds {
    /// Label a single volatility value.
    pub fn label_for(&self, volatility: f64) -> RegimeLabel {
        if volatility <= self.low {
            RegimeLabel::Low
        } else if volatility <= self.high {
            RegimeLabel::Medium
        } else {
            RegimeLabel::High
        }
    }

    /// Whether the Medium band has collapsed to a single point.
    pub fn is_degenerate(&self) -> bool {
        self.low == self.high
    }
}

/// Regime label for one trading day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegimePoint {
    /// Trading date
    pub date: NaiveDate,
    /// Regime, `None` where volatility is missing
    pub label: Option<RegimeLabel>,
}

/// Regime labels aligned one-to-one with a volatility series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeSeries {
    thresholds: Option<RegimeThresholds>,
    points: Vec<RegimePoint>,
}

impl RegimeSeries {
    /// Build a series from labels produced elsewhere. It carries no
    /// thresholds.
    pub const fn from_points(points: Vec<RegimePoint>) -> Self {
        Self {
            thresholds: None,
            points,
        }
    }

    /// Thresholds used by [`classify`], if this series came from it.
    pub const fn thresholds(&self) -> Option<&RegimeThresholds> {
        self.thresholds.as_ref()
    }

    /// All points in date order, unlabeled ones included.
    pub fn points(&self) -> &[RegimePoint] {
        &self.points
    }

    /// Labels without dates.
    pub fn labels(&self) -> Vec<Option<RegimeLabel>> {
        self.points.iter().map(|p| p.label).collect()
    }

    /// Number of labeled days.
    pub fn classified_count(&self) -> usize {
        self.points.iter().filter(|p| p.label.is_some()).count()
    }

    /// Most recent labeled day.
    pub fn current(&self) -> Option<(NaiveDate, RegimeLabel)> {
        self.points
            .iter()
            .rev()
            .find_map(|p| p.label.map(|label| (p.date, label)))
    }

    /// Number of points, unlabeled ones included.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Classify volatility into regimes with the default 33rd/67th percentiles.
///
/// # Errors
/// Returns [`AnalyticsError::InsufficientData`] if fewer than two volatility
/// values are defined.
pub fn classify(volatility: &VolatilitySeries) -> Result<RegimeSeries> {
    classify_with(volatility, &ClassifierConfig::default())
}

/// Classify volatility into regimes with custom quantiles.
///
/// # Errors
/// Returns [`AnalyticsError::InvalidInput`] for quantiles outside `[0, 1]` or
/// out of order, and [`AnalyticsError::InsufficientData`] if fewer than two
/// volatility values are defined.
pub fn classify_with(
    volatility: &VolatilitySeries,
    config: &ClassifierConfig,
) -> Result<RegimeSeries> {
    config.validate()?;

    let defined = volatility.defined_values();
    if defined.len() < MIN_OBSERVATIONS {
        return Err(AnalyticsError::InsufficientData {
            required: MIN_OBSERVATIONS,
            actual: defined.len(),
        });
    }
    if defined.iter().any(|v| v.is_nan()) {
        return Err(AnalyticsError::InvalidInput(
            "volatility contains NaN".to_string(),
        ));
    }

    let [low, high] = quantiles(&defined, [config.low_quantile, config.high_quantile])?;
    let thresholds = RegimeThresholds { low, high };
    debug!(
        low = thresholds.low,
        high = thresholds.high,
        observations = defined.len(),
        "regime thresholds"
    );

    let points = volatility
        .points()
        .iter()
        .map(|p| RegimePoint {
            date: p.date,
            label: p.value.map(|v| thresholds.label_for(v)),
        })
        .collect();

    Ok(RegimeSeries {
        thresholds: Some(thresholds),
        points,
    })
}
