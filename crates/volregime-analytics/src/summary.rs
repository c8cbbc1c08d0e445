//! Regime occupancy summary.

use crate::classifier::{RegimeLabel, RegimeSeries};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Occupancy of one regime.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RegimeStats {
    /// Labeled days in this regime
    pub count: usize,
    /// Share of labeled days, in percent
    pub percentage: f64,
}

/// Count and share of days spent in each regime.
///
/// Every label is present, including ones with zero days. Percentages are
/// taken over labeled days only, so they sum to 100 unless nothing was labeled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeSummary {
    total: usize,
    stats: BTreeMap<RegimeLabel, RegimeStats>,
}

impl RegimeSummary {
    /// Number of labeled days.
    pub const fn total(&self) -> usize {
        self.total
    }

    /// Occupancy of `label`.
    pub fn get(&self, label: RegimeLabel) -> RegimeStats {
        self.stats.get(&label).copied().unwrap_or_default()
    }

    /// Per-regime occupancy in severity order.
    pub fn iter(&self) -> impl Iterator<Item = (RegimeLabel, RegimeStats)> + '_ {
        self.stats.iter().map(|(&label, &stats)| (label, stats))
    }

    /// Regime with the most days, ties going to the calmer regime.
    pub fn dominant(&self) -> Option<RegimeLabel> {
        if self.total == 0 {
            return None;
        }
        self.stats
            .iter()
            .rev()
            .max_by_key(|(_, stats)| stats.count)
            .map(|(&label, _)| label)
    }
}

/// Summarize how many days fall in each regime.
pub fn summarize(regimes: &RegimeSeries) -> RegimeSummary {
    let mut counts = [0_usize; RegimeLabel::ALL.len()];
    for label in regimes.points().iter().filter_map(|p| p.label) {
        counts[label.index()] += 1;
    }
    let total: usize = counts.iter().sum();

    let stats = RegimeLabel::ALL
        .into_iter()
        .map(|label| {
            let count = counts[label.index()];
            let percentage = if total == 0 {
                0.0
            } else {
                count as f64 / total as f64 * 100.0
            };
            (label, RegimeStats { count, percentage })
        })
        .collect();

    RegimeSummary { total, stats }
}
