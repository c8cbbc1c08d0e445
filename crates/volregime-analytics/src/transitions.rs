//! Regime Transition Matrix
//!
//! Empirical first-order Markov estimate of day-to-day regime changes. Only
//! adjacent pairs where both days are labeled count; a pair that touches an
//! unlabeled day is dropped rather than treated as staying put.
//!
//! Rows and columns always follow [`RegimeLabel::ALL`]. A label that never
//! starts a valid pair gets an all-zero row, which means "no estimate" and is
//! not a probability distribution.

use crate::classifier::{RegimeLabel, RegimeSeries};
use crate::error::{AnalyticsError, Result};
use serde::{Deserialize, Serialize};

const N: usize = RegimeLabel::ALL.len();

/// Regime transition counts and row-normalized probabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionMatrix {
    counts: [[u64; N]; N],
    probabilities: [[f64; N]; N],
}

impl TransitionMatrix {
    /// Build from raw counts, normalizing each row by its total.
    pub fn from_counts(counts: [[u64; N]; N]) -> Self {
        let mut probabilities = [[0.0; N]; N];
        for (row, counts_row) in probabilities.iter_mut().zip(&counts) {
            let total: u64 = counts_row.iter().sum();
            if total > 0 {
                for (p, &c) in row.iter_mut().zip(counts_row) {
                    *p = c as f64 / total as f64;
                }
            }
        }
        Self {
            counts,
            probabilities,
        }
    }

    /// Probability of moving from `from` to `to` on the next day.
    pub const fn probability(&self, from: RegimeLabel, to: RegimeLabel) -> f64 {
        self.probabilities[from.index()][to.index()]
    }

    /// Outgoing probabilities for `from` in [`RegimeLabel::ALL`] order.
    pub const fn row(&self, from: RegimeLabel) -> [f64; N] {
        self.probabilities[from.index()]
    }

    /// Observed `from -> to` pairs.
    pub const fn count(&self, from: RegimeLabel, to: RegimeLabel) -> u64 {
        self.counts[from.index()][to.index()]
    }

    /// Valid pairs starting in `from`.
    pub fn row_total(&self, from: RegimeLabel) -> u64 {
        self.counts[from.index()].iter().sum()
    }

    /// Whether the row for `from` is an estimate rather than all-zero.
    pub fn has_estimate(&self, from: RegimeLabel) -> bool {
        self.row_total(from) > 0
    }

    /// All valid adjacent pairs counted.
    pub fn total_transitions(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    /// Probability of staying in `label`, `None` without an estimate.
    pub fn persistence(&self, label: RegimeLabel) -> Option<f64> {
        self.has_estimate(label)
            .then(|| self.probability(label, label))
    }

    /// Expected run length in days implied by [`Self::persistence`],
    /// `1 / (1 - p)`. `None` without an estimate or for an absorbing regime.
    pub fn expected_duration(&self, label: RegimeLabel) -> Option<f64> {
        let stay = self.persistence(label)?;
        (stay < 1.0).then(|| 1.0 / (1.0 - stay))
    }

    /// Full probability table, rows are "from" and columns "to".
    pub const fn probabilities(&self) -> &[[f64; N]; N] {
        &self.probabilities
    }

    /// Full count table, rows are "from" and columns "to".
    pub const fn counts(&self) -> &[[u64; N]; N] {
        &self.counts
    }
}

/// Estimate the regime transition matrix.
///
/// # Errors
/// Returns [`AnalyticsError::InsufficientData`] if fewer than two days are
/// labeled, since no pair can exist.
pub fn estimate_transitions(regimes: &RegimeSeries) -> Result<TransitionMatrix> {
    let labeled = regimes.classified_count();
    if labeled < 2 {
        return Err(AnalyticsError::InsufficientData {
            required: 2,
            actual: labeled,
        });
    }

    let mut counts = [[0_u64; N]; N];
    for pair in regimes.points().windows(2) {
        if let (Some(from), Some(to)) = (pair[0].label, pair[1].label) {
            counts[from.index()][to.index()] += 1;
        }
    }

    Ok(TransitionMatrix::from_counts(counts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::RegimePoint;
    use RegimeLabel::{High, Low, Medium};
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn regimes(labels: &[Option<RegimeLabel>]) -> RegimeSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        RegimeSeries::from_points(
            labels
                .iter()
                .enumerate()
                .map(|(i, &label)| RegimePoint {
                    date: start + chrono::Days::new(i as u64),
                    label,
                })
                .collect(),
        )
    }

    #[test]
    fn test_alternating_low_medium() {
        let matrix =
            estimate_transitions(&regimes(&[Some(Low), Some(Medium), Some(Low), Some(Medium)]))
                .unwrap();

        // pairs: L->M, M->L, L->M
        assert_eq!(matrix.count(Low, Medium), 2);
        assert_eq!(matrix.count(Medium, Low), 1);
        assert_eq!(matrix.total_transitions(), 3);

        assert_eq!(matrix.row(Low), [0.0, 1.0, 0.0]);
        // the terminal Medium has no successor, so its row rests on one pair
        assert_eq!(matrix.row(Medium), [1.0, 0.0, 0.0]);
        assert_eq!(matrix.row(High), [0.0, 0.0, 0.0]);
        assert!(!matrix.has_estimate(High));
    }

    #[test]
    fn test_rows_sum_to_one_or_zero() {
        let matrix = estimate_transitions(&regimes(&[
            Some(Low),
            Some(Low),
            Some(Medium),
            Some(High),
            Some(High),
            Some(Medium),
            Some(Low),
        ]))
        .unwrap();

        for label in RegimeLabel::ALL {
            let sum: f64 = matrix.row(label).iter().sum();
            if matrix.has_estimate(label) {
                assert_relative_eq!(sum, 1.0, epsilon = 1e-12);
            } else {
                assert_eq!(sum, 0.0);
            }
        }
        assert_relative_eq!(matrix.probability(Medium, High), 0.5);
        assert_relative_eq!(matrix.probability(Medium, Low), 0.5);
    }

    #[test]
    fn test_pairs_touching_gaps_are_excluded() {
        let matrix = estimate_transitions(&regimes(&[
            Some(Low),
            None,
            Some(High),
            Some(High),
            None,
            Some(Low),
        ]))
        .unwrap();

        assert_eq!(matrix.total_transitions(), 1);
        assert_eq!(matrix.count(High, High), 1);
        assert_eq!(matrix.count(Low, Low), 0);
        assert!(!matrix.has_estimate(Low));
    }

    #[test]
    fn test_persistence_and_expected_duration() {
        let matrix = estimate_transitions(&regimes(&[
            Some(Low),
            Some(Low),
            Some(Low),
            Some(Low),
            Some(High),
        ]))
        .unwrap();

        // Low -> Low three times, Low -> High once
        assert_relative_eq!(matrix.persistence(Low).unwrap(), 0.75);
        assert_relative_eq!(matrix.expected_duration(Low).unwrap(), 4.0);
        assert_eq!(matrix.persistence(High), None);
    }

    #[test]
    fn test_insufficient_data() {
        let result = estimate_transitions(&regimes(&[None, Some(Low), None]));
        assert_eq!(
            result,
            Err(AnalyticsError::InsufficientData {
                required: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_two_labels_separated_by_gap_yield_empty_matrix() {
        let matrix = estimate_transitions(&regimes(&[Some(Low), None, Some(High)])).unwrap();
        assert_eq!(matrix.total_transitions(), 0);
        for label in RegimeLabel::ALL {
            assert!(!matrix.has_estimate(label));
        }
    }
}
