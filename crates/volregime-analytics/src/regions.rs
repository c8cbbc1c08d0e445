//! Contiguous regime regions for chart shading.

use crate::classifier::{RegimeLabel, RegimePoint, RegimeSeries};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A maximal run of consecutive days sharing one regime.
///
/// `start..end` indexes the regime series (end exclusive). `end_date` is the
/// date at `end` when the run is followed by another day, so shading spans up
/// to the next boundary; the terminal region ends on its own last date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// Regime shared by every day in the run
    pub label: RegimeLabel,
    /// Index of the first day
    pub start: usize,
    /// Index one past the last day
    pub end: usize,
    /// First date of the run
    pub start_date: NaiveDate,
    /// Exclusive end date (see type docs)
    pub end_date: NaiveDate,
}

impl Region {
    /// Number of trading days in the run, always at least one.
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Always `false`; regions are never empty.
    pub const fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

/// Iterator over the regions of a regime series.
///
/// Cheap to clone, so a caller can restart the scan at any time.
#[derive(Debug, Clone)]
pub struct Regions<'a> {
    points: &'a [RegimePoint],
    position: usize,
}

impl Iterator for Regions<'_> {
    type Item = Region;

    fn next(&mut self) -> Option<Region> {
        let points = self.points;

        // a gap closes the current region and emits nothing itself
        while points.get(self.position)?.label.is_none() {
            self.position += 1;
        }

        let start = self.position;
        let label = points[start].label?;
        let end = points[start..]
            .iter()
            .position(|p| p.label != Some(label))
            .map_or(points.len(), |offset| start + offset);
        self.position = end;

        let end_date = points.get(end).unwrap_or(&points[end - 1]).date;
        Some(Region {
            label,
            start,
            end,
            start_date: points[start].date,
            end_date,
        })
    }
}

/// Split a regime series into maximal same-label runs.
///
/// A run ends when the label changes or an unlabeled day appears. Adjacent
/// regions separated by a gap may share a label; regions that touch never do.
pub fn extract_regions(regimes: &RegimeSeries) -> Regions<'_> {
    Regions {
        points: regimes.points(),
        position: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use RegimeLabel::{High, Low, Medium};

    fn date(i: usize) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(i as u64)
    }

    fn regimes(labels: &[Option<RegimeLabel>]) -> RegimeSeries {
        RegimeSeries::from_points(
            labels
                .iter()
                .enumerate()
                .map(|(i, &label)| RegimePoint {
                    date: date(i),
                    label,
                })
                .collect(),
        )
    }

    fn spans(series: &RegimeSeries) -> Vec<(RegimeLabel, usize, usize)> {
        extract_regions(series)
            .map(|r| (r.label, r.start, r.end))
            .collect()
    }

    #[test]
    fn test_label_changes_split_regions() {
        let series = regimes(&[
            Some(Low),
            Some(Low),
            Some(Medium),
            Some(High),
            Some(High),
            Some(Medium),
        ]);

        assert_eq!(
            spans(&series),
            vec![(Low, 0, 2), (Medium, 2, 3), (High, 3, 5), (Medium, 5, 6)]
        );
    }

    #[test]
    fn test_region_dates() {
        let series = regimes(&[Some(Low), Some(Low), Some(High)]);
        let regions: Vec<Region> = extract_regions(&series).collect();

        assert_eq!(regions[0].start_date, date(0));
        assert_eq!(regions[0].end_date, date(2));
        // terminal region ends on its own last date
        assert_eq!(regions[1].start_date, date(2));
        assert_eq!(regions[1].end_date, date(2));
        assert_eq!(regions[1].len(), 1);
    }

    #[test]
    fn test_gap_breaks_region() {
        let series = regimes(&[
            None,
            Some(Low),
            Some(Low),
            None,
            None,
            Some(Low),
            Some(High),
            None,
        ]);

        assert_eq!(spans(&series), vec![(Low, 1, 3), (Low, 5, 6), (High, 6, 7)]);
        let regions: Vec<Region> = extract_regions(&series).collect();
        assert_eq!(regions[0].end_date, date(3));
        assert_eq!(regions[2].end_date, date(7));
    }

    #[test]
    fn test_empty_and_all_missing() {
        assert!(spans(&regimes(&[])).is_empty());
        assert!(spans(&regimes(&[None, None])).is_empty());
    }

    #[test]
    fn test_iterator_is_restartable() {
        let series = regimes(&[Some(Low), Some(High), Some(High)]);
        let regions = extract_regions(&series);

        let first: Vec<Region> = regions.clone().collect();
        let second: Vec<Region> = regions.collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }
}
