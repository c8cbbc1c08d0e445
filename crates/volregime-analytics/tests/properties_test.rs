//! End-to-end checks of the analytics chain on seeded random walks.

#![allow(missing_docs)]

use approx::assert_relative_eq;
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rstest::rstest;
use volregime_analytics::{
    RegimeLabel, RegimePoint, RegimeSeries, classify, compute_returns, compute_volatility,
    estimate_transitions, extract_regions, quantile, summarize,
};
use volregime_data::{PricePoint, PriceSeries};

fn price_series(prices: &[f64]) -> PriceSeries {
    let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    let points = prices
        .iter()
        .enumerate()
        .map(|(i, &p)| PricePoint::new(start + chrono::Days::new(i as u64), p))
        .collect();
    PriceSeries::new("SYN", points).unwrap()
}

fn random_walk(seed: u64, days: usize) -> PriceSeries {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut price = 100.0;
    let prices: Vec<f64> = (0..days)
        .map(|_| {
            price *= (rng.gen_range(-0.03..0.03_f64)).exp();
            price
        })
        .collect();
    price_series(&prices)
}

/// Regions rebuild the labeled days exactly, and touching regions differ.
fn assert_regions_partition(regimes: &RegimeSeries) {
    let regions: Vec<_> = extract_regions(regimes).collect();

    let rebuilt: Vec<(usize, RegimeLabel)> = regions
        .iter()
        .flat_map(|r| (r.start..r.end).map(move |i| (i, r.label)))
        .collect();
    let labeled: Vec<(usize, RegimeLabel)> = regimes
        .points()
        .iter()
        .enumerate()
        .filter_map(|(i, p)| Some((i, p.label?)))
        .collect();
    assert_eq!(rebuilt, labeled);

    for region in &regions {
        assert_eq!(region.start_date, regimes.points()[region.start].date);
    }
    for pair in regions.windows(2) {
        if pair[0].end == pair[1].start {
            assert_ne!(pair[0].label, pair[1].label);
        }
    }
}

/// Labels in random-length runs, with interior unlabeled stretches.
fn random_labels(seed: u64, days: usize) -> RegimeSeries {
    let mut rng = StdRng::seed_from_u64(seed);
    let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    let mut points = Vec::with_capacity(days);
    while points.len() < days {
        let label = match rng.gen_range(0..4) {
            0 => None,
            n => Some(RegimeLabel::ALL[n - 1]),
        };
        for _ in 0..rng.gen_range(1..6) {
            if points.len() == days {
                break;
            }
            points.push(RegimePoint {
                date: start + chrono::Days::new(points.len() as u64),
                label,
            });
        }
    }
    RegimeSeries::from_points(points)
}

#[test]
fn test_short_series_chain() {
    let prices = price_series(&[100.0, 101.0, 99.0, 102.0, 105.0, 103.0]);

    let returns = compute_returns(&prices).unwrap();
    assert_eq!(returns.len(), 5);

    let vol = compute_volatility(&returns, 2).unwrap();
    assert_eq!(vol.len(), 5);
    assert_eq!(vol.points()[0].value, None);
    assert!(vol.points()[1..].iter().all(|p| p.value.is_some()));

    let defined = vol.defined_values();
    assert_eq!(defined.len(), 4);

    let regimes = classify(&vol).unwrap();
    let thresholds = regimes.thresholds().unwrap();
    assert_relative_eq!(thresholds.low, quantile(&defined, 0.33).unwrap());
    assert_relative_eq!(thresholds.high, quantile(&defined, 0.67).unwrap());
    assert_eq!(regimes.classified_count(), 4);
}

#[rstest]
#[case(1, 20)]
#[case(7, 30)]
#[case(42, 60)]
fn test_random_walk_invariants(#[case] seed: u64, #[case] window: usize) {
    let prices = random_walk(seed, 400);
    let returns = compute_returns(&prices).unwrap();
    assert_eq!(returns.len(), prices.len() - 1);

    let vol = compute_volatility(&returns, window).unwrap();
    assert_eq!(vol.len(), returns.len());
    let missing = vol.points().iter().take_while(|p| p.value.is_none()).count();
    assert_eq!(missing, window - 1);
    assert!(vol.defined_values().iter().all(|v| *v >= 0.0));

    // labels are monotone in volatility
    let regimes = classify(&vol).unwrap();
    let mut pairs: Vec<(f64, RegimeLabel)> = vol
        .points()
        .iter()
        .zip(regimes.points())
        .filter_map(|(v, r)| Some((v.value?, r.label?)))
        .collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
    assert!(pairs.windows(2).all(|w| w[0].1 <= w[1].1));

    assert_regions_partition(&regimes);

    let matrix = estimate_transitions(&regimes).unwrap();
    for label in RegimeLabel::ALL {
        let sum: f64 = matrix.row(label).iter().sum();
        if matrix.has_estimate(label) {
            assert_relative_eq!(sum, 1.0, epsilon = 1e-9);
        } else {
            assert_eq!(sum, 0.0);
        }
    }
    // gap-free after the prefix, so every adjacent labeled pair counts
    assert_eq!(
        matrix.total_transitions() as usize,
        regimes.classified_count() - 1
    );

    let summary = summarize(&regimes);
    assert_eq!(summary.total(), regimes.classified_count());
    let share: f64 = summary.iter().map(|(_, s)| s.percentage).sum();
    assert_relative_eq!(share, 100.0, epsilon = 1e-9);
}

#[rstest]
#[case(3, 50)]
#[case(11, 200)]
#[case(2024, 500)]
fn test_regions_and_transitions_with_gaps(#[case] seed: u64, #[case] days: usize) {
    let regimes = random_labels(seed, days);
    assert_regions_partition(&regimes);

    // a pair counts only when both days are labeled
    let labeled_pairs = regimes
        .points()
        .windows(2)
        .filter(|w| w[0].label.is_some() && w[1].label.is_some())
        .count();
    match estimate_transitions(&regimes) {
        Ok(matrix) => assert_eq!(matrix.total_transitions() as usize, labeled_pairs),
        Err(_) => assert!(regimes.classified_count() < 2),
    }
}

#[test]
fn test_pipeline_is_deterministic() {
    let prices = random_walk(99, 250);
    let run = || {
        let returns = compute_returns(&prices).unwrap();
        let vol = compute_volatility(&returns, 30).unwrap();
        let regimes = classify(&vol).unwrap();
        let transitions = estimate_transitions(&regimes).unwrap();
        (regimes, transitions)
    };

    assert_eq!(run(), run());
}

#[test]
fn test_window_longer_than_history_cannot_classify() {
    let prices = random_walk(3, 20);
    let returns = compute_returns(&prices).unwrap();
    let vol = compute_volatility(&returns, 30).unwrap();

    assert!(vol.defined_values().is_empty());
    assert!(classify(&vol).is_err());
}
