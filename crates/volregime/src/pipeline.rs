//! End-to-end regime analysis.
//!
//! Runs the fixed chain fetch, returns, volatility, classification and then
//! regions, transitions and summary, keeping every intermediate series so
//! callers can chart or export any of them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use volregime_analytics::{
    AnalyticsError, ClassifierConfig, Region, RegimeLabel, RegimeSeries, RegimeSummary,
    ReturnSeries, TransitionMatrix, VolatilitySeries, classify_with, compute_returns,
    compute_volatility, estimate_transitions, extract_regions, summarize,
};
use volregime_data::{DataRange, FetchError, Notifier, PriceProvider, PriceSeries, ResilientFetcher};
use volregime_output::{RegimeRecord, RegimeReport, RegionRecord, ReportBuilder, ReportError};

/// Default first date of the requested history.
pub const DEFAULT_START_DATE: NaiveDate = match NaiveDate::from_ymd_opt(2010, 1, 1) {
    Some(date) => date,
    None => NaiveDate::MIN,
};

/// Default rolling volatility window in trading days.
pub const DEFAULT_WINDOW: usize = 30;

/// Window lengths offered to users. Any window of at least two days works.
pub const SUGGESTED_WINDOWS: [usize; 3] = [20, 30, 60];

/// Errors from a full analysis run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Prices could not be obtained
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Prices were obtained but could not be analyzed
    #[error("Analysis failed: {0}")]
    Analytics(#[from] AnalyticsError),
}

/// Configuration for a regime analysis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// First date of price history to request (default: 2010-01-01)
    pub start_date: NaiveDate,
    /// Rolling volatility window in trading days (default: 30)
    pub window: usize,
    /// Regime quantiles (default: 0.33 / 0.67)
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            start_date: DEFAULT_START_DATE,
            window: DEFAULT_WINDOW,
            classifier: ClassifierConfig::default(),
        }
    }
}

/// Every stage of one regime analysis.
#[derive(Debug, Clone)]
pub struct RegimeAnalysis {
    config: AnalysisConfig,
    prices: PriceSeries,
    returns: ReturnSeries,
    volatility: VolatilitySeries,
    regimes: RegimeSeries,
    regions: Vec<Region>,
    transitions: TransitionMatrix,
    summary: RegimeSummary,
    data_range: DataRange,
}

impl RegimeAnalysis {
    /// Fetch prices and analyze them.
    ///
    /// # Errors
    /// Returns [`PipelineError::Fetch`] if the fetch fails, in which case no
    /// analysis runs, or [`PipelineError::Analytics`] as for
    /// [`Self::from_prices`].
    pub async fn run<P, N>(
        fetcher: &ResilientFetcher<P, N>,
        symbol: &str,
        config: &AnalysisConfig,
    ) -> Result<Self, PipelineError>
    where
        P: PriceProvider,
        N: Notifier,
    {
        let prices = fetcher.fetch(symbol, config.start_date).await?;
        Ok(Self::from_prices(prices, config)?)
    }

    /// Analyze an already obtained price series.
    ///
    /// # Errors
    /// Returns [`AnalyticsError`] for invalid prices or window, or a history
    /// too short to yield two volatility observations.
    pub fn from_prices(
        prices: PriceSeries,
        config: &AnalysisConfig,
    ) -> Result<Self, AnalyticsError> {
        let returns = compute_returns(&prices)?;
        let volatility = compute_volatility(&returns, config.window)?;
        let regimes = classify_with(&volatility, &config.classifier)?;
        let regions: Vec<Region> = extract_regions(&regimes).collect();
        let transitions = estimate_transitions(&regimes)?;
        let summary = summarize(&regimes);
        let data_range = prices
            .range()
            .ok_or(AnalyticsError::InsufficientData {
                required: 1,
                actual: 0,
            })?;

        info!(
            symbol = prices.symbol(),
            trading_days = data_range.trading_days,
            window = config.window,
            classified = summary.total(),
            regions = regions.len(),
            "regime analysis complete"
        );

        Ok(Self {
            config: *config,
            prices,
            returns,
            volatility,
            regimes,
            regions,
            transitions,
            summary,
            data_range,
        })
    }

    /// Analyzed symbol.
    pub fn symbol(&self) -> &str {
        self.prices.symbol()
    }

    /// Settings the analysis ran with.
    pub const fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Input closes.
    pub const fn prices(&self) -> &PriceSeries {
        &self.prices
    }

    /// Daily log returns.
    pub const fn returns(&self) -> &ReturnSeries {
        &self.returns
    }

    /// Rolling annualized volatility.
    pub const fn volatility(&self) -> &VolatilitySeries {
        &self.volatility
    }

    /// Regime per day.
    pub const fn regimes(&self) -> &RegimeSeries {
        &self.regimes
    }

    /// Contiguous regime regions.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Regime transition matrix.
    pub const fn transitions(&self) -> &TransitionMatrix {
        &self.transitions
    }

    /// Regime occupancy.
    pub const fn summary(&self) -> &RegimeSummary {
        &self.summary
    }

    /// First and last date plus trading day count of the input prices.
    pub const fn data_range(&self) -> &DataRange {
        &self.data_range
    }

    /// Most recent regime and its date.
    pub fn current_regime(&self) -> Option<(NaiveDate, RegimeLabel)> {
        self.regimes.current()
    }

    /// Per-day rows for export.
    pub fn records(&self) -> Vec<RegimeRecord> {
        RegimeRecord::from_series(&self.volatility, &self.regimes)
    }

    /// Region rows for export.
    pub fn region_records(&self) -> Vec<RegionRecord> {
        self.regions.iter().copied().map(Into::into).collect()
    }

    /// Render-ready report.
    ///
    /// # Errors
    /// Returns [`ReportError`] if the report cannot be assembled.
    pub fn report(&self) -> Result<RegimeReport, ReportError> {
        ReportBuilder::new()
            .symbol(self.symbol())
            .window(self.config.window)
            .data_range(self.data_range)
            .regimes(&self.regimes)
            .region_count(self.regions.len())
            .summary(self.summary.clone())
            .transitions(self.transitions.clone())
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use volregime_data::PricePoint;

    fn prices(closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        PriceSeries::new(
            "TEST",
            closes
                .iter()
                .enumerate()
                .map(|(i, &p)| PricePoint::new(start + chrono::Days::new(i as u64), p))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();
        assert_eq!(config.start_date, NaiveDate::from_ymd_opt(2010, 1, 1).unwrap());
        assert_eq!(config.window, 30);
        assert!(SUGGESTED_WINDOWS.contains(&config.window));
    }

    #[test]
    fn test_config_deserializes_without_classifier() {
        let config: AnalysisConfig =
            serde_json::from_str(r#"{"start_date":"2015-06-01","window":20}"#).unwrap();
        assert_eq!(config.window, 20);
        assert_eq!(config.classifier, ClassifierConfig::default());
    }

    #[test]
    fn test_short_scenario() {
        let config = AnalysisConfig {
            window: 2,
            ..AnalysisConfig::default()
        };
        let analysis =
            RegimeAnalysis::from_prices(prices(&[100.0, 101.0, 99.0, 102.0, 105.0, 103.0]), &config)
                .unwrap();

        assert_eq!(analysis.returns().len(), 5);
        assert_eq!(analysis.volatility().defined_values().len(), 4);
        assert_eq!(analysis.summary().total(), 4);
        assert_eq!(analysis.data_range().trading_days, 6);
        assert_eq!(
            analysis.current_regime().map(|(date, _)| date),
            NaiveDate::from_ymd_opt(2024, 1, 6)
        );
        assert_eq!(analysis.records().len(), 5);
        let days: usize = analysis.region_records().iter().map(|r| r.days).sum();
        assert_eq!(days, 4);
    }

    #[test]
    fn test_history_shorter_than_window() {
        let result =
            RegimeAnalysis::from_prices(prices(&[100.0, 101.0, 102.0]), &AnalysisConfig::default());
        assert!(matches!(
            result,
            Err(AnalyticsError::InsufficientData { actual: 0, .. })
        ));
    }

    #[test]
    fn test_invalid_window() {
        let config = AnalysisConfig {
            window: 1,
            ..AnalysisConfig::default()
        };
        let result = RegimeAnalysis::from_prices(prices(&[100.0, 101.0, 102.0]), &config);
        assert!(matches!(result, Err(AnalyticsError::InvalidInput(_))));
    }

    #[test]
    fn test_report_matches_analysis() {
        let config = AnalysisConfig {
            window: 2,
            ..AnalysisConfig::default()
        };
        let analysis =
            RegimeAnalysis::from_prices(prices(&[100.0, 101.0, 99.0, 102.0, 105.0, 103.0]), &config)
                .unwrap();
        let report = analysis.report().unwrap();

        assert_eq!(report.symbol, "TEST");
        assert_eq!(report.window, 2);
        assert_eq!(&report.summary, analysis.summary());
        assert_eq!(report.region_count, analysis.regions().len());
    }
}
