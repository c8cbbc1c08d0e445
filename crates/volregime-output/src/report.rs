//! Report generation for regime analyses.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use volregime_analytics::{
    RegimeLabel, RegimeSeries, RegimeSummary, RegimeThresholds, TransitionMatrix,
};
use volregime_data::DataRange;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A required section was never supplied to the builder.
    #[error("Report is missing its {0}")]
    MissingSection(&'static str),
}

/// Most recent classified day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentRegime {
    /// Trading date
    pub date: NaiveDate,
    /// Regime on that date
    pub regime: RegimeLabel,
}

/// A finished regime analysis for one symbol, ready to render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeReport {
    /// Symbol being analyzed.
    pub symbol: String,

    /// Report generation timestamp.
    pub timestamp: DateTime<Utc>,

    /// Price history the analysis covers.
    pub data_range: Option<DataRange>,

    /// Rolling volatility window in trading days.
    pub window: usize,

    /// Volatility cut points between regimes.
    pub thresholds: Option<RegimeThresholds>,

    /// Latest regime.
    pub current: Option<CurrentRegime>,

    /// Number of contiguous regime regions.
    pub region_count: usize,

    /// Occupancy per regime.
    pub summary: RegimeSummary,

    /// Day-to-day transition probabilities.
    pub transitions: TransitionMatrix,
}

impl RegimeReport {
    /// Convert report to JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Format as ASCII table for terminal display.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("\nVolatility Regimes: {}\n", self.symbol));
        if let Some(range) = &self.data_range {
            output.push_str(&format!(
                "Data: {} to {} ({} trading days), {}-day window\n",
                range.start, range.end, range.trading_days, self.window
            ));
        } else {
            output.push_str(&format!("{}-day window\n", self.window));
        }
        output.push_str(&"=".repeat(60));
        output.push('\n');

        if let Some(current) = &self.current {
            output.push_str(&format!(
                "  Current regime:   {} (as of {})\n",
                current.regime, current.date
            ));
        }
        if let Some(thresholds) = &self.thresholds {
            output.push_str(&format!(
                "  Low/Medium cut:   {:.2}%\n",
                thresholds.low * 100.0
            ));
            output.push_str(&format!(
                "  Medium/High cut:  {:.2}%\n",
                thresholds.high * 100.0
            ));
        }
        output.push_str(&format!("  Regions:          {}\n", self.region_count));

        output.push_str("\nRegime Distribution:\n");
        output.push_str(&"-".repeat(60));
        output.push('\n');
        output.push_str(&format!("{:<10} {:>10} {:>12}\n", "Regime", "Days", "% of Days"));
        for (label, stats) in self.summary.iter() {
            output.push_str(&format!(
                "{:<10} {:>10} {:>11.1}%\n",
                label.to_string(),
                stats.count,
                stats.percentage
            ));
        }

        output.push_str("\nTransition Probabilities (row = today, column = tomorrow):\n");
        output.push_str(&"-".repeat(60));
        output.push('\n');
        output.push_str(&format!("{:<10}", "From"));
        for to in RegimeLabel::ALL {
            output.push_str(&format!(" {:>10}", to.to_string()));
        }
        output.push_str(&format!(" {:>10}\n", "Pairs"));
        for from in RegimeLabel::ALL {
            output.push_str(&format!("{:<10}", from.to_string()));
            for p in self.transitions.row(from) {
                output.push_str(&format!(" {:>10.3}", p));
            }
            output.push_str(&format!(" {:>10}\n", self.transitions.row_total(from)));
        }

        output.push_str(&"=".repeat(60));
        output.push('\n');

        output
    }

    /// Format as Markdown for documentation.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("# Volatility Regimes: {}\n\n", self.symbol));
        if let Some(range) = &self.data_range {
            output.push_str(&format!(
                "**Data:** {} to {} ({} trading days), {}-day window\n\n",
                range.start, range.end, range.trading_days, self.window
            ));
        }
        if let Some(current) = &self.current {
            output.push_str(&format!(
                "**Current regime:** {} (as of {})\n\n",
                current.regime, current.date
            ));
        }
        if let Some(thresholds) = &self.thresholds {
            output.push_str(&format!(
                "- **Low/Medium cut:** {:.2}%\n- **Medium/High cut:** {:.2}%\n\n",
                thresholds.low * 100.0,
                thresholds.high * 100.0
            ));
        }

        output.push_str("## Regime Distribution\n\n");
        output.push_str("| Regime | Days | % of Days |\n");
        output.push_str("|--------|------|-----------|\n");
        for (label, stats) in self.summary.iter() {
            output.push_str(&format!(
                "| {} | {} | {:.1}% |\n",
                label, stats.count, stats.percentage
            ));
        }

        output.push_str("\n## Transition Probabilities\n\n");
        output.push_str("| From \\ To | Low | Medium | High |\n");
        output.push_str("|-----------|-----|--------|------|\n");
        for from in RegimeLabel::ALL {
            let [low, medium, high] = self.transitions.row(from);
            output.push_str(&format!(
                "| {} | {:.3} | {:.3} | {:.3} |\n",
                from, low, medium, high
            ));
        }

        output
    }
}

impl fmt::Display for RegimeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_ascii_table())
    }
}

/// Builder for creating reports.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    symbol: Option<String>,
    data_range: Option<DataRange>,
    window: Option<usize>,
    thresholds: Option<RegimeThresholds>,
    current: Option<CurrentRegime>,
    region_count: usize,
    summary: Option<RegimeSummary>,
    transitions: Option<TransitionMatrix>,
}

impl ReportBuilder {
    /// Create a new report builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the symbol.
    pub fn symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    /// Set the analyzed price range.
    pub const fn data_range(mut self, range: DataRange) -> Self {
        self.data_range = Some(range);
        self
    }

    /// Set the volatility window.
    pub const fn window(mut self, window: usize) -> Self {
        self.window = Some(window);
        self
    }

    /// Take thresholds and the current regime from a classified series.
    pub fn regimes(mut self, regimes: &RegimeSeries) -> Self {
        self.thresholds = regimes.thresholds().copied();
        self.current = regimes
            .current()
            .map(|(date, regime)| CurrentRegime { date, regime });
        self
    }

    /// Set the number of regions.
    pub const fn region_count(mut self, count: usize) -> Self {
        self.region_count = count;
        self
    }

    /// Set the occupancy summary.
    pub fn summary(mut self, summary: RegimeSummary) -> Self {
        self.summary = Some(summary);
        self
    }

    /// Set the transition matrix.
    pub fn transitions(mut self, transitions: TransitionMatrix) -> Self {
        self.transitions = Some(transitions);
        self
    }

    /// Build the report.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::MissingSection`] without a summary or
    /// transition matrix.
    pub fn build(self) -> Result<RegimeReport, ReportError> {
        Ok(RegimeReport {
            symbol: self.symbol.unwrap_or_default(),
            timestamp: Utc::now(),
            data_range: self.data_range,
            window: self.window.unwrap_or_default(),
            thresholds: self.thresholds,
            current: self.current,
            region_count: self.region_count,
            summary: self.summary.ok_or(ReportError::MissingSection("summary"))?,
            transitions: self
                .transitions
                .ok_or(ReportError::MissingSection("transition matrix"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use volregime_analytics::{RegimePoint, estimate_transitions, extract_regions, summarize};

    fn regimes() -> RegimeSeries {
        use RegimeLabel::{High, Low, Medium};
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        RegimeSeries::from_points(
            [None, Some(Low), Some(Low), Some(Medium), Some(High), Some(Medium)]
                .into_iter()
                .enumerate()
                .map(|(i, label)| RegimePoint {
                    date: start + chrono::Days::new(i as u64),
                    label,
                })
                .collect(),
        )
    }

    fn report() -> RegimeReport {
        let regimes = regimes();
        ReportBuilder::new()
            .symbol("SPY")
            .window(20)
            .data_range(DataRange {
                start: NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
                end: NaiveDate::from_ymd_opt(2024, 3, 6).unwrap(),
                trading_days: 7,
            })
            .regimes(&regimes)
            .region_count(extract_regions(&regimes).count())
            .summary(summarize(&regimes))
            .transitions(estimate_transitions(&regimes).unwrap())
            .build()
            .unwrap()
    }

    #[test]
    fn test_report_builder() {
        let report = report();

        assert_eq!(report.symbol, "SPY");
        assert_eq!(report.window, 20);
        assert_eq!(report.region_count, 4);
        assert_eq!(
            report.current,
            Some(CurrentRegime {
                date: NaiveDate::from_ymd_opt(2024, 3, 6).unwrap(),
                regime: RegimeLabel::Medium,
            })
        );
        assert!(report.thresholds.is_none());
    }

    #[test]
    fn test_missing_sections() {
        let result = ReportBuilder::new().symbol("SPY").build();
        assert!(matches!(result, Err(ReportError::MissingSection("summary"))));

        let result = ReportBuilder::new()
            .summary(summarize(&regimes()))
            .build();
        assert!(matches!(result, Err(ReportError::MissingSection(_))));
    }

    #[test]
    fn test_error_messages() {
        let describe = |err: &ReportError| match err {
            ReportError::Serialization(_) => "serialization",
            ReportError::MissingSection(_) => "missing",
        };

        let missing = ReportError::MissingSection("summary");
        assert_eq!(describe(&missing), "missing");
        assert_eq!(missing.to_string(), "Report is missing its summary");

        let json = serde_json::from_str::<RegimeReport>("{").unwrap_err();
        let serialization = ReportError::from(json);
        assert_eq!(describe(&serialization), "serialization");
        assert!(serialization.to_string().starts_with("Serialization error:"));
    }

    #[test]
    fn test_ascii_table() {
        let table = report().to_ascii_table();

        assert!(table.contains("Volatility Regimes: SPY"));
        assert!(table.contains("2024-02-29 to 2024-03-06"));
        assert!(table.contains("Current regime:   Medium"));
        assert!(table.contains("40.0%"));
        assert!(table.contains("Transition Probabilities"));
        assert_eq!(table, report().to_string());
    }

    #[test]
    fn test_markdown() {
        let markdown = report().to_markdown();

        assert!(markdown.starts_with("# Volatility Regimes: SPY"));
        assert!(markdown.contains("| Low | 2 | 40.0% |"));
        assert!(markdown.contains("| From \\ To | Low | Medium | High |"));
        // Low -> Low once, Low -> Medium once
        assert!(markdown.contains("| Low | 0.500 | 0.500 | 0.000 |"));
    }

    #[test]
    fn test_json_roundtrip() {
        let report = report();
        let json = report.to_json().unwrap();
        assert!(json.contains("\"symbol\": \"SPY\""));

        let parsed: RegimeReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);
    }
}
