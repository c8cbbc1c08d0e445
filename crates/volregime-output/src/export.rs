//! Export functionality for regime analyses.
//!
//! Flattens the per-day regime series and the regime regions into plain
//! records and writes them as CSV or JSON. Missing volatility and regime
//! values are written as empty CSV fields or JSON `null`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;
use volregime_analytics::{RegimeLabel, RegimeSeries, Region, VolatilitySeries};

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV writer produced bytes that are not UTF-8.
    #[error("CSV output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }

    /// Infer the format from a file extension. JSON files are pretty-printed.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::InvalidFormat`] for a missing or unknown
    /// extension.
    pub fn from_path(path: &Path) -> Result<Self, ExportError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("csv") => Ok(Self::Csv),
            Some("json") => Ok(Self::PrettyJson),
            Some(other) => Err(ExportError::InvalidFormat(format!(
                "unsupported extension '.{other}'"
            ))),
            None => Err(ExportError::InvalidFormat(format!(
                "cannot infer format from '{}'",
                path.display()
            ))),
        }
    }
}

/// One trading day of the regime series.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RegimeRecord {
    /// Trading date.
    pub date: NaiveDate,

    /// Annualized volatility, empty while the window fills.
    pub volatility: Option<f64>,

    /// Regime label, empty where volatility is missing.
    pub regime: Option<RegimeLabel>,
}

impl RegimeRecord {
    /// Pair each volatility point with its regime label.
    ///
    /// Both series come from the same classification pass, so they line up
    /// one-to-one; any excess on either side is ignored.
    pub fn from_series(volatility: &VolatilitySeries, regimes: &RegimeSeries) -> Vec<Self> {
        volatility
            .points()
            .iter()
            .zip(regimes.points())
            .map(|(vol, regime)| Self {
                date: vol.date,
                volatility: vol.value,
                regime: regime.label,
            })
            .collect()
    }
}

/// One contiguous regime region.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegionRecord {
    /// Regime shared by the whole run.
    pub regime: RegimeLabel,

    /// First date of the run.
    pub start_date: NaiveDate,

    /// Shading end date, the next day's date when one exists.
    pub end_date: NaiveDate,

    /// Trading days in the run.
    pub days: usize,
}

impl From<Region> for RegionRecord {
    fn from(region: Region) -> Self {
        Self {
            regime: region.label,
            start_date: region.start_date,
            end_date: region.end_date,
            days: region.len(),
        }
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to any writer in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    fn export_to_writer(
        &self,
        writer: &mut dyn Write,
        format: ExportFormat,
    ) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        writer.write_all(content.as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let mut file = BufWriter::new(File::create(path)?);
        self.export_to_writer(&mut file, format)
    }
}

/// Serialize homogeneous rows; CSV gets a header row from the field names.
fn rows_to_string<T: Serialize>(rows: &[T], format: ExportFormat) -> Result<String, ExportError> {
    match format {
        ExportFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(vec![]);
            for row in rows {
                wtr.serialize(row)?;
            }
            let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
            Ok(String::from_utf8(bytes)?)
        }
        ExportFormat::Json => Ok(serde_json::to_string(rows)?),
        ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(rows)?),
    }
}

impl Exporter for Vec<RegimeRecord> {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        rows_to_string(self, format)
    }
}

impl Exporter for Vec<RegionRecord> {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        rows_to_string(self, format)
    }
}
