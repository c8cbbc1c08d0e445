//! Empirical quantiles.
//!
//! Linear interpolation between order statistics at position `q * (n - 1)`,
//! the same convention as the default `numpy`/`pandas` quantile.

use crate::error::{AnalyticsError, Result};
use polars::prelude::*;

/// Quantile `q` of `values`. `q` is clamped to `[0, 1]`.
///
/// # Errors
/// Returns [`AnalyticsError::InsufficientData`] for an empty slice and
/// [`AnalyticsError::InvalidInput`] if any value is NaN.
pub fn quantile(values: &[f64], q: f64) -> Result<f64> {
    let [value] = quantiles(values, [q])?;
    Ok(value)
}

/// Several quantiles of `values` in one pass, in the order requested.
///
/// # Errors
/// Same conditions as [`quantile`].
pub fn quantiles<const N: usize>(values: &[f64], qs: [f64; N]) -> Result<[f64; N]> {
    if values.is_empty() {
        return Err(AnalyticsError::InsufficientData {
            required: 1,
            actual: 0,
        });
    }
    if values.iter().any(|v| v.is_nan()) {
        return Err(AnalyticsError::InvalidInput(
            "quantile input contains NaN".to_string(),
        ));
    }

    let exprs: Vec<Expr> = qs
        .iter()
        .enumerate()
        .map(|(i, &q)| {
            col("value")
                .quantile(lit(q.clamp(0.0, 1.0)), QuantileMethod::Linear)
                .alias(format!("q{i}"))
        })
        .collect();

    let frame = DataFrame::new(vec![Series::new("value".into(), values).into()])?
        .lazy()
        .select(exprs)
        .collect()?;

    let mut out = [0.0; N];
    for (slot, column) in out.iter_mut().zip(frame.get_columns()) {
        *slot = column
            .f64()?
            .get(0)
            .ok_or_else(|| AnalyticsError::Compute("quantile produced no value".to_string()))?;
    }
    Ok(out)
}
