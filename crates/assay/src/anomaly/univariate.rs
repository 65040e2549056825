//! Single-column outlier tests.

use crate::stats;

/// Flag values outside `[Q1 - k*IQR, Q3 + k*IQR]`.
///
/// Quartiles ignore missing values, and missing positions are never flagged.
pub fn iqr_outliers(values: &[Option<f64>], multiplier: f64) -> Vec<bool> {
    let sorted = stats::sorted(&stats::present(values));
    let (Some(q1), Some(q3)) = (stats::quantile(&sorted, 0.25), stats::quantile(&sorted, 0.75))
    else {
        return vec![false; values.len()];
    };

    let iqr = q3 - q1;
    let lower = q1 - multiplier * iqr;
    let upper = q3 + multiplier * iqr;

    values
        .iter()
        .map(|v| v.map(|x| x < lower || x > upper).unwrap_or(false))
        .collect()
}

/// Flag values whose standardized score exceeds `threshold` in magnitude.
///
/// Uses the sample standard deviation. With zero variance or fewer than two
/// values nothing is flagged.
pub fn zscore_outliers(values: &[Option<f64>], threshold: f64) -> Vec<bool> {
    let present = stats::present(values);
    let std = stats::sample_std(&present);
    if std == 0.0 {
        return vec![false; values.len()];
    }
    let mean = stats::mean(&present);

    values
        .iter()
        .map(|v| v.map(|x| ((x - mean) / std).abs() > threshold).unwrap_or(false))
        .collect()
}
