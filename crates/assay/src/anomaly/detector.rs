//! Column-level and table-level outlier detection.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{AssayError, Result};
use crate::input::{ColumnKind, Dataset};
use crate::report::{AnomalyRow, format_percentage};
use crate::rules::percentage;

use super::isolation::{IsolationConfig, IsolationForest};
use super::univariate::{iqr_outliers, zscore_outliers};

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Tunables for the univariate detectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    /// `k` in `[Q1 - k*IQR, Q3 + k*IQR]`.
    pub iqr_multiplier: f64,
    /// Absolute z-score above which a value is an outlier.
    pub zscore_threshold: f64,
    /// Columns with this many distinct values or fewer are treated as codes
    /// and skipped by table analysis.
    pub min_distinct_values: usize,
    /// Maximum outlier values kept per finding.
    pub sample_limit: usize,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            iqr_multiplier: 1.5,
            zscore_threshold: 3.0,
            min_distinct_values: 10,
            sample_limit: 10,
        }
    }
}

// =============================================================================
// FINDINGS
// =============================================================================

/// Outlier detection method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DetectionMethod {
    Iqr,
    Zscore,
    Isolation,
}

impl DetectionMethod {
    pub fn label(&self) -> &'static str {
        match self {
            DetectionMethod::Iqr => "IQR",
            DetectionMethod::Zscore => "ZSCORE",
            DetectionMethod::Isolation => "ISOLATION",
        }
    }
}

impl fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outliers found in one column by one method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyFinding {
    pub column: String,
    pub method: DetectionMethod,
    pub outlier_count: usize,
    pub outlier_percentage: f64,
    /// The first outlier values in row order, at most `sample_limit`.
    pub sample_values: Vec<f64>,
}

/// Per-table result of [`AnomalyDetector::analyze_table`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableAnomalies {
    pub table_name: String,
    pub total_rows: usize,
    /// Every numeric column that was eligible for analysis.
    pub columns_analyzed: Vec<String>,
    /// One finding per analyzed column, clean columns included.
    pub findings: IndexMap<String, AnomalyFinding>,
}

impl TableAnomalies {
    pub fn total_outliers(&self) -> usize {
        self.findings.values().map(|f| f.outlier_count).sum()
    }

    /// Flat rows for tabular display, in column order.
    pub fn outlier_summary_rows(&self) -> Vec<AnomalyRow> {
        self.findings
            .values()
            .map(|f| AnomalyRow {
                table_name: self.table_name.clone(),
                column: f.column.clone(),
                method: f.method.label().to_string(),
                outlier_count: f.outlier_count,
                outlier_percentage: format_percentage(f.outlier_percentage),
            })
            .collect()
    }
}

/// Row label produced by multivariate detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutlierLabel {
    Normal,
    Outlier,
}

/// Joint outliers across several numeric columns.
///
/// `row_indices`, `labels` and `scores` are parallel: entry `i` describes
/// dataset row `row_indices[i]`. Rows with a missing value in any analysed
/// column are left out.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MultivariateOutliers {
    pub columns: Vec<String>,
    pub row_indices: Vec<usize>,
    pub labels: Vec<OutlierLabel>,
    pub scores: Vec<f64>,
}

impl MultivariateOutliers {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn outlier_count(&self) -> usize {
        self.labels
            .iter()
            .filter(|l| **l == OutlierLabel::Outlier)
            .count()
    }

    /// Dataset rows labelled as outliers.
    pub fn outlier_rows(&self) -> impl Iterator<Item = usize> + '_ {
        self.row_indices
            .iter()
            .zip(&self.labels)
            .filter(|(_, l)| **l == OutlierLabel::Outlier)
            .map(|(i, _)| *i)
    }
}

// =============================================================================
// DETECTOR
// =============================================================================

/// Stateless outlier detector.
#[derive(Debug, Clone, Default)]
pub struct AnomalyDetector {
    config: AnomalyConfig,
    isolation: IsolationConfig,
}

impl AnomalyDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AnomalyConfig, isolation: IsolationConfig) -> Self {
        Self { config, isolation }
    }

    pub fn config(&self) -> &AnomalyConfig {
        &self.config
    }

    /// Outlier mask for one numeric column under a univariate method.
    ///
    /// Isolation on a single column runs the forest in one dimension;
    /// rows with a missing value are not flagged.
    pub fn column_mask(
        &self,
        dataset: &Dataset,
        column: &str,
        method: DetectionMethod,
    ) -> Result<Vec<bool>> {
        let values = dataset.numeric(column)?;
        Ok(match method {
            DetectionMethod::Iqr => iqr_outliers(&values, self.config.iqr_multiplier),
            DetectionMethod::Zscore => zscore_outliers(&values, self.config.zscore_threshold),
            DetectionMethod::Isolation => {
                let found = self.detect_multivariate(dataset, &[column])?;
                let mut mask = vec![false; values.len()];
                for row in found.outlier_rows() {
                    mask[row] = true;
                }
                mask
            }
        })
    }

    /// Run one method on one column.
    ///
    /// Fails if the column is absent or holds non-numeric values.
    pub fn detect_column(
        &self,
        dataset: &Dataset,
        column: &str,
        method: DetectionMethod,
    ) -> Result<AnomalyFinding> {
        let mask = self.column_mask(dataset, column, method)?;
        let values = dataset.numeric(column)?;
        let outlier_count = mask.iter().filter(|m| **m).count();

        let sample_values = values
            .iter()
            .zip(&mask)
            .filter_map(|(v, flagged)| if *flagged { *v } else { None })
            .take(self.config.sample_limit)
            .collect();

        Ok(AnomalyFinding {
            column: column.to_string(),
            method,
            outlier_count,
            outlier_percentage: percentage(outlier_count, dataset.row_count()),
            sample_values,
        })
    }

    /// IQR analysis of every eligible numeric column.
    ///
    /// A column is eligible when it is numeric and has more than
    /// `min_distinct_values` distinct values. Never fails: empty tables and
    /// tables without eligible columns give an empty result.
    #[instrument(skip(self, dataset), fields(rows = dataset.row_count()))]
    pub fn analyze_table(&self, dataset: &Dataset, table_name: &str) -> TableAnomalies {
        let mut result = TableAnomalies {
            table_name: table_name.to_string(),
            total_rows: dataset.row_count(),
            columns_analyzed: Vec::new(),
            findings: IndexMap::new(),
        };

        for (name, column) in dataset.columns() {
            if column.kind() != ColumnKind::Numeric
                || column.distinct_count() <= self.config.min_distinct_values
            {
                continue;
            }
            result.columns_analyzed.push(name.to_string());

            match self.detect_column(dataset, name, DetectionMethod::Iqr) {
                Ok(finding) => {
                    result.findings.insert(name.to_string(), finding);
                }
                Err(e) => debug!(column = name, error = %e, "skipped column"),
            }
        }

        debug!(
            analyzed = result.columns_analyzed.len(),
            outliers = result.total_outliers(),
            "analyzed table"
        );
        result
    }

    /// Isolation-forest labels over the complete rows of `columns`.
    ///
    /// Non-numeric columns among those requested are ignored. An absent
    /// column is an error. The result is empty when no row is complete or
    /// no numeric column remains.
    #[instrument(skip(self, dataset), fields(rows = dataset.row_count()))]
    pub fn detect_multivariate(
        &self,
        dataset: &Dataset,
        columns: &[&str],
    ) -> Result<MultivariateOutliers> {
        let mut names = Vec::new();
        let mut series = Vec::new();
        for name in columns {
            let column = dataset.column(name)?;
            if !matches!(column.kind(), ColumnKind::Numeric) {
                debug!(column = name, kind = column.kind().label(), "ignored non-numeric column");
                continue;
            }
            names.push(name.to_string());
            series.push(dataset.numeric(name)?);
        }

        let mut found = MultivariateOutliers {
            columns: names,
            ..Default::default()
        };
        if series.is_empty() {
            return Ok(found);
        }

        let mut points = Vec::new();
        for row in 0..dataset.row_count() {
            let point: Option<Vec<f64>> = series.iter().map(|s| s[row]).collect();
            if let Some(point) = point {
                found.row_indices.push(row);
                points.push(point);
            }
        }
        if points.is_empty() {
            return Ok(found);
        }

        let (scores, flags) = IsolationForest::new(self.isolation.clone()).fit_predict(&points);
        found.labels = flags
            .into_iter()
            .map(|f| if f { OutlierLabel::Outlier } else { OutlierLabel::Normal })
            .collect();
        found.scores = scores;

        debug!(
            complete_rows = found.row_indices.len(),
            outliers = found.outlier_count(),
            "multivariate detection finished"
        );
        Ok(found)
    }

    /// Summarize multivariate labels as a finding over the table.
    pub fn multivariate_finding(
        &self,
        found: &MultivariateOutliers,
        total_rows: usize,
    ) -> Result<AnomalyFinding> {
        if found.columns.is_empty() {
            return Err(AssayError::EmptyData(
                "no numeric columns for multivariate detection".to_string(),
            ));
        }
        let outlier_count = found.outlier_count();
        Ok(AnomalyFinding {
            column: found.columns.join("+"),
            method: DetectionMethod::Isolation,
            outlier_count,
            outlier_percentage: percentage(outlier_count, total_rows),
            sample_values: found
                .scores
                .iter()
                .zip(&found.labels)
                .filter(|(_, l)| **l == OutlierLabel::Outlier)
                .map(|(s, _)| *s)
                .take(self.config.sample_limit)
                .collect(),
        })
    }
}
