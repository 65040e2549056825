//! Flat row projections for rendering.
//!
//! These keep the order of the underlying results and never filter them.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::anomaly::TableAnomalies;
use crate::error::Result;
use crate::profile::TableProfile;
use crate::rules::ValidationResult;

use super::summary::{ReportAggregator, SummaryReport};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Percentages in every row are rendered the same way: `"12.50%"`.
pub(crate) fn format_percentage(value: f64) -> String {
    format!("{:.2}%", value)
}

/// One rule result. Also returned by [`RuleEngine::summary_rows`].
///
/// [`RuleEngine::summary_rows`]: crate::rules::RuleEngine::summary_rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRow {
    pub rule_name: String,
    pub status: String,
    pub severity: String,
    pub message: String,
    pub affected_rows: usize,
    pub affected_percentage: String,
    pub timestamp: String,
}

impl From<&ValidationResult> for ValidationRow {
    fn from(r: &ValidationResult) -> Self {
        Self {
            rule_name: r.rule_name.clone(),
            status: r.status().to_string(),
            severity: r.severity.label().to_string(),
            message: r.message.clone(),
            affected_rows: r.affected_rows,
            affected_percentage: format_percentage(r.affected_percentage),
            timestamp: r.timestamp.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableProfileRow {
    pub table_name: String,
    pub row_count: usize,
    pub column_count: usize,
    pub duplicate_rows: usize,
    pub memory_usage_mb: f64,
}

impl From<&TableProfile> for TableProfileRow {
    fn from(p: &TableProfile) -> Self {
        Self {
            table_name: p.table_name.clone(),
            row_count: p.row_count,
            column_count: p.column_count,
            duplicate_rows: p.duplicate_rows,
            memory_usage_mb: p.memory_usage_mb,
        }
    }
}

/// Built by [`TableProfile::profile_summary_rows`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfileRow {
    pub table_name: String,
    pub column: String,
    pub dtype: String,
    pub null_count: usize,
    pub null_percentage: String,
}

/// Built by [`TableAnomalies::outlier_summary_rows`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyRow {
    pub table_name: String,
    pub column: String,
    pub method: String,
    pub outlier_count: usize,
    pub outlier_percentage: String,
}

pub fn validation_rows(results: &[ValidationResult]) -> Vec<ValidationRow> {
    results.iter().map(ValidationRow::from).collect()
}

/// Summary plus every flat projection, ready to render or export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportBundle {
    pub summary: SummaryReport,
    pub validation: Vec<ValidationRow>,
    pub profiles: Vec<TableProfileRow>,
    pub columns: Vec<ColumnProfileRow>,
    pub anomalies: Vec<AnomalyRow>,
}

impl ReportBundle {
    pub fn build(
        results: &[ValidationResult],
        profiles: &IndexMap<String, TableProfile>,
        anomalies: &IndexMap<String, TableAnomalies>,
    ) -> Self {
        Self {
            summary: ReportAggregator::summarize(results, profiles, anomalies),
            validation: validation_rows(results),
            profiles: profiles.values().map(TableProfileRow::from).collect(),
            columns: profiles
                .values()
                .flat_map(TableProfile::profile_summary_rows)
                .collect(),
            anomalies: anomalies
                .values()
                .flat_map(TableAnomalies::outlier_summary_rows)
                .collect(),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
