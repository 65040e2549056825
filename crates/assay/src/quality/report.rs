//! Data quality report for one table.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Outcome of the structural quality checks on one table.
///
/// `validation_passed` is true exactly while `issues` is empty: recording
/// an issue flips it to false and nothing flips it back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataQualityReport {
    pub table_name: String,
    pub total_rows: usize,
    /// Missing values per column, only for columns that have any.
    pub null_count: IndexMap<String, usize>,
    pub duplicate_count: usize,
    /// Orphaned foreign-key values per column.
    pub missing_foreign_keys: IndexMap<String, usize>,
    validation_passed: bool,
    issues: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl DataQualityReport {
    pub fn new(table_name: impl Into<String>, total_rows: usize) -> Self {
        Self {
            table_name: table_name.into(),
            total_rows,
            null_count: IndexMap::new(),
            duplicate_count: 0,
            missing_foreign_keys: IndexMap::new(),
            validation_passed: true,
            issues: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    /// Record an issue; the report no longer passes.
    pub fn add_issue(&mut self, issue: impl Into<String>) {
        self.issues.push(issue.into());
        self.validation_passed = false;
    }

    pub fn validation_passed(&self) -> bool {
        self.validation_passed
    }

    /// Issues in the order they were recorded.
    pub fn issues(&self) -> &[String] {
        &self.issues
    }
}

/// Flat per-table line of a quality summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualitySummaryRow {
    pub table_name: String,
    pub total_rows: usize,
    pub null_columns: usize,
    pub total_nulls: usize,
    pub duplicates: usize,
    pub fk_issues: usize,
    pub validation_passed: bool,
    pub issue_count: usize,
    pub timestamp: String,
}

/// One summary row per report, in input order.
pub fn quality_summary_rows(reports: &[DataQualityReport]) -> Vec<QualitySummaryRow> {
    reports
        .iter()
        .map(|r| QualitySummaryRow {
            table_name: r.table_name.clone(),
            total_rows: r.total_rows,
            null_columns: r.null_count.len(),
            total_nulls: r.null_count.values().sum(),
            duplicates: r.duplicate_count,
            fk_issues: r.missing_foreign_keys.len(),
            validation_passed: r.validation_passed,
            issue_count: r.issues.len(),
            timestamp: r.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
        })
        .collect()
}
