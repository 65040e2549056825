//! Results of rule evaluation.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::rule::Severity;

/// Outcome of evaluating one rule against one dataset.
///
/// Created once per evaluation and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub rule_name: String,
    pub passed: bool,
    pub severity: Severity,
    pub message: String,
    pub affected_rows: usize,
    /// Share of rows affected, in [0, 100]. Zero for an empty table.
    pub affected_percentage: f64,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub details: IndexMap<String, JsonValue>,
    pub timestamp: DateTime<Utc>,
}

impl ValidationResult {
    /// Result for a rule that ran to completion.
    pub(crate) fn evaluated(
        rule_name: &str,
        passed: bool,
        severity: Severity,
        description: &str,
        affected_rows: usize,
        total_rows: usize,
    ) -> Self {
        Self {
            rule_name: rule_name.to_string(),
            passed,
            severity,
            message: format!("{}: {}", status_label(passed), description),
            affected_rows,
            affected_percentage: percentage(affected_rows, total_rows),
            details: IndexMap::new(),
            timestamp: Utc::now(),
        }
    }

    /// Critical failure for a rule that could not be evaluated.
    pub(crate) fn failed(rule_name: &str, message: impl Into<String>) -> Self {
        Self {
            rule_name: rule_name.to_string(),
            passed: false,
            severity: Severity::Critical,
            message: message.into(),
            affected_rows: 0,
            affected_percentage: 0.0,
            details: IndexMap::new(),
            timestamp: Utc::now(),
        }
    }

    pub(crate) fn with_detail(mut self, key: &str, value: impl Into<JsonValue>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }

    /// `"PASS"` or `"FAIL"`.
    pub fn status(&self) -> &'static str {
        status_label(self.passed)
    }
}

fn status_label(passed: bool) -> &'static str {
    if passed { "PASS" } else { "FAIL" }
}

/// `part / total * 100`, defined as 0 when `total` is 0.
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}
