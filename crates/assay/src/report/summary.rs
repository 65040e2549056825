//! Aggregate summary across rule results, profiles and anomalies.

use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::anomaly::TableAnomalies;
use crate::profile::TableProfile;
use crate::rules::ValidationResult;

use super::rows::format_percentage;

/// Share of passed rules. Not applicable when no rule ran.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PassRate {
    Percent(f64),
    NotApplicable,
}

impl PassRate {
    pub fn from_counts(passed: usize, total: usize) -> Self {
        if total == 0 {
            PassRate::NotApplicable
        } else {
            PassRate::Percent(passed as f64 / total as f64 * 100.0)
        }
    }

    pub fn percent(&self) -> Option<f64> {
        match self {
            PassRate::Percent(p) => Some(*p),
            PassRate::NotApplicable => None,
        }
    }
}

impl fmt::Display for PassRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PassRate::Percent(p) => f.write_str(&format_percentage(*p)),
            PassRate::NotApplicable => f.write_str("N/A"),
        }
    }
}

impl Serialize for PassRate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PassRate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw == "N/A" {
            return Ok(PassRate::NotApplicable);
        }
        raw.trim_end_matches('%')
            .parse::<f64>()
            .map(PassRate::Percent)
            .map_err(|_| serde::de::Error::custom(format!("invalid pass rate '{}'", raw)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub total_rules: usize,
    pub passed: usize,
    pub failed: usize,
    pub pass_rate: PassRate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSummary {
    pub total_tables: usize,
    pub total_rows: usize,
    pub total_columns: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalySummary {
    pub total_outliers_detected: usize,
}

/// One-record overview of a quality run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryReport {
    pub report_timestamp: DateTime<Utc>,
    pub validation_summary: ValidationSummary,
    pub data_summary: DataSummary,
    pub anomaly_summary: AnomalySummary,
}

/// Merges the outputs of the engine, profiler and detector.
pub struct ReportAggregator;

impl ReportAggregator {
    /// Summarize a rule-result history together with per-table profiles and
    /// anomaly findings. Pure apart from the report timestamp.
    pub fn summarize(
        results: &[ValidationResult],
        profiles: &IndexMap<String, TableProfile>,
        anomalies: &IndexMap<String, TableAnomalies>,
    ) -> SummaryReport {
        let total_rules = results.len();
        let passed = results.iter().filter(|r| r.passed).count();

        SummaryReport {
            report_timestamp: Utc::now(),
            validation_summary: ValidationSummary {
                total_rules,
                passed,
                failed: total_rules - passed,
                pass_rate: PassRate::from_counts(passed, total_rules),
            },
            data_summary: DataSummary {
                total_tables: profiles.len(),
                total_rows: profiles.values().map(|p| p.row_count).sum(),
                total_columns: profiles.values().map(|p| p.column_count).sum(),
            },
            anomaly_summary: AnomalySummary {
                total_outliers_detected: anomalies.values().map(TableAnomalies::total_outliers).sum(),
            },
        }
    }
}
