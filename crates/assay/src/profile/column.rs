//! Per-column descriptive statistics.

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::input::{Column, ColumnKind};
use crate::rules::percentage;
use crate::stats;

/// Number of entries kept in a categorical value distribution.
pub const TOP_VALUES: usize = 10;

/// Profile of a single column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub dtype_label: String,
    pub null_count: usize,
    /// Share of missing values in [0, 100]; 0 for an empty table.
    pub null_percentage: f64,
    pub stats: ColumnStats,
}

/// Kind-specific statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnStats {
    Numeric(NumericStats),
    Temporal(TemporalStats),
    Categorical(CategoricalStats),
}

impl ColumnStats {
    /// Number of usable (non-missing) values the statistics were built from.
    pub fn count(&self) -> usize {
        match self {
            ColumnStats::Numeric(s) => s.count,
            ColumnStats::Temporal(s) => s.count,
            ColumnStats::Categorical(s) => s.count,
        }
    }

    pub fn kind_label(&self) -> &'static str {
        match self {
            ColumnStats::Numeric(_) => "numeric",
            ColumnStats::Temporal(_) => "temporal",
            ColumnStats::Categorical(_) => "categorical",
        }
    }
}

/// Statistics for numeric columns, computed over non-missing values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericStats {
    pub count: usize,
    pub missing: usize,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub q25: f64,
    pub q75: f64,
    pub skewness: f64,
    pub kurtosis: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalStats {
    /// Values that are, or parse as, timestamps.
    pub count: usize,
    /// Everything else, including unparseable text.
    pub missing: usize,
    pub min_date: Option<NaiveDateTime>,
    pub max_date: Option<NaiveDateTime>,
    /// Whole days between the earliest and latest value.
    pub date_range_days: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalStats {
    pub count: usize,
    pub missing: usize,
    pub unique: usize,
    pub top_value: Option<String>,
    pub top_frequency: usize,
    /// Most frequent values, highest first; ties keep first-seen order.
    pub value_distribution: IndexMap<String, usize>,
}

impl ColumnProfile {
    /// Profile `column`. `temporal_hint` forces temporal statistics, as for
    /// columns whose name marks them as dates.
    pub fn build(column: &Column, total_rows: usize, temporal_hint: bool) -> Self {
        let kind = column.kind();

        let stats = match kind {
            ColumnKind::Numeric => ColumnStats::Numeric(numeric_stats(column)),
            ColumnKind::Temporal => ColumnStats::Temporal(temporal_stats(column)),
            _ if temporal_hint => ColumnStats::Temporal(temporal_stats(column)),
            _ => ColumnStats::Categorical(categorical_stats(column)),
        };
        // Date coercion turns unparseable text into missing values.
        let null_count = match &stats {
            ColumnStats::Temporal(s) => s.missing,
            _ => column.null_count(),
        };

        Self {
            dtype_label: kind.label().to_string(),
            null_count,
            null_percentage: percentage(null_count, total_rows),
            stats,
        }
    }
}

fn numeric_stats(column: &Column) -> NumericStats {
    let values: Vec<f64> = column.values.iter().filter_map(|v| v.as_f64()).collect();
    let sorted = stats::sorted(&values);
    let q = |p: f64| stats::quantile(&sorted, p).unwrap_or(0.0);

    NumericStats {
        count: values.len(),
        missing: column.null_count(),
        mean: stats::mean(&values),
        median: q(0.5),
        std: stats::sample_std(&values),
        min: sorted.first().copied().unwrap_or(0.0),
        max: sorted.last().copied().unwrap_or(0.0),
        q25: q(0.25),
        q75: q(0.75),
        skewness: stats::skewness(&values),
        kurtosis: stats::kurtosis(&values),
    }
}

fn temporal_stats(column: &Column) -> TemporalStats {
    let parsed: Vec<NaiveDateTime> = column
        .values
        .iter()
        .filter_map(|v| v.as_timestamp())
        .collect();
    let min_date = parsed.iter().min().copied();
    let max_date = parsed.iter().max().copied();
    let date_range_days = match (min_date, max_date) {
        (Some(lo), Some(hi)) => (hi - lo).num_days(),
        _ => 0,
    };

    TemporalStats {
        count: parsed.len(),
        missing: column.len() - parsed.len(),
        min_date,
        max_date,
        date_range_days,
    }
}

fn categorical_stats(column: &Column) -> CategoricalStats {
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for value in column.values.iter().filter(|v| !v.is_missing()) {
        *counts.entry(value.to_string()).or_default() += 1;
    }

    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    // stable: equal counts stay in first-seen order
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let (top_value, top_frequency) = ranked
        .first()
        .map(|(v, n)| (Some(v.clone()), *n))
        .unwrap_or((None, 0));

    CategoricalStats {
        count: column.len() - column.null_count(),
        missing: column.null_count(),
        unique: column.distinct_count(),
        top_value,
        top_frequency,
        value_distribution: ranked.into_iter().take(TOP_VALUES).collect(),
    }
}
