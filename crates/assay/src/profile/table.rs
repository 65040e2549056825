//! Whole-table profiling.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::input::Dataset;
use crate::report::{ColumnProfileRow, format_percentage};

use super::column::ColumnProfile;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Descriptive snapshot of one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableProfile {
    pub table_name: String,
    pub row_count: usize,
    pub column_count: usize,
    /// Approximate in-memory footprint.
    pub memory_bytes: usize,
    pub memory_usage_mb: f64,
    /// Rows that repeat an earlier row across all columns.
    pub duplicate_rows: usize,
    pub columns: IndexMap<String, ColumnProfile>,
}

impl TableProfile {
    /// Column-level overview in column order.
    pub fn profile_summary_rows(&self) -> Vec<ColumnProfileRow> {
        self.columns
            .iter()
            .map(|(name, col)| ColumnProfileRow {
                table_name: self.table_name.clone(),
                column: name.clone(),
                dtype: col.dtype_label.clone(),
                null_count: col.null_count,
                null_percentage: format_percentage(col.null_percentage),
            })
            .collect()
    }
}

/// Builds [`TableProfile`]s. Independent of rule execution.
#[derive(Debug, Clone)]
pub struct Profiler {
    date_marker: String,
}

impl Default for Profiler {
    fn default() -> Self {
        Self {
            date_marker: "date".to_string(),
        }
    }
}

impl Profiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Columns whose lowercased name contains `marker` get temporal statistics.
    pub fn with_date_marker(mut self, marker: impl Into<String>) -> Self {
        self.date_marker = marker.into().to_lowercase();
        self
    }

    /// Profile every column of `dataset`. Never fails and never mutates the
    /// dataset; an empty table yields zero counts.
    #[instrument(skip(self, dataset), fields(rows = dataset.row_count()))]
    pub fn profile(&self, dataset: &Dataset, table_name: &str) -> TableProfile {
        let rows = dataset.row_count();
        let columns: IndexMap<String, ColumnProfile> = dataset
            .columns()
            .map(|(name, column)| {
                let hint = self.is_date_name(name);
                (name.to_string(), ColumnProfile::build(column, rows, hint))
            })
            .collect();

        let duplicate_rows = dataset
            .duplicated_rows(None)
            .map(|mask| mask.into_iter().filter(|d| *d).count())
            .unwrap_or(0);
        let memory_bytes = dataset.estimated_memory_bytes();

        debug!(columns = columns.len(), duplicate_rows, "profiled table");

        TableProfile {
            table_name: table_name.to_string(),
            row_count: rows,
            column_count: dataset.column_count(),
            memory_bytes,
            memory_usage_mb: memory_bytes as f64 / BYTES_PER_MB,
            duplicate_rows,
            columns,
        }
    }

    fn is_date_name(&self, name: &str) -> bool {
        !self.date_marker.is_empty() && name.to_lowercase().contains(&self.date_marker)
    }
}
