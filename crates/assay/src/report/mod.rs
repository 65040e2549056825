//! Aggregate summaries and flat exports of a quality run.

mod rows;
mod summary;

pub(crate) use rows::format_percentage;
pub use rows::{
    AnomalyRow, ColumnProfileRow, ReportBundle, TableProfileRow, ValidationRow, validation_rows,
};
pub use summary::{
    AnomalySummary, DataSummary, PassRate, ReportAggregator, SummaryReport, ValidationSummary,
};
