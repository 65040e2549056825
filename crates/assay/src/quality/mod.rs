//! Structural data quality validation.

mod report;
mod validator;

pub use report::{DataQualityReport, QualitySummaryRow, quality_summary_rows};
pub use validator::{ForeignKeyMap, QualityThresholds, QualityValidator, ReferenceKeys};
