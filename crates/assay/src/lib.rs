//! Assay: rule-based data quality engine for tabular business records.
//!
//! Assay certifies tables (suppliers, products, inventory, orders, sales)
//! for downstream analytics. It evaluates declarative validation rules,
//! profiles columns, detects statistical outliers and merges everything
//! into one summary.
//!
//! # Core Principles
//!
//! - **Pure results**: every check returns plain values; nothing is persisted
//! - **Non-destructive**: transforms return new datasets, the caller's copy is never touched
//! - **Failures become data**: a rule that cannot run is a failed result, not an abort
//!
//! # Example
//!
//! ```
//! use assay::{Assay, Parser, ReferenceKeys};
//!
//! let csv = "order_quantity,order_cost\n5,10.0\n0,3.5\n2,4.0\n";
//! let orders = Parser::new().parse_str(csv).unwrap();
//!
//! let mut assay = Assay::new().unwrap();
//! let prepared = assay.prepare("orders", &orders).unwrap();
//! assert_eq!(prepared.row_count(), 2);
//!
//! let assessment = assay.assess("orders", &prepared, &ReferenceKeys::new());
//! assert!(assessment.results.iter().all(|r| r.passed));
//! ```

pub mod anomaly;
pub mod error;
pub mod input;
pub mod profile;
pub mod quality;
pub mod report;
pub mod rules;
pub mod stats;
pub mod transform;

mod assay;

pub use crate::assay::{Assay, AssayConfig, RunOutcome, RunStats, TableAssessment};
pub use anomaly::{AnomalyDetector, AnomalyFinding, DetectionMethod, TableAnomalies};
pub use error::{AssayError, Result};
pub use input::{Dataset, Parser, ParserConfig, SourceMetadata, Value};
pub use profile::{ColumnProfile, Profiler, TableProfile};
pub use quality::{DataQualityReport, QualityValidator, ReferenceKeys};
pub use report::{ReportAggregator, ReportBundle, SummaryReport};
pub use rules::{
    CompareOp, Predicate, RuleEngine, RuleRegistry, RuleType, Severity, ValidationResult,
    ValidationRule,
};
