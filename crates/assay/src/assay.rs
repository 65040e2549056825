//! Main Assay struct and batch API.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

use crate::anomaly::{AnomalyConfig, AnomalyDetector, IsolationConfig, TableAnomalies};
use crate::error::{AssayError, Result};
use crate::input::Dataset;
use crate::profile::{Profiler, TableProfile};
use crate::quality::{DataQualityReport, QualityThresholds, QualityValidator, ReferenceKeys};
use crate::report::{ReportAggregator, ReportBundle, SummaryReport};
use crate::rules::{RuleEngine, RuleRegistry, ValidationResult};
use crate::transform::{TransformRegistry, remove_duplicates, standardize_dates};

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Tunables for a quality run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssayConfig {
    /// Tolerated share of missing values per column, in [0, 1].
    pub null_threshold: f64,
    /// Tolerated share of duplicate rows, in [0, 1].
    pub duplicate_threshold: f64,
    pub anomaly: AnomalyConfig,
    pub isolation: IsolationConfig,
    /// Clean, derive and filter tables before assessing them.
    pub enable_transformation: bool,
    /// Run the quality validator and the rule engine.
    pub enable_validation: bool,
    /// Column-name fragment that marks date columns.
    pub date_marker: String,
}

impl Default for AssayConfig {
    fn default() -> Self {
        let thresholds = QualityThresholds::default();
        Self {
            null_threshold: thresholds.null_threshold,
            duplicate_threshold: thresholds.duplicate_threshold,
            anomaly: AnomalyConfig::default(),
            isolation: IsolationConfig::default(),
            enable_transformation: true,
            enable_validation: true,
            date_marker: "date".to_string(),
        }
    }
}

impl AssayConfig {
    /// Parse and check a JSON config. Missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn thresholds(&self) -> QualityThresholds {
        QualityThresholds {
            null_threshold: self.null_threshold,
            duplicate_threshold: self.duplicate_threshold,
        }
    }

    /// Reject values no detector or validator can work with.
    pub fn validate(&self) -> Result<()> {
        let fraction = |name: &str, v: f64| {
            if (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(AssayError::Config(format!("{} must be in [0, 1], got {}", name, v)))
            }
        };
        fraction("null_threshold", self.null_threshold)?;
        fraction("duplicate_threshold", self.duplicate_threshold)?;

        if self.anomaly.iqr_multiplier <= 0.0 || self.anomaly.zscore_threshold <= 0.0 {
            return Err(AssayError::Config(
                "iqr_multiplier and zscore_threshold must be positive".to_string(),
            ));
        }
        if self.isolation.n_trees == 0 || self.isolation.sample_size < 2 {
            return Err(AssayError::Config(
                "isolation forest needs at least one tree and a sample size of 2".to_string(),
            ));
        }
        if !(0.0..=0.5).contains(&self.isolation.contamination) {
            return Err(AssayError::Config(format!(
                "contamination must be in [0, 0.5], got {}",
                self.isolation.contamination
            )));
        }
        Ok(())
    }
}

// =============================================================================
// RESULTS
// =============================================================================

/// Everything learned about one table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableAssessment {
    pub table_name: String,
    /// Present only when validation is enabled.
    pub quality: Option<DataQualityReport>,
    /// Empty when validation is disabled.
    pub results: Vec<ValidationResult>,
    pub profile: TableProfile,
    pub anomalies: TableAnomalies,
}

/// Counters for a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStats {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub tables_processed: usize,
    pub total_rows_extracted: usize,
    /// Rows left after preparation, summed over processed tables.
    pub total_rows_retained: usize,
    pub failed_tables: Vec<String>,
}

impl RunStats {
    pub fn duration_secs(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }
}

/// Result of [`Assay::run`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutcome {
    pub assessments: IndexMap<String, TableAssessment>,
    pub stats: RunStats,
    /// Built from `validation_history`, so rules run before this call count too.
    pub summary: SummaryReport,
    /// The engine's rule-result history when the run finished, oldest first.
    pub validation_history: Vec<ValidationResult>,
}

impl RunOutcome {
    /// Summary plus flat rows: the whole rule history, and the profiles and
    /// anomalies of the tables assessed in this run.
    pub fn bundle(&self) -> ReportBundle {
        let (profiles, anomalies) = split_assessments(&self.assessments);
        ReportBundle::build(&self.validation_history, &profiles, &anomalies)
    }
}

type Split = (
    IndexMap<String, TableProfile>,
    IndexMap<String, TableAnomalies>,
);

fn split_assessments(assessments: &IndexMap<String, TableAssessment>) -> Split {
    let profiles = assessments
        .iter()
        .map(|(name, a)| (name.clone(), a.profile.clone()))
        .collect();
    let anomalies = assessments
        .iter()
        .map(|(name, a)| (name.clone(), a.anomalies.clone()))
        .collect();
    (profiles, anomalies)
}

// =============================================================================
// FACADE
// =============================================================================

/// The main quality engine: rules, profiling, anomaly detection, quality
/// checks and table preparation behind one value.
#[derive(Debug, Clone)]
pub struct Assay {
    config: AssayConfig,
    engine: RuleEngine,
    profiler: Profiler,
    detector: AnomalyDetector,
    validator: QualityValidator,
    transforms: TransformRegistry,
}

impl Assay {
    /// Default configuration with the standard rules and transforms.
    pub fn new() -> Result<Self> {
        Self::with_config(AssayConfig::default())
    }

    pub fn with_config(config: AssayConfig) -> Result<Self> {
        let registry = Arc::new(RuleRegistry::with_standard_rules()?);
        Self::with_parts(config, registry, TransformRegistry::standard())
    }

    /// Build from caller-supplied rules and transforms.
    pub fn with_parts(
        config: AssayConfig,
        registry: Arc<RuleRegistry>,
        transforms: TransformRegistry,
    ) -> Result<Self> {
        config.validate()?;
        let detector = AnomalyDetector::with_config(config.anomaly.clone(), config.isolation.clone());
        let validator = QualityValidator::with_config(
            config.thresholds(),
            crate::quality::ForeignKeyMap::standard(),
        );
        let profiler = Profiler::new().with_date_marker(config.date_marker.clone());

        Ok(Self {
            engine: RuleEngine::new(registry),
            profiler,
            detector,
            validator,
            transforms,
            config,
        })
    }

    pub fn config(&self) -> &AssayConfig {
        &self.config
    }

    pub fn registry(&self) -> &RuleRegistry {
        self.engine.registry()
    }

    pub fn engine(&self) -> &RuleEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut RuleEngine {
        &mut self.engine
    }

    pub fn detector(&self) -> &AnomalyDetector {
        &self.detector
    }

    pub fn profiler(&self) -> &Profiler {
        &self.profiler
    }

    pub fn transforms(&self) -> &TransformRegistry {
        &self.transforms
    }

    /// Clean and reshape a table: drop duplicate rows, parse date columns,
    /// add derived columns and drop rows violating business rules.
    ///
    /// Returns a copy of the input when transformation is disabled.
    #[instrument(skip(self, dataset), fields(rows = dataset.row_count()))]
    pub fn prepare(&self, table_name: &str, dataset: &Dataset) -> Result<Dataset> {
        if !self.config.enable_transformation {
            return Ok(dataset.clone());
        }

        let marker = self.config.date_marker.to_lowercase();
        let date_columns: Vec<&str> = dataset
            .column_names()
            .filter(|name| !marker.is_empty() && name.to_lowercase().contains(&marker))
            .collect();

        let out = remove_duplicates(dataset, None)?;
        let out = standardize_dates(&out, &date_columns)?;
        let out = self.transforms.derive(table_name, &out)?;
        let out = self.transforms.apply_business_rules(table_name, &out)?;

        info!(before = dataset.row_count(), after = out.row_count(), "prepared table");
        Ok(out)
    }

    /// Quality report, rule results, profile and anomalies for one table.
    #[instrument(skip(self, dataset, references), fields(rows = dataset.row_count()))]
    pub fn assess(
        &mut self,
        table_name: &str,
        dataset: &Dataset,
        references: &ReferenceKeys,
    ) -> TableAssessment {
        let (quality, results) = if self.config.enable_validation {
            let quality = self
                .validator
                .validate_table(dataset, table_name, &[], references);
            if !quality.validation_passed() {
                for issue in quality.issues() {
                    warn!(issue = %issue, "quality issue");
                }
            }
            let results = self.engine.execute(dataset, table_name);
            (Some(quality), results)
        } else {
            (None, Vec::new())
        };

        TableAssessment {
            table_name: table_name.to_string(),
            quality,
            results,
            profile: self.profiler.profile(dataset, table_name),
            anomalies: self.detector.analyze_table(dataset, table_name),
        }
    }

    /// Prepare and assess every table in order.
    ///
    /// A table that fails preparation is logged, listed in
    /// `failed_tables`, and the run moves on.
    pub fn run<'a>(
        &mut self,
        tables: impl IntoIterator<Item = (&'a str, &'a Dataset)>,
        references: &ReferenceKeys,
    ) -> RunOutcome {
        let started_at = Utc::now();
        info!("quality run started");

        let mut assessments = IndexMap::new();
        let mut tables_processed = 0;
        let mut total_rows_extracted = 0;
        let mut total_rows_retained = 0;
        let mut failed_tables = Vec::new();

        for (table_name, dataset) in tables {
            total_rows_extracted += dataset.row_count();
            let prepared = match self.prepare(table_name, dataset) {
                Ok(prepared) => prepared,
                Err(e) => {
                    error!(table = table_name, error = %e, "failed to process table");
                    failed_tables.push(table_name.to_string());
                    continue;
                }
            };
            total_rows_retained += prepared.row_count();
            let assessment = self.assess(table_name, &prepared, references);
            assessments.insert(table_name.to_string(), assessment);
            tables_processed += 1;
        }

        let validation_history = self.engine.history().to_vec();
        let (profiles, anomalies) = split_assessments(&assessments);
        let summary = ReportAggregator::summarize(&validation_history, &profiles, &anomalies);

        let stats = RunStats {
            started_at,
            finished_at: Utc::now(),
            tables_processed,
            total_rows_extracted,
            total_rows_retained,
            failed_tables,
        };
        if stats.failed_tables.is_empty() {
            info!(tables = stats.tables_processed, "all tables processed");
        } else {
            error!(failed = ?stats.failed_tables, "some tables failed");
        }

        RunOutcome {
            assessments,
            stats,
            summary,
            validation_history,
        }
    }
}
