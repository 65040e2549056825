//! Rule execution engine.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::error::{AssayError, Result};
use crate::input::Dataset;
use crate::report::{ValidationRow, validation_rows};

use super::registry::RuleRegistry;
use super::result::{ValidationResult, percentage};
use super::rule::{RuleType, ValidationRule};

/// Evaluates a table's registered rules and keeps the results history.
///
/// Each engine owns its history. Engines built from the same registry can
/// run side by side without sharing mutable state.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    registry: Arc<RuleRegistry>,
    history: Vec<ValidationResult>,
}

impl RuleEngine {
    /// Create an engine over a shared, read-only registry.
    pub fn new(registry: Arc<RuleRegistry>) -> Self {
        Self {
            registry,
            history: Vec::new(),
        }
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Run every rule registered for `table_name`, in registration order.
    ///
    /// Never fails: a rule that cannot be evaluated becomes a critical
    /// failed result and the remaining rules still run. Results are also
    /// appended to the history.
    #[instrument(skip(self, dataset), fields(rows = dataset.row_count()))]
    pub fn execute(&mut self, dataset: &Dataset, table_name: &str) -> Vec<ValidationResult> {
        let rules = self.registry.rules_for(table_name);
        if rules.is_empty() {
            debug!("no rules registered");
            return Vec::new();
        }

        let results: Vec<ValidationResult> =
            rules.iter().map(|rule| evaluate_rule(rule, dataset)).collect();

        let failed = results.iter().filter(|r| !r.passed).count();
        debug!(rules = results.len(), failed, "executed rules");

        self.history.extend(results.iter().cloned());
        results
    }

    /// All results produced by this engine, oldest first.
    pub fn history(&self) -> &[ValidationResult] {
        &self.history
    }

    /// Drop the accumulated history.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Flat projection of the history for tabular display.
    pub fn summary_rows(&self) -> Vec<ValidationRow> {
        validation_rows(&self.history)
    }
}

/// Evaluate a single rule against a dataset.
pub fn evaluate_rule(rule: &ValidationRule, dataset: &Dataset) -> ValidationResult {
    let outcome = match rule.rule_type {
        RuleType::Uniqueness => check_uniqueness(rule, dataset),
        RuleType::Completeness => check_completeness(rule, dataset),
        RuleType::Validity | RuleType::Consistency => check_condition(rule, dataset),
    };

    outcome.unwrap_or_else(|e| {
        warn!(rule = %rule.rule_name, error = %e, "rule evaluation failed");
        ValidationResult::failed(&rule.rule_name, format!("Rule execution failed: {}", e))
            .with_detail("error", e.to_string())
    })
}

fn target_column(rule: &ValidationRule) -> Result<&str> {
    rule.target_column
        .as_deref()
        .ok_or_else(|| AssayError::InvalidRule {
            rule: rule.rule_name.clone(),
            reason: format!("{} rules require a target column", rule.rule_type.label()),
        })
}

/// Count values that repeat an earlier one. Repeated missing values count too.
fn check_uniqueness(rule: &ValidationRule, dataset: &Dataset) -> Result<ValidationResult> {
    let column = dataset.column(target_column(rule)?)?;
    let mut seen = HashSet::with_capacity(column.len());
    let duplicates = column
        .values
        .iter()
        .filter(|v| !seen.insert(v.key()))
        .count();

    Ok(ValidationResult::evaluated(
        &rule.rule_name,
        duplicates == 0,
        rule.severity,
        &rule.description,
        duplicates,
        dataset.row_count(),
    )
    .with_detail("duplicate_count", duplicates))
}

fn check_completeness(rule: &ValidationRule, dataset: &Dataset) -> Result<ValidationResult> {
    let column = dataset.column(target_column(rule)?)?;
    let null_count = column.null_count();
    let null_percentage = percentage(null_count, dataset.row_count());
    let threshold = rule.threshold.unwrap_or(0.0);
    let passed = null_percentage <= threshold;

    Ok(ValidationResult::evaluated(
        &rule.rule_name,
        passed,
        rule.severity,
        &rule.description,
        null_count,
        dataset.row_count(),
    )
    .with_detail("null_count", null_count)
    .with_detail("null_percentage", null_percentage))
}

fn check_condition(rule: &ValidationRule, dataset: &Dataset) -> Result<ValidationResult> {
    let predicate = rule.predicate.as_ref().ok_or_else(|| AssayError::InvalidRule {
        rule: rule.rule_name.clone(),
        reason: "No condition defined for rule".to_string(),
    })?;

    let mask = predicate
        .evaluate(dataset)
        .map_err(|e| AssayError::Evaluation(format!("condition '{}' failed: {}", predicate, e)))?;
    let invalid_count = mask.iter().filter(|valid| !**valid).count();

    Ok(ValidationResult::evaluated(
        &rule.rule_name,
        invalid_count == 0,
        rule.severity,
        &rule.description,
        invalid_count,
        dataset.row_count(),
    )
    .with_detail("invalid_count", invalid_count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Value;
    use crate::rules::{CompareOp, Predicate, Severity};

    fn engine_with(rules: Vec<ValidationRule>) -> RuleEngine {
        let mut registry = RuleRegistry::new();
        for rule in rules {
            registry.register("t", rule).unwrap();
        }
        RuleEngine::new(Arc::new(registry))
    }

    fn numbers(values: &[Option<f64>]) -> Vec<Value> {
        values.iter().map(|v| Value::from(*v)).collect()
    }

    #[test]
    fn test_uniqueness_counts_extra_occurrences() {
        let ds = Dataset::from_columns([(
            "id",
            numbers(&[Some(1.0), Some(2.0), Some(1.0), Some(1.0), Some(3.0), None, None]),
        )])
        .unwrap();
        let mut engine = engine_with(vec![ValidationRule::uniqueness("id_unique", "id")]);

        let results = engine.execute(&ds, "t");
        assert_eq!(results.len(), 1);
        assert!(!results[0].passed);
        assert_eq!(results[0].affected_rows, 3);
        assert_eq!(results[0].details["duplicate_count"], 3);
    }

    #[test]
    fn test_uniqueness_flags_repeated_blank_ids() {
        let ds = Dataset::from_columns([(
            "supplier_id",
            numbers(&[Some(1.0), None, None, None]),
        )])
        .unwrap();
        let mut engine = engine_with(vec![ValidationRule::uniqueness(
            "supplier_id_unique",
            "supplier_id",
        )]);

        let result = &engine.execute(&ds, "t")[0];
        assert!(!result.passed);
        assert_eq!(result.affected_rows, 2);
        assert_eq!(result.affected_percentage, 50.0);
    }

    #[test]
    fn test_completeness_threshold_is_inclusive() {
        let ds = Dataset::from_columns([(
            "email",
            numbers(&[Some(1.0), None, Some(1.0), Some(1.0)]),
        )])
        .unwrap();
        let mut engine = engine_with(vec![
            ValidationRule::completeness("at_limit", "email", 25.0),
            ValidationRule::completeness("below_limit", "email", 24.9),
        ]);

        let results = engine.execute(&ds, "t");
        assert!(results[0].passed);
        assert!(!results[1].passed);
        assert_eq!(results[0].affected_percentage, 25.0);
    }

    #[test]
    fn test_bad_rule_does_not_block_others() {
        let ds = Dataset::from_columns([("qty", numbers(&[Some(1.0), Some(-2.0)]))]).unwrap();
        let mut engine = engine_with(vec![
            ValidationRule::validity("missing_col", Predicate::compare("nope", CompareOp::Gt, 0.0))
                .with_severity(Severity::Info),
            ValidationRule::validity("qty_positive", Predicate::compare("qty", CompareOp::Gt, 0.0)),
        ]);

        let results = engine.execute(&ds, "t");
        assert_eq!(results.len(), 2);
        assert!(!results[0].passed);
        assert_eq!(results[0].severity, Severity::Critical);
        assert!(results[0].message.contains("nope"));
        assert_eq!(results[1].affected_rows, 1);
        assert_eq!(results[1].affected_percentage, 50.0);
    }

    #[test]
    fn test_custom_predicate_error_becomes_result() {
        let ds = Dataset::from_columns([("a", numbers(&[Some(1.0)]))]).unwrap();
        let mut engine = engine_with(vec![ValidationRule::consistency(
            "explodes",
            Predicate::custom("explodes", |_| Err(AssayError::Evaluation("bad".into()))),
        )]);
        let results = engine.execute(&ds, "t");
        assert!(!results[0].passed);
        assert_eq!(results[0].severity, Severity::Critical);
    }

    #[test]
    fn test_empty_table_percentages_are_zero() {
        let ds = Dataset::empty_with_columns(["id", "qty"]);
        let mut engine = engine_with(vec![
            ValidationRule::uniqueness("u", "id"),
            ValidationRule::completeness("c", "id", 0.0),
            ValidationRule::validity("v", Predicate::compare("qty", CompareOp::Gt, 0.0)),
        ]);
        for result in engine.execute(&ds, "t") {
            assert!(result.passed);
            assert_eq!(result.affected_percentage, 0.0);
        }
    }

    #[test]
    fn test_history_accumulates() {
        let ds = Dataset::from_columns([("id", numbers(&[Some(1.0)]))]).unwrap();
        let mut engine = engine_with(vec![ValidationRule::uniqueness("u", "id")]);
        engine.execute(&ds, "t");
        engine.execute(&ds, "t");
        engine.execute(&ds, "unknown");
        assert_eq!(engine.history().len(), 2);

        let rows = engine.summary_rows();
        assert_eq!(rows[0].status, "PASS");
        assert_eq!(rows[0].affected_percentage, "0.00%");

        engine.clear_history();
        assert!(engine.history().is_empty());
    }
}
