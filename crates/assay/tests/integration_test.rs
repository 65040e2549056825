//! Integration tests for Assay.

use std::io::Write;
use std::sync::Arc;

use indexmap::IndexMap;
use tempfile::NamedTempFile;

use assay::anomaly::DetectionMethod;
use assay::report::PassRate;
use assay::transform::TransformRegistry;
use assay::{
    AnomalyDetector, Assay, AssayConfig, Dataset, Parser, Predicate, Profiler, ReferenceKeys,
    ReportAggregator, RuleEngine, RuleRegistry, Severity, ValidationRule, Value,
};

/// Helper to create a temporary file with given content.
fn create_test_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write to temp file");
    file
}

fn numbers(values: impl IntoIterator<Item = f64>) -> Vec<Value> {
    values.into_iter().map(Value::number).collect()
}

// =============================================================================
// End-to-end Scenarios
// =============================================================================

#[test]
fn test_orders_business_rules_remove_invalid_quantities() {
    let quantities: Vec<f64> = (0..100)
        .map(|i| match i {
            10 => 0.0,
            40 => -3.0,
            77 => -1.0,
            _ => (i % 9 + 1) as f64,
        })
        .collect();
    let costs: Vec<f64> = (0..100).map(|i| 50.0 + i as f64).collect();
    let orders = Dataset::from_columns([
        ("order_quantity", numbers(quantities)),
        ("order_cost", numbers(costs)),
    ])
    .unwrap();

    let filtered = TransformRegistry::standard()
        .apply_business_rules("orders", &orders)
        .expect("business rules failed");

    assert_eq!(filtered.row_count(), 97);
    assert_eq!(orders.row_count(), 100);
}

#[test]
fn test_reliability_score_out_of_range() {
    let mut scores: Vec<f64> = (0..40).map(|i| (i * 2) as f64).collect();
    scores[17] = 150.0;
    let suppliers = Dataset::from_columns([
        ("supplier_id", numbers((1..=40).map(|i| i as f64))),
        ("reliability_score", numbers(scores)),
    ])
    .unwrap();

    let registry = Arc::new(RuleRegistry::with_standard_rules().unwrap());
    let mut engine = RuleEngine::new(registry);
    let results = engine.execute(&suppliers, "suppliers");

    let range = results
        .iter()
        .find(|r| r.rule_name == "reliability_score_range")
        .expect("range rule ran");
    assert!(!range.passed);
    assert_eq!(range.affected_rows, 1);
    assert!((range.affected_percentage - 1.0 / 40.0 * 100.0).abs() < 1e-12);
    assert_eq!(range.severity, Severity::Critical);

    let unique = results
        .iter()
        .find(|r| r.rule_name == "supplier_id_unique")
        .unwrap();
    assert!(unique.passed);
}

#[test]
fn test_empty_dataset_reports_zeroes() {
    let empty = Dataset::empty_with_columns([
        "quantity_on_hand",
        "quantity_reserved",
        "last_count_date",
    ]);

    let mut assay = Assay::new().unwrap();
    let assessment = assay.assess("inventory", &empty, &ReferenceKeys::new());

    assert_eq!(assessment.results.len(), 2);
    for result in &assessment.results {
        assert!(result.passed, "{} should pass on empty input", result.rule_name);
        assert_eq!(result.affected_percentage, 0.0);
    }
    assert_eq!(assessment.profile.row_count, 0);
    assert_eq!(assessment.profile.duplicate_rows, 0);
    for column in assessment.profile.columns.values() {
        assert_eq!(column.null_percentage, 0.0);
    }
    assert!(assessment.anomalies.findings.is_empty());
    assert!(assessment.quality.unwrap().validation_passed());

    let summary = ReportAggregator::summarize(&[], &IndexMap::new(), &IndexMap::new());
    assert_eq!(summary.validation_summary.pass_rate, PassRate::NotApplicable);
    assert_eq!(
        serde_json::to_value(&summary).unwrap()["validation_summary"]["pass_rate"],
        "N/A"
    );
}

#[test]
fn test_constant_column_zscore() {
    let ds =
        Dataset::from_columns([("unit_cost", numbers(std::iter::repeat_n(12.5, 200)))]).unwrap();

    let profile = Profiler::new().profile(&ds, "products");
    let assay::profile::ColumnStats::Numeric(stats) = &profile.columns["unit_cost"].stats else {
        panic!("expected numeric stats");
    };
    assert_eq!(stats.std, 0.0);
    assert_eq!(stats.skewness, 0.0);

    let finding = AnomalyDetector::new()
        .detect_column(&ds, "unit_cost", DetectionMethod::Zscore)
        .unwrap();
    assert_eq!(finding.outlier_count, 0);
    assert!(finding.outlier_percentage.is_finite());
}

// =============================================================================
// Engine Behaviour
// =============================================================================

#[test]
fn test_failing_predicate_does_not_abort_batch() {
    let mut registry = RuleRegistry::new();
    registry
        .register(
            "t",
            ValidationRule::validity(
                "broken",
                Predicate::custom("short_mask", |_| Ok(vec![true])),
            ),
        )
        .unwrap();
    registry
        .register("t", ValidationRule::uniqueness("id_unique", "id"))
        .unwrap();
    registry
        .register("t", ValidationRule::completeness("id_complete", "id", 0.0))
        .unwrap();

    let ds = Dataset::from_columns([("id", numbers([1.0, 2.0, 2.0]))]).unwrap();
    let mut engine = RuleEngine::new(Arc::new(registry));
    let results = engine.execute(&ds, "t");

    assert_eq!(results.len(), 3);
    assert!(!results[0].passed);
    assert_eq!(results[0].severity, Severity::Critical);
    assert!(results[0].message.starts_with("Rule execution failed"));
    assert_eq!(results[1].affected_rows, 1);
    assert!(results[2].passed);
}

#[test]
fn test_engines_share_registry_not_history() {
    let registry = Arc::new(RuleRegistry::with_standard_rules().unwrap());
    let ds = Dataset::from_columns([("quantity_sold", numbers([1.0, 2.0]))]).unwrap();

    let mut a = RuleEngine::new(Arc::clone(&registry));
    let b = RuleEngine::new(Arc::clone(&registry));
    a.execute(&ds, "sales");

    assert_eq!(a.history().len(), 1);
    assert!(b.history().is_empty());
}

// =============================================================================
// File-based Pipeline
// =============================================================================

#[test]
fn test_check_inventory_file() {
    let content = "product_id,warehouse_id,quantity_on_hand,quantity_reserved,last_count_date\n\
                   1,1,10,2,2024-01-02\n\
                   2,1,5,7,2024-01-03\n\
                   3,2,8,1,2024-01-04\n\
                   3,2,8,1,2024-01-04\n\
                   4,2,-2,0,2024-01-05\n";
    let file = create_test_file(content);
    let (inventory, source) = Parser::new().parse_file(file.path()).expect("parse failed");
    assert_eq!(source.row_count, 5);
    assert_eq!(source.format, "csv");

    let mut references = ReferenceKeys::new();
    references.insert("products", [1i64, 2, 3]);
    references.insert("warehouses", [1i64, 2]);

    let mut assay = Assay::new().unwrap();
    let prepared = assay.prepare("inventory", &inventory).unwrap();
    // one duplicate, one negative on-hand row
    assert_eq!(prepared.row_count(), 3);
    assert!(prepared.has_column("quantity_available"));

    let assessment = assay.assess("inventory", &prepared, &references);
    let reserved = assessment
        .results
        .iter()
        .find(|r| r.rule_name == "reserved_not_exceed_onhand")
        .unwrap();
    assert!(!reserved.passed);
    assert_eq!(reserved.affected_rows, 1);

    let quality = assessment.quality.as_ref().unwrap();
    assert!(quality.missing_foreign_keys.is_empty());
    assert!(quality.validation_passed());
}

#[test]
fn test_run_summary_and_json_export() {
    let sales = Dataset::from_columns([
        ("product_id", numbers([1.0, 2.0, 3.0])),
        ("quantity_sold", numbers([2.0, 4.0, 5.0])),
        ("revenue", numbers([20.0, 10.0, 50.0])),
    ])
    .unwrap();
    let products = Dataset::from_columns([
        ("product_id", numbers([1.0, 2.0, 2.0])),
        ("unit_cost", numbers([3.0, 4.0, 5.0])),
        ("reorder_level", numbers([1.0, 1.0, 1.0])),
    ])
    .unwrap();

    let mut references = ReferenceKeys::new();
    references.insert_column("products", &products, "product_id").unwrap();

    let mut assay = Assay::with_config(AssayConfig::default()).unwrap();
    let outcome = assay.run([("sales", &sales), ("products", &products)], &references);

    assert!(outcome.stats.failed_tables.is_empty());
    assert_eq!(outcome.stats.tables_processed, 2);
    let summary = &outcome.summary;
    assert_eq!(summary.validation_summary.total_rules, 3);
    assert_eq!(summary.validation_summary.failed, 1);
    assert_eq!(summary.data_summary.total_tables, 2);
    assert_eq!(summary.data_summary.total_rows, 6);

    // unit_price is derived during preparation
    let sales_assessment = &outcome.assessments["sales"];
    assert_eq!(sales_assessment.profile.column_count, 4);

    let json = outcome.bundle().to_json_pretty().unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["summary"]["validation_summary"]["pass_rate"], "66.67%");
    assert_eq!(parsed["validation"].as_array().unwrap().len(), 3);
}
