//! Structural quality checks: required columns, nulls, duplicates and
//! foreign-key integrity.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::error::Result;
use crate::input::{Dataset, ValueKey};

use super::report::DataQualityReport;

/// Tolerated shares of bad rows, as fractions in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityThresholds {
    pub null_threshold: f64,
    pub duplicate_threshold: f64,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            null_threshold: 0.05,
            duplicate_threshold: 0.01,
        }
    }
}

/// Foreign-key columns per table, each pointing at a parent table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForeignKeyMap {
    keys: IndexMap<String, Vec<(String, String)>>,
}

impl ForeignKeyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Relationships of the supply-chain schema.
    pub fn standard() -> Self {
        Self::new()
            .with_key("products", "supplier_id", "suppliers")
            .with_key("inventory", "product_id", "products")
            .with_key("inventory", "warehouse_id", "warehouses")
            .with_key("orders", "supplier_id", "suppliers")
            .with_key("sales", "product_id", "products")
            .with_key("sales", "warehouse_id", "warehouses")
            .with_key("price_history", "product_id", "products")
            .with_key("price_history", "supplier_id", "suppliers")
    }

    pub fn with_key(
        mut self,
        table: impl Into<String>,
        column: impl Into<String>,
        parent: impl Into<String>,
    ) -> Self {
        self.keys
            .entry(table.into())
            .or_default()
            .push((column.into(), parent.into()));
        self
    }

    /// `(column, parent_table)` pairs for `table`, in declaration order.
    pub fn keys_for(&self, table: &str) -> &[(String, String)] {
        self.keys.get(table).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Known key values of parent tables, supplied by the caller.
///
/// The parent key column is assumed to share the foreign key's name
/// (`product_id` in `sales` refers to `product_id` in `products`).
#[derive(Debug, Clone, Default)]
pub struct ReferenceKeys {
    tables: IndexMap<String, HashSet<ValueKey>>,
}

impl ReferenceKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add key values for `parent`.
    pub fn insert<I, V>(&mut self, parent: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<crate::input::Value>,
    {
        let keys = self.tables.entry(parent.into()).or_default();
        keys.extend(
            values
                .into_iter()
                .map(Into::into)
                .filter(|v| !v.is_missing())
                .map(|v| v.key()),
        );
    }

    /// Add every non-missing value of `column` in `dataset` as keys of `parent`.
    pub fn insert_column(
        &mut self,
        parent: impl Into<String>,
        dataset: &Dataset,
        column: &str,
    ) -> Result<()> {
        let values = dataset.column(column)?.values.clone();
        self.insert(parent, values);
        Ok(())
    }

    pub fn get(&self, parent: &str) -> Option<&HashSet<ValueKey>> {
        self.tables.get(parent)
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Produces a [`DataQualityReport`] per table.
#[derive(Debug, Clone, Default)]
pub struct QualityValidator {
    thresholds: QualityThresholds,
    foreign_keys: ForeignKeyMap,
}

impl QualityValidator {
    /// Validator with default thresholds and the standard key map.
    pub fn new() -> Self {
        Self::with_config(QualityThresholds::default(), ForeignKeyMap::standard())
    }

    pub fn with_config(thresholds: QualityThresholds, foreign_keys: ForeignKeyMap) -> Self {
        Self {
            thresholds,
            foreign_keys,
        }
    }

    pub fn thresholds(&self) -> &QualityThresholds {
        &self.thresholds
    }

    /// Run all structural checks on one table.
    #[instrument(skip_all, fields(table = table_name, rows = dataset.row_count()))]
    pub fn validate_table(
        &self,
        dataset: &Dataset,
        table_name: &str,
        required_columns: &[&str],
        references: &ReferenceKeys,
    ) -> DataQualityReport {
        let total = dataset.row_count();
        let mut report = DataQualityReport::new(table_name, total);

        let missing: Vec<&str> = required_columns
            .iter()
            .copied()
            .filter(|c| !dataset.has_column(c))
            .collect();
        if !missing.is_empty() {
            warn!(?missing, "missing required columns");
            report.add_issue(format!("Missing required columns: {}", missing.join(", ")));
        }

        for (name, column) in dataset.columns() {
            let nulls = column.null_count();
            if nulls == 0 {
                continue;
            }
            report.null_count.insert(name.to_string(), nulls);
            let share = nulls as f64 / total as f64;
            if share > self.thresholds.null_threshold {
                warn!(column = name, nulls, "high null count");
                report.add_issue(format!(
                    "Column '{}' has {:.1}% nulls (threshold: {:.1}%)",
                    name,
                    share * 100.0,
                    self.thresholds.null_threshold * 100.0
                ));
            }
        }

        if total > 0 {
            let duplicates = dataset
                .duplicated_rows(None)
                .map(|mask| mask.into_iter().filter(|d| *d).count())
                .unwrap_or(0);
            report.duplicate_count = duplicates;
            let share = duplicates as f64 / total as f64;
            if duplicates > 0 && share > self.thresholds.duplicate_threshold {
                warn!(duplicates, "duplicate rows found");
                report.add_issue(format!(
                    "Found {} duplicates ({:.1}%)",
                    duplicates,
                    share * 100.0
                ));
            }
        }

        for (column, orphans) in self.orphaned_keys(dataset, table_name, references) {
            warn!(column = %column, orphans, "orphaned foreign keys");
            report.add_issue(format!(
                "Missing foreign key references in '{}': {} rows",
                column, orphans
            ));
            report.missing_foreign_keys.insert(column, orphans);
        }

        if report.validation_passed() {
            info!("quality validation passed");
        } else {
            warn!(issues = report.issues().len(), "quality validation failed");
        }
        report
    }

    /// Count non-missing foreign-key values absent from the parent's keys.
    fn orphaned_keys(
        &self,
        dataset: &Dataset,
        table_name: &str,
        references: &ReferenceKeys,
    ) -> Vec<(String, usize)> {
        let mut issues = Vec::new();
        for (column, parent) in self.foreign_keys.keys_for(table_name) {
            let Ok(values) = dataset.column(column) else {
                continue;
            };
            let Some(known) = references.get(parent) else {
                warn!(column = %column, parent = %parent, "no reference keys supplied, skipping");
                continue;
            };

            let orphans = values
                .values
                .iter()
                .filter(|v| !v.is_missing() && !known.contains(&v.key()))
                .count();
            if orphans > 0 {
                issues.push((column.clone(), orphans));
            }
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Value;

    fn sales() -> Dataset {
        Dataset::from_columns([
            (
                "product_id",
                vec![
                    Value::from(1i64),
                    Value::from(2i64),
                    Value::from(99i64),
                    Value::Missing,
                ],
            ),
            (
                "warehouse_id",
                vec![
                    Value::from(1i64),
                    Value::from(1i64),
                    Value::from(1i64),
                    Value::from(1i64),
                ],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_orphaned_foreign_keys() {
        let mut refs = ReferenceKeys::new();
        refs.insert("products", [1i64, 2, 3]);

        let report = QualityValidator::new().validate_table(&sales(), "sales", &[], &refs);
        assert_eq!(report.missing_foreign_keys.get("product_id"), Some(&1));
        // warehouses not supplied: skipped, not an issue
        assert!(!report.missing_foreign_keys.contains_key("warehouse_id"));
        assert_eq!(report.null_count.get("product_id"), Some(&1));
        assert!(!report.validation_passed());
        assert!(report.issues().iter().any(|i| i.contains("product_id")));
    }

    #[test]
    fn test_thresholds_and_required_columns() {
        let validator = QualityValidator::with_config(
            QualityThresholds {
                null_threshold: 0.5,
                duplicate_threshold: 0.5,
            },
            ForeignKeyMap::new(),
        );
        let report = validator.validate_table(&sales(), "sales", &["product_id"], &ReferenceKeys::new());
        assert!(report.validation_passed());
        assert_eq!(report.duplicate_count, 0);

        let report = validator.validate_table(
            &sales(),
            "sales",
            &["product_id", "store_id"],
            &ReferenceKeys::new(),
        );
        assert_eq!(report.issues(), ["Missing required columns: store_id"]);
    }

    #[test]
    fn test_duplicates_over_threshold() {
        let ds = Dataset::from_columns([("a", vec![Value::from(1i64); 4])]).unwrap();
        let report = QualityValidator::new().validate_table(&ds, "t", &[], &ReferenceKeys::new());
        assert_eq!(report.duplicate_count, 3);
        assert_eq!(report.issues(), ["Found 3 duplicates (75.0%)"]);
    }

    #[test]
    fn test_empty_table_passes() {
        let ds = Dataset::empty_with_columns(["product_id"]);
        let report =
            QualityValidator::new().validate_table(&ds, "sales", &["product_id"], &ReferenceKeys::new());
        assert!(report.validation_passed());
        assert_eq!(report.total_rows, 0);
    }
}
