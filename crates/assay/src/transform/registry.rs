//! Per-table derivations and business-rule filters.

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::error::{AssayError, Result};
use crate::input::Dataset;
use crate::rules::{CompareOp, Predicate};

use super::operations::Derivation;

/// Derived columns and row filters for one table.
#[derive(Debug, Clone, Default)]
pub struct TableTransform {
    pub derivations: Vec<Derivation>,
    /// Rows failing any filter are removed.
    pub filters: Vec<Predicate>,
}

impl TableTransform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_derivation(mut self, derivation: Derivation) -> Self {
        self.derivations.push(derivation);
        self
    }

    pub fn with_filter(mut self, filter: Predicate) -> Self {
        self.filters.push(filter);
        self
    }
}

/// Table name to [`TableTransform`] lookup.
#[derive(Debug, Clone, Default)]
pub struct TransformRegistry {
    tables: IndexMap<String, TableTransform>,
}

impl TransformRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transforms for the supply-chain tables.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(
            "products",
            TableTransform::new()
                .with_filter(Predicate::compare("unit_cost", CompareOp::Gt, 0.0))
                .with_filter(Predicate::compare("reorder_level", CompareOp::Ge, 0.0)),
        );
        registry.register(
            "inventory",
            TableTransform::new()
                .with_derivation(Derivation::difference(
                    "quantity_on_hand",
                    "quantity_reserved",
                    "quantity_available",
                ))
                .with_filter(Predicate::compare("quantity_on_hand", CompareOp::Ge, 0.0))
                .with_filter(Predicate::compare("quantity_reserved", CompareOp::Ge, 0.0)),
        );
        registry.register(
            "orders",
            TableTransform::new()
                .with_derivation(Derivation::day_delta(
                    "expected_delivery_date",
                    "actual_delivery_date",
                    "delivery_delay_days",
                ))
                .with_derivation(Derivation::exceeds("delivery_delay_days", 0.0, "is_late"))
                .with_filter(Predicate::compare("order_quantity", CompareOp::Gt, 0.0))
                .with_filter(Predicate::compare("order_cost", CompareOp::Ge, 0.0)),
        );
        registry.register(
            "sales",
            TableTransform::new()
                .with_derivation(Derivation::ratio("revenue", "quantity_sold", "unit_price"))
                .with_filter(Predicate::compare("quantity_sold", CompareOp::Gt, 0.0))
                .with_filter(Predicate::compare("revenue", CompareOp::Ge, 0.0)),
        );
        registry
    }

    /// Set the transform for a table, replacing any previous one.
    pub fn register(&mut self, table: impl Into<String>, transform: TableTransform) {
        self.tables.insert(table.into(), transform);
    }

    pub fn get(&self, table: &str) -> Option<&TableTransform> {
        self.tables.get(table)
    }

    pub fn tables(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Add the table's derived columns, in declaration order.
    ///
    /// Derivations whose input columns are absent are skipped. Unknown
    /// tables pass through unchanged.
    pub fn derive(&self, table: &str, dataset: &Dataset) -> Result<Dataset> {
        let Some(transform) = self.get(table) else {
            return Ok(dataset.clone());
        };

        let mut out = dataset.clone();
        for derivation in &transform.derivations {
            if !derivation.applies_to(&out) {
                debug!(table, derivation = %derivation, "inputs absent, skipped");
                continue;
            }
            out = derivation.apply(&out)?;
            info!(table, derivation = %derivation, "added derived column");
        }
        Ok(out)
    }

    /// Remove rows violating the table's filters.
    ///
    /// A filter on an absent column is an error. Unknown tables pass
    /// through unchanged.
    pub fn apply_business_rules(&self, table: &str, dataset: &Dataset) -> Result<Dataset> {
        let Some(transform) = self.get(table) else {
            return Ok(dataset.clone());
        };

        let initial = dataset.row_count();
        let mut out = dataset.clone();
        for filter in &transform.filters {
            let mask = filter.evaluate(&out).map_err(|e| {
                AssayError::Evaluation(format!("business rule '{}' failed: {}", filter, e))
            })?;
            out = out.filter_rows(&mask)?;
        }

        let removed = initial - out.row_count();
        if removed > 0 {
            warn!(table, removed, "removed rows violating business rules");
        }
        Ok(out)
    }
}
