//! Per-table rule registry.

use indexmap::IndexMap;
use tracing::debug;

use crate::error::{AssayError, Result};

use super::predicate::{CompareOp, Predicate};
use super::rule::{Severity, ValidationRule};

/// Mapping from table name to its ordered validation rules.
///
/// Populate once at startup, then share read-only (e.g. behind an `Arc`).
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    rules: IndexMap<String, Vec<ValidationRule>>,
}

impl RuleRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry seeded with the standard business rules.
    pub fn with_standard_rules() -> Result<Self> {
        let mut registry = Self::new();
        registry.register_standard_rules()?;
        Ok(registry)
    }

    /// Append a rule to a table's list.
    ///
    /// Fails if the rule is malformed or its name is already taken for
    /// that table.
    pub fn register(&mut self, table_name: impl Into<String>, rule: ValidationRule) -> Result<()> {
        let table_name = table_name.into();
        rule.validate()?;

        if self.contains(&table_name, &rule.rule_name) {
            return Err(AssayError::DuplicateRule {
                table: table_name,
                rule: rule.rule_name,
            });
        }

        debug!(table = %table_name, rule = %rule.rule_name, "registered rule");
        self.rules.entry(table_name).or_default().push(rule);
        Ok(())
    }

    /// Rules for a table in registration order; empty for unknown tables.
    pub fn rules_for(&self, table_name: &str) -> &[ValidationRule] {
        self.rules.get(table_name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether `rule_name` is registered for `table_name`.
    pub fn contains(&self, table_name: &str, rule_name: &str) -> bool {
        self.rules_for(table_name)
            .iter()
            .any(|r| r.rule_name == rule_name)
    }

    /// Tables that have at least one rule, in first-registration order.
    pub fn tables(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    /// Total number of registered rules.
    pub fn len(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Seed the standard rules for suppliers, products, inventory, orders
    /// and sales. Rules already present by name are skipped.
    pub fn register_standard_rules(&mut self) -> Result<()> {
        for (table, rule) in standard_rules() {
            if self.contains(table, &rule.rule_name) {
                continue;
            }
            self.register(table, rule)?;
        }
        Ok(())
    }
}

fn standard_rules() -> Vec<(&'static str, ValidationRule)> {
    vec![
        (
            "suppliers",
            ValidationRule::uniqueness("supplier_id_unique", "supplier_id")
                .with_severity(Severity::Critical)
                .with_description("Supplier ID must be unique"),
        ),
        (
            "suppliers",
            ValidationRule::validity(
                "reliability_score_range",
                Predicate::range("reliability_score", Some(0.0), Some(100.0)),
            )
            .with_column("reliability_score")
            .with_severity(Severity::Critical)
            .with_description("Reliability score must be between 0 and 100"),
        ),
        (
            "products",
            ValidationRule::uniqueness("product_id_unique", "product_id")
                .with_severity(Severity::Critical)
                .with_description("Product ID must be unique"),
        ),
        (
            "products",
            ValidationRule::validity(
                "unit_cost_positive",
                Predicate::compare("unit_cost", CompareOp::Gt, 0.0),
            )
            .with_column("unit_cost")
            .with_severity(Severity::Critical)
            .with_description("Unit cost must be positive"),
        ),
        (
            "inventory",
            ValidationRule::validity(
                "quantity_on_hand_valid",
                Predicate::compare("quantity_on_hand", CompareOp::Ge, 0.0),
            )
            .with_column("quantity_on_hand")
            .with_severity(Severity::Critical)
            .with_description("Quantity on hand cannot be negative"),
        ),
        (
            "inventory",
            ValidationRule::consistency(
                "reserved_not_exceed_onhand",
                Predicate::cross_column("quantity_reserved", CompareOp::Le, "quantity_on_hand"),
            )
            .with_column("quantity_reserved")
            .with_severity(Severity::Critical)
            .with_description("Reserved quantity cannot exceed quantity on hand"),
        ),
        (
            "orders",
            ValidationRule::validity(
                "order_quantity_positive",
                Predicate::compare("order_quantity", CompareOp::Gt, 0.0),
            )
            .with_column("order_quantity")
            .with_severity(Severity::Critical)
            .with_description("Order quantity must be positive"),
        ),
        (
            "sales",
            ValidationRule::validity(
                "quantity_sold_positive",
                Predicate::compare("quantity_sold", CompareOp::Gt, 0.0),
            )
            .with_column("quantity_sold")
            .with_severity(Severity::Critical)
            .with_description("Quantity sold must be positive"),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_table_has_no_rules() {
        let registry = RuleRegistry::new();
        assert!(registry.rules_for("nope").is_empty());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut registry = RuleRegistry::new();
        registry
            .register("t", ValidationRule::uniqueness("id_unique", "id"))
            .unwrap();
        let err = registry
            .register("t", ValidationRule::uniqueness("id_unique", "other"))
            .unwrap_err();
        assert!(matches!(err, AssayError::DuplicateRule { .. }));

        // Same name on another table is fine
        registry
            .register("u", ValidationRule::uniqueness("id_unique", "id"))
            .unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_malformed_rule_fails_at_registration() {
        let mut registry = RuleRegistry::new();
        let mut rule = ValidationRule::completeness("c", "col", 5.0);
        rule.threshold = None;
        assert!(matches!(
            registry.register("t", rule),
            Err(AssayError::InvalidRule { .. })
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_standard_rules_are_idempotent() {
        let mut registry = RuleRegistry::with_standard_rules().unwrap();
        let count = registry.len();
        assert_eq!(count, 8);
        registry.register_standard_rules().unwrap();
        assert_eq!(registry.len(), count);

        let names: Vec<_> = registry
            .rules_for("inventory")
            .iter()
            .map(|r| r.rule_name.as_str())
            .collect();
        assert_eq!(names, vec!["quantity_on_hand_valid", "reserved_not_exceed_onhand"]);
        assert_eq!(
            registry.tables().collect::<Vec<_>>(),
            vec!["suppliers", "products", "inventory", "orders", "sales"]
        );
    }
}
