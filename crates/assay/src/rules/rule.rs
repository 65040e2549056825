//! Validation rule definitions.

use serde::{Deserialize, Serialize};

use crate::error::{AssayError, Result};

use super::predicate::Predicate;

/// Kind of check a rule performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    /// Target column values must not repeat.
    Uniqueness,
    /// Missing-value percentage must stay within a threshold.
    Completeness,
    /// Each row must satisfy a predicate.
    Validity,
    /// Related columns must agree; evaluated like validity.
    Consistency,
}

impl RuleType {
    pub fn label(&self) -> &'static str {
        match self {
            RuleType::Uniqueness => "uniqueness",
            RuleType::Completeness => "completeness",
            RuleType::Validity => "validity",
            RuleType::Consistency => "consistency",
        }
    }
}

/// Severity of a failed rule. Ordered `Info < Warning < Critical`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Informational only, may not require action.
    Info,
    /// Potential issue that should be reviewed.
    #[default]
    Warning,
    /// Data is not fit for downstream use.
    Critical,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Critical => "CRITICAL",
        }
    }
}

/// A named, typed check against a table.
#[derive(Debug, Clone)]
pub struct ValidationRule {
    pub rule_name: String,
    pub rule_type: RuleType,
    pub target_column: Option<String>,
    /// Maximum allowed missing percentage (0-100) for completeness rules.
    pub threshold: Option<f64>,
    pub predicate: Option<Predicate>,
    pub severity: Severity,
    pub description: String,
}

impl ValidationRule {
    fn base(rule_name: impl Into<String>, rule_type: RuleType) -> Self {
        Self {
            rule_name: rule_name.into(),
            rule_type,
            target_column: None,
            threshold: None,
            predicate: None,
            severity: Severity::default(),
            description: String::new(),
        }
    }

    /// Values of `column` must be unique.
    pub fn uniqueness(rule_name: impl Into<String>, column: impl Into<String>) -> Self {
        Self::base(rule_name, RuleType::Uniqueness).with_column(column)
    }

    /// At most `threshold` percent of `column` may be missing.
    pub fn completeness(
        rule_name: impl Into<String>,
        column: impl Into<String>,
        threshold: f64,
    ) -> Self {
        let mut rule = Self::base(rule_name, RuleType::Completeness).with_column(column);
        rule.threshold = Some(threshold);
        rule
    }

    /// Every row must satisfy `predicate`.
    pub fn validity(rule_name: impl Into<String>, predicate: Predicate) -> Self {
        Self::base(rule_name, RuleType::Validity).with_predicate(predicate)
    }

    /// Related columns must agree row by row.
    pub fn consistency(rule_name: impl Into<String>, predicate: Predicate) -> Self {
        Self::base(rule_name, RuleType::Consistency).with_predicate(predicate)
    }

    /// Set the target column.
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.target_column = Some(column.into());
        self
    }

    /// Set the predicate.
    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.predicate = Some(predicate);
        self
    }

    /// Set the severity.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Check that the fields required by the rule type are present.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| {
            Err(AssayError::InvalidRule {
                rule: self.rule_name.clone(),
                reason: reason.to_string(),
            })
        };

        if self.rule_name.trim().is_empty() {
            return invalid("rule name must not be empty");
        }

        match self.rule_type {
            RuleType::Uniqueness if self.target_column.is_none() => {
                invalid("uniqueness rules require a target column")
            }
            RuleType::Completeness if self.target_column.is_none() => {
                invalid("completeness rules require a target column")
            }
            RuleType::Completeness => match self.threshold {
                Some(t) if t.is_finite() && (0.0..=100.0).contains(&t) => Ok(()),
                Some(_) => invalid("completeness threshold must be a percentage in [0, 100]"),
                None => invalid("completeness rules require a threshold"),
            },
            RuleType::Validity | RuleType::Consistency if self.predicate.is_none() => {
                invalid("validity and consistency rules require a predicate")
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::CompareOp;

    #[test]
    fn test_builders_validate() {
        ValidationRule::uniqueness("id_unique", "id").validate().unwrap();
        ValidationRule::completeness("email_complete", "email", 5.0)
            .validate()
            .unwrap();
        ValidationRule::validity("qty_positive", Predicate::compare("qty", CompareOp::Gt, 0.0))
            .with_severity(Severity::Critical)
            .with_description("Quantity must be positive")
            .validate()
            .unwrap();
    }

    #[test]
    fn test_completeness_requires_threshold() {
        let mut rule = ValidationRule::completeness("c", "col", 5.0);
        rule.threshold = None;
        assert!(matches!(rule.validate(), Err(AssayError::InvalidRule { .. })));

        rule.threshold = Some(150.0);
        assert!(rule.validate().is_err());
    }

    #[test]
    fn test_validity_requires_predicate() {
        let mut rule = ValidationRule::validity("v", Predicate::not_null("a"));
        rule.predicate = None;
        assert!(rule.validate().is_err());
    }

    #[test]
    fn test_uniqueness_requires_column() {
        let mut rule = ValidationRule::uniqueness("u", "id");
        rule.target_column = None;
        assert!(rule.validate().is_err());
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Critical);
        assert_eq!(serde_json::to_string(&Severity::Critical).unwrap(), "\"CRITICAL\"");
    }

    #[test]
    fn test_new_rules_default_to_warning() {
        assert_eq!(Severity::default(), Severity::Warning);
        assert_eq!(ValidationRule::uniqueness("u", "id").severity, Severity::Warning);
    }
}
