//! Row predicates evaluated to boolean masks.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{AssayError, Result};
use crate::input::{Dataset, Value};

/// Comparison operator used by predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl CompareOp {
    /// Apply the operator. Comparisons involving NaN are false.
    pub fn apply(&self, left: f64, right: f64) -> bool {
        match self {
            CompareOp::Lt => left < right,
            CompareOp::Le => left <= right,
            CompareOp::Gt => left > right,
            CompareOp::Ge => left >= right,
            CompareOp::Eq => left == right,
            CompareOp::Ne => left != right,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
        }
    }
}

/// User-supplied mask function.
pub type MaskFn = dyn Fn(&Dataset) -> Result<Vec<bool>> + Send + Sync;

/// A condition over the rows of a dataset.
///
/// Missing or non-numeric operands make a comparison false, so such rows
/// count as invalid.
#[derive(Clone)]
pub enum Predicate {
    /// Value lies in `[min, max]`; an absent bound is unbounded.
    Range {
        column: String,
        min: Option<f64>,
        max: Option<f64>,
    },
    /// Column compared against a constant.
    Compare {
        column: String,
        op: CompareOp,
        value: f64,
    },
    /// Column compared against another column of the same row.
    CrossColumn {
        left: String,
        op: CompareOp,
        right: String,
    },
    /// Value is present.
    NotNull { column: String },
    /// Arbitrary mask function.
    Custom { name: String, mask: Arc<MaskFn> },
}

impl Predicate {
    pub fn range(column: impl Into<String>, min: Option<f64>, max: Option<f64>) -> Self {
        Predicate::Range {
            column: column.into(),
            min,
            max,
        }
    }

    pub fn compare(column: impl Into<String>, op: CompareOp, value: f64) -> Self {
        Predicate::Compare {
            column: column.into(),
            op,
            value,
        }
    }

    pub fn cross_column(left: impl Into<String>, op: CompareOp, right: impl Into<String>) -> Self {
        Predicate::CrossColumn {
            left: left.into(),
            op,
            right: right.into(),
        }
    }

    pub fn not_null(column: impl Into<String>) -> Self {
        Predicate::NotNull {
            column: column.into(),
        }
    }

    pub fn custom<F>(name: impl Into<String>, mask: F) -> Self
    where
        F: Fn(&Dataset) -> Result<Vec<bool>> + Send + Sync + 'static,
    {
        Predicate::Custom {
            name: name.into(),
            mask: Arc::new(mask),
        }
    }

    /// Columns the predicate reads, if known.
    pub fn columns(&self) -> Vec<&str> {
        match self {
            Predicate::Range { column, .. }
            | Predicate::Compare { column, .. }
            | Predicate::NotNull { column } => vec![column.as_str()],
            Predicate::CrossColumn { left, right, .. } => vec![left.as_str(), right.as_str()],
            Predicate::Custom { .. } => Vec::new(),
        }
    }

    /// Evaluate to one boolean per row; `true` means the row is valid.
    pub fn evaluate(&self, dataset: &Dataset) -> Result<Vec<bool>> {
        let mask = match self {
            Predicate::Range { column, min, max } => {
                let values = dataset.column(column)?;
                values
                    .values
                    .iter()
                    .map(|v| match v.as_f64() {
                        Some(n) => {
                            min.map(|m| n >= m).unwrap_or(true) && max.map(|m| n <= m).unwrap_or(true)
                        }
                        None => false,
                    })
                    .collect()
            }
            Predicate::Compare { column, op, value } => {
                let values = dataset.column(column)?;
                values
                    .values
                    .iter()
                    .map(|v| v.as_f64().map(|n| op.apply(n, *value)).unwrap_or(false))
                    .collect()
            }
            Predicate::CrossColumn { left, op, right } => {
                let lhs = dataset.column(left)?;
                let rhs = dataset.column(right)?;
                lhs.values
                    .iter()
                    .zip(&rhs.values)
                    .map(|(l, r)| compare_values(l, r, *op))
                    .collect()
            }
            Predicate::NotNull { column } => dataset
                .column(column)?
                .values
                .iter()
                .map(|v| !v.is_missing())
                .collect(),
            Predicate::Custom { mask, .. } => (mask.as_ref())(dataset)?,
        };

        if mask.len() != dataset.row_count() {
            return Err(AssayError::LengthMismatch {
                column: self.to_string(),
                expected: dataset.row_count(),
                actual: mask.len(),
            });
        }
        Ok(mask)
    }
}

fn compare_values(left: &Value, right: &Value, op: CompareOp) -> bool {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => op.apply(*l, *r),
        (Value::Timestamp(l), Value::Timestamp(r)) => match op {
            CompareOp::Lt => l < r,
            CompareOp::Le => l <= r,
            CompareOp::Gt => l > r,
            CompareOp::Ge => l >= r,
            CompareOp::Eq => l == r,
            CompareOp::Ne => l != r,
        },
        _ => false,
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Range { column, min, max } => {
                let lo = min.map(|v| v.to_string()).unwrap_or_else(|| "-inf".to_string());
                let hi = max.map(|v| v.to_string()).unwrap_or_else(|| "inf".to_string());
                write!(f, "{} in [{}, {}]", column, lo, hi)
            }
            Predicate::Compare { column, op, value } => {
                write!(f, "{} {} {}", column, op.symbol(), value)
            }
            Predicate::CrossColumn { left, op, right } => {
                write!(f, "{} {} {}", left, op.symbol(), right)
            }
            Predicate::NotNull { column } => write!(f, "{} is not null", column),
            Predicate::Custom { name, .. } => write!(f, "custom({})", name),
        }
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Predicate({})", self)
    }
}
