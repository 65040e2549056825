//! Column derivations and null-handling strategies.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{AssayError, Result};
use crate::input::{Dataset, Value};

const SECONDS_PER_DAY: i64 = 86_400;

/// How [`clean_nulls`](super::clean_nulls) treats missing values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullStrategy {
    /// Drop every row with a missing value.
    #[default]
    Drop,
    /// Fill numeric columns with their mean.
    FillMean,
    /// Fill numeric columns with their median.
    FillMedian,
    /// Carry the last present value forward, in every column.
    FillForward,
}

impl NullStrategy {
    pub fn label(&self) -> &'static str {
        match self {
            NullStrategy::Drop => "drop",
            NullStrategy::FillMean => "fill_mean",
            NullStrategy::FillMedian => "fill_median",
            NullStrategy::FillForward => "fill_forward",
        }
    }
}

impl FromStr for NullStrategy {
    type Err = AssayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "drop" => Ok(NullStrategy::Drop),
            "mean" | "fill_mean" => Ok(NullStrategy::FillMean),
            "median" | "fill_median" => Ok(NullStrategy::FillMedian),
            "ffill" | "forward" | "fill_forward" => Ok(NullStrategy::FillForward),
            other => Err(AssayError::Config(format!("unknown null strategy '{}'", other))),
        }
    }
}

/// User-supplied derivation over a whole dataset.
pub type DeriveFn = dyn Fn(&Dataset) -> Result<Dataset> + Send + Sync;

/// A computed column added to a table.
#[derive(Clone)]
pub enum Derivation {
    /// `left - right`.
    Difference {
        left: String,
        right: String,
        output: String,
    },
    /// `numerator / denominator`; a zero or missing denominator gives Missing.
    Ratio {
        numerator: String,
        denominator: String,
        output: String,
    },
    /// Whole days from `start` to `end`, rounded down.
    DayDelta {
        start: String,
        end: String,
        output: String,
    },
    /// Boolean flag `column > threshold`; missing values give false.
    Exceeds {
        column: String,
        threshold: f64,
        output: String,
    },
    /// Arbitrary dataset-to-dataset function.
    Custom { name: String, derive: Arc<DeriveFn> },
}

impl Derivation {
    pub fn difference(
        left: impl Into<String>,
        right: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Derivation::Difference {
            left: left.into(),
            right: right.into(),
            output: output.into(),
        }
    }

    pub fn ratio(
        numerator: impl Into<String>,
        denominator: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Derivation::Ratio {
            numerator: numerator.into(),
            denominator: denominator.into(),
            output: output.into(),
        }
    }

    pub fn day_delta(
        start: impl Into<String>,
        end: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Derivation::DayDelta {
            start: start.into(),
            end: end.into(),
            output: output.into(),
        }
    }

    pub fn exceeds(column: impl Into<String>, threshold: f64, output: impl Into<String>) -> Self {
        Derivation::Exceeds {
            column: column.into(),
            threshold,
            output: output.into(),
        }
    }

    pub fn custom<F>(name: impl Into<String>, derive: F) -> Self
    where
        F: Fn(&Dataset) -> Result<Dataset> + Send + Sync + 'static,
    {
        Derivation::Custom {
            name: name.into(),
            derive: Arc::new(derive),
        }
    }

    /// Columns the derivation reads. Empty for custom derivations.
    pub fn inputs(&self) -> Vec<&str> {
        match self {
            Derivation::Difference { left, right, .. } => vec![left.as_str(), right.as_str()],
            Derivation::Ratio {
                numerator,
                denominator,
                ..
            } => vec![numerator.as_str(), denominator.as_str()],
            Derivation::DayDelta { start, end, .. } => vec![start.as_str(), end.as_str()],
            Derivation::Exceeds { column, .. } => vec![column.as_str()],
            Derivation::Custom { .. } => Vec::new(),
        }
    }

    /// Whether every input column exists in `dataset`.
    pub fn applies_to(&self, dataset: &Dataset) -> bool {
        self.inputs().iter().all(|c| dataset.has_column(c))
    }

    /// Compute the derivation, returning a new dataset.
    pub fn apply(&self, dataset: &Dataset) -> Result<Dataset> {
        match self {
            Derivation::Difference {
                left,
                right,
                output,
            } => {
                let values = zip_columns(dataset, left, right, |l, r| {
                    match (l.as_f64(), r.as_f64()) {
                        (Some(a), Some(b)) => Value::number(a - b),
                        _ => Value::Missing,
                    }
                })?;
                dataset.with_column(output.as_str(), values)
            }
            Derivation::Ratio {
                numerator,
                denominator,
                output,
            } => {
                let values = zip_columns(dataset, numerator, denominator, |n, d| {
                    match (n.as_f64(), d.as_f64()) {
                        (Some(a), Some(b)) if b != 0.0 => Value::number(a / b),
                        _ => Value::Missing,
                    }
                })?;
                dataset.with_column(output.as_str(), values)
            }
            Derivation::DayDelta { start, end, output } => {
                let values = zip_columns(dataset, start, end, |s, e| {
                    match (s.as_timestamp(), e.as_timestamp()) {
                        (Some(s), Some(e)) => {
                            let days = (e - s).num_seconds().div_euclid(SECONDS_PER_DAY);
                            Value::number(days as f64)
                        }
                        _ => Value::Missing,
                    }
                })?;
                dataset.with_column(output.as_str(), values)
            }
            Derivation::Exceeds {
                column,
                threshold,
                output,
            } => {
                let values = dataset
                    .column(column)?
                    .values
                    .iter()
                    .map(|v| Value::Boolean(v.as_f64().map(|n| n > *threshold).unwrap_or(false)))
                    .collect();
                dataset.with_column(output.as_str(), values)
            }
            Derivation::Custom { derive, .. } => (derive.as_ref())(dataset),
        }
    }
}

fn zip_columns(
    dataset: &Dataset,
    left: &str,
    right: &str,
    f: impl Fn(&Value, &Value) -> Value,
) -> Result<Vec<Value>> {
    let l = dataset.column(left)?;
    let r = dataset.column(right)?;
    Ok(l.values.iter().zip(&r.values).map(|(a, b)| f(a, b)).collect())
}

impl fmt::Display for Derivation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Derivation::Difference {
                left,
                right,
                output,
            } => write!(f, "{} = {} - {}", output, left, right),
            Derivation::Ratio {
                numerator,
                denominator,
                output,
            } => write!(f, "{} = {} / {}", output, numerator, denominator),
            Derivation::DayDelta { start, end, output } => {
                write!(f, "{} = days({} - {})", output, end, start)
            }
            Derivation::Exceeds {
                column,
                threshold,
                output,
            } => write!(f, "{} = {} > {}", output, column, threshold),
            Derivation::Custom { name, .. } => write!(f, "custom({})", name),
        }
    }
}

impl fmt::Debug for Derivation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Derivation({})", self)
    }
}
