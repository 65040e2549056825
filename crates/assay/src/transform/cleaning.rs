//! Table cleaning: nulls, duplicates and date normalisation.

use tracing::{info, warn};

use crate::error::Result;
use crate::input::{Column, ColumnKind, Dataset, Value, parse_timestamp};
use crate::stats;

use super::operations::NullStrategy;

/// Handle missing values according to `strategy`. Returns a new dataset.
///
/// Fill strategies leave a numeric column untouched when it has no present
/// value to fill from.
pub fn clean_nulls(dataset: &Dataset, strategy: NullStrategy) -> Result<Dataset> {
    let nulls: usize = dataset.columns().map(|(_, c)| c.null_count()).sum();
    info!(nulls, strategy = strategy.label(), "handling null values");

    match strategy {
        NullStrategy::Drop => {
            let mask: Vec<bool> = (0..dataset.row_count())
                .map(|i| {
                    dataset
                        .columns()
                        .all(|(_, c)| !c.values[i].is_missing())
                })
                .collect();
            dataset.filter_rows(&mask)
        }
        NullStrategy::FillMean => fill_numeric(dataset, stats::mean),
        NullStrategy::FillMedian => fill_numeric(dataset, |present| {
            stats::quantile(&stats::sorted(present), 0.5).unwrap_or(0.0)
        }),
        NullStrategy::FillForward => Dataset::from_columns(
            dataset
                .columns()
                .map(|(name, column)| (name.to_string(), forward_fill(column))),
        ),
    }
}

fn fill_numeric(dataset: &Dataset, fill: impl Fn(&[f64]) -> f64) -> Result<Dataset> {
    Dataset::from_columns(dataset.columns().map(|(name, column)| {
        let present: Vec<f64> = column.values.iter().filter_map(Value::as_f64).collect();
        if column.kind() != ColumnKind::Numeric || present.is_empty() {
            return (name.to_string(), column.values.clone());
        }
        let value = Value::number(fill(&present));
        let values = column
            .values
            .iter()
            .map(|v| if v.is_missing() { value.clone() } else { v.clone() })
            .collect::<Vec<_>>();
        (name.to_string(), values)
    }))
}

fn forward_fill(column: &Column) -> Vec<Value> {
    let mut last: Option<&Value> = None;
    column
        .values
        .iter()
        .map(|v| {
            if v.is_missing() {
                last.cloned().unwrap_or(Value::Missing)
            } else {
                last = Some(v);
                v.clone()
            }
        })
        .collect()
}

/// Drop rows that repeat an earlier row, keeping the first occurrence.
///
/// With `subset` only those columns are compared.
pub fn remove_duplicates(dataset: &Dataset, subset: Option<&[&str]>) -> Result<Dataset> {
    let duplicated = dataset.duplicated_rows(subset)?;
    let removed = duplicated.iter().filter(|d| **d).count();
    if removed > 0 {
        warn!(removed, "removed duplicate rows");
    } else {
        info!("no duplicates found");
    }
    let keep: Vec<bool> = duplicated.into_iter().map(|d| !d).collect();
    dataset.filter_rows(&keep)
}

/// Convert the named columns to timestamps.
///
/// Cells that do not parse become Missing. Absent columns are skipped.
pub fn standardize_dates(dataset: &Dataset, columns: &[&str]) -> Result<Dataset> {
    let mut out = dataset.clone();
    for name in columns {
        let Ok(column) = dataset.column(name) else {
            continue;
        };
        let values: Vec<Value> = column
            .values
            .iter()
            .map(|v| match v {
                Value::Timestamp(_) => v.clone(),
                Value::Text(s) => parse_timestamp(s).map(Value::Timestamp).unwrap_or(Value::Missing),
                _ => Value::Missing,
            })
            .collect();
        let unparsed = values.iter().filter(|v| v.is_missing()).count() - column.null_count();
        if unparsed > 0 {
            warn!(column = name, unparsed, "unparseable dates set to missing");
        }
        out = out.with_column(*name, values)?;
        info!(column = name, "standardized date column");
    }
    Ok(out)
}
