//! Column-oriented in-memory dataset.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{AssayError, Result};

use super::value::{ColumnKind, Value, ValueKey};

/// A named sequence of typed values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Kind inferred from the non-missing values.
    pub fn kind(&self) -> ColumnKind {
        ColumnKind::infer(&self.values)
    }

    /// Number of missing values.
    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_missing()).count()
    }

    /// Number of distinct non-missing values.
    pub fn distinct_count(&self) -> usize {
        self.values
            .iter()
            .filter(|v| !v.is_missing())
            .map(Value::key)
            .collect::<HashSet<_>>()
            .len()
    }

    /// Iterate over the values with their row index.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Value)> {
        self.values.iter().enumerate()
    }
}

/// Ordered collection of named columns sharing one row count.
///
/// Every column's length equals `row_count`. Operations that change the
/// table return a new dataset instead of mutating the caller's copy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDataset")]
pub struct Dataset {
    columns: IndexMap<String, Column>,
    row_count: usize,
}

/// Wire shape of a [`Dataset`], validated before it becomes one.
#[derive(Deserialize)]
struct RawDataset {
    columns: IndexMap<String, Column>,
    row_count: usize,
}

impl TryFrom<RawDataset> for Dataset {
    type Error = AssayError;

    fn try_from(raw: RawDataset) -> Result<Self> {
        let declared = raw.row_count;
        let dataset = Dataset::from_columns(raw.columns.into_iter().map(|(n, c)| (n, c.values)))?;
        match dataset.columns.first() {
            Some((name, column)) if column.len() != declared => Err(AssayError::LengthMismatch {
                column: name.clone(),
                expected: declared,
                actual: column.len(),
            }),
            _ => Ok(dataset),
        }
    }
}

impl Dataset {
    /// Create an empty dataset with no columns and no rows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dataset from named columns, checking that all lengths agree.
    pub fn from_columns<N, V>(columns: impl IntoIterator<Item = (N, V)>) -> Result<Self>
    where
        N: Into<String>,
        V: Into<Vec<Value>>,
    {
        let mut dataset = Dataset::new();
        for (index, (name, values)) in columns.into_iter().enumerate() {
            let name = name.into();
            let values = values.into();
            if index == 0 {
                dataset.row_count = values.len();
            } else if values.len() != dataset.row_count {
                return Err(AssayError::LengthMismatch {
                    column: name,
                    expected: dataset.row_count,
                    actual: values.len(),
                });
            }
            dataset.columns.insert(name, Column::new(values));
        }
        Ok(dataset)
    }

    /// Columns with zero rows, keeping the given names.
    pub fn empty_with_columns<N: Into<String>>(names: impl IntoIterator<Item = N>) -> Self {
        Self {
            columns: names
                .into_iter()
                .map(|n| (n.into(), Column::new(Vec::new())))
                .collect(),
            row_count: 0,
        }
    }

    /// Return a copy with `name` added or replaced.
    ///
    /// A replaced column keeps its position.
    pub fn with_column(&self, name: impl Into<String>, values: Vec<Value>) -> Result<Self> {
        let name = name.into();
        if !self.columns.is_empty() && values.len() != self.row_count {
            return Err(AssayError::LengthMismatch {
                column: name,
                expected: self.row_count,
                actual: values.len(),
            });
        }

        let mut next = self.clone();
        if next.columns.is_empty() {
            next.row_count = values.len();
        }
        next.columns.insert(name, Column::new(values));
        Ok(next)
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.columns.iter().map(|(name, col)| (name.as_str(), col))
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Get a column by name.
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .get(name)
            .ok_or_else(|| AssayError::ColumnNotFound(name.to_string()))
    }

    /// Numeric view of a column: `None` marks a missing value.
    ///
    /// Fails if any non-missing value is not a number.
    pub fn numeric(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let column = self.column(name)?;
        column
            .values
            .iter()
            .map(|value| match value {
                Value::Number(n) => Ok(Some(*n)),
                Value::Missing => Ok(None),
                _ => Err(AssayError::TypeMismatch {
                    column: name.to_string(),
                    expected: "number".to_string(),
                }),
            })
            .collect()
    }

    /// Values of one row in column order.
    pub fn row(&self, index: usize) -> Option<Vec<&Value>> {
        if index >= self.row_count {
            return None;
        }
        Some(self.columns.values().map(|c| &c.values[index]).collect())
    }

    /// Keep only rows where `mask` is true.
    pub fn filter_rows(&self, mask: &[bool]) -> Result<Self> {
        if mask.len() != self.row_count {
            return Err(AssayError::LengthMismatch {
                column: "<row mask>".to_string(),
                expected: self.row_count,
                actual: mask.len(),
            });
        }
        let indices: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter_map(|(i, keep)| keep.then_some(i))
            .collect();
        Ok(self.select_rows(&indices))
    }

    /// Build a dataset from the rows at `indices`, in that order.
    ///
    /// Indices past the end are ignored.
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        let indices: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|&i| i < self.row_count)
            .collect();
        let columns = self
            .columns
            .iter()
            .map(|(name, col)| {
                let values = indices.iter().map(|&i| col.values[i].clone()).collect();
                (name.clone(), Column::new(values))
            })
            .collect();
        Self {
            columns,
            row_count: indices.len(),
        }
    }

    /// Mark rows that repeat an earlier row, first occurrence kept.
    ///
    /// With `subset` only those columns are compared; otherwise all columns.
    pub fn duplicated_rows(&self, subset: Option<&[&str]>) -> Result<Vec<bool>> {
        let columns: Vec<&Column> = match subset {
            Some(names) => names
                .iter()
                .map(|name| self.column(name))
                .collect::<Result<_>>()?,
            None => self.columns.values().collect(),
        };

        let mut seen: HashSet<Vec<ValueKey>> = HashSet::with_capacity(self.row_count);
        Ok((0..self.row_count)
            .map(|i| {
                let key: Vec<ValueKey> = columns.iter().map(|c| c.values[i].key()).collect();
                !seen.insert(key)
            })
            .collect())
    }

    /// Approximate memory footprint of the values and names in bytes.
    pub fn estimated_memory_bytes(&self) -> usize {
        self.columns
            .iter()
            .map(|(name, col)| {
                name.capacity() + col.values.iter().map(Value::approx_size).sum::<usize>()
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::from_columns([
            ("id", vec![Value::from(1i64), Value::from(2i64), Value::from(1i64)]),
            ("name", vec![Value::from("a"), Value::from("b"), Value::from("a")]),
        ])
        .unwrap()
    }

    #[test]
    fn test_from_columns_rejects_ragged() {
        let err = Dataset::from_columns([
            ("a", vec![Value::from(1i64)]),
            ("b", vec![Value::from(1i64), Value::from(2i64)]),
        ])
        .unwrap_err();
        assert!(matches!(err, AssayError::LengthMismatch { expected: 1, actual: 2, .. }));
    }

    #[test]
    fn test_column_not_found() {
        let ds = sample();
        assert!(matches!(ds.column("nope"), Err(AssayError::ColumnNotFound(_))));
    }

    #[test]
    fn test_numeric_view() {
        let ds = sample();
        assert_eq!(ds.numeric("id").unwrap(), vec![Some(1.0), Some(2.0), Some(1.0)]);
        assert!(matches!(ds.numeric("name"), Err(AssayError::TypeMismatch { .. })));
    }

    #[test]
    fn test_duplicated_rows_keeps_first() {
        let ds = sample();
        assert_eq!(ds.duplicated_rows(None).unwrap(), vec![false, false, true]);
        assert_eq!(
            ds.duplicated_rows(Some(&["name"][..])).unwrap(),
            vec![false, false, true]
        );
    }

    #[test]
    fn test_filter_rows_returns_new_dataset() {
        let ds = sample();
        let filtered = ds.filter_rows(&[true, false, true]).unwrap();
        assert_eq!(filtered.row_count(), 2);
        assert_eq!(ds.row_count(), 3);
        assert!(ds.filter_rows(&[true]).is_err());
    }

    #[test]
    fn test_with_column_keeps_position() {
        let ds = sample();
        let next = ds
            .with_column("id", vec![Value::Missing, Value::Missing, Value::Missing])
            .unwrap();
        assert_eq!(next.column_names().collect::<Vec<_>>(), vec!["id", "name"]);
        assert_eq!(next.column("id").unwrap().null_count(), 3);
        assert_eq!(ds.column("id").unwrap().null_count(), 0);
    }

    #[test]
    fn test_deserialize_round_trips_valid_dataset() {
        let ds = sample();
        let json = serde_json::to_string(&ds).unwrap();
        let back: Dataset = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ds);
    }

    #[test]
    fn test_deserialize_rejects_ragged_columns() {
        let json = r#"{
            "columns": {
                "a": {"values": [{"type": "number", "value": 1.0}]},
                "b": {"values": []}
            },
            "row_count": 1
        }"#;
        assert!(serde_json::from_str::<Dataset>(json).is_err());
    }

    #[test]
    fn test_deserialize_rejects_wrong_row_count() {
        let json = r#"{
            "columns": {"a": {"values": [{"type": "missing"}]}},
            "row_count": 3
        }"#;
        assert!(serde_json::from_str::<Dataset>(json).is_err());
    }

    #[test]
    fn test_empty_dataset() {
        let ds = Dataset::empty_with_columns(["a", "b"]);
        assert_eq!(ds.row_count(), 0);
        assert_eq!(ds.column_count(), 2);
        assert!(ds.duplicated_rows(None).unwrap().is_empty());
        assert!(ds.row(0).is_none());
    }
}
