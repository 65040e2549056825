//! Typed cell values and column kind inference.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

// =============================================================================
// LAZY STATIC PATTERNS
// =============================================================================
// Cheap prefilter so free text never reaches chrono.

static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"^\d{4}-\d{2}-\d{2}").unwrap(), // ISO date
        Regex::new(r"^\d{2}/\d{2}/\d{4}").unwrap(), // US date
        Regex::new(r"^\d{2}-\d{2}-\d{4}").unwrap(), // European date
        Regex::new(r"^\d{4}/\d{2}/\d{2}").unwrap(), // Alt ISO
    ]
});

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y"];

/// A single cell of a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    Number(f64),
    Text(String),
    Boolean(bool),
    Timestamp(NaiveDateTime),
    /// Distinguished missing marker. Never zero or the empty string.
    Missing,
}

impl Value {
    /// Build a numeric value; NaN becomes `Missing`.
    pub fn number(value: f64) -> Self {
        if value.is_nan() {
            Value::Missing
        } else {
            Value::Number(value)
        }
    }

    /// Build a text value.
    pub fn text(value: impl Into<String>) -> Self {
        Value::Text(value.into())
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Numeric view of the value, if it is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Timestamp view of the value. Text is parsed leniently.
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Timestamp(ts) => Some(*ts),
            Value::Text(s) => parse_timestamp(s),
            _ => None,
        }
    }

    /// Hashable identity used for duplicate detection.
    pub fn key(&self) -> ValueKey {
        match self {
            Value::Number(n) => {
                let normalized = if *n == 0.0 { 0.0f64 } else { *n };
                ValueKey::Number(normalized.to_bits())
            }
            Value::Text(s) => ValueKey::Text(s.clone()),
            Value::Boolean(b) => ValueKey::Boolean(*b),
            Value::Timestamp(ts) => ValueKey::Timestamp(ts.and_utc().timestamp_micros()),
            Value::Missing => ValueKey::Missing,
        }
    }

    /// Kind of this single value.
    pub fn kind(&self) -> ColumnKind {
        match self {
            Value::Number(_) => ColumnKind::Numeric,
            Value::Text(_) => ColumnKind::Text,
            Value::Boolean(_) => ColumnKind::Boolean,
            Value::Timestamp(_) => ColumnKind::Temporal,
            Value::Missing => ColumnKind::Empty,
        }
    }

    /// Approximate in-memory size in bytes.
    pub(crate) fn approx_size(&self) -> usize {
        let base = std::mem::size_of::<Value>();
        match self {
            Value::Text(s) => base + s.capacity(),
            _ => base,
        }
    }

    /// Check if a raw cell represents a missing/null value.
    pub fn is_null_token(raw: &str) -> bool {
        let trimmed = raw.trim();
        trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case("na")
            || trimmed.eq_ignore_ascii_case("n/a")
            || trimmed.eq_ignore_ascii_case("nan")
            || trimmed.eq_ignore_ascii_case("null")
            || trimmed.eq_ignore_ascii_case("none")
            || trimmed.eq_ignore_ascii_case("nil")
            || trimmed == "."
            || trimmed == "-"
    }

    /// Parse one cell on its own, trying number, boolean and timestamp in turn.
    ///
    /// Column loading goes through [`infer_column`] instead, which commits a
    /// whole column to one kind.
    pub fn parse_cell(raw: &str) -> Self {
        if Value::is_null_token(raw) {
            return Value::Missing;
        }
        let trimmed = raw.trim();
        if let Ok(n) = trimmed.parse::<f64>() {
            return Value::number(n);
        }
        if let Some(b) = parse_bool(trimmed) {
            return Value::Boolean(b);
        }
        parse_timestamp(trimmed)
            .map(Value::Timestamp)
            .unwrap_or_else(|| Value::Text(trimmed.to_string()))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "{}", s),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S")),
            Value::Missing => Ok(()),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::number(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value as f64)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::Timestamp(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Missing)
    }
}

/// Hashable projection of a [`Value`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueKey {
    Number(u64),
    Text(String),
    Boolean(bool),
    Timestamp(i64),
    Missing,
}

/// Kind of a column, inferred from its non-missing values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    Boolean,
    Temporal,
    Text,
    /// Non-missing values of more than one kind.
    Mixed,
    /// No non-missing values.
    Empty,
}

impl ColumnKind {
    /// Infer the kind of a column from its values.
    pub fn infer<'a>(values: impl IntoIterator<Item = &'a Value>) -> Self {
        let mut kind = ColumnKind::Empty;
        for value in values {
            let value_kind = value.kind();
            if value_kind == ColumnKind::Empty {
                continue;
            }
            kind = match kind {
                ColumnKind::Empty => value_kind,
                k if k == value_kind => k,
                _ => return ColumnKind::Mixed,
            };
        }
        kind
    }

    /// Label reported as the column dtype.
    pub fn label(&self) -> &'static str {
        match self {
            ColumnKind::Numeric => "number",
            ColumnKind::Boolean => "boolean",
            ColumnKind::Temporal => "timestamp",
            ColumnKind::Text => "text",
            ColumnKind::Mixed => "mixed",
            ColumnKind::Empty => "empty",
        }
    }
}

/// Parse a timestamp from the supported date and datetime formats.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if !DATE_PATTERNS.iter().any(|p| p.is_match(trimmed)) {
        return None;
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(ts);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Convert a column of raw cells into typed values.
///
/// A column whose non-missing cells all parse as numbers becomes numeric,
/// all booleans becomes boolean, all timestamps becomes temporal. Anything
/// else stays text.
pub fn infer_column(raw: &[&str]) -> Vec<Value> {
    let present: Vec<&str> = raw
        .iter()
        .copied()
        .filter(|cell| !Value::is_null_token(cell))
        .map(str::trim)
        .collect();

    let convert = |f: &dyn Fn(&str) -> Value| -> Vec<Value> {
        raw.iter()
            .map(|cell| {
                if Value::is_null_token(cell) {
                    Value::Missing
                } else {
                    f(cell.trim())
                }
            })
            .collect()
    };

    if present.is_empty() {
        return raw.iter().map(|_| Value::Missing).collect();
    }

    if present.iter().all(|s| s.parse::<f64>().is_ok()) {
        return convert(&|s| s.parse::<f64>().map(Value::number).unwrap_or(Value::Missing));
    }

    if present.iter().all(|s| parse_bool(s).is_some()) {
        return convert(&|s| parse_bool(s).map(Value::Boolean).unwrap_or(Value::Missing));
    }

    if present.iter().all(|s| parse_timestamp(s).is_some()) {
        return convert(&|s| parse_timestamp(s).map(Value::Timestamp).unwrap_or(Value::Missing));
    }

    convert(&|s| Value::Text(s.to_string()))
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}
