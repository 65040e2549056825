//! Provenance recorded for every loaded table file.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a table came from and what it looked like on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// Bare file name, e.g. `orders.csv`.
    pub file: String,
    /// Path the table was read from.
    pub path: PathBuf,
    /// `sha256:`-prefixed digest of the raw bytes.
    pub hash: String,
    pub size_bytes: u64,
    /// Delimiter flavour: `csv`, `tsv`, `psv` or `csv-semicolon`.
    pub format: String,
    /// Data rows read, header excluded.
    pub row_count: usize,
    pub column_count: usize,
    pub loaded_at: DateTime<Utc>,
}

impl SourceMetadata {
    /// Record provenance for a freshly parsed file, stamped with the current time.
    pub fn new(
        path: PathBuf,
        hash: String,
        size_bytes: u64,
        format: String,
        row_count: usize,
        column_count: usize,
    ) -> Self {
        let file = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            file,
            path,
            hash,
            size_bytes,
            format,
            row_count,
            column_count,
            loaded_at: Utc::now(),
        }
    }

    /// Derive a table name from the file stem (`orders.csv` -> `orders`).
    pub fn table_name(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
