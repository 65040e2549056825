//! Loading tables and configuration from disk.

use std::fs;
use std::path::Path;

use assay::quality::ForeignKeyMap;
use assay::{AssayConfig, Dataset, Parser, ReferenceKeys, SourceMetadata};
use tracing::{debug, warn};

/// A parsed data file and the table name it is checked as.
pub struct LoadedTable {
    pub name: String,
    pub dataset: Dataset,
    pub source: SourceMetadata,
}

/// Parse `file`; the table is named by `table` or else the file stem.
pub fn load_table(
    file: &Path,
    table: Option<&str>,
) -> Result<LoadedTable, Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let (dataset, source) = Parser::new().parse_file(file)?;
    let name = match table {
        Some(t) => t.to_string(),
        None => source.table_name(),
    };
    if name.is_empty() {
        return Err(format!("Cannot derive a table name from {}", file.display()).into());
    }

    debug!(table = %name, rows = dataset.row_count(), hash = %source.hash, "loaded table");
    Ok(LoadedTable {
        name,
        dataset,
        source,
    })
}

/// Read an `AssayConfig` from a JSON file, or the defaults.
pub fn load_config(path: Option<&Path>) -> Result<AssayConfig, Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            let text = fs::read_to_string(p)
                .map_err(|e| format!("Cannot read config {}: {}", p.display(), e))?;
            Ok(AssayConfig::from_json(&text)?)
        }
        None => Ok(AssayConfig::default()),
    }
}

/// Key sets for foreign-key checks, taken from the loaded parent tables.
///
/// A parent only contributes keys when it was loaded and carries the
/// referencing column under the same name.
pub fn reference_keys(tables: &[LoadedTable], foreign_keys: &ForeignKeyMap) -> ReferenceKeys {
    let mut references = ReferenceKeys::new();
    for child in tables {
        for (column, parent) in foreign_keys.keys_for(&child.name) {
            let Some(parent_table) = tables.iter().find(|t| &t.name == parent) else {
                continue;
            };
            if let Err(e) = references.insert_column(parent.as_str(), &parent_table.dataset, column) {
                warn!(parent = %parent, column = %column, error = %e, "parent has no key column");
            }
        }
    }
    references
}
