//! Clean command - prepare a table and write the result as CSV.

use std::path::{Path, PathBuf};

use assay::transform::{NullStrategy, clean_nulls};
use assay::{Assay, Dataset};
use colored::Colorize;

use crate::load::{load_config, load_table};

pub fn run(
    file: PathBuf,
    table: String,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
    nulls: Option<NullStrategy>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config.as_deref())?;
    let loaded = load_table(&file, Some(&table))?;

    if verbose && !config.enable_transformation {
        println!("{}", "Transformation disabled by config".dimmed());
    }
    let assay = Assay::with_config(config)?;
    let mut cleaned = assay.prepare(&loaded.name, &loaded.dataset)?;
    if let Some(strategy) = nulls {
        cleaned = clean_nulls(&cleaned, strategy)?;
    }

    let output_path = output.unwrap_or_else(|| {
        let stem = file.file_stem().unwrap_or_default().to_string_lossy();
        file.with_file_name(format!("{}_clean.csv", stem))
    });
    write_csv(&cleaned, &output_path)?;

    println!(
        "{} {} rows of {} ({} removed)",
        "Cleaned".cyan().bold(),
        cleaned.row_count().to_string().white().bold(),
        loaded.name.white(),
        loaded.dataset.row_count().saturating_sub(cleaned.row_count())
    );
    if let Some(strategy) = nulls {
        println!("Missing values: {}", strategy.label());
    }
    if verbose {
        let columns: Vec<&str> = cleaned.column_names().collect();
        println!("Columns: {}", columns.join(", "));
    }
    println!(
        "{} {}",
        "Saved to".green().bold(),
        output_path.display().to_string().white()
    );

    Ok(())
}

/// Write a dataset as CSV with a header row; missing values become empty cells.
fn write_csv(dataset: &Dataset, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(dataset.column_names())?;
    for index in 0..dataset.row_count() {
        if let Some(row) = dataset.row(index) {
            writer.write_record(row.iter().map(|v| v.to_string()))?;
        }
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_clean_orders() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("orders.csv");
        fs::write(
            &input,
            "order_quantity,order_cost,expected_delivery_date,actual_delivery_date\n\
             5,10.0,2024-01-01,2024-01-03\n\
             5,10.0,2024-01-01,2024-01-03\n\
             0,3.0,2024-01-01,2024-01-01\n\
             2,,2024-01-05,2024-01-04\n",
        )
        .unwrap();

        run(
            input.clone(),
            "orders".to_string(),
            None,
            None,
            Some(NullStrategy::Drop),
            false,
        )
        .unwrap();

        let written = fs::read_to_string(dir.path().join("orders_clean.csv")).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(
            lines[0],
            "order_quantity,order_cost,expected_delivery_date,actual_delivery_date,delivery_delay_days,is_late"
        );
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("5,10,2024-01-01 00:00:00,2024-01-03 00:00:00,2,"));
    }

    #[test]
    fn test_clean_honours_config() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("orders.csv");
        fs::write(
            &input,
            "order_quantity,order_cost\n5,10.0\n5,10.0\n0,3.0\n",
        )
        .unwrap();
        let config = dir.path().join("assay.json");
        fs::write(&config, r#"{"enable_transformation": false}"#).unwrap();
        let output = dir.path().join("raw.csv");

        run(
            input,
            "orders".to_string(),
            Some(output.clone()),
            Some(config),
            None,
            true,
        )
        .unwrap();

        // no dedupe, no derived columns, no business-rule filters
        let written = fs::read_to_string(&output).unwrap();
        assert_eq!(written, "order_quantity,order_cost\n5,10\n5,10\n0,3\n");
    }

    #[test]
    fn test_clean_rejects_bad_config() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("orders.csv");
        fs::write(&input, "order_quantity\n1\n").unwrap();
        let config = dir.path().join("assay.json");
        fs::write(&config, r#"{"null_threshold": 4.0}"#).unwrap();

        assert!(run(input, "orders".to_string(), None, Some(config), None, false).is_err());
        assert!(!dir.path().join("orders_clean.csv").exists());
    }

    #[test]
    fn test_write_csv_keeps_missing_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let ds = Dataset::from_columns([
            ("a", vec![assay::Value::from(1.0), assay::Value::Missing]),
            ("b", vec![assay::Value::text("x"), assay::Value::text("y")]),
        ])
        .unwrap();

        write_csv(&ds, &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "a,b\n1,x\n,y\n");
    }
}
