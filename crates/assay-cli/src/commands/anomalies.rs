//! Anomalies command - univariate or isolation-forest outlier detection.

use std::path::PathBuf;

use assay::anomaly::AnomalyFinding;
use assay::input::ColumnKind;
use assay::{AnomalyDetector, DetectionMethod};
use colored::Colorize;

use crate::cli::MethodChoice;
use crate::load::{load_config, load_table};

pub fn run(
    file: PathBuf,
    columns: Vec<String>,
    method: MethodChoice,
    config: Option<PathBuf>,
    json_output: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config.as_deref())?;
    let table = load_table(&file, None)?;
    let ds = &table.dataset;
    let detector = AnomalyDetector::with_config(config.anomaly, config.isolation);

    let columns: Vec<&str> = if columns.is_empty() {
        ds.columns()
            .filter(|(_, c)| c.kind() == ColumnKind::Numeric)
            .map(|(name, _)| name)
            .collect()
    } else {
        columns.iter().map(String::as_str).collect()
    };
    if columns.is_empty() {
        return Err(format!("No numeric columns in {}", file.display()).into());
    }

    let findings: Vec<AnomalyFinding> = match method.method() {
        DetectionMethod::Isolation => {
            let found = detector.detect_multivariate(ds, &columns)?;
            if verbose {
                for (row, score) in found.row_indices.iter().zip(&found.scores) {
                    eprintln!("row {:>6} score {:.4}", row, score);
                }
            }
            vec![detector.multivariate_finding(&found, ds.row_count())?]
        }
        m => columns
            .iter()
            .map(|c| detector.detect_column(ds, c, m))
            .collect::<Result<_, _>>()?,
    };

    if json_output {
        println!("{}", serde_json::to_string_pretty(&findings)?);
        return Ok(());
    }

    println!(
        "{} {} by {} ({} rows)",
        "Outliers in".cyan().bold(),
        table.name.white().bold(),
        method,
        ds.row_count()
    );
    println!();
    for finding in &findings {
        let count = if finding.outlier_count == 0 {
            finding.outlier_count.to_string().green()
        } else {
            finding.outlier_count.to_string().red()
        };
        println!(
            "  {:30} {:>6} outliers ({:.2}%)",
            finding.column, count, finding.outlier_percentage
        );
        if !finding.sample_values.is_empty() {
            let samples: Vec<String> = finding
                .sample_values
                .iter()
                .map(|v| format!("{:.4}", v))
                .collect();
            let label = if finding.method == DetectionMethod::Isolation {
                "scores"
            } else {
                "e.g."
            };
            println!("      {} {}", label.dimmed(), samples.join(", "));
        }
    }

    Ok(())
}
