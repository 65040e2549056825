//! Profile command - per-column statistics for one table.

use std::path::PathBuf;

use assay::Profiler;
use assay::profile::ColumnStats;
use colored::Colorize;

use crate::load::load_table;

pub fn run(
    file: PathBuf,
    date_marker: String,
    json_output: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let table = load_table(&file, None)?;
    let profile = Profiler::new()
        .with_date_marker(date_marker)
        .profile(&table.dataset, &table.name);

    if json_output {
        println!("{}", serde_json::to_string_pretty(&profile)?);
        return Ok(());
    }

    println!(
        "{} {} ({} rows, {} columns, {} duplicate rows, {:.3} MB)",
        "Profile of".cyan().bold(),
        profile.table_name.white().bold(),
        profile.row_count,
        profile.column_count,
        profile.duplicate_rows,
        profile.memory_usage_mb
    );
    println!();

    for (name, column) in &profile.columns {
        println!(
            "  {:24} {:10} {:>6} nulls ({:.2}%)",
            name.white().bold(),
            column.dtype_label,
            column.null_count,
            column.null_percentage
        );

        match &column.stats {
            ColumnStats::Numeric(s) => {
                println!(
                    "      mean {:.3}  median {:.3}  std {:.3}  range [{}, {}]",
                    s.mean, s.median, s.std, s.min, s.max
                );
                if verbose {
                    println!(
                        "      q25 {:.3}  q75 {:.3}  skew {:.3}  kurtosis {:.3}",
                        s.q25, s.q75, s.skewness, s.kurtosis
                    );
                }
            }
            ColumnStats::Temporal(s) => match (s.min_date, s.max_date) {
                (Some(lo), Some(hi)) => println!(
                    "      {} to {} ({} days)",
                    lo.format("%Y-%m-%d"),
                    hi.format("%Y-%m-%d"),
                    s.date_range_days
                ),
                _ => println!("      {}", "no parseable dates".dimmed()),
            },
            ColumnStats::Categorical(s) => {
                let top = s.top_value.as_deref().unwrap_or("-");
                println!(
                    "      {} unique, top {:?} x{}",
                    s.unique, top, s.top_frequency
                );
                if verbose {
                    for (value, count) in &s.value_distribution {
                        println!("        {:20} {}", value, count);
                    }
                }
            }
        }
    }

    Ok(())
}
