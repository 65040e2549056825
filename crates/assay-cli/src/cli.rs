//! CLI argument definitions using clap.

use std::path::PathBuf;

use assay::DetectionMethod;
use assay::transform::NullStrategy;
use clap::{Parser, Subcommand};

/// Assay: rule-based data quality checks for business tables
#[derive(Parser)]
#[command(name = "assay")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output and debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Prepare and assess one or more tables, then print the summary
    Check {
        /// Data files (CSV/TSV); the file stem names the table
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /// Table name to use instead of the file stem (single file only)
        #[arg(short, long)]
        table: Option<String>,

        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write the full report as JSON
        #[arg(long, value_name = "OUT")]
        json: Option<PathBuf>,

        /// Write the full report as HTML
        #[arg(long, value_name = "OUT")]
        html: Option<PathBuf>,

        /// Assess the tables as loaded, without cleaning or derivations
        #[arg(long)]
        no_transform: bool,
    },

    /// Profile every column of a table
    Profile {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Column-name marker for date columns
        #[arg(long, default_value = "date")]
        date_marker: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Detect outliers in numeric columns
    Anomalies {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Columns to analyze (default: every numeric column)
        #[arg(short, long, value_delimiter = ',')]
        columns: Vec<String>,

        /// Detection method (iqr, zscore, isolation)
        #[arg(short, long, default_value = "iqr")]
        method: MethodChoice,

        /// JSON configuration file (anomaly and isolation settings)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the registered validation rules
    Rules {
        /// Only show rules for this table
        #[arg(short, long)]
        table: Option<String>,
    },

    /// Clean a table and write it back out
    Clean {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Table whose transforms to apply
        #[arg(short, long)]
        table: String,

        /// Output path (default: <file>_clean.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Missing-value handling (drop, mean, median, ffill)
        #[arg(long)]
        nulls: Option<NullStrategy>,
    },
}

/// Outlier detection method
#[derive(Clone, Copy, Debug, Default)]
pub enum MethodChoice {
    #[default]
    Iqr,
    Zscore,
    Isolation,
}

impl MethodChoice {
    pub fn method(self) -> DetectionMethod {
        match self {
            MethodChoice::Iqr => DetectionMethod::Iqr,
            MethodChoice::Zscore => DetectionMethod::Zscore,
            MethodChoice::Isolation => DetectionMethod::Isolation,
        }
    }
}

impl std::str::FromStr for MethodChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "iqr" => Ok(MethodChoice::Iqr),
            "zscore" | "z_score" | "z" => Ok(MethodChoice::Zscore),
            "isolation" | "isolation_forest" | "forest" => Ok(MethodChoice::Isolation),
            _ => Err(format!(
                "Unknown method: {}. Use: iqr, zscore, or isolation.",
                s
            )),
        }
    }
}

impl std::fmt::Display for MethodChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MethodChoice::Iqr => write!(f, "iqr"),
            MethodChoice::Zscore => write!(f, "zscore"),
            MethodChoice::Isolation => write!(f, "isolation"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_method_choice_parsing() {
        assert!(matches!("IQR".parse::<MethodChoice>(), Ok(MethodChoice::Iqr)));
        assert!(matches!("z-score".parse::<MethodChoice>(), Ok(MethodChoice::Zscore)));
        assert!(matches!("forest".parse::<MethodChoice>(), Ok(MethodChoice::Isolation)));
        assert!("lof".parse::<MethodChoice>().is_err());
    }

    #[test]
    fn test_check_arguments() {
        let cli = Cli::parse_from([
            "assay", "check", "orders.csv", "sales.csv", "--json", "out.json", "-v",
        ]);
        assert!(cli.verbose);
        let Commands::Check { files, json, table, .. } = cli.command else {
            panic!("expected check");
        };
        assert_eq!(files.len(), 2);
        assert_eq!(json, Some(PathBuf::from("out.json")));
        assert!(table.is_none());
    }

    #[test]
    fn test_clean_parses_null_strategy() {
        let cli = Cli::parse_from([
            "assay", "clean", "orders.csv", "--table", "orders", "--nulls", "median",
        ]);
        let Commands::Clean { nulls, .. } = cli.command else {
            panic!("expected clean");
        };
        assert_eq!(nulls, Some(NullStrategy::FillMedian));
    }

    #[test]
    fn test_anomaly_columns_split_on_comma() {
        let cli = Cli::parse_from(["assay", "anomalies", "t.csv", "--columns", "a,b"]);
        let Commands::Anomalies { columns, method, .. } = cli.command else {
            panic!("expected anomalies");
        };
        assert_eq!(columns, vec!["a", "b"]);
        assert!(matches!(method, MethodChoice::Iqr));
    }
}
