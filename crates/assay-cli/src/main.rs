//! Assay CLI - data quality checks for delimited business tables.

mod cli;
mod commands;
mod load;
mod render;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Check {
            files,
            table,
            config,
            json,
            html,
            no_transform,
        } => commands::check::run(files, table, config, json, html, no_transform, cli.verbose),

        Commands::Profile {
            file,
            date_marker,
            json,
        } => commands::profile::run(file, date_marker, json, cli.verbose),

        Commands::Anomalies {
            file,
            columns,
            method,
            config,
            json,
        } => commands::anomalies::run(file, columns, method, config, json, cli.verbose),

        Commands::Rules { table } => commands::rules::run(table, cli.verbose),

        Commands::Clean {
            file,
            table,
            output,
            config,
            nulls,
        } => commands::clean::run(file, table, output, config, nulls, cli.verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr so reports on stdout stay clean. `RUST_LOG` overrides the
/// default `warn` level; `--verbose` adds debug output from the library.
fn init_logging(verbose: bool) {
    let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    if verbose {
        if let Ok(directive) = "assay=debug".parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
