//! Check command - prepare and assess tables, print and export the report.

use std::fs;
use std::path::PathBuf;

use assay::Assay;
use assay::quality::ForeignKeyMap;
use colored::Colorize;

use crate::load::{LoadedTable, load_config, load_table, reference_keys};
use crate::render;

pub fn run(
    files: Vec<PathBuf>,
    table: Option<String>,
    config: Option<PathBuf>,
    json: Option<PathBuf>,
    html: Option<PathBuf>,
    no_transform: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if table.is_some() && files.len() > 1 {
        return Err("--table can only be used with a single file".into());
    }

    let mut config = load_config(config.as_deref())?;
    if no_transform {
        config.enable_transformation = false;
    }

    let mut tables: Vec<LoadedTable> = Vec::with_capacity(files.len());
    for file in &files {
        let loaded = load_table(file, table.as_deref())?;
        println!(
            "{} {} as {} ({} rows)",
            "Loaded".cyan().bold(),
            loaded.source.file.white(),
            loaded.name.white().bold(),
            loaded.source.row_count
        );
        tables.push(loaded);
    }

    let references = reference_keys(&tables, &ForeignKeyMap::standard());
    let mut assay = Assay::with_config(config)?;
    let outcome = assay.run(
        tables.iter().map(|t| (t.name.as_str(), &t.dataset)),
        &references,
    );

    for assessment in outcome.assessments.values() {
        render::print_assessment(assessment, verbose);
    }

    let bundle = outcome.bundle();
    render::print_summary(&bundle, &outcome.stats);

    if let Some(path) = json {
        fs::write(&path, bundle.to_json_pretty()?)?;
        println!();
        println!(
            "{} {}",
            "Saved JSON to".green().bold(),
            path.display().to_string().white()
        );
    }
    if let Some(path) = html {
        fs::write(&path, render::html_report(&bundle))?;
        println!(
            "{} {}",
            "Saved HTML to".green().bold(),
            path.display().to_string().white()
        );
    }

    Ok(())
}
