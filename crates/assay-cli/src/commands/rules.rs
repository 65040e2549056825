//! Rules command - list the standard validation rules.

use assay::RuleRegistry;
use colored::Colorize;

pub fn run(table: Option<String>, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let registry = RuleRegistry::with_standard_rules()?;

    let tables: Vec<&str> = match table.as_deref() {
        Some(t) => vec![t],
        None => registry.tables().collect(),
    };

    for name in tables {
        let rules = registry.rules_for(name);
        println!(
            "{} ({} rules)",
            name.cyan().bold(),
            rules.len().to_string().white()
        );
        if rules.is_empty() {
            println!("  {}", "No rules registered".dimmed());
        }
        for rule in rules {
            println!(
                "  {:32} {:12} {:8} {}",
                rule.rule_name.white().bold(),
                rule.rule_type.label(),
                rule.severity.label(),
                rule.description
            );
            if verbose {
                if let Some(column) = &rule.target_column {
                    println!("      column: {}", column);
                }
                if let Some(predicate) = &rule.predicate {
                    println!("      condition: {}", predicate);
                }
            }
        }
        println!();
    }

    Ok(())
}
