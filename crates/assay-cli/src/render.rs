//! Console and HTML rendering of assessment results.

use std::fmt::Write as _;

use assay::report::PassRate;
use assay::{ReportBundle, RunStats, Severity, TableAssessment};
use colored::{ColoredString, Colorize};

// =============================================================================
// Console
// =============================================================================

fn severity_colored(severity: Severity) -> ColoredString {
    match severity {
        Severity::Critical => severity.label().red().bold(),
        Severity::Warning => severity.label().yellow(),
        Severity::Info => severity.label().blue(),
    }
}

fn pass_rate_colored(rate: PassRate) -> ColoredString {
    let text = rate.to_string();
    match rate.percent() {
        Some(p) if p >= 95.0 => text.green(),
        Some(p) if p >= 80.0 => text.yellow(),
        Some(_) => text.red(),
        None => text.dimmed(),
    }
}

/// Print rule results, quality issues and anomalies for one table.
pub fn print_assessment(assessment: &TableAssessment, verbose: bool) {
    println!();
    println!(
        "{} {} ({} rows, {} columns)",
        "Table".cyan().bold(),
        assessment.table_name.white().bold(),
        assessment.profile.row_count,
        assessment.profile.column_count
    );

    if assessment.results.is_empty() {
        println!("  {}", "No rules evaluated".dimmed());
    }
    for result in &assessment.results {
        let status = if result.passed {
            "PASS".green().bold()
        } else {
            "FAIL".red().bold()
        };
        println!(
            "  {} {:32} {:>10} {:>6} rows ({:.2}%)",
            status,
            result.rule_name,
            severity_colored(result.severity),
            result.affected_rows,
            result.affected_percentage
        );
        if verbose || !result.passed {
            println!("       {}", result.message.dimmed());
        }
    }

    if let Some(quality) = &assessment.quality {
        for issue in quality.issues() {
            println!("  {} {}", "Issue:".yellow().bold(), issue);
        }
    }

    for finding in assessment.anomalies.findings.values() {
        println!(
            "  {} {} {} outliers ({:.2}%) by {}",
            "Outliers:".magenta().bold(),
            finding.column,
            finding.outlier_count,
            finding.outlier_percentage,
            finding.method
        );
    }
}

/// Print the aggregate summary of a run.
pub fn print_summary(bundle: &ReportBundle, stats: &RunStats) {
    let summary = &bundle.summary;
    println!();
    println!("{}", "Summary:".yellow().bold());
    println!(
        "  Rules:    {} total, {} passed, {} failed",
        summary.validation_summary.total_rules.to_string().white().bold(),
        summary.validation_summary.passed.to_string().green(),
        summary.validation_summary.failed.to_string().red()
    );
    println!(
        "  Pass rate: {}",
        pass_rate_colored(summary.validation_summary.pass_rate)
    );
    println!(
        "  Data:     {} tables, {} rows, {} columns",
        summary.data_summary.total_tables,
        summary.data_summary.total_rows,
        summary.data_summary.total_columns
    );
    println!(
        "  Outliers: {}",
        summary.anomaly_summary.total_outliers_detected
    );
    println!(
        "  Rows:     {} extracted, {} retained in {:.2}s",
        stats.total_rows_extracted, stats.total_rows_retained, stats.duration_secs()
    );
    if !stats.failed_tables.is_empty() {
        println!(
            "  {} {}",
            "Failed tables:".red().bold(),
            stats.failed_tables.join(", ")
        );
    }
}

// =============================================================================
// HTML
// =============================================================================

const STYLE: &str = "body{font-family:sans-serif;margin:2em;color:#222}\
table{border-collapse:collapse;margin-bottom:2em;width:100%}\
th,td{border:1px solid #ccc;padding:4px 8px;text-align:left}\
th{background:#f0f0f0}.cards{display:flex;gap:1em;margin-bottom:2em}\
.card{border:1px solid #ccc;border-radius:6px;padding:1em;min-width:10em}\
.card h3{margin:0 0 .5em 0;font-size:.9em;color:#666}.card p{margin:0;font-size:1.6em}\
.pass{color:#2a7a2a;font-weight:bold}.fail{color:#b22222;font-weight:bold}";

/// Escape text for HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn card(html: &mut String, title: &str, value: &str) {
    let _ = write!(
        html,
        "<div class=\"card\"><h3>{}</h3><p>{}</p></div>",
        escape_html(title),
        escape_html(value)
    );
}

fn table(html: &mut String, title: &str, headers: &[&str], rows: Vec<Vec<String>>) {
    let _ = write!(html, "<h2>{}</h2>", escape_html(title));
    if rows.is_empty() {
        html.push_str("<p>None.</p>");
        return;
    }
    html.push_str("<table><thead><tr>");
    for h in headers {
        let _ = write!(html, "<th>{}</th>", escape_html(h));
    }
    html.push_str("</tr></thead><tbody>");
    for row in rows {
        html.push_str("<tr>");
        for cell in row {
            let class = match cell.as_str() {
                "PASS" => " class=\"pass\"",
                "FAIL" => " class=\"fail\"",
                _ => "",
            };
            let _ = write!(html, "<td{}>{}</td>", class, escape_html(&cell));
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>");
}

/// Standalone HTML page with summary cards and one table per projection.
pub fn html_report(bundle: &ReportBundle) -> String {
    let summary = &bundle.summary;
    let mut html = String::new();
    html.push_str("<!DOCTYPE html><html><head><meta charset=\"utf-8\">");
    html.push_str("<title>Data Quality Report</title>");
    let _ = write!(html, "<style>{}</style></head><body>", STYLE);
    html.push_str("<h1>Data Quality Report</h1>");
    let _ = write!(
        html,
        "<p>Generated {}</p>",
        escape_html(&summary.report_timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string())
    );

    html.push_str("<div class=\"cards\">");
    card(&mut html, "Rules", &summary.validation_summary.total_rules.to_string());
    card(&mut html, "Passed", &summary.validation_summary.passed.to_string());
    card(&mut html, "Failed", &summary.validation_summary.failed.to_string());
    card(&mut html, "Pass rate", &summary.validation_summary.pass_rate.to_string());
    card(&mut html, "Tables", &summary.data_summary.total_tables.to_string());
    card(&mut html, "Rows", &summary.data_summary.total_rows.to_string());
    card(
        &mut html,
        "Outliers",
        &summary.anomaly_summary.total_outliers_detected.to_string(),
    );
    html.push_str("</div>");

    table(
        &mut html,
        "Validation Results",
        &["Rule", "Status", "Severity", "Message", "Affected rows", "Affected %"],
        bundle
            .validation
            .iter()
            .map(|r| {
                vec![
                    r.rule_name.clone(),
                    r.status.clone(),
                    r.severity.clone(),
                    r.message.clone(),
                    r.affected_rows.to_string(),
                    r.affected_percentage.clone(),
                ]
            })
            .collect(),
    );
    table(
        &mut html,
        "Table Profiles",
        &["Table", "Rows", "Columns", "Duplicate rows", "Memory (MB)"],
        bundle
            .profiles
            .iter()
            .map(|p| {
                vec![
                    p.table_name.clone(),
                    p.row_count.to_string(),
                    p.column_count.to_string(),
                    p.duplicate_rows.to_string(),
                    format!("{:.3}", p.memory_usage_mb),
                ]
            })
            .collect(),
    );
    table(
        &mut html,
        "Column Profiles",
        &["Table", "Column", "Type", "Nulls", "Null %"],
        bundle
            .columns
            .iter()
            .map(|c| {
                vec![
                    c.table_name.clone(),
                    c.column.clone(),
                    c.dtype.clone(),
                    c.null_count.to_string(),
                    c.null_percentage.clone(),
                ]
            })
            .collect(),
    );
    table(
        &mut html,
        "Anomalies",
        &["Table", "Column", "Method", "Outliers", "Outlier %"],
        bundle
            .anomalies
            .iter()
            .map(|a| {
                vec![
                    a.table_name.clone(),
                    a.column.clone(),
                    a.method.clone(),
                    a.outlier_count.to_string(),
                    a.outlier_percentage.clone(),
                ]
            })
            .collect(),
    );

    html.push_str("</body></html>\n");
    html
}
