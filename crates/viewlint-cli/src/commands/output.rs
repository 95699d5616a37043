//! Shared output formatting for analysis reports.

use anyhow::Result;
use viewlint_core::Report;

use crate::OutputFormat;

/// Print an analysis report in the specified format.
pub fn print(report: &Report, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(report),
        OutputFormat::Json => return print_json(report),
        OutputFormat::Compact => print_compact(report),
    }
    Ok(())
}

fn print_text(report: &Report) {
    for finding in &report.findings {
        print!("{}", finding.format());
        println!();
    }

    for incident in &report.incidents {
        println!(
            "\x1b[35mrule failure\x1b[0m {} at {}: {}",
            incident.rule, incident.span, incident.message
        );
        println!();
    }

    let summary = &report.summary;
    let summary_color = if summary.errors > 0 {
        "\x1b[31m"
    } else if summary.warnings > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };

    println!(
        "{}Found {} error(s), {} warning(s), {} info(s) in {} unit(s)\x1b[0m",
        summary_color, summary.errors, summary.warnings, summary.infos, report.units_checked
    );
}

fn print_json(report: &Report) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{json}");
    Ok(())
}

fn print_compact(report: &Report) {
    for finding in &report.findings {
        println!(
            "{}:{}:{}: {} [{}] {}",
            finding.span.file.display(),
            finding.span.start_line,
            finding.span.start_col,
            finding.severity,
            finding.code,
            finding.message,
        );
    }
}
