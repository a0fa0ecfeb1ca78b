//! Shared output formatting for check reports.

use anyhow::Result;
use arch_conform_core::{ConformanceReport, ViolationDiagnostic};

use crate::OutputFormat;

/// Print a report in the specified format.
pub fn print(report: &ConformanceReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(report),
        OutputFormat::Json => return print_json(report),
        OutputFormat::Compact => print_compact(report),
    }
    Ok(())
}

fn print_text(report: &ConformanceReport) {
    for violation in &report.violations {
        let diagnostic = miette::Report::new(ViolationDiagnostic::from(violation));
        println!("{diagnostic:?}");
    }

    let (errors, warnings, infos) = report.count_by_severity();
    let summary_color = if errors > 0 {
        "\x1b[31m"
    } else if warnings > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };

    println!(
        "{}Found {} error(s), {} warning(s), {} info(s) in {} type(s) across {} rule(s)\x1b[0m",
        summary_color, errors, warnings, infos, report.types_checked, report.rules_checked
    );
}

fn print_json(report: &ConformanceReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{json}");
    Ok(())
}

fn print_compact(report: &ConformanceReport) {
    for violation in &report.violations {
        println!("{violation}");
    }
}
