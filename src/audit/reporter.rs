//! Console formatting for reports

use colored::Colorize;
use tabled::{
    builder::Builder,
    settings::{Alignment, Modify, Style, object::Rows},
};

use super::report::Report;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Formats a report as a table followed by a summary block
pub fn format_report(report: &Report) -> String {
    let mut builder = Builder::default();

    let with_resources = report
        .test_results
        .iter()
        .any(|r| r.memory_delta.is_some() || r.cpu_sample.is_some());

    if with_resources {
        builder.push_record(["Check", "Status", "Time", "Memory", "CPU", "Message"]);
    } else {
        builder.push_record(["Check", "Status", "Time", "Message"]);
    }

    for result in &report.test_results {
        let duration_str = format!("{:.2?}", result.execution_time);
        if with_resources {
            let memory_str = result
                .memory_delta
                .map(|bytes| format!("{:+.2} MB", bytes as f64 / BYTES_PER_MB))
                .unwrap_or_else(|| "-".to_string());
            let cpu_str = result
                .cpu_sample
                .map(|cpu| format!("{:.1}%", cpu))
                .unwrap_or_else(|| "-".to_string());
            builder.push_record([
                result.name.as_str(),
                &result.status.as_colored_str(),
                &duration_str,
                &memory_str,
                &cpu_str,
                &result.message,
            ]);
        } else {
            builder.push_record([
                result.name.as_str(),
                &result.status.as_colored_str(),
                &duration_str,
                &result.message,
            ]);
        }
    }

    let mut table = builder.build();
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));

    let mut output = String::new();
    output.push_str(&table.to_string());
    output.push('\n');
    output.push_str(&format_summary(report));

    output
}

/// Formats the summary section of the report
pub fn format_summary(report: &Report) -> String {
    let summary = &report.summary;
    let mut out = String::new();

    out.push_str(&format!("\n{} ({})\n", "Summary".bold().underline(), report.suite));
    out.push_str(&format!("  Total checks: {}\n", summary.total_tests));
    out.push_str(&format!("  {} Passed: {}\n", "✓".green(), summary.passed_tests));

    if summary.failed_tests > 0 {
        out.push_str(&format!("  {} Failed: {}\n", "✗".red(), summary.failed_tests));
    }

    out.push_str(&format!("  Success rate: {:.2}%\n", summary.success_rate * 100.0));
    out.push_str(&format!("  Total execution time: {:.3}s\n", summary.total_execution_time));

    if let Some(bytes) = summary.total_memory_usage {
        out.push_str(&format!("  Total memory usage: {:.2} MB\n", bytes as f64 / BYTES_PER_MB));
    }
    if let Some(cpu) = summary.average_cpu_usage {
        out.push_str(&format!("  Average CPU usage: {:.1}%\n", cpu));
    }

    out.push('\n');
    if report.is_successful() {
        out.push_str(&format!("  {}\n", "Overall: ALL CHECKS PASSED".green().bold()));
    } else {
        out.push_str(&format!("  {}\n", "Overall: CHECKS FAILED".red().bold()));
    }

    out
}

/// Prints a report to stdout, including details of failing checks
pub fn print_report(report: &Report) {
    println!("{}", format_report(report));

    for result in report.failures() {
        if result.details.is_empty() {
            continue;
        }
        println!("\n{} Details:", result.name.bold());
        match serde_json::to_string_pretty(&result.details) {
            Ok(details) => println!("{}", details),
            Err(_) => println!("{:?}", result.details),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::check::{CheckOutcome, CheckResult};
    use std::time::Duration;

    #[test]
    fn test_format_report_lists_every_check() {
        colored::control::set_override(false);
        let report = Report::aggregate(
            "suite",
            vec![
                CheckResult::from_outcome("check_alpha", CheckOutcome::pass("fine"), Duration::from_millis(1)),
                CheckResult::from_outcome("check_beta", CheckOutcome::fail("broken"), Duration::from_millis(2)),
            ],
        );

        let text = format_report(&report);

        assert!(text.contains("check_alpha"));
        assert!(text.contains("check_beta"));
        assert!(text.contains("FAIL"));
        assert!(text.contains("Success rate: 50.00%"));
        assert!(text.contains("Overall: CHECKS FAILED"));
        assert!(!text.contains("Memory"));
    }

    #[test]
    fn test_resource_columns_appear_when_measured() {
        colored::control::set_override(false);
        let report = Report::aggregate(
            "performance",
            vec![
                CheckResult::from_outcome("check_alpha", CheckOutcome::pass("fine"), Duration::from_millis(1))
                    .with_resources(Some(1024 * 1024), Some(42.0)),
            ],
        );

        let text = format_report(&report);

        assert!(text.contains("+1.00 MB"));
        assert!(text.contains("42.0%"));
        assert!(text.contains("Average CPU usage: 42.0%"));
    }
}
