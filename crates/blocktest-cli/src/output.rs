//! Output formatting utilities

use crate::error::CliResult;
use blocktest_suite::report::summary_line;
use blocktest_suite::{NetworkVariant, SuiteOutcome, SuiteReport};
use colored::*;
use serde::Serialize;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Summary lines as the suite logs them
    #[default]
    Text,
    /// JSON document
    Json,
}

#[derive(Serialize)]
struct RunDocument<'a> {
    verdict: &'static str,
    passed: usize,
    failed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<&'a SuiteReport>,
}

fn verdict(outcome: &SuiteOutcome) -> &'static str {
    match outcome {
        SuiteOutcome::Skipped => "skipped",
        SuiteOutcome::Completed(_) if outcome.is_success() => "passed",
        SuiteOutcome::Completed(_) => "failed",
    }
}

/// Print a run outcome in the specified format
pub fn print_outcome(outcome: &SuiteOutcome, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Text => match outcome.report() {
            None => println!("{}", "No fixture files selected".dimmed()),
            Some(report) => print_report(report),
        },
        OutputFormat::Json => {
            let doc = RunDocument {
                verdict: verdict(outcome),
                passed: outcome.passed(),
                failed: outcome.failed(),
                report: outcome.report(),
            };
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
    }
    Ok(())
}

fn print_report(report: &SuiteReport) {
    println!("Summary: ");
    println!("=========");
    for outcome in report.outcomes.values() {
        println!("{}", colorize_status(&summary_line(&outcome.name, outcome.passed())));
    }

    let failures = report.failures();
    if !failures.is_empty() {
        println!();
        println!("{}", "Failures:".red().bold());
        for outcome in failures {
            println!("  {} ({})", outcome.name.bold(), outcome.network);
            for complaint in &outcome.complaints {
                println!("      {}", complaint);
            }
        }
        println!();
    }

    println!("{}", report.totals_line());
}

fn colorize_status(line: &str) -> String {
    if let Some(name) = line.strip_suffix(": OK") {
        format!("{}: {}", name, "OK".green())
    } else if let Some(name) = line.strip_suffix(": FAIL") {
        format!("{}: {}", name, "FAIL".red())
    } else {
        line.to_string()
    }
}

/// Print the known networks and their fork schedules
pub fn print_networks(format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Text => {
            for variant in NetworkVariant::all() {
                let schedule: Vec<String> = variant
                    .config()
                    .forks
                    .iter()
                    .map(|a| format!("{:?}@{}", a.fork, a.block))
                    .collect();
                println!("{} {}", format!("{:<28}", variant.name()).bold(), schedule.join(" "));
            }
        }
        OutputFormat::Json => {
            let configs: Vec<_> = NetworkVariant::all()
                .iter()
                .map(|v| (v.name(), v.config()))
                .collect();
            println!("{}", serde_json::to_string_pretty(&configs)?);
        }
    }
    Ok(())
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}
