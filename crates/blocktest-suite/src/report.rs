//! Suite report and verdict.
//!
//! The report keeps one outcome per executed case, keyed by name so the
//! rendered summary is identical from run to run.

use crate::error::{SuiteError, SuiteResult};
use crate::types::CaseOutcome;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Column the status marker is aligned to.
const NAME_WIDTH: usize = 60;

/// One summary line: the test name dot-padded to a fixed column, then
/// the status.
pub fn summary_line(name: &str, passed: bool) -> String {
    let status = if passed { "OK" } else { "FAIL" };
    format!("{:.<width$}: {}", name.replace(' ', "."), status, width = NAME_WIDTH)
}

/// Outcomes of one completed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    /// Outcome per test name.
    pub outcomes: BTreeMap<String, CaseOutcome>,
    /// Test names overwritten during aggregation.
    pub collisions: Vec<String>,
    /// When execution started.
    pub started_at: DateTime<Utc>,
    /// When the last case finished.
    pub completed_at: DateTime<Utc>,
}

impl SuiteReport {
    /// Start an empty report.
    pub fn new(collisions: Vec<String>) -> Self {
        let now = Utc::now();
        Self {
            outcomes: BTreeMap::new(),
            collisions,
            started_at: now,
            completed_at: now,
        }
    }

    /// Record a finished case.
    pub fn record(&mut self, outcome: CaseOutcome) {
        self.outcomes.insert(outcome.name.clone(), outcome);
    }

    /// Stamp the completion time.
    pub fn complete(&mut self) {
        self.completed_at = Utc::now();
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn passed(&self) -> usize {
        self.outcomes.values().filter(|o| o.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.passed()
    }

    /// Whether no case failed. Vacuously true for an empty run.
    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }

    /// Failed outcomes in name order.
    pub fn failures(&self) -> Vec<&CaseOutcome> {
        self.outcomes.values().filter(|o| !o.passed()).collect()
    }

    /// Per-test lines followed by the totals line.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .outcomes
            .values()
            .map(|o| summary_line(&o.name, o.passed()))
            .collect();
        lines.push(self.totals_line());
        lines
    }

    /// The closing ` - Total: Pass: P, Failed: F - ` line.
    pub fn totals_line(&self) -> String {
        format!(" - Total: Pass: {}, Failed: {} - ", self.passed(), self.failed())
    }

    /// Emit the summary through the log.
    pub fn log_summary(&self) {
        tracing::info!("");
        tracing::info!("Summary: ");
        tracing::info!("=========");
        for line in self.summary_lines() {
            tracing::info!("{}", line);
        }
    }
}

impl fmt::Display for SuiteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Summary: ")?;
        writeln!(f, "=========")?;
        for line in self.summary_lines() {
            writeln!(f, "{}", line)?;
        }

        let failures = self.failures();
        if !failures.is_empty() {
            writeln!(f)?;
            writeln!(f, "Failures:")?;
            for outcome in failures {
                writeln!(f, "  {} ({})", outcome.name, outcome.network)?;
                for complaint in &outcome.complaints {
                    writeln!(f, "      {}", complaint)?;
                }
            }
        }
        Ok(())
    }
}

/// The verdict of one run invocation.
#[derive(Debug, Clone)]
pub enum SuiteOutcome {
    /// No fixture files were selected; nothing was fetched or executed.
    Skipped,
    /// Every selected case ran to completion.
    Completed(SuiteReport),
}

impl SuiteOutcome {
    /// Whether the run is judged a success.
    pub fn is_success(&self) -> bool {
        match self {
            Self::Skipped => true,
            Self::Completed(report) => report.all_passed(),
        }
    }

    /// Passed cases; zero when skipped.
    pub fn passed(&self) -> usize {
        self.report().map_or(0, SuiteReport::passed)
    }

    /// Failed cases; zero when skipped.
    pub fn failed(&self) -> usize {
        self.report().map_or(0, SuiteReport::failed)
    }

    pub fn report(&self) -> Option<&SuiteReport> {
        match self {
            Self::Skipped => None,
            Self::Completed(report) => Some(report),
        }
    }

    /// Turn a failed verdict into [`SuiteError::SuiteFailed`].
    pub fn into_result(self) -> SuiteResult<Option<SuiteReport>> {
        match self {
            Self::Skipped => Ok(None),
            Self::Completed(report) if report.all_passed() => Ok(Some(report)),
            Self::Completed(report) => Err(SuiteError::SuiteFailed {
                failed: report.failed(),
                total: report.total(),
            }),
        }
    }
}
