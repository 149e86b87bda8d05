//! Suite runner.
//!
//! Executes every case of a merged suite, one at a time in name order,
//! each inside its own configuration scope. A failed case is recorded and
//! the loop moves on; only faults stop the run.

use crate::aggregator::MergedSuite;
use crate::error::{SuiteError, SuiteResult};
use crate::executor::CaseExecutor;
use crate::report::SuiteReport;
use crate::scope::{ConfigScope, ConfigStore};
use crate::types::{CaseOutcome, TestCase};

/// Runs merged suites against a validator.
pub struct SuiteRunner<'a> {
    executor: &'a dyn CaseExecutor,
    store: &'a dyn ConfigStore,
}

impl<'a> SuiteRunner<'a> {
    /// Create a runner activating case configurations on `store`.
    pub fn new(executor: &'a dyn CaseExecutor, store: &'a dyn ConfigStore) -> Self {
        Self { executor, store }
    }

    /// Execute every case and collect the outcomes.
    ///
    /// Complaints never stop the loop. An executor fault aborts the run
    /// after the default configuration is back in place; a restore fault
    /// aborts it after the case's outcome has been recorded.
    pub fn run(&self, suite: MergedSuite) -> SuiteResult<SuiteReport> {
        tracing::info!(cases = suite.len(), "running suite");
        let mut report = SuiteReport::new(suite.collisions);

        for case in suite.cases.values() {
            self.run_case(case, &mut report)?;
        }

        report.complete();
        report.log_summary();
        Ok(report)
    }

    fn run_case(&self, case: &TestCase, report: &mut SuiteReport) -> SuiteResult<()> {
        tracing::info!("");
        tracing::info!(
            " ***************** Running test: {} ***************************** ",
            case.name
        );

        let config = case.required_config();
        let scope = ConfigScope::enter(self.store, &config)?;

        let complaints = match self.executor.execute(case, &config) {
            Ok(complaints) => complaints,
            Err(source) => {
                if let Err(err) = scope.release() {
                    tracing::warn!(test = %case.name, error = %err, "restore failed after executor fault");
                }
                return Err(SuiteError::Executor {
                    test: case.name.clone(),
                    source,
                });
            }
        };

        tracing::info!("--------- POST Validation---------");
        for complaint in &complaints {
            tracing::info!(test = %case.name, "{}", complaint);
        }
        report.record(CaseOutcome::new(case.name.clone(), case.network, complaints));

        if let Err(source) = scope.release() {
            tracing::error!(test = %case.name, error = %source, "default configuration not restored");
            report.complete();
            return Err(SuiteError::RestoreFailed {
                test: case.name.clone(),
                source,
                partial: Box::new(report.clone()),
            });
        }
        Ok(())
    }
}
