//! Error types for fixture suite runs.
//!
//! Two classes are kept apart: faults that stop a run before or while it
//! executes ([`SuiteError`]), and validation complaints, which are ordinary
//! per-case outcomes and never appear here.

use crate::report::SuiteReport;
use thiserror::Error;

/// A fault raised by a fixture collaborator (index, fetcher or parser).
#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("fixture not found: {path}")]
    NotFound { path: String },

    #[error("malformed fixture {path}: {reason}")]
    Format { path: String, reason: String },

    #[error("cannot list fixtures for tree {tree}: {reason}")]
    Index { tree: String, reason: String },
}

/// An unexpected fault inside the validator.
///
/// Ordinary validation failures are complaints, not faults.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct ExecutorFault(pub String);

impl From<std::io::Error> for ExecutorFault {
    fn from(err: std::io::Error) -> Self {
        Self(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for ExecutorFault {
    fn from(err: serde_json::Error) -> Self {
        Self(format!("JSON error: {}", err))
    }
}

/// Failure of a process-wide configuration mutator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("cannot activate configuration {config}: {reason}")]
    Activate { config: String, reason: String },

    #[error("cannot restore default configuration: {0}")]
    Restore(String),
}

/// Errors that abort a suite run, plus the failed-suite verdict.
#[derive(Error, Debug)]
pub enum SuiteError {
    /// The fixture set could not be materialized.
    #[error("fixture {path}: {source}")]
    Fixture {
        path: String,
        #[source]
        source: FixtureError,
    },

    /// The fixture index could not be listed.
    #[error("fixture index: {0}")]
    Index(#[source] FixtureError),

    /// The validator faulted while replaying a case.
    #[error("test {test} faulted: {source}")]
    Executor {
        test: String,
        #[source]
        source: ExecutorFault,
    },

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The default configuration could not be put back after a case.
    ///
    /// `partial` holds every outcome recorded so far, including the case
    /// that had just finished.
    #[error("default configuration not restored after test {test}: {source}")]
    RestoreFailed {
        test: String,
        #[source]
        source: ConfigError,
        partial: Box<SuiteReport>,
    },

    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    /// The run completed but at least one case failed.
    #[error("{failed} of {total} test(s) failed")]
    SuiteFailed { failed: usize, total: usize },
}

/// Convenience result type for suite operations.
pub type SuiteResult<T> = Result<T, SuiteError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_fixture_error_display() {
        let err = SuiteError::Fixture {
            path: "bcValidBlockTest/simpleTx.json".into(),
            source: FixtureError::NotFound {
                path: "bcValidBlockTest/simpleTx.json".into(),
            },
        };
        assert!(err.to_string().contains("simpleTx.json"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_suite_failed_display() {
        let err = SuiteError::SuiteFailed {
            failed: 1,
            total: 3,
        };
        assert_eq!(err.to_string(), "1 of 3 test(s) failed");
    }

    #[test]
    fn test_executor_fault_display() {
        let err = SuiteError::Executor {
            test: "t1".into(),
            source: ExecutorFault("segfault in evm".into()),
        };
        assert!(err.to_string().contains("t1"));
        assert!(err.to_string().contains("segfault in evm"));
    }

    #[test]
    fn test_config_error_converts() {
        let err: SuiteError = ConfigError::Restore("store poisoned".into()).into();
        assert!(matches!(err, SuiteError::Config(ConfigError::Restore(_))));
    }
}
