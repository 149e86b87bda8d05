//! Blockchain Fixture Suite Orchestration
//!
//! Runs versioned JSON blockchain fixtures against an external validator
//! and reports a deterministic pass/fail summary.
//!
//! # Pipeline
//!
//! | Stage | Module | Role |
//! |-------|--------|------|
//! | Index / fetch / parse | [`fixtures`] | list fixture files, load raw text, build test cases |
//! | Select + aggregate | [`aggregator`] | root filter, file exclusion, last-write-wins merge |
//! | Scope | [`scope`] | activate a case's configuration, always restore the default |
//! | Execute | [`runner`], [`executor`] | run every case, collect complaints |
//! | Report | [`report`] | summary lines, counts, verdict |
//!
//! Execution is strictly sequential: case configurations are activated
//! on a shared store.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use blocktest_suite::{
//!     BlockchainSuite, CommandExecutor, GlobalConfig, JsonSuiteParser, LocalFixtureStore,
//!     Selection, SuiteCollaborators,
//! };
//!
//! let store = LocalFixtureStore::new("fixtures");
//! let parser = JsonSuiteParser::new();
//! let executor = CommandExecutor::new("validator");
//! let suite = BlockchainSuite::open(
//!     SuiteCollaborators {
//!         index: &store,
//!         fetcher: &store,
//!         parser: &parser,
//!         executor: &executor,
//!         store: &GlobalConfig,
//!     },
//!     "",
//!     "",
//! )?;
//! let outcome = suite.run(&Selection::root("bcValidBlockTest").exclude(["RecallSuicidedContract"]))?;
//! assert!(outcome.is_success());
//! # Ok::<(), blocktest_suite::SuiteError>(())
//! ```

pub mod aggregator;
pub mod error;
pub mod executor;
pub mod fixtures;
pub mod network;
pub mod report;
pub mod runner;
pub mod scope;
pub mod selection;
pub mod types;

// Re-export key types at crate root.
pub use aggregator::{aggregate, select_files, MergedSuite};
pub use error::{ConfigError, ExecutorFault, FixtureError, SuiteError, SuiteResult};
pub use executor::{CaseExecutor, CommandExecutor};
pub use fixtures::{FixtureFetcher, FixtureIndex, JsonSuiteParser, LocalFixtureStore, SuiteParser};
pub use network::{Fork, NetworkVariant, ProtocolConfig, UnknownNetwork};
pub use report::{SuiteOutcome, SuiteReport};
pub use runner::SuiteRunner;
pub use scope::{ConfigScope, ConfigStore, GlobalConfig, MemoryConfigStore};
pub use selection::{BlockchainSuite, Selection, SuiteCollaborators, Target};
pub use types::{CaseOutcome, FixtureFile, TestCase};
