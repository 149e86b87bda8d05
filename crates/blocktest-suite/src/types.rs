//! Core types for fixture suite runs.

use crate::network::{NetworkVariant, ProtocolConfig};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One named, self-contained unit of validator execution.
///
/// The name is unique within a run; `data` is opaque to the orchestrator
/// and consumed only by the executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    /// Globally unique test name.
    pub name: String,
    /// Network the case was generated for.
    pub network: NetworkVariant,
    /// The raw case body.
    pub data: serde_json::Value,
}

impl TestCase {
    pub fn new(name: impl Into<String>, network: NetworkVariant, data: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            network,
            data,
        }
    }

    /// The configuration the validator must run under for this case.
    pub fn required_config(&self) -> ProtocolConfig {
        self.network.config()
    }
}

/// Path helpers for fixture files listed by an index.
///
/// Paths are `/`-separated and relative to the fixture root, e.g.
/// `bcValidBlockTest/simpleTx.json`.
pub struct FixtureFile;

impl FixtureFile {
    /// The file-granular identity used for exclusion: base name without
    /// the `.json` extension.
    pub fn identity(path: &str) -> &str {
        let base = path.rsplit('/').next().unwrap_or(path);
        base.strip_suffix(".json").unwrap_or(base)
    }

    /// Whether `path` lives under the directory `root`.
    pub fn is_under(path: &str, root: &str) -> bool {
        let root = root.trim_end_matches('/');
        path.len() > root.len() + 1 && path.starts_with(root) && path[root.len()..].starts_with('/')
    }
}

/// The result of running one test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseOutcome {
    /// Test name.
    pub name: String,
    /// Network the case ran under.
    pub network: NetworkVariant,
    /// Validation complaints in validator order. Empty means pass.
    pub complaints: Vec<String>,
}

impl CaseOutcome {
    pub fn new(name: impl Into<String>, network: NetworkVariant, complaints: Vec<String>) -> Self {
        Self {
            name: name.into(),
            network,
            complaints,
        }
    }

    /// Whether the validator had no complaints.
    pub fn passed(&self) -> bool {
        self.complaints.is_empty()
    }
}

impl fmt::Display for CaseOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.passed() { "OK" } else { "FAIL" };
        write!(f, "[{}] {} ({})", status, self.name, self.network)?;
        if !self.passed() {
            write!(f, ": {} complaint(s)", self.complaints.len())?;
        }
        Ok(())
    }
}
