//! Fixture selection and suite aggregation.
//!
//! Selection narrows the indexed files to one category root and drops
//! excluded files. Aggregation fetches and parses each remaining file and
//! merges the per-file cases into one name-keyed suite.

use crate::error::{SuiteError, SuiteResult};
use crate::fixtures::{FixtureFetcher, SuiteParser};
use crate::network::NetworkVariant;
use crate::types::{FixtureFile, TestCase};
use std::collections::{BTreeMap, BTreeSet};

/// Files under `root`, minus those whose identity is in `excluded`.
///
/// Exclusion is file-granular: an excluded file contributes no cases at
/// all. Index order is preserved.
pub fn select_files(files: &[String], root: &str, excluded: &BTreeSet<String>) -> Vec<String> {
    let mut selected = Vec::new();
    for file in files.iter().filter(|f| FixtureFile::is_under(f, root)) {
        if excluded.contains(FixtureFile::identity(file)) {
            tracing::info!(" [X] {}", file);
        } else {
            tracing::info!("     {}", file);
            selected.push(file.clone());
        }
    }
    selected
}

/// All cases of a run, keyed by test name.
#[derive(Debug, Clone, Default)]
pub struct MergedSuite {
    /// Cases in name order.
    pub cases: BTreeMap<String, TestCase>,
    /// Names defined by more than one file, in the order they were
    /// overwritten. The later file's case is the one kept.
    pub collisions: Vec<String>,
}

impl MergedSuite {
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Merge one file's cases; later files win on name collision.
    pub fn merge(&mut self, cases: BTreeMap<String, TestCase>) {
        for (name, case) in cases {
            if self.cases.insert(name.clone(), case).is_some() {
                self.collisions.push(name);
            }
        }
    }
}

/// Fetch, parse and merge `files` at `commit_id`.
///
/// Files are processed one at a time in input order. The first fetch or
/// parse fault aborts the whole aggregation.
pub fn aggregate(
    fetcher: &dyn FixtureFetcher,
    parser: &dyn SuiteParser,
    files: &[String],
    commit_id: &str,
    variants: &[NetworkVariant],
) -> SuiteResult<MergedSuite> {
    let mut suite = MergedSuite::default();
    for file in files {
        let raw = fetcher
            .fetch(commit_id, file)
            .map_err(|source| SuiteError::Fixture {
                path: file.clone(),
                source,
            })?;
        let cases = parser
            .parse(file, &raw, variants)
            .map_err(|source| SuiteError::Fixture {
                path: file.clone(),
                source,
            })?;
        tracing::debug!(file = %file, cases = cases.len(), "parsed fixture");
        suite.merge(cases);
    }

    if !suite.collisions.is_empty() {
        tracing::warn!(
            collisions = suite.collisions.len(),
            names = ?suite.collisions,
            "test names defined by more than one fixture; later files win"
        );
    }
    Ok(suite)
}
