//! Fixture collaborators: listing, fetching and parsing fixture files.
//!
//! The orchestrator only talks to the three traits below. A directory
//! backed store and a JSON parser for the blockchain fixture layout are
//! provided for local runs.

use crate::error::FixtureError;
use crate::network::NetworkVariant;
use crate::types::TestCase;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Default directory, inside a revision, holding blockchain fixtures.
pub const DEFAULT_FIXTURE_ROOT: &str = "BlockchainTests";

/// Lists the fixture files available at a tree revision.
pub trait FixtureIndex {
    /// Ordered fixture paths, relative to the fixture root.
    fn list(&self, tree_id: &str) -> Result<Vec<String>, FixtureError>;
}

/// Fetches raw fixture text.
pub trait FixtureFetcher {
    /// Raw text of `path` (relative to the fixture root) at `commit_id`.
    fn fetch(&self, commit_id: &str, path: &str) -> Result<String, FixtureError>;
}

/// Turns raw fixture text into test cases.
pub trait SuiteParser {
    /// Parse `raw`, keeping only cases for the requested `variants`.
    ///
    /// `path` is used for error context only.
    fn parse(
        &self,
        path: &str,
        raw: &str,
        variants: &[NetworkVariant],
    ) -> Result<BTreeMap<String, TestCase>, FixtureError>;
}

/// Directory-backed fixture index and fetcher.
///
/// Revisions are subdirectories of `base_dir`; an empty revision id
/// addresses `base_dir` itself. Fixtures live under `fixture_root`
/// inside each revision.
#[derive(Debug, Clone)]
pub struct LocalFixtureStore {
    base_dir: PathBuf,
    fixture_root: String,
}

impl LocalFixtureStore {
    /// Create a store with the default fixture root.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self::with_root(base_dir, DEFAULT_FIXTURE_ROOT)
    }

    /// Create a store with a custom fixture root.
    pub fn with_root(base_dir: impl Into<PathBuf>, fixture_root: &str) -> Self {
        Self {
            base_dir: base_dir.into(),
            fixture_root: fixture_root.trim_matches('/').to_string(),
        }
    }

    fn root_for(&self, revision: &str) -> PathBuf {
        let mut dir = self.base_dir.clone();
        if !revision.is_empty() {
            dir.push(revision);
        }
        if !self.fixture_root.is_empty() {
            dir.push(&self.fixture_root);
        }
        dir
    }

    fn relative_path(root: &Path, file: &Path) -> Option<String> {
        let rel = file.strip_prefix(root).ok()?;
        let parts: Vec<_> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(parts.join("/"))
    }
}

impl FixtureIndex for LocalFixtureStore {
    fn list(&self, tree_id: &str) -> Result<Vec<String>, FixtureError> {
        let root = self.root_for(tree_id);
        if !root.is_dir() {
            return Err(FixtureError::Index {
                tree: tree_id.to_string(),
                reason: format!("{} is not a directory", root.display()),
            });
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&root).sort_by_file_name() {
            let entry = entry.map_err(|e| FixtureError::Index {
                tree: tree_id.to_string(),
                reason: e.to_string(),
            })?;
            let is_json = entry.path().extension().is_some_and(|ext| ext == "json");
            if !entry.file_type().is_file() || !is_json {
                continue;
            }
            if let Some(rel) = Self::relative_path(&root, entry.path()) {
                files.push(rel);
            }
        }

        tracing::debug!(tree = tree_id, count = files.len(), "listed fixture files");
        Ok(files)
    }
}

impl FixtureFetcher for LocalFixtureStore {
    fn fetch(&self, commit_id: &str, path: &str) -> Result<String, FixtureError> {
        if path.split('/').any(|part| part == "..") {
            return Err(FixtureError::NotFound {
                path: path.to_string(),
            });
        }
        let file = self.root_for(commit_id).join(path);
        if !file.is_file() {
            return Err(FixtureError::NotFound {
                path: path.to_string(),
            });
        }
        Ok(std::fs::read_to_string(file)?)
    }
}

/// Parser for the blockchain fixture layout.
///
/// A fixture file is a JSON object mapping test names to case objects.
/// Each case names its ruleset in a `"network"` string field; everything
/// else is kept as opaque case data.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSuiteParser;

impl JsonSuiteParser {
    pub fn new() -> Self {
        Self
    }
}

impl SuiteParser for JsonSuiteParser {
    fn parse(
        &self,
        path: &str,
        raw: &str,
        variants: &[NetworkVariant],
    ) -> Result<BTreeMap<String, TestCase>, FixtureError> {
        let value: serde_json::Value = serde_json::from_str(raw)?;
        let entries = value.as_object().ok_or_else(|| FixtureError::Format {
            path: path.to_string(),
            reason: "top level is not an object".into(),
        })?;

        let mut cases = BTreeMap::new();
        for (name, body) in entries {
            let network = body
                .as_object()
                .and_then(|obj| obj.get("network"))
                .and_then(|n| n.as_str())
                .ok_or_else(|| FixtureError::Format {
                    path: path.to_string(),
                    reason: format!("case {} has no network field", name),
                })?;

            match network.parse::<NetworkVariant>() {
                Ok(variant) if variants.contains(&variant) => {
                    cases.insert(name.clone(), TestCase::new(name, variant, body.clone()));
                }
                Ok(variant) => {
                    tracing::debug!(test = %name, network = %variant, "network not selected");
                }
                Err(_) => {
                    tracing::debug!(test = %name, network, "unknown network, skipping");
                }
            }
        }
        Ok(cases)
    }
}
