//! Run entry points.
//!
//! A [`Selection`] says which fixture files to run and under which
//! networks; [`BlockchainSuite`] turns it into aggregate, run and report.

use crate::aggregator::{aggregate, select_files};
use crate::error::{SuiteError, SuiteResult};
use crate::executor::CaseExecutor;
use crate::fixtures::{FixtureFetcher, FixtureIndex, SuiteParser};
use crate::network::NetworkVariant;
use crate::report::SuiteOutcome;
use crate::runner::SuiteRunner;
use crate::scope::ConfigStore;
use crate::types::FixtureFile;
use std::collections::BTreeSet;

/// Which fixture files a run covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Every indexed file under a category directory.
    Root(String),
    /// One fixture file, fetched whether or not the index lists it.
    File(String),
}

/// Options for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub target: Target,
    /// File identities (base name without `.json`) to leave out.
    pub excluded: BTreeSet<String>,
    /// Networks to materialize; `None` uses the suite's networks.
    pub networks: Option<Vec<NetworkVariant>>,
}

impl Selection {
    /// All files under `root`, no exclusions, suite networks.
    pub fn root(root: impl Into<String>) -> Self {
        Self {
            target: Target::Root(root.into()),
            excluded: BTreeSet::new(),
            networks: None,
        }
    }

    /// A single fixture file, suite networks.
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            target: Target::File(path.into()),
            excluded: BTreeSet::new(),
            networks: None,
        }
    }

    pub fn exclude<I, S>(mut self, identities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded.extend(identities.into_iter().map(Into::into));
        self
    }

    pub fn networks(mut self, networks: &[NetworkVariant]) -> Self {
        self.networks = Some(networks.to_vec());
        self
    }

    pub fn network(self, network: NetworkVariant) -> Self {
        self.networks(&[network])
    }
}

/// The collaborators a suite talks to.
#[derive(Clone, Copy)]
pub struct SuiteCollaborators<'a> {
    pub index: &'a dyn FixtureIndex,
    pub fetcher: &'a dyn FixtureFetcher,
    pub parser: &'a dyn SuiteParser,
    pub executor: &'a dyn CaseExecutor,
    pub store: &'a dyn ConfigStore,
}

/// A blockchain fixture suite pinned to one fixture revision.
///
/// The index is listed once, when the suite is opened; every run
/// re-fetches and re-parses the fixtures it selects.
pub struct BlockchainSuite<'a> {
    fetcher: &'a dyn FixtureFetcher,
    parser: &'a dyn SuiteParser,
    executor: &'a dyn CaseExecutor,
    store: &'a dyn ConfigStore,
    commit_id: String,
    files: Vec<String>,
    networks: Vec<NetworkVariant>,
}

impl<'a> BlockchainSuite<'a> {
    /// Open a suite at `tree_id`/`commit_id`, running all networks.
    pub fn open(
        collaborators: SuiteCollaborators<'a>,
        tree_id: &str,
        commit_id: &str,
    ) -> SuiteResult<Self> {
        let files = collaborators
            .index
            .list(tree_id)
            .map_err(SuiteError::Index)?;
        tracing::debug!(tree = tree_id, files = files.len(), "opened fixture suite");

        Ok(Self {
            fetcher: collaborators.fetcher,
            parser: collaborators.parser,
            executor: collaborators.executor,
            store: collaborators.store,
            commit_id: commit_id.to_string(),
            files,
            networks: NetworkVariant::all().to_vec(),
        })
    }

    /// Replace the default network set.
    pub fn with_networks(mut self, networks: &[NetworkVariant]) -> Self {
        self.networks = networks.to_vec();
        self
    }

    /// Files listed by the index.
    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn networks(&self) -> &[NetworkVariant] {
        &self.networks
    }

    pub fn commit_id(&self) -> &str {
        &self.commit_id
    }

    /// Run a selection.
    pub fn run(&self, selection: &Selection) -> SuiteResult<SuiteOutcome> {
        let networks = selection.networks.as_deref().unwrap_or(&self.networks);
        if networks.is_empty() {
            return Err(SuiteError::InvalidSelection("no networks selected".into()));
        }

        let files = match &selection.target {
            Target::Root(root) if root.trim_matches('/').is_empty() => {
                return Err(SuiteError::InvalidSelection("empty fixture root".into()));
            }
            Target::Root(root) => select_files(&self.files, root, &selection.excluded),
            Target::File(path) => select_single(path, &selection.excluded),
        };

        if files.is_empty() {
            tracing::info!("no fixture files selected");
            return Ok(SuiteOutcome::Skipped);
        }

        let merged = aggregate(self.fetcher, self.parser, &files, &self.commit_id, networks)?;
        let report = SuiteRunner::new(self.executor, self.store).run(merged)?;
        Ok(SuiteOutcome::Completed(report))
    }

    /// Every file under `root` on the suite's networks.
    pub fn run_all(&self, root: &str) -> SuiteResult<SuiteOutcome> {
        self.run(&Selection::root(root))
    }

    /// Every file under `root` except the excluded identities.
    pub fn run_all_excluding(
        &self,
        root: &str,
        excluded: &BTreeSet<String>,
    ) -> SuiteResult<SuiteOutcome> {
        self.run(&Selection::root(root).exclude(excluded.iter().cloned()))
    }

    /// Every file under `root` on one network.
    pub fn run_all_on(&self, root: &str, network: NetworkVariant) -> SuiteResult<SuiteOutcome> {
        self.run(&Selection::root(root).network(network))
    }

    /// One fixture file on one network, or on every known network.
    ///
    /// The suite's configured networks do not narrow a single-file run.
    pub fn run_single(
        &self,
        file: &str,
        network: Option<NetworkVariant>,
    ) -> SuiteResult<SuiteOutcome> {
        let selection = Selection::file(file);
        match network {
            Some(network) => self.run(&selection.network(network)),
            None => self.run(&selection.networks(NetworkVariant::all())),
        }
    }
}

fn select_single(path: &str, excluded: &BTreeSet<String>) -> Vec<String> {
    if excluded.contains(FixtureFile::identity(path)) {
        tracing::info!(" [X] {}", path);
        Vec::new()
    } else {
        tracing::info!("     {}", path);
        vec![path.to_string()]
    }
}
