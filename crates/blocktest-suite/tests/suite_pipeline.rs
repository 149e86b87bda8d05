//! End-to-end runs through index, aggregation, scoped execution and report.

use blocktest_suite::{
    BlockchainSuite, CaseExecutor, ConfigStore, ExecutorFault, FixtureError, FixtureFetcher,
    FixtureIndex, JsonSuiteParser, LocalFixtureStore, MemoryConfigStore, NetworkVariant,
    ProtocolConfig, Selection, SuiteCollaborators, SuiteError, SuiteOutcome, SuiteParser,
    TestCase,
};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};

/// Builds fixture text: each case is `(name, network)`; `origin` tags the file.
fn fixture(origin: &str, cases: &[(&str, &str)]) -> String {
    let body: serde_json::Map<String, serde_json::Value> = cases
        .iter()
        .map(|(name, network)| {
            (
                name.to_string(),
                serde_json::json!({ "network": network, "origin": origin }),
            )
        })
        .collect();
    serde_json::Value::Object(body).to_string()
}

#[derive(Default)]
struct MemoryFixtures {
    files: BTreeMap<String, String>,
    lists: Cell<usize>,
    fetches: RefCell<Vec<String>>,
}

impl MemoryFixtures {
    fn with(mut self, path: &str, text: String) -> Self {
        self.files.insert(path.to_string(), text);
        self
    }
}

impl FixtureIndex for MemoryFixtures {
    fn list(&self, _tree_id: &str) -> Result<Vec<String>, FixtureError> {
        self.lists.set(self.lists.get() + 1);
        Ok(self.files.keys().cloned().collect())
    }
}

impl FixtureFetcher for MemoryFixtures {
    fn fetch(&self, _commit_id: &str, path: &str) -> Result<String, FixtureError> {
        self.fetches.borrow_mut().push(path.to_string());
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| FixtureError::NotFound { path: path.into() })
    }
}

#[derive(Default)]
struct CountingParser {
    inner: JsonSuiteParser,
    calls: Cell<usize>,
}

impl SuiteParser for CountingParser {
    fn parse(
        &self,
        path: &str,
        raw: &str,
        variants: &[NetworkVariant],
    ) -> Result<BTreeMap<String, TestCase>, FixtureError> {
        self.calls.set(self.calls.get() + 1);
        self.inner.parse(path, raw, variants)
    }
}

/// Fails the named cases, faults on one, and checks the scoped config.
struct ScriptedValidator<'s> {
    store: &'s MemoryConfigStore,
    failing: BTreeSet<String>,
    fault_on: Option<String>,
    executed: RefCell<Vec<String>>,
}

impl<'s> ScriptedValidator<'s> {
    fn new(store: &'s MemoryConfigStore) -> Self {
        Self {
            store,
            failing: BTreeSet::new(),
            fault_on: None,
            executed: RefCell::new(Vec::new()),
        }
    }

    fn failing(mut self, names: &[&str]) -> Self {
        self.failing = names.iter().map(|s| s.to_string()).collect();
        self
    }

    fn fault_on(mut self, name: &str) -> Self {
        self.fault_on = Some(name.to_string());
        self
    }
}

impl CaseExecutor for ScriptedValidator<'_> {
    fn execute(&self, case: &TestCase, config: &ProtocolConfig) -> Result<Vec<String>, ExecutorFault> {
        assert_eq!(&self.store.active(), config, "case config must be active");
        self.executed.borrow_mut().push(case.name.clone());
        if self.fault_on.as_deref() == Some(case.name.as_str()) {
            return Err(ExecutorFault("engine crashed".into()));
        }
        if self.failing.contains(&case.name) {
            return Ok(vec![
                format!("{}: state root mismatch", case.name),
                format!("{}: nonce mismatch", case.name),
            ]);
        }
        Ok(Vec::new())
    }
}

fn open<'a>(
    fixtures: &'a MemoryFixtures,
    parser: &'a CountingParser,
    validator: &'a ScriptedValidator<'a>,
    store: &'a MemoryConfigStore,
) -> BlockchainSuite<'a> {
    BlockchainSuite::open(
        SuiteCollaborators {
            index: fixtures,
            fetcher: fixtures,
            parser,
            executor: validator,
            store,
        },
        "tree",
        "commit",
    )
    .unwrap()
}

fn two_file_fixtures() -> MemoryFixtures {
    MemoryFixtures::default()
        .with(
            "bcCat/A.json",
            fixture("A", &[("t1", "Byzantium"), ("t2", "Byzantium")]),
        )
        .with(
            "bcCat/B.json",
            fixture("B", &[("t2", "Byzantium"), ("t3", "Byzantium")]),
        )
}

#[test]
fn merged_cases_run_with_last_write_wins_and_failure_verdict() {
    let fixtures = two_file_fixtures();
    let parser = CountingParser::default();
    let store = MemoryConfigStore::new();
    let validator = ScriptedValidator::new(&store).failing(&["t2"]);
    let suite = open(&fixtures, &parser, &validator, &store);

    let outcome = suite.run_all("bcCat").unwrap();
    assert!(!outcome.is_success());
    assert_eq!((outcome.passed(), outcome.failed()), (2, 1));

    let report = outcome.report().unwrap();
    let names: Vec<_> = report.outcomes.keys().cloned().collect();
    assert_eq!(names, vec!["t1", "t2", "t3"]);
    assert!(report.outcomes["t1"].passed());
    assert!(!report.outcomes["t2"].passed());
    assert_eq!(report.outcomes["t2"].complaints.len(), 2);
    assert_eq!(report.collisions, vec!["t2"]);
    assert_eq!(
        report.summary_lines().last().unwrap(),
        " - Total: Pass: 2, Failed: 1 - "
    );

    // Each case ran exactly once.
    assert_eq!(*validator.executed.borrow(), vec!["t1", "t2", "t3"]);
    assert!(store.active().is_mainnet());

    assert!(matches!(
        outcome.into_result(),
        Err(SuiteError::SuiteFailed {
            failed: 1,
            total: 3
        })
    ));
}

#[test]
fn collision_keeps_case_from_later_file() {
    let fixtures = MemoryFixtures::default()
        .with("bcCat/A.json", fixture("A", &[("t2", "Byzantium")]))
        .with("bcCat/B.json", fixture("B", &[("t2", "Homestead")]));
    let parser = CountingParser::default();
    let store = MemoryConfigStore::new();
    let validator = ScriptedValidator::new(&store);
    let suite = open(&fixtures, &parser, &validator, &store);

    let outcome = suite.run_all("bcCat").unwrap();
    let report = outcome.report().unwrap();
    assert_eq!(report.total(), 1);
    assert_eq!(report.outcomes["t2"].network, NetworkVariant::Homestead);
}

#[test]
fn empty_selection_does_no_work() {
    let fixtures = two_file_fixtures();
    let parser = CountingParser::default();
    let store = MemoryConfigStore::new();
    let validator = ScriptedValidator::new(&store);
    let suite = open(&fixtures, &parser, &validator, &store);

    let outcome = suite.run_all("bcOtherCat").unwrap();
    assert!(matches!(outcome, SuiteOutcome::Skipped));
    assert!(outcome.is_success());
    assert!(fixtures.fetches.borrow().is_empty());
    assert_eq!(parser.calls.get(), 0);
    assert!(validator.executed.borrow().is_empty());
}

#[test]
fn excluding_the_only_file_is_a_vacuous_success() {
    let fixtures = MemoryFixtures::default().with(
        "bcCat/A.json",
        fixture("A", &[("t1", "Byzantium"), ("t2", "Byzantium")]),
    );
    let parser = CountingParser::default();
    let store = MemoryConfigStore::new();
    let validator = ScriptedValidator::new(&store);
    let suite = open(&fixtures, &parser, &validator, &store);

    let excluded: BTreeSet<String> = ["A".to_string()].into();
    let outcome = suite.run_all_excluding("bcCat", &excluded).unwrap();
    assert!(outcome.is_success());
    assert_eq!((outcome.passed(), outcome.failed()), (0, 0));
    assert!(fixtures.fetches.borrow().is_empty());
}

#[test]
fn exclusion_removes_every_case_of_a_file() {
    let fixtures = two_file_fixtures();
    let parser = CountingParser::default();
    let store = MemoryConfigStore::new();
    let validator = ScriptedValidator::new(&store);
    let suite = open(&fixtures, &parser, &validator, &store);

    let outcome = suite
        .run(&Selection::root("bcCat").exclude(["B"]))
        .unwrap();
    let report = outcome.report().unwrap();
    let names: Vec<_> = report.outcomes.keys().cloned().collect();
    assert_eq!(names, vec!["t1", "t2"]);
    assert!(report.collisions.is_empty());
    assert_eq!(*fixtures.fetches.borrow(), vec!["bcCat/A.json"]);

    // A test name is not a file identity.
    let outcome = suite
        .run(&Selection::root("bcCat").exclude(["t3"]))
        .unwrap();
    assert_eq!(outcome.report().unwrap().total(), 3);
}

fn three_network_fixture() -> MemoryFixtures {
    MemoryFixtures::default().with(
        "bcCat/simpleTx.json",
        fixture(
            "simpleTx",
            &[
                ("simpleTx_Byzantium", "Byzantium"),
                ("simpleTx_EIP150", "EIP150"),
                ("simpleTx_Frontier", "Frontier"),
            ],
        ),
    )
}

#[test]
fn single_file_on_two_networks_yields_two_cases() {
    let fixtures = three_network_fixture();
    let parser = CountingParser::default();
    let store = MemoryConfigStore::new();
    let validator = ScriptedValidator::new(&store);
    let suite = open(&fixtures, &parser, &validator, &store);

    let outcome = suite
        .run(
            &Selection::file("bcCat/simpleTx.json")
                .networks(&[NetworkVariant::Byzantium, NetworkVariant::Eip150]),
        )
        .unwrap();
    let report = outcome.report().unwrap();
    assert_eq!(report.total(), 2);
    assert_eq!(report.outcomes["simpleTx_EIP150"].network, NetworkVariant::Eip150);

    let outcome = suite
        .run_single("bcCat/simpleTx.json", Some(NetworkVariant::Frontier))
        .unwrap();
    let names: Vec<_> = outcome.report().unwrap().outcomes.keys().cloned().collect();
    assert_eq!(names, vec!["simpleTx_Frontier"]);
}

#[test]
fn single_file_without_network_runs_every_network() {
    let fixtures = three_network_fixture();
    let parser = CountingParser::default();
    let store = MemoryConfigStore::new();
    let validator = ScriptedValidator::new(&store);
    let suite = open(&fixtures, &parser, &validator, &store)
        .with_networks(&[NetworkVariant::Byzantium]);

    let outcome = suite.run_single("bcCat/simpleTx.json", None).unwrap();
    let names: Vec<_> = outcome.report().unwrap().outcomes.keys().cloned().collect();
    assert_eq!(
        names,
        vec!["simpleTx_Byzantium", "simpleTx_EIP150", "simpleTx_Frontier"]
    );

    // Root runs still honour the narrowed networks.
    let outcome = suite.run_all("bcCat").unwrap();
    let names: Vec<_> = outcome.report().unwrap().outcomes.keys().cloned().collect();
    assert_eq!(names, vec!["simpleTx_Byzantium"]);
}

#[test]
fn fixture_fault_aborts_before_any_case_runs() {
    let fixtures = MemoryFixtures::default()
        .with("bcCat/A.json", fixture("A", &[("t1", "Byzantium")]))
        .with("bcCat/B.json", "{ truncated".to_string());
    let parser = CountingParser::default();
    let store = MemoryConfigStore::new();
    let validator = ScriptedValidator::new(&store);
    let suite = open(&fixtures, &parser, &validator, &store);

    let err = suite.run_all("bcCat").unwrap_err();
    match err {
        SuiteError::Fixture { path, source } => {
            assert_eq!(path, "bcCat/B.json");
            assert!(matches!(source, FixtureError::Json(_)));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(validator.executed.borrow().is_empty());
}

#[test]
fn missing_single_fixture_is_a_fixture_fault() {
    let fixtures = two_file_fixtures();
    let parser = CountingParser::default();
    let store = MemoryConfigStore::new();
    let validator = ScriptedValidator::new(&store);
    let suite = open(&fixtures, &parser, &validator, &store);

    let err = suite.run_single("bcCat/missing.json", None).unwrap_err();
    assert!(matches!(
        err,
        SuiteError::Fixture {
            source: FixtureError::NotFound { .. },
            ..
        }
    ));
}

#[test]
fn executor_fault_aborts_with_default_config_restored() {
    let fixtures = two_file_fixtures();
    let parser = CountingParser::default();
    let store = MemoryConfigStore::new();
    let validator = ScriptedValidator::new(&store).fault_on("t2");
    let suite = open(&fixtures, &parser, &validator, &store);

    let err = suite.run_all("bcCat").unwrap_err();
    assert!(matches!(err, SuiteError::Executor { ref test, .. } if test == "t2"));
    assert!(store.active().is_mainnet());
    assert_eq!(*validator.executed.borrow(), vec!["t1", "t2"]);
}

#[test]
fn index_is_listed_once_and_cases_are_rebuilt_per_run() {
    let fixtures = two_file_fixtures();
    let parser = CountingParser::default();
    let store = MemoryConfigStore::new();
    let validator = ScriptedValidator::new(&store);
    let suite = open(&fixtures, &parser, &validator, &store);
    assert_eq!(fixtures.lists.get(), 1);
    assert_eq!(suite.files().len(), 2);

    suite.run_all("bcCat").unwrap();
    suite.run_all("bcCat").unwrap();
    assert_eq!(fixtures.lists.get(), 1);
    assert_eq!(fixtures.fetches.borrow().len(), 4);
    assert_eq!(parser.calls.get(), 4);
}

#[test]
fn invalid_selections_are_rejected() {
    let fixtures = two_file_fixtures();
    let parser = CountingParser::default();
    let store = MemoryConfigStore::new();
    let validator = ScriptedValidator::new(&store);
    let suite = open(&fixtures, &parser, &validator, &store);

    assert!(matches!(
        suite.run(&Selection::root("bcCat").networks(&[])),
        Err(SuiteError::InvalidSelection(_))
    ));
    assert!(matches!(
        suite.run_all(""),
        Err(SuiteError::InvalidSelection(_))
    ));
}

#[test]
fn directory_store_runs_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("rev").join("BlockchainTests").join("bcCat");
    std::fs::create_dir_all(&root).unwrap();
    std::fs::write(
        root.join("A.json"),
        fixture("A", &[("t1", "Byzantium"), ("t1_hs", "Homestead")]),
    )
    .unwrap();
    std::fs::write(root.join("B.json"), fixture("B", &[("t3", "Byzantium")])).unwrap();

    let store = LocalFixtureStore::new(dir.path());
    let parser = JsonSuiteParser::new();
    let config = MemoryConfigStore::new();
    let validator = ScriptedValidator::new(&config).failing(&["t3"]);
    let suite = BlockchainSuite::open(
        SuiteCollaborators {
            index: &store,
            fetcher: &store,
            parser: &parser,
            executor: &validator,
            store: &config,
        },
        "rev",
        "rev",
    )
    .unwrap();
    assert_eq!(suite.files(), ["bcCat/A.json", "bcCat/B.json"]);

    let outcome = suite.run_all_on("bcCat", NetworkVariant::Byzantium).unwrap();
    assert_eq!((outcome.passed(), outcome.failed()), (1, 1));
    let text = outcome.report().unwrap().to_string();
    assert!(text.contains("t3: state root mismatch"));
}
