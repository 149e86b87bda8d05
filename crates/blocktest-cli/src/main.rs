//! Blocktest CLI - runs blockchain fixture suites against a validator
//!
//! Fixtures are read from a local checkout laid out as
//! `<fixtures>/<revision>/BlockchainTests/<category>/<file>.json`. Each
//! case is handed to the validator program as JSON on stdin; every line
//! it prints is a complaint against that case.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod output;

use blocktest_suite::{
    BlockchainSuite, CommandExecutor, GlobalConfig, JsonSuiteParser, LocalFixtureStore,
    NetworkVariant, Selection, SuiteCollaborators, SuiteError, SuiteOutcome,
};
use config::CliConfig;
use error::{CliError, CliResult};

/// Blocktest CLI application
#[derive(Parser)]
#[command(name = "blocktest")]
#[command(about = "Run blockchain conformance fixtures against a validator", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    source: SourceArgs,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    output: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Where fixtures come from and what validates them
#[derive(clap::Args)]
struct SourceArgs {
    /// Configuration file path
    #[arg(short, long, env = "BLOCKTEST_CONFIG")]
    config: Option<String>,

    /// Directory holding fixture checkouts
    #[arg(short, long, env = "BLOCKTEST_FIXTURES")]
    fixtures: Option<PathBuf>,

    /// Revision whose file listing is used
    #[arg(long)]
    tree: Option<String>,

    /// Revision fixture contents are read from (defaults to the tree)
    #[arg(long)]
    commit: Option<String>,

    /// Validator program
    #[arg(long, env = "BLOCKTEST_VALIDATOR")]
    validator: Option<PathBuf>,

    /// Argument passed to the validator (repeatable)
    #[arg(long = "validator-arg", allow_hyphen_values = true)]
    validator_args: Vec<String>,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Run every fixture file under a category directory
    Run {
        /// Category directory, e.g. bcValidBlockTest
        root: String,

        /// File identity to leave out (repeatable)
        #[arg(short = 'x', long = "exclude")]
        exclude: Vec<String>,

        /// Network to run (repeatable; default all)
        #[arg(short, long = "network")]
        network: Vec<NetworkVariant>,
    },

    /// Run one fixture file
    ///
    /// The fixture index at --tree is still listed when the suite opens,
    /// so the tree directory must exist even though only one file is read.
    Single {
        /// Fixture path relative to the fixture root
        file: String,

        /// Network to run (default all)
        #[arg(short, long)]
        network: Option<NetworkVariant>,
    },

    /// List known networks
    Networks,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json_logs);

    match execute(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            output::print_error(&err.to_string());
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: bool, json: bool) {
    let filter = if verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| filter.into());

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .without_time()
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

/// Returns whether the run is judged a success.
fn execute(cli: Cli) -> CliResult<bool> {
    match cli.command {
        Commands::Networks => {
            output::print_networks(cli.output)?;
            Ok(true)
        }
        Commands::Run {
            root,
            exclude,
            network,
        } => run_suite(cli.source, cli.output, |config| {
            let selection =
                Selection::root(root).exclude(config.excluded.iter().cloned().chain(exclude));
            if network.is_empty() {
                selection
            } else {
                selection.networks(&network)
            }
        }),
        Commands::Single { file, network } => run_suite(cli.source, cli.output, |_| match network {
            Some(network) => Selection::file(file).network(network),
            None => Selection::file(file).networks(NetworkVariant::all()),
        }),
    }
}

fn run_suite(
    source: SourceArgs,
    format: output::OutputFormat,
    select: impl FnOnce(&CliConfig) -> Selection,
) -> CliResult<bool> {
    let config = CliConfig::load(source.config.as_deref())?;

    let fixtures_dir = source
        .fixtures
        .or_else(|| config.fixtures_dir.clone())
        .ok_or_else(|| {
            CliError::Config("no fixtures directory; pass --fixtures or set fixtures_dir".into())
        })?;
    let tree_id = source
        .tree
        .or_else(|| config.tree_id.clone())
        .unwrap_or_default();
    let commit_id = source
        .commit
        .or_else(|| config.commit_id.clone())
        .unwrap_or_else(|| tree_id.clone());

    let executor = match (source.validator, &config.validator) {
        (Some(program), _) => CommandExecutor::new(program).with_args(source.validator_args),
        (None, Some(v)) => CommandExecutor::new(v.program.clone()).with_args(v.args.iter().cloned()),
        (None, None) => {
            return Err(CliError::Config(
                "no validator; pass --validator or set [validator] in the config file".into(),
            ))
        }
    };

    let store = LocalFixtureStore::with_root(fixtures_dir, config.fixture_root());
    let parser = JsonSuiteParser::new();
    let mut suite = BlockchainSuite::open(
        SuiteCollaborators {
            index: &store,
            fetcher: &store,
            parser: &parser,
            executor: &executor,
            store: &GlobalConfig,
        },
        &tree_id,
        &commit_id,
    )?;
    if !config.networks.is_empty() {
        suite = suite.with_networks(&config.networks);
    }

    match suite.run(&select(&config)) {
        Ok(outcome) => {
            output::print_outcome(&outcome, format)?;
            Ok(outcome.is_success())
        }
        Err(SuiteError::RestoreFailed {
            test,
            source,
            partial,
        }) => {
            // Show what was recorded before the fault.
            output::print_outcome(&SuiteOutcome::Completed((*partial).clone()), format)?;
            Err(SuiteError::RestoreFailed {
                test,
                source,
                partial,
            }
            .into())
        }
        Err(err) => Err(err.into()),
    }
}
