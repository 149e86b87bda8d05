//! The validator boundary.

use crate::error::ExecutorFault;
use crate::network::{NetworkVariant, ProtocolConfig};
use crate::types::TestCase;
use serde::Serialize;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Replays a test case against the state-transition engine.
pub trait CaseExecutor {
    /// Run `case` under `config` and return its complaints.
    ///
    /// An empty list is a pass. Validation failures are complaints;
    /// `Err` is reserved for unexpected faults.
    fn execute(&self, case: &TestCase, config: &ProtocolConfig) -> Result<Vec<String>, ExecutorFault>;
}

impl<F> CaseExecutor for F
where
    F: Fn(&TestCase, &ProtocolConfig) -> Result<Vec<String>, ExecutorFault>,
{
    fn execute(&self, case: &TestCase, config: &ProtocolConfig) -> Result<Vec<String>, ExecutorFault> {
        self(case, config)
    }
}

/// Environment variable naming the case network for external validators.
pub const NETWORK_ENV: &str = "BLOCKTEST_NETWORK";

#[derive(Serialize)]
struct CasePayload<'a> {
    name: &'a str,
    network: NetworkVariant,
    config: &'a ProtocolConfig,
    data: &'a serde_json::Value,
}

/// Runs an external validator program once per case.
///
/// The program receives the case as JSON on stdin and reports one
/// complaint per non-blank stdout line. A non-zero exit status is a
/// fault, not a failed case.
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandExecutor {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Arguments passed to the validator program.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

impl CaseExecutor for CommandExecutor {
    fn execute(&self, case: &TestCase, config: &ProtocolConfig) -> Result<Vec<String>, ExecutorFault> {
        let payload = serde_json::to_vec(&CasePayload {
            name: &case.name,
            network: case.network,
            config,
            data: &case.data,
        })?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .env(NETWORK_ENV, case.network.name())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ExecutorFault(format!("cannot spawn {}: {}", self.program.display(), e)))?;

        // Stdin is fed from its own thread while stdout is drained below.
        let writer = child.stdin.take().map(|mut stdin| {
            std::thread::spawn(move || match stdin.write_all(&payload) {
                Err(e) if e.kind() != ErrorKind::BrokenPipe => Err(e),
                _ => Ok(()),
            })
        });

        let output = child.wait_with_output()?;
        if let Some(handle) = writer {
            match handle.join() {
                Ok(result) => result?,
                Err(_) => return Err(ExecutorFault("stdin writer panicked".into())),
            }
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExecutorFault(format!(
                "validator exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }
}
