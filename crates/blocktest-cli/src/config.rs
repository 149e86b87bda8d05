//! CLI configuration

use crate::error::{CliError, CliResult};
use blocktest_suite::fixtures::DEFAULT_FIXTURE_ROOT;
use blocktest_suite::NetworkVariant;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    /// Directory holding fixture checkouts
    pub fixtures_dir: Option<PathBuf>,

    /// Directory inside a checkout that holds the blockchain fixtures
    pub fixture_root: Option<String>,

    /// Revision whose file listing is used
    pub tree_id: Option<String>,

    /// Revision fixture contents are read from
    pub commit_id: Option<String>,

    /// Validator program
    pub validator: Option<ValidatorConfig>,

    /// Networks to run when none are given on the command line
    #[serde(default)]
    pub networks: Vec<NetworkVariant>,

    /// File identities always left out of `run`
    #[serde(default)]
    pub excluded: Vec<String>,
}

/// External validator invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorConfig {
    pub program: PathBuf,
    #[serde(default)]
    pub args: Vec<String>,
}

impl CliConfig {
    /// Load configuration from file
    pub fn load(path: Option<&str>) -> CliResult<Self> {
        let config_path = match path {
            Some(p) => PathBuf::from(p),
            None => Self::default_config_path()?,
        };

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            let config: CliConfig =
                toml::from_str(&contents).map_err(|e| CliError::Config(e.to_string()))?;
            tracing::debug!(path = %config_path.display(), "loaded configuration");
            Ok(config)
        } else {
            Ok(CliConfig::default())
        }
    }

    /// Fixture root, falling back to the conventional directory name
    pub fn fixture_root(&self) -> &str {
        self.fixture_root.as_deref().unwrap_or(DEFAULT_FIXTURE_ROOT)
    }

    /// Get the default configuration file path
    fn default_config_path() -> CliResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CliError::Config("Cannot find config directory".into()))?;
        Ok(config_dir.join("blocktest").join("config.toml"))
    }
}
