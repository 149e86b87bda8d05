//! Network variants and the protocol configuration each one requires.
//!
//! A fixture names the ruleset it was generated under in its `network`
//! field. [`NetworkVariant`] is that selector; [`ProtocolConfig`] is the
//! fork schedule the validator must run with while replaying such a case.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A protocol ruleset, in activation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Fork {
    Frontier,
    Homestead,
    DaoFork,
    Eip150,
    Eip158,
    Byzantium,
    Constantinople,
    Petersburg,
}

/// A ruleset switching on at a block number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForkActivation {
    /// First block governed by `fork`.
    pub block: u64,
    /// The ruleset that becomes active.
    pub fork: Fork,
}

impl ForkActivation {
    const fn at(block: u64, fork: Fork) -> Self {
        Self { block, fork }
    }
}

/// A named fork schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Human-readable schedule name.
    pub name: String,
    /// Activations sorted by block number.
    pub forks: Vec<ForkActivation>,
}

impl ProtocolConfig {
    /// Build a schedule from activations, sorting them by block.
    pub fn new(name: &str, mut forks: Vec<ForkActivation>) -> Self {
        forks.sort_by_key(|a| (a.block, a.fork));
        Self {
            name: name.to_string(),
            forks,
        }
    }

    /// The default configuration, restored after every case.
    pub fn mainnet() -> Self {
        Self::new(
            "Mainnet",
            vec![
                ForkActivation::at(0, Fork::Frontier),
                ForkActivation::at(1_150_000, Fork::Homestead),
                ForkActivation::at(1_920_000, Fork::DaoFork),
                ForkActivation::at(2_463_000, Fork::Eip150),
                ForkActivation::at(2_675_000, Fork::Eip158),
                ForkActivation::at(4_370_000, Fork::Byzantium),
                ForkActivation::at(7_280_000, Fork::Constantinople),
                ForkActivation::at(7_280_000, Fork::Petersburg),
            ],
        )
    }

    /// A schedule running `fork` from genesis.
    pub fn single(name: &str, fork: Fork) -> Self {
        Self::new(name, vec![ForkActivation::at(0, fork)])
    }

    /// A schedule switching from `from` to `to` at block `at`.
    pub fn transition(name: &str, from: Fork, to: Fork, at: u64) -> Self {
        Self::new(
            name,
            vec![ForkActivation::at(0, from), ForkActivation::at(at, to)],
        )
    }

    /// The ruleset governing `block`, or `None` before the first activation.
    pub fn fork_at(&self, block: u64) -> Option<Fork> {
        self.forks
            .iter()
            .take_while(|a| a.block <= block)
            .map(|a| a.fork)
            .last()
    }

    /// Whether this is the default schedule.
    pub fn is_mainnet(&self) -> bool {
        *self == Self::mainnet()
    }
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self::mainnet()
    }
}

impl fmt::Display for ProtocolConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// The network selector carried by each fixture case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NetworkVariant {
    Frontier,
    Homestead,
    #[serde(rename = "EIP150")]
    Eip150,
    #[serde(rename = "EIP158")]
    Eip158,
    Byzantium,
    Constantinople,
    ConstantinopleFix,
    FrontierToHomesteadAt5,
    HomesteadToDaoAt5,
    #[serde(rename = "HomesteadToEIP150At5")]
    HomesteadToEip150At5,
    #[serde(rename = "EIP158ToByzantiumAt5")]
    Eip158ToByzantiumAt5,
    ByzantiumToConstantinopleFixAt5,
}

impl NetworkVariant {
    /// Every variant, in declaration order.
    pub fn all() -> &'static [NetworkVariant] {
        &[
            Self::Frontier,
            Self::Homestead,
            Self::Eip150,
            Self::Eip158,
            Self::Byzantium,
            Self::Constantinople,
            Self::ConstantinopleFix,
            Self::FrontierToHomesteadAt5,
            Self::HomesteadToDaoAt5,
            Self::HomesteadToEip150At5,
            Self::Eip158ToByzantiumAt5,
            Self::ByzantiumToConstantinopleFixAt5,
        ]
    }

    /// The spelling used in fixture files.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Frontier => "Frontier",
            Self::Homestead => "Homestead",
            Self::Eip150 => "EIP150",
            Self::Eip158 => "EIP158",
            Self::Byzantium => "Byzantium",
            Self::Constantinople => "Constantinople",
            Self::ConstantinopleFix => "ConstantinopleFix",
            Self::FrontierToHomesteadAt5 => "FrontierToHomesteadAt5",
            Self::HomesteadToDaoAt5 => "HomesteadToDaoAt5",
            Self::HomesteadToEip150At5 => "HomesteadToEIP150At5",
            Self::Eip158ToByzantiumAt5 => "EIP158ToByzantiumAt5",
            Self::ByzantiumToConstantinopleFixAt5 => "ByzantiumToConstantinopleFixAt5",
        }
    }

    /// The configuration a case on this network must run under.
    pub fn config(&self) -> ProtocolConfig {
        let name = self.name();
        match self {
            Self::Frontier => ProtocolConfig::single(name, Fork::Frontier),
            Self::Homestead => ProtocolConfig::single(name, Fork::Homestead),
            Self::Eip150 => ProtocolConfig::single(name, Fork::Eip150),
            Self::Eip158 => ProtocolConfig::single(name, Fork::Eip158),
            Self::Byzantium => ProtocolConfig::single(name, Fork::Byzantium),
            Self::Constantinople => ProtocolConfig::single(name, Fork::Constantinople),
            Self::ConstantinopleFix => ProtocolConfig::single(name, Fork::Petersburg),
            Self::FrontierToHomesteadAt5 => {
                ProtocolConfig::transition(name, Fork::Frontier, Fork::Homestead, 5)
            }
            Self::HomesteadToDaoAt5 => {
                ProtocolConfig::transition(name, Fork::Homestead, Fork::DaoFork, 5)
            }
            Self::HomesteadToEip150At5 => {
                ProtocolConfig::transition(name, Fork::Homestead, Fork::Eip150, 5)
            }
            Self::Eip158ToByzantiumAt5 => {
                ProtocolConfig::transition(name, Fork::Eip158, Fork::Byzantium, 5)
            }
            Self::ByzantiumToConstantinopleFixAt5 => {
                ProtocolConfig::transition(name, Fork::Byzantium, Fork::Petersburg, 5)
            }
        }
    }
}

impl fmt::Display for NetworkVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Error returned when a network name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown network: {0}")]
pub struct UnknownNetwork(pub String);

impl FromStr for NetworkVariant {
    type Err = UnknownNetwork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|v| v.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownNetwork(s.to_string()))
    }
}
