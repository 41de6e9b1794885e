use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::contracts::ContractTable;
use crate::types::{Address, ArgValue};

/// Chain backend the CLI deploys against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ChainType {
    /// In-memory simulated chain (dry run).
    Simulated,
    /// Recording mock, mostly useful in tests.
    Mock,
}

/// Command-line configuration.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "daosmith", about = "Deploy and wire a DAO contract suite")]
pub struct BaseConfig {
    /// JSON contract table. The built-in table is used when omitted.
    #[arg(long)]
    pub contracts_path: Option<String>,

    /// JSON deploy options (owner, arguments, feature flags).
    #[arg(long)]
    pub options_path: Option<String>,

    /// Network name, overrides the options file.
    #[arg(long)]
    pub network: Option<String>,

    /// DAO name, overrides the options file.
    #[arg(long)]
    pub dao_name: Option<String>,

    /// Owner / deployer address, overrides the options file.
    #[arg(long)]
    pub owner: Option<String>,

    #[arg(long, value_enum, default_value_t = ChainType::Simulated)]
    pub chain: ChainType,

    /// Deploy the test-only contracts.
    #[arg(long)]
    pub deploy_test_contracts: bool,

    /// Install the off-chain voting adapter.
    #[arg(long)]
    pub offchain_voting: bool,

    /// Finalize the DAO once everything is wired.
    #[arg(long)]
    pub finalize: bool,

    /// Write the deployment result here instead of stdout.
    #[arg(long)]
    pub output: Option<String>,
}

impl Default for BaseConfig {
    fn default() -> Self {
        BaseConfig {
            contracts_path: None,
            options_path: None,
            network: None,
            dao_name: None,
            owner: None,
            chain: ChainType::Simulated,
            deploy_test_contracts: false,
            offchain_voting: false,
            finalize: false,
            output: None,
        }
    }
}

impl BaseConfig {
    /// Contract table from `contracts_path`, or the built-in one.
    pub fn contract_table(&self) -> Result<ContractTable> {
        match &self.contracts_path {
            Some(path) => ContractTable::load(path),
            None => Ok(ContractTable::builtin()),
        }
    }

    /// Deploy options from `options_path` (or defaults) with CLI overrides.
    pub fn deploy_options(&self) -> Result<DeployOptions> {
        let mut options = match &self.options_path {
            Some(path) => DeployOptions::load(path)?,
            None => DeployOptions::default(),
        };
        if let Some(network) = &self.network {
            options.network = network.clone();
        }
        if let Some(dao_name) = &self.dao_name {
            options.dao_name = dao_name.clone();
        }
        if let Some(owner) = &self.owner {
            options.owner = owner.parse().context("Invalid --owner")?;
        }
        options.deploy_test_contracts |= self.deploy_test_contracts;
        options.offchain_voting |= self.offchain_voting;
        options.finalize |= self.finalize;
        Ok(options)
    }
}

/// Raw inputs of a deployment run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployOptions {
    /// Sender of every transaction and creator of the DAO.
    pub owner: Address,
    pub dao_name: String,
    pub network: String,
    /// Named constructor / configuration arguments.
    #[serde(default)]
    pub args: BTreeMap<String, ArgValue>,
    /// Artifacts available for deployment. Every table entry plus the
    /// off-chain voting helpers when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifacts: Option<BTreeSet<String>>,
    #[serde(default)]
    pub deploy_test_contracts: bool,
    #[serde(default)]
    pub offchain_voting: bool,
    #[serde(default)]
    pub finalize: bool,
}

/// Internal units token of the bank.
pub const UNITS: &str = "0x00000000000000000000000000000000000ff1ce";
/// Native-token placeholder.
pub const ETH_TOKEN: &str = "0x0000000000000000000000000000000000000000";

const DEFAULT_OWNER: &str = "0x5b38da6a701c568545dcfcb03fcb875f56beddc4";

impl Default for DeployOptions {
    fn default() -> Self {
        let addr = |s: &str| ArgValue::Address(s.parse().unwrap_or_default());
        let args: BTreeMap<String, ArgValue> = [
            ("maxExternalTokens", ArgValue::Uint(100)),
            ("erc20TokenName", ArgValue::from("DAO Units")),
            ("erc20TokenSymbol", ArgValue::from("UNIT")),
            ("erc20TokenDecimals", ArgValue::Uint(0)),
            ("unitTokenToMint", addr(UNITS)),
            ("unitPrice", ArgValue::Uint(100_000_000_000_000_000)),
            ("nbUnits", ArgValue::Uint(100_000)),
            ("maxChunks", ArgValue::Uint(100_000)),
            ("tokenAddr", addr(ETH_TOKEN)),
            ("votingPeriod", ArgValue::Uint(600)),
            ("gracePeriod", ArgValue::Uint(600)),
            ("couponCreatorAddress", addr(DEFAULT_OWNER)),
            ("maxAmount", ArgValue::Uint(1_000_000)),
            ("maxNFTs", ArgValue::Uint(100)),
            ("erc20TokenSupply", ArgValue::Uint(1_000_000_000)),
            ("testTokenSupply", ArgValue::Uint(1_000_000)),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        DeployOptions {
            owner: DEFAULT_OWNER.parse().unwrap_or_default(),
            dao_name: "test-dao".to_string(),
            network: "ganache".to_string(),
            args,
            artifacts: None,
            deploy_test_contracts: false,
            offchain_voting: false,
            finalize: false,
        }
    }
}

impl DeployOptions {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read deploy options {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse deploy options {}", path.display()))
    }

    /// Set (or replace) a named argument.
    pub fn with_arg(mut self, name: &str, value: ArgValue) -> Self {
        self.args.insert(name.to_string(), value);
        self
    }

    pub fn without_arg(mut self, name: &str) -> Self {
        self.args.remove(name);
        self
    }
}
