//! DaoDeployer struct and the immutable per-phase context - no chain calls.

use std::collections::BTreeSet;
use std::sync::Arc;

use super::offchain::HELPER_ARTIFACTS;
use crate::chain::ChainVariant;
use crate::config::DeployOptions;
use crate::contracts::ContractTable;
use crate::error::{DeployError, DeployResult};
use crate::traits::ChainClient;
use crate::types::{Address, ArgValue, ContractSet, DeployedContract};

/// Name under which the DAO clone address is resolvable.
pub const DAO_ADDRESS_ARG: &str = "daoAddress";

/// Everything a phase may read. Phases never mutate it; the orchestrator
/// derives the next context from the previous one plus the phase output.
#[derive(Debug, Clone)]
pub struct DeployContext {
    pub table: Arc<ContractTable>,
    pub options: DeployOptions,
    artifacts: BTreeSet<String>,
    dao: Option<DeployedContract>,
    dao_factory: Option<DeployedContract>,
    deployed: ContractSet,
}

impl DeployContext {
    pub fn new(table: Arc<ContractTable>, options: DeployOptions) -> Self {
        let artifacts = options.artifacts.clone().unwrap_or_else(|| {
            let mut names = table.artifact_names();
            names.extend(HELPER_ARTIFACTS.iter().map(|name| name.to_string()));
            names
        });
        Self {
            table,
            options,
            artifacts,
            dao: None,
            dao_factory: None,
            deployed: ContractSet::new(),
        }
    }

    /// Context with the DAO clone and its factory known.
    pub fn with_dao(&self, dao: DeployedContract, dao_factory: DeployedContract) -> Self {
        Self {
            dao: Some(dao),
            dao_factory: Some(dao_factory),
            ..self.clone()
        }
    }

    /// Context extended with a phase's deployed contracts.
    pub fn with_contracts(&self, contracts: &ContractSet) -> DeployResult<Self> {
        let mut next = self.clone();
        for contract in contracts.iter() {
            next.deployed.insert(contract.clone())?;
        }
        Ok(next)
    }

    pub fn owner(&self) -> Address {
        self.options.owner
    }

    pub fn dao(&self) -> DeployResult<&DeployedContract> {
        self.dao
            .as_ref()
            .ok_or_else(|| DeployError::MissingDeployment("dao".to_string()))
    }

    pub fn dao_factory(&self) -> DeployResult<&DeployedContract> {
        self.dao_factory
            .as_ref()
            .ok_or_else(|| DeployError::MissingDeployment("daoFactory".to_string()))
    }

    pub fn has_artifact(&self, name: &str) -> bool {
        self.artifacts.contains(name)
    }

    /// Handles deployed by earlier phases.
    pub fn deployed(&self) -> &ContractSet {
        &self.deployed
    }

    /// Resolve a named value: DAO address, owner, raw argument, then the
    /// address of an already-deployed contract with that alias.
    pub fn resolve(&self, name: &str) -> Option<ArgValue> {
        if name == DAO_ADDRESS_ARG {
            return self.dao.as_ref().map(|dao| ArgValue::Address(dao.address));
        }
        if name == "owner" || name == "creator" {
            return Some(ArgValue::Address(self.options.owner));
        }
        if let Some(value) = self.options.args.get(name) {
            return Some(value.clone());
        }
        self.deployed
            .get(name)
            .map(|contract| ArgValue::Address(contract.address))
    }
}

/// Deployment orchestrator.
pub struct DaoDeployer<C: ChainClient = ChainVariant> {
    /// Transaction-submission backend.
    pub chain: C,

    /// Descriptor table, shared with every context.
    pub table: Arc<ContractTable>,

    /// Raw run inputs.
    pub options: DeployOptions,
}

impl<C: ChainClient> DaoDeployer<C> {
    pub fn new(chain: C, table: ContractTable, options: DeployOptions) -> Self {
        Self {
            chain,
            table: Arc::new(table),
            options,
        }
    }

    /// Fresh context for a run.
    pub fn context(&self) -> DeployContext {
        DeployContext::new(Arc::clone(&self.table), self.options.clone())
    }
}
