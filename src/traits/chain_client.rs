use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

use crate::types::{Address, ArgValue, DeployedContract};

/// A call against a deployed contract instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractCall {
    /// Instance address.
    pub target: Address,
    /// Artifact name of the instance, used to pick the ABI.
    pub contract: String,
    pub method: String,
    pub args: Vec<ArgValue>,
}

impl ContractCall {
    pub fn new(target: &DeployedContract, method: &str, args: Vec<ArgValue>) -> Self {
        Self {
            target: target.address,
            contract: target.name().to_string(),
            method: method.to_string(),
            args,
        }
    }
}

/// Transaction-submission boundary (local node, simulator, test double).
///
/// Every method either resolves or rejects; the deployer never retries and
/// imposes no timeouts of its own.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Client name for logging.
    fn name(&self) -> &'static str;

    /// Chain id reported by the connected node.
    async fn chain_id(&self) -> Result<u64>;

    /// Deploy a new instance of `contract` and return its address.
    async fn deploy(&self, contract: &str, args: &[ArgValue], sender: Address) -> Result<Address>;

    /// Submit a state-changing call and wait for it to be mined.
    async fn send(&self, call: &ContractCall, sender: Address) -> Result<()>;

    /// Read-only call.
    async fn query(&self, call: &ContractCall) -> Result<ArgValue>;
}
