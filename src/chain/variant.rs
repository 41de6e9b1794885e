use anyhow::Result;
use async_trait::async_trait;

use super::mock::MockChain;
use super::simulated::SimulatedChain;
use crate::config::ChainType;
use crate::traits::{ChainClient, ContractCall};
use crate::types::{Address, ArgValue};

/// Enum representing all possible chain client implementations.
pub enum ChainVariant {
    Simulated(SimulatedChain),
    Mock(MockChain),
}

impl ChainVariant {
    /// Create a new chain client based on the specified type.
    pub fn new(chain_type: ChainType, chain_id: u64) -> Self {
        match chain_type {
            ChainType::Simulated => ChainVariant::Simulated(SimulatedChain::new(chain_id)),
            ChainType::Mock => ChainVariant::Mock(MockChain::new()),
        }
    }
}

#[async_trait]
impl ChainClient for ChainVariant {
    fn name(&self) -> &'static str {
        match self {
            ChainVariant::Simulated(inner) => inner.name(),
            ChainVariant::Mock(inner) => inner.name(),
        }
    }

    async fn chain_id(&self) -> Result<u64> {
        match self {
            ChainVariant::Simulated(inner) => inner.chain_id().await,
            ChainVariant::Mock(inner) => inner.chain_id().await,
        }
    }

    async fn deploy(&self, contract: &str, args: &[ArgValue], sender: Address) -> Result<Address> {
        match self {
            ChainVariant::Simulated(inner) => inner.deploy(contract, args, sender).await,
            ChainVariant::Mock(inner) => inner.deploy(contract, args, sender).await,
        }
    }

    async fn send(&self, call: &ContractCall, sender: Address) -> Result<()> {
        match self {
            ChainVariant::Simulated(inner) => inner.send(call, sender).await,
            ChainVariant::Mock(inner) => inner.send(call, sender).await,
        }
    }

    async fn query(&self, call: &ContractCall) -> Result<ArgValue> {
        match self {
            ChainVariant::Simulated(inner) => inner.query(call).await,
            ChainVariant::Mock(inner) => inner.query(call).await,
        }
    }
}
