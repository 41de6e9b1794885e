use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use super::simulated::SimulatedChain;
use crate::traits::{ChainClient, ContractCall};
use crate::types::{Address, ArgValue};

/// One interaction observed by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    Deploy { contract: String, args: Vec<ArgValue> },
    Send(ContractCall),
    Query(ContractCall),
    ChainId,
}

impl RecordedCall {
    /// `contract.method` for calls, `deploy:contract` for deployments.
    pub fn label(&self) -> String {
        match self {
            RecordedCall::Deploy { contract, .. } => format!("deploy:{}", contract),
            RecordedCall::Send(call) | RecordedCall::Query(call) => {
                format!("{}.{}", call.contract, call.method)
            }
            RecordedCall::ChainId => "chainId".to_string(),
        }
    }
}

/// Mock chain for testing.
/// Records every interaction, forwards to a simulated chain, and can be told
/// to reject specific deployments or calls.
#[derive(Clone)]
pub struct MockChain {
    pub inner: Arc<SimulatedChain>,
    pub calls: Arc<Mutex<Vec<RecordedCall>>>,
    pub failures: Arc<Mutex<Vec<String>>>,
}

impl MockChain {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SimulatedChain::default()),
            calls: Arc::new(Mutex::new(Vec::new())),
            failures: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Reject deployments of `contract`.
    pub fn fail_on_deploy(&self, contract: &str) {
        self.failures
            .lock()
            .unwrap()
            .push(format!("deploy:{}", contract));
    }

    /// Reject `contract.method` sends and queries.
    pub fn fail_on_call(&self, contract: &str, method: &str) {
        self.failures
            .lock()
            .unwrap()
            .push(format!("{}.{}", contract, method));
    }

    /// Get all recorded calls (for testing/verification).
    pub fn get_calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn labels(&self) -> Vec<String> {
        self.get_calls().iter().map(RecordedCall::label).collect()
    }

    /// Clear recorded calls.
    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: RecordedCall) -> Result<()> {
        let label = call.label();
        self.calls.lock().unwrap().push(call);
        if self.failures.lock().unwrap().contains(&label) {
            return Err(anyhow!("revert: injected failure for {}", label));
        }
        Ok(())
    }
}

impl Default for MockChain {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChainClient for MockChain {
    fn name(&self) -> &'static str {
        "mock-chain"
    }

    async fn chain_id(&self) -> Result<u64> {
        self.record(RecordedCall::ChainId)?;
        self.inner.chain_id().await
    }

    async fn deploy(&self, contract: &str, args: &[ArgValue], sender: Address) -> Result<Address> {
        self.record(RecordedCall::Deploy {
            contract: contract.to_string(),
            args: args.to_vec(),
        })?;
        let addr = self.inner.deploy(contract, args, sender).await?;
        tracing::debug!("MockChain: deployed {} at {}", contract, addr);
        Ok(addr)
    }

    async fn send(&self, call: &ContractCall, sender: Address) -> Result<()> {
        self.record(RecordedCall::Send(call.clone()))?;
        self.inner.send(call, sender).await
    }

    async fn query(&self, call: &ContractCall) -> Result<ArgValue> {
        self.record(RecordedCall::Query(call.clone()))?;
        self.inner.query(call).await
    }
}
