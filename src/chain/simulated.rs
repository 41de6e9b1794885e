//! In-memory chain that models the registry contracts the deployer drives.
//!
//! Only the entry points the orchestration uses are understood; anything
//! else is rejected the way a node rejects a call to a missing selector.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use sha3::{Digest, Keccak256};

use crate::acl::AclEntry;
use crate::traits::{ChainClient, ContractCall};
use crate::types::{Address, ArgValue, Hash32};

const DAO_FACTORY: &str = "DaoFactory";

/// Registry state of one DAO clone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DaoState {
    pub name: String,
    pub creator: Address,
    /// Adapter id -> (address, DAO-level flags).
    pub adapters: BTreeMap<Hash32, (Address, u64)>,
    /// Extension id -> address.
    pub extensions: BTreeMap<Hash32, Address>,
    /// (extension, grantee) -> extension flags.
    pub extension_acl: BTreeMap<(Address, Address), u64>,
    pub finalized: bool,
}

impl DaoState {
    pub fn adapter(&self, id: &Hash32) -> Option<(Address, u64)> {
        self.adapters.get(id).copied()
    }

    pub fn extension_flags(&self, extension: Address, grantee: Address) -> Option<u64> {
        self.extension_acl.get(&(extension, grantee)).copied()
    }
}

#[derive(Debug, Clone)]
struct Instance {
    contract: String,
    args: Vec<ArgValue>,
}

#[derive(Debug, Default)]
struct Ledger {
    nonce: u64,
    instances: HashMap<Address, Instance>,
    daos: HashMap<Address, DaoState>,
    dao_by_name: HashMap<String, Address>,
    /// (factory, dao) -> extension created by the factory for that DAO.
    created: HashMap<(Address, Address), Address>,
    configurations: HashMap<Address, Vec<Vec<ArgValue>>>,
}

impl Ledger {
    fn next_address(&mut self, sender: Address) -> Address {
        let mut hasher = Keccak256::new();
        hasher.update(sender.0);
        hasher.update(self.nonce.to_be_bytes());
        self.nonce += 1;
        let digest = hasher.finalize();
        let mut out = [0u8; 20];
        out.copy_from_slice(&digest[12..]);
        Address(out)
    }

    fn instance(&self, addr: Address) -> Result<&Instance> {
        self.instances
            .get(&addr)
            .ok_or_else(|| anyhow!("no contract deployed at {}", addr))
    }

    fn dao_mut(&mut self, addr: Address) -> Result<&mut DaoState> {
        self.daos
            .get_mut(&addr)
            .ok_or_else(|| anyhow!("{} is not a DAO", addr))
    }

    fn clone_of(&mut self, identity: Address, sender: Address) -> Result<Address> {
        let template = self.instance(identity)?.contract.clone();
        let addr = self.next_address(sender);
        self.instances.insert(
            addr,
            Instance {
                contract: template,
                args: Vec::new(),
            },
        );
        Ok(addr)
    }
}

/// Deterministic in-memory chain.
pub struct SimulatedChain {
    chain_id: u64,
    ledger: Mutex<Ledger>,
}

impl SimulatedChain {
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            ledger: Mutex::new(Ledger::default()),
        }
    }

    fn ledger(&self) -> Result<MutexGuard<'_, Ledger>> {
        self.ledger
            .lock()
            .map_err(|_| anyhow!("simulated chain state poisoned"))
    }

    /// Registry state of a DAO clone.
    pub fn dao_state(&self, dao: Address) -> Option<DaoState> {
        self.ledger().ok()?.daos.get(&dao).cloned()
    }

    /// Artifact name of the instance at `addr`.
    pub fn contract_at(&self, addr: Address) -> Option<String> {
        Some(self.ledger().ok()?.instances.get(&addr)?.contract.clone())
    }

    /// Constructor arguments of the instance at `addr`.
    pub fn constructor_args(&self, addr: Address) -> Option<Vec<ArgValue>> {
        Some(self.ledger().ok()?.instances.get(&addr)?.args.clone())
    }

    /// Every `configureDao` argument list received by `adapter`, in order.
    pub fn configurations(&self, adapter: Address) -> Vec<Vec<ArgValue>> {
        self.ledger()
            .ok()
            .and_then(|l| l.configurations.get(&adapter).cloned())
            .unwrap_or_default()
    }

    /// Number of contract instances (deployments and clones).
    pub fn instance_count(&self) -> usize {
        self.ledger().map(|l| l.instances.len()).unwrap_or(0)
    }
}

impl Default for SimulatedChain {
    fn default() -> Self {
        Self::new(1337)
    }
}

fn arg_address(args: &[ArgValue], index: usize, method: &str) -> Result<Address> {
    args.get(index)
        .and_then(ArgValue::as_address)
        .ok_or_else(|| anyhow!("{}: argument {} must be an address", method, index))
}

fn arg_entries<'a>(args: &'a [ArgValue], index: usize, method: &str) -> Result<&'a [AclEntry]> {
    match args.get(index) {
        Some(ArgValue::Entries(entries)) => Ok(entries),
        _ => bail!("{}: argument {} must be an entry list", method, index),
    }
}

fn arg_bytes32(args: &[ArgValue], index: usize, method: &str) -> Result<Hash32> {
    match args.get(index) {
        Some(ArgValue::Bytes32(id)) => Ok(*id),
        _ => bail!("{}: argument {} must be bytes32", method, index),
    }
}

#[async_trait]
impl ChainClient for SimulatedChain {
    fn name(&self) -> &'static str {
        "simulated"
    }

    async fn chain_id(&self) -> Result<u64> {
        Ok(self.chain_id)
    }

    async fn deploy(&self, contract: &str, args: &[ArgValue], sender: Address) -> Result<Address> {
        let mut ledger = self.ledger()?;
        let addr = ledger.next_address(sender);
        ledger.instances.insert(
            addr,
            Instance {
                contract: contract.to_string(),
                args: args.to_vec(),
            },
        );
        Ok(addr)
    }

    async fn send(&self, call: &ContractCall, sender: Address) -> Result<()> {
        let mut ledger = self.ledger()?;
        let instance = ledger.instance(call.target)?.clone();
        let args = call.args.as_slice();
        let method = call.method.as_str();

        match (instance.contract.as_str(), method) {
            (DAO_FACTORY, "createDao") => {
                let name = args
                    .first()
                    .and_then(ArgValue::as_text)
                    .ok_or_else(|| anyhow!("createDao: argument 0 must be a name"))?
                    .to_string();
                let creator = arg_address(args, 1, method)?;
                if ledger.dao_by_name.contains_key(&name) {
                    bail!("revert: name already taken");
                }
                let identity = arg_address(&instance.args, 0, "DaoFactory constructor")?;
                let dao = ledger.clone_of(identity, sender)?;
                ledger.daos.insert(
                    dao,
                    DaoState {
                        name: name.clone(),
                        creator,
                        ..DaoState::default()
                    },
                );
                ledger.dao_by_name.insert(name, dao);
            }
            (DAO_FACTORY, "addAdapters") | (DAO_FACTORY, "updateAdapter") => {
                let dao = ledger.dao_mut(arg_address(args, 0, method)?)?;
                if dao.finalized && method == "addAdapters" {
                    bail!("revert: dao already finalized");
                }
                for entry in arg_entries(args, 1, method)? {
                    dao.adapters.insert(entry.id, (entry.addr, entry.flags));
                }
            }
            (DAO_FACTORY, "configureExtension") => {
                let extension = arg_address(args, 1, method)?;
                let dao = ledger.dao_mut(arg_address(args, 0, method)?)?;
                if !dao.extensions.values().any(|a| *a == extension) {
                    bail!("revert: {} is not an extension of the DAO", extension);
                }
                for entry in arg_entries(args, 2, method)? {
                    dao.extension_acl
                        .insert((extension, entry.addr), entry.flags);
                }
            }
            (_, "addExtension") => {
                let id = arg_bytes32(args, 0, method)?;
                let extension = arg_address(args, 1, method)?;
                let dao = ledger.dao_mut(call.target)?;
                if dao.finalized {
                    bail!("revert: dao already finalized");
                }
                if dao.extensions.contains_key(&id) {
                    bail!("revert: extension id already in use");
                }
                dao.extensions.insert(id, extension);
            }
            (_, "finalizeDao") => {
                ledger.dao_mut(call.target)?.finalized = true;
            }
            (_, "create") => {
                let dao = arg_address(args, 0, method)?;
                if !ledger.daos.contains_key(&dao) {
                    bail!("revert: {} is not a DAO", dao);
                }
                let identity = arg_address(&instance.args, 0, "factory constructor")?;
                let extension = ledger.clone_of(identity, sender)?;
                ledger.created.insert((call.target, dao), extension);
            }
            (_, "configureDao") => {
                let dao = arg_address(args, 0, method)?;
                if !ledger.daos.contains_key(&dao) {
                    bail!("revert: {} is not a DAO", dao);
                }
                ledger
                    .configurations
                    .entry(call.target)
                    .or_default()
                    .push(args.to_vec());
            }
            (contract, _) => bail!("{} has no method `{}`", contract, method),
        }
        Ok(())
    }

    async fn query(&self, call: &ContractCall) -> Result<ArgValue> {
        let ledger = self.ledger()?;
        let instance = ledger.instance(call.target)?;
        let args = call.args.as_slice();
        let method = call.method.as_str();

        let addr = match (instance.contract.as_str(), method) {
            (DAO_FACTORY, "getDaoAddress") => {
                let name = args
                    .first()
                    .and_then(ArgValue::as_text)
                    .ok_or_else(|| anyhow!("getDaoAddress: argument 0 must be a name"))?;
                ledger.dao_by_name.get(name).copied().unwrap_or(Address::ZERO)
            }
            (_, "getAdapterAddress") => {
                let id = arg_bytes32(args, 0, method)?;
                let dao = ledger
                    .daos
                    .get(&call.target)
                    .ok_or_else(|| anyhow!("{} is not a DAO", call.target))?;
                dao.adapter(&id)
                    .map(|(addr, _)| addr)
                    .ok_or_else(|| anyhow!("revert: adapter not found"))?
            }
            (_, "getExtensionAddress") => match ledger.daos.get(&call.target) {
                Some(dao) => {
                    let id = arg_bytes32(args, 0, method)?;
                    dao.extensions
                        .get(&id)
                        .copied()
                        .ok_or_else(|| anyhow!("revert: extension not found"))?
                }
                None => {
                    let dao = arg_address(args, 0, method)?;
                    ledger
                        .created
                        .get(&(call.target, dao))
                        .copied()
                        .unwrap_or(Address::ZERO)
                }
            },
            (contract, _) => bail!("{} has no view `{}`", contract, method),
        };
        Ok(ArgValue::Address(addr))
    }
}
