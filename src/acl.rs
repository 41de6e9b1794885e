//! Access-control flag schemas and entry encoding.
//!
//! Flags are bit positions: a flag list encodes to `OR(1 << index)` where
//! `index` is the flag's position in the schema of the contract that
//! enforces it (the DAO registry or a specific extension).

use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

use crate::error::{DeployError, DeployResult};
use crate::types::{Address, Hash32};

pub const DAO_FLAGS: &[&str] = &[
    "REPLACE_ADAPTER",
    "SUBMIT_PROPOSAL",
    "UPDATE_DELEGATE_KEY",
    "SET_CONFIGURATION",
    "ADD_EXTENSION",
    "REMOVE_EXTENSION",
    "NEW_MEMBER",
];

pub const BANK_FLAGS: &[&str] = &[
    "ADD_TO_BALANCE",
    "SUB_FROM_BALANCE",
    "INTERNAL_TRANSFER",
    "WITHDRAW",
    "REGISTER_NEW_TOKEN",
    "REGISTER_NEW_INTERNAL_TOKEN",
    "UPDATE_TOKEN",
];

pub const NFT_FLAGS: &[&str] = &["WITHDRAW_NFT", "COLLECT_NFT", "INTERNAL_TRANSFER"];

pub const ERC1155_FLAGS: &[&str] = &["WITHDRAW_NFT", "COLLECT_NFT", "INTERNAL_TRANSFER"];

pub const ERC1271_FLAGS: &[&str] = &["SIGN"];

pub const EXECUTOR_FLAGS: &[&str] = &["EXECUTE"];

pub const VESTING_FLAGS: &[&str] = &["NEW_VESTING", "REMOVE_VESTING"];

/// Extension ids known to the registry and the flag schema each enforces.
const EXTENSION_SCHEMAS: &[(&str, &[&str])] = &[
    ("bank", BANK_FLAGS),
    ("nft", NFT_FLAGS),
    ("erc1155-ext", ERC1155_FLAGS),
    ("erc1271", ERC1271_FLAGS),
    ("executor-ext", EXECUTOR_FLAGS),
    ("internal-token-vesting-extension", VESTING_FLAGS),
    ("erc20-ext", &[]),
];

/// Flags granted to the off-chain voting adapter on the bank.
pub const OFFCHAIN_VOTING_BANK_FLAGS: &[&str] =
    &["ADD_TO_BALANCE", "SUB_FROM_BALANCE", "INTERNAL_TRANSFER"];

/// One access-control entry: who (`addr`, registered under `id`) gets which
/// flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclEntry {
    pub id: Hash32,
    pub addr: Address,
    pub flags: u64,
}

/// keccak256 of a logical id, as used for registry keys.
pub fn sha3(id: &str) -> Hash32 {
    let mut hasher = Keccak256::new();
    hasher.update(id.as_bytes());
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    Hash32(out)
}

/// Schema of the extension registered under `extension_id`.
pub fn extension_schema(extension_id: &str) -> Option<&'static [&'static str]> {
    EXTENSION_SCHEMAS
        .iter()
        .find(|(id, _)| *id == extension_id)
        .map(|(_, flags)| *flags)
}

fn encode(
    schema: &[&str],
    flags: &[String],
    contract: &str,
    target: &str,
) -> DeployResult<u64> {
    flags.iter().try_fold(0u64, |acc, flag| {
        schema
            .iter()
            .position(|known| known == flag)
            .map(|index| acc | (1u64 << index))
            .ok_or_else(|| DeployError::UnknownAclFlag {
                contract: contract.to_string(),
                target: target.to_string(),
                flag: flag.clone(),
            })
    })
}

/// Encode DAO-level flags declared by `contract`.
pub fn encode_dao_flags(flags: &[String], contract: &str) -> DeployResult<u64> {
    encode(DAO_FLAGS, flags, contract, "dao")
}

/// Encode flags declared by `contract` against the extension `extension_id`,
/// using that extension's own schema.
pub fn encode_extension_flags(
    extension_id: &str,
    flags: &[String],
    contract: &str,
) -> DeployResult<u64> {
    let schema = extension_schema(extension_id).ok_or_else(|| DeployError::UnknownAclFlag {
        contract: contract.to_string(),
        target: extension_id.to_string(),
        flag: flags.first().cloned().unwrap_or_default(),
    })?;
    encode(schema, flags, contract, extension_id)
}

/// Registry entry for an adapter (or pseudo-adapter) with DAO-level flags.
pub fn entry_dao(id: &str, addr: Address, flags: u64) -> AclEntry {
    AclEntry {
        id: sha3(id),
        addr,
        flags,
    }
}
