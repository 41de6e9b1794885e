use tracing::{error, info};

use super::contract::{deploy_raw, query_address, require_artifact, send};
use super::core::DeployContext;
use crate::acl::{
    encode_extension_flags, entry_dao, sha3, AclEntry, OFFCHAIN_VOTING_BANK_FLAGS,
};
use crate::error::{DeployError, DeployResult};
use crate::network;
use crate::traits::ChainClient;
use crate::types::{
    ArgValue, ContractDescriptor, ContractSet, ContractType, DeployedContract, VotingHelpers,
};

/// Registry id the voting adapter is registered under.
pub const VOTING_ID: &str = "voting";
pub const BANK_ID: &str = "bank";

/// Fourth `configureDao` argument of the off-chain voting adapter. Opaque to
/// this layer; passed exactly as the adapter expects it.
pub const OFFCHAIN_CONFIG_CONSTANT: u64 = 10;

const SNAPSHOT_PROPOSAL: &str = "SnapshotProposalContract";
const OFFCHAIN_VOTING_HASH: &str = "OffchainVotingHashContract";
const KICK_BAD_REPORTER: &str = "KickBadReporterAdapter";
const OFFCHAIN_VOTING: &str = "OffchainVotingContract";

/// Artifacts the installer deploys that no table entry names.
pub const HELPER_ARTIFACTS: &[&str] = &[
    SNAPSHOT_PROPOSAL,
    OFFCHAIN_VOTING_HASH,
    KICK_BAD_REPORTER,
    OFFCHAIN_VOTING,
];

/// Chain id for the configured network, falling back to the node's own.
pub async fn resolve_chain_id<C: ChainClient + ?Sized>(
    chain: &C,
    network_name: &str,
) -> DeployResult<u64> {
    if let Some(network) = network::lookup(network_name) {
        return Ok(network.chain_id);
    }
    chain.chain_id().await.map_err(|e| {
        error!("chainId failed for unknown network '{}': {}", network_name, e);
        DeployError::chain(chain.name(), "chainId", e)
    })
}

fn required(ctx: &DeployContext, name: &str) -> DeployResult<ArgValue> {
    ctx.resolve(name).ok_or_else(|| {
        error!(contract = OFFCHAIN_VOTING, "Missing argument `{}`", name);
        DeployError::MissingArgument {
            contract: OFFCHAIN_VOTING.to_string(),
            argument: name.to_string(),
        }
    })
}

async fn deploy_helper<C: ChainClient + ?Sized>(
    chain: &C,
    ctx: &DeployContext,
    descriptor: ContractDescriptor,
    args: Vec<ArgValue>,
) -> DeployResult<DeployedContract> {
    let address = deploy_raw(chain, ctx, &descriptor.name, &args).await?;
    Ok(DeployedContract::at(descriptor, address))
}

/// Replace the DAO's voting adapter with the off-chain one.
///
/// Returns all-`None` helpers, without touching the chain, unless
/// `offchain_voting` is set.
pub async fn install_offchain_voting<C: ChainClient + ?Sized>(
    chain: &C,
    ctx: &DeployContext,
    extensions: &ContractSet,
) -> DeployResult<VotingHelpers> {
    if !ctx.options.offchain_voting {
        return Ok(VotingHelpers::default());
    }

    let dao = ctx.dao()?;
    let dao_factory = ctx.dao_factory()?;
    let bank = extensions
        .find_by_id(BANK_ID)
        .ok_or_else(|| DeployError::MissingDeployment(BANK_ID.to_string()))?;
    let voting_period = required(ctx, "votingPeriod")?;
    let grace_period = required(ctx, "gracePeriod")?;
    let bank_flags = OFFCHAIN_VOTING_BANK_FLAGS
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>();
    let bank_flags = encode_extension_flags(BANK_ID, &bank_flags, OFFCHAIN_VOTING)?;
    for name in HELPER_ARTIFACTS {
        require_artifact(ctx, name)?;
    }

    // The off-chain adapter falls back to whatever voting adapter is
    // registered now.
    let current_voting = query_address(
        chain,
        dao,
        "getAdapterAddress",
        vec![ArgValue::Bytes32(sha3(VOTING_ID))],
    )
    .await?;
    let chain_id = resolve_chain_id(chain, &ctx.options.network).await?;

    let snapshot_proposal = deploy_helper(
        chain,
        ctx,
        ContractDescriptor::synthetic(
            "snapshot-proposal",
            SNAPSHOT_PROPOSAL,
            "snapshotProposal",
            ContractType::Util,
        ),
        vec![ArgValue::Uint(chain_id)],
    )
    .await?;
    let offchain_voting_hash = deploy_helper(
        chain,
        ctx,
        ContractDescriptor::synthetic(
            "offchain-voting-hash",
            OFFCHAIN_VOTING_HASH,
            "offchainVotingHash",
            ContractType::Util,
        ),
        vec![ArgValue::Address(snapshot_proposal.address)],
    )
    .await?;
    let kick_bad_reporter = deploy_helper(
        chain,
        ctx,
        ContractDescriptor::synthetic(
            "kick-bad-reporter",
            KICK_BAD_REPORTER,
            "kickBadReporter",
            ContractType::Adapter,
        ),
        Vec::new(),
    )
    .await?;
    let offchain_voting = deploy_helper(
        chain,
        ctx,
        ContractDescriptor::synthetic(
            VOTING_ID,
            OFFCHAIN_VOTING,
            "offchainVoting",
            ContractType::Adapter,
        ),
        vec![
            ArgValue::Address(current_voting),
            ArgValue::Address(offchain_voting_hash.address),
            ArgValue::Address(snapshot_proposal.address),
            ArgValue::Address(kick_bad_reporter.address),
            ArgValue::Address(ctx.owner()),
        ],
    )
    .await?;

    send(
        chain,
        ctx,
        dao_factory,
        "updateAdapter",
        vec![
            ArgValue::Address(dao.address),
            ArgValue::Entries(vec![entry_dao(VOTING_ID, offchain_voting.address, 0)]),
        ],
    )
    .await?;
    send(
        chain,
        ctx,
        dao_factory,
        "configureExtension",
        vec![
            ArgValue::Address(dao.address),
            ArgValue::Address(bank.address),
            ArgValue::Entries(vec![AclEntry {
                id: sha3(VOTING_ID),
                addr: offchain_voting.address,
                flags: bank_flags,
            }]),
        ],
    )
    .await?;
    send(
        chain,
        ctx,
        &offchain_voting,
        "configureDao",
        vec![
            ArgValue::Address(dao.address),
            voting_period,
            grace_period,
            ArgValue::Uint(OFFCHAIN_CONFIG_CONSTANT),
        ],
    )
    .await?;
    info!(
        "Off-chain voting installed at {} (previous voting adapter {})",
        offchain_voting.address, current_voting
    );

    Ok(VotingHelpers {
        offchain_voting: Some(offchain_voting),
        snapshot_proposal: Some(snapshot_proposal),
        offchain_voting_hash: Some(offchain_voting_hash),
        kick_bad_reporter: Some(kick_bad_reporter),
    })
}
