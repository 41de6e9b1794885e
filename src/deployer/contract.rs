//! Single-contract primitives: deploy, send, query.
//!
//! Every chain failure is logged with the contract it concerns and handed
//! back unchanged; nothing here retries.

use tracing::{debug, error, info};

use super::core::DeployContext;
use crate::error::{DeployError, DeployResult};
use crate::traits::{ChainClient, ContractCall};
use crate::types::{Address, ArgValue, ContractDescriptor, DeployedContract};

/// Resolve a descriptor's `deploymentArgs`, in declaration order.
pub fn resolve_args(
    ctx: &DeployContext,
    descriptor: &ContractDescriptor,
) -> DeployResult<Vec<ArgValue>> {
    descriptor
        .deployment_args
        .iter()
        .map(|argument| {
            ctx.resolve(argument).ok_or_else(|| {
                error!(
                    contract = %descriptor.name,
                    "Missing deployment argument `{}`", argument
                );
                DeployError::MissingArgument {
                    contract: descriptor.name.clone(),
                    argument: argument.clone(),
                }
            })
        })
        .collect()
}

/// Fail with a configuration error unless the artifact is available.
pub fn require_artifact(ctx: &DeployContext, name: &str) -> DeployResult<()> {
    if ctx.has_artifact(name) {
        Ok(())
    } else {
        error!(contract = %name, "Contract artifact not found in deploy context");
        Err(DeployError::MissingContract {
            name: name.to_string(),
        })
    }
}

/// Deploy one table descriptor with its resolved arguments.
pub async fn deploy_contract<C: ChainClient + ?Sized>(
    chain: &C,
    ctx: &DeployContext,
    descriptor: &ContractDescriptor,
) -> DeployResult<DeployedContract> {
    require_artifact(ctx, &descriptor.name)?;
    let args = resolve_args(ctx, descriptor)?;
    let address = deploy_raw(chain, ctx, &descriptor.name, &args).await?;
    Ok(DeployedContract::at(descriptor.clone(), address))
}

/// Deploy an artifact with explicit arguments.
pub async fn deploy_raw<C: ChainClient + ?Sized>(
    chain: &C,
    ctx: &DeployContext,
    name: &str,
    args: &[ArgValue],
) -> DeployResult<Address> {
    debug!(contract = %name, "Deploying with {} argument(s)", args.len());
    match chain.deploy(name, args, ctx.owner()).await {
        Ok(address) => {
            info!("Deployed {} at {}", name, address);
            Ok(address)
        }
        Err(e) => {
            error!(contract = %name, "Deployment failed: {}", e);
            Err(DeployError::chain(name, "deploy", e))
        }
    }
}

/// Submit a state-changing call as the owner.
pub async fn send<C: ChainClient + ?Sized>(
    chain: &C,
    ctx: &DeployContext,
    target: &DeployedContract,
    method: &str,
    args: Vec<ArgValue>,
) -> DeployResult<()> {
    let call = ContractCall::new(target, method, args);
    debug!(contract = %target.name(), "{}.{}", target.alias(), method);
    chain.send(&call, ctx.owner()).await.map_err(|e| {
        error!(contract = %target.name(), "{} failed: {}", method, e);
        DeployError::chain(target.name(), method, e)
    })
}

/// Read-only call expected to return an address.
pub async fn query_address<C: ChainClient + ?Sized>(
    chain: &C,
    target: &DeployedContract,
    method: &str,
    args: Vec<ArgValue>,
) -> DeployResult<Address> {
    let call = ContractCall::new(target, method, args);
    let value = chain.query(&call).await.map_err(|e| {
        error!(contract = %target.name(), "{} failed: {}", method, e);
        DeployError::chain(target.name(), method, e)
    })?;
    value
        .as_address()
        .ok_or_else(|| DeployError::UnexpectedReturn {
            contract: target.name().to_string(),
            operation: method.to_string(),
        })
}
