//! Deployment phases and the pipeline that sequences them.
//!
//! Each phase is a plain sequential loop: one chain interaction in flight at
//! a time, in table order. A failure aborts the run; whatever was already
//! mined stays on chain.

use std::time::Instant;

use tracing::{error, info, info_span, Instrument};

use super::access::configure_dao;
use super::contract::{
    deploy_contract, deploy_raw, query_address, require_artifact, resolve_args, send,
};
use super::core::{DaoDeployer, DeployContext};
use super::offchain::install_offchain_voting;
use crate::acl::sha3;
use crate::contracts::ContractTable;
use crate::error::{DeployError, DeployResult};
use crate::traits::ChainClient;
use crate::types::{ArgValue, ContractSet, ContractType, DeployedContract, DeploymentResult};

pub const DAO_REGISTRY_ID: &str = "daoRegistry";
pub const DAO_FACTORY_ID: &str = "daoFactory";

/// Checks that need no chain access: unique aliases and resolvable
/// factory links.
pub fn validate_table(table: &ContractTable) -> DeployResult<()> {
    table.validate_aliases()?;
    for factory in table.deployable(ContractType::Factory) {
        table.generated_extension(factory)?;
    }
    Ok(())
}

/// Deploy the registry identity and its factory, then clone a DAO for
/// `options.dao_name`.
pub async fn bootstrap<C: ChainClient + ?Sized>(
    chain: &C,
    ctx: &DeployContext,
) -> DeployResult<DeployContext> {
    let registry = ctx.table.core(DAO_REGISTRY_ID)?;
    let factory = ctx.table.core(DAO_FACTORY_ID)?;
    require_artifact(ctx, &registry.name)?;
    require_artifact(ctx, &factory.name)?;

    let identity = deploy_raw(chain, ctx, &registry.name, &[]).await?;
    let factory_address =
        deploy_raw(chain, ctx, &factory.name, &[ArgValue::Address(identity)]).await?;
    let dao_factory = DeployedContract::at(factory.clone(), factory_address);

    let dao_name = ArgValue::Text(ctx.options.dao_name.clone());
    send(
        chain,
        ctx,
        &dao_factory,
        "createDao",
        vec![dao_name.clone(), ArgValue::Address(ctx.owner())],
    )
    .await?;
    let dao_address = query_address(chain, &dao_factory, "getDaoAddress", vec![dao_name]).await?;
    if dao_address.is_zero() {
        error!(contract = %factory.name, "DAO '{}' was not created", ctx.options.dao_name);
        return Err(DeployError::UnexpectedReturn {
            contract: factory.name.clone(),
            operation: "getDaoAddress".to_string(),
        });
    }
    info!("DAO '{}' cloned at {}", ctx.options.dao_name, dao_address);

    let dao = DeployedContract::at(registry.clone(), dao_address);
    Ok(ctx.with_dao(dao, dao_factory))
}

/// Deploy every factory, each constructed with the identity instance of the
/// extension it generates.
pub async fn deploy_factories<C: ChainClient + ?Sized>(
    chain: &C,
    ctx: &DeployContext,
) -> DeployResult<ContractSet> {
    let mut factories = ContractSet::new();
    for descriptor in ctx.table.deployable(ContractType::Factory) {
        let extension = ctx.table.generated_extension(descriptor).map_err(|e| {
            error!(contract = %descriptor.name, "{}", e);
            e
        })?;
        require_artifact(ctx, &descriptor.name)?;
        require_artifact(ctx, &extension.name)?;

        let identity = deploy_raw(chain, ctx, &extension.name, &[]).await?;
        let address =
            deploy_raw(chain, ctx, &descriptor.name, &[ArgValue::Address(identity)]).await?;
        factories.insert(DeployedContract::at(descriptor.clone(), address))?;
    }
    Ok(factories)
}

/// Ask each factory for a new extension instance bound to the DAO, then
/// register the instance with the DAO under `keccak256(id)`.
pub async fn create_extensions<C: ChainClient + ?Sized>(
    chain: &C,
    ctx: &DeployContext,
    factories: &ContractSet,
) -> DeployResult<ContractSet> {
    let dao = ctx.dao()?;
    let mut extensions = ContractSet::new();
    for factory in factories.iter() {
        let descriptor = ctx.table.generated_extension(&factory.configs)?;
        let args = resolve_args(ctx, &factory.configs)?;

        // create() does not hand back the instance; read it from the factory.
        send(chain, ctx, factory, "create", args).await?;
        let address = query_address(
            chain,
            factory,
            "getExtensionAddress",
            vec![ArgValue::Address(dao.address)],
        )
        .await?;
        if address.is_zero() {
            error!(
                contract = %factory.name(),
                "Factory reported no extension for {}", dao.address
            );
            return Err(DeployError::UnexpectedReturn {
                contract: factory.name().to_string(),
                operation: "getExtensionAddress".to_string(),
            });
        }

        let extension = DeployedContract::at(descriptor.clone(), address);
        send(
            chain,
            ctx,
            dao,
            "addExtension",
            vec![ArgValue::Bytes32(sha3(extension.id())), ArgValue::Address(address)],
        )
        .await?;
        info!("Extension {} ({}) added to DAO", extension.alias(), address);
        extensions.insert(extension)?;
    }
    Ok(extensions)
}

async fn deploy_category<C: ChainClient + ?Sized>(
    chain: &C,
    ctx: &DeployContext,
    contract_type: ContractType,
) -> DeployResult<ContractSet> {
    let mut deployed = ContractSet::new();
    for descriptor in ctx.table.deployable(contract_type) {
        deployed.insert(deploy_contract(chain, ctx, descriptor).await?)?;
    }
    Ok(deployed)
}

pub async fn deploy_adapters<C: ChainClient + ?Sized>(
    chain: &C,
    ctx: &DeployContext,
) -> DeployResult<ContractSet> {
    deploy_category(chain, ctx, ContractType::Adapter).await
}

pub async fn deploy_util_contracts<C: ChainClient + ?Sized>(
    chain: &C,
    ctx: &DeployContext,
) -> DeployResult<ContractSet> {
    deploy_category(chain, ctx, ContractType::Util).await
}

/// No-op unless `deploy_test_contracts` is set.
pub async fn deploy_test_contracts<C: ChainClient + ?Sized>(
    chain: &C,
    ctx: &DeployContext,
) -> DeployResult<ContractSet> {
    if !ctx.options.deploy_test_contracts {
        return Ok(ContractSet::new());
    }
    deploy_category(chain, ctx, ContractType::Test).await
}

pub async fn finalize_dao<C: ChainClient + ?Sized>(
    chain: &C,
    ctx: &DeployContext,
) -> DeployResult<()> {
    let dao = ctx.dao()?;
    send(chain, ctx, dao, "finalizeDao", Vec::new()).await?;
    info!("DAO {} finalized", dao.address);
    Ok(())
}

impl<C: ChainClient> DaoDeployer<C> {
    /// Run every phase in order and return the aggregate.
    pub async fn deploy(&self) -> DeployResult<DeploymentResult> {
        let started = Instant::now();
        let chain = &self.chain;
        info!(
            "Deploying DAO '{}' on network '{}' via {} chain",
            self.options.dao_name,
            self.options.network,
            chain.name()
        );

        validate_table(&self.table)?;
        let ctx = bootstrap(chain, &self.context())
            .instrument(info_span!("bootstrap"))
            .await?;

        let factories = deploy_factories(chain, &ctx)
            .instrument(info_span!("factories"))
            .await?;
        let ctx = ctx.with_contracts(&factories)?;

        let extensions = create_extensions(chain, &ctx, &factories)
            .instrument(info_span!("extensions"))
            .await?;
        let ctx = ctx.with_contracts(&extensions)?;

        let adapters = deploy_adapters(chain, &ctx)
            .instrument(info_span!("adapters"))
            .await?;
        let ctx = ctx.with_contracts(&adapters)?;

        let util_contracts = deploy_util_contracts(chain, &ctx)
            .instrument(info_span!("utils"))
            .await?;
        let ctx = ctx.with_contracts(&util_contracts)?;

        let test_contracts = deploy_test_contracts(chain, &ctx)
            .instrument(info_span!("tests"))
            .await?;
        let ctx = ctx.with_contracts(&test_contracts)?;

        configure_dao(chain, &ctx, &adapters, &extensions)
            .instrument(info_span!("access"))
            .await?;

        let voting_helpers = install_offchain_voting(chain, &ctx, &extensions)
            .instrument(info_span!("offchain_voting"))
            .await?;

        if ctx.options.finalize {
            finalize_dao(chain, &ctx).await?;
        }

        info!(
            "Deployment of '{}' complete: {} factories, {} extensions, {} adapters, {} utils, {} test contracts in {:?}",
            self.options.dao_name,
            factories.len(),
            extensions.len(),
            adapters.len(),
            util_contracts.len(),
            test_contracts.len(),
            started.elapsed()
        );

        Ok(DeploymentResult {
            dao: ctx.dao()?.clone(),
            dao_factory: ctx.dao_factory()?.clone(),
            factories,
            extensions,
            adapters,
            util_contracts,
            test_contracts,
            voting_helpers,
        })
    }
}
