//! Access wiring once every contract exists: DAO-level adapter registration,
//! adapter parameters, and per-extension grants.

use tracing::{debug, error, info};

use super::contract::send;
use super::core::DeployContext;
use crate::acl::{encode_dao_flags, encode_extension_flags, entry_dao, sha3, AclEntry};
use crate::error::{DeployError, DeployResult};
use crate::traits::ChainClient;
use crate::types::{ArgValue, ContractSet, ContractType, DeployedContract};

/// Registry entries for one batched `addAdapters` call.
///
/// Adapters declaring DAO-level access get their encoded flags. Extensions
/// that need access to other extensions are registered as pseudo-adapters
/// with no DAO flags, since extensions only accept calls from registered
/// adapters.
pub fn dao_access_entries(
    adapters: &ContractSet,
    extensions: &ContractSet,
) -> DeployResult<Vec<AclEntry>> {
    let mut entries = Vec::new();
    for adapter in adapters.iter().filter(|a| a.configs.is_deployable()) {
        if !adapter.configs.acls.has_dao_access() {
            continue;
        }
        let flags = encode_dao_flags(adapter.configs.acls.dao_flags(), adapter.name())?;
        entries.push(entry_dao(adapter.id(), adapter.address, flags));
    }
    for extension in extensions.iter().filter(|e| e.configs.enabled) {
        if extension.configs.acls.has_extension_access() {
            entries.push(entry_dao(extension.id(), extension.address, 0));
        }
    }
    Ok(entries)
}

/// Entries granting `grantees` access to `target`, encoded with the
/// target's own flag schema. Grantees without flags for the target are
/// left out.
pub fn extension_access_entries(
    target: &DeployedContract,
    grantees: &ContractSet,
) -> DeployResult<Vec<AclEntry>> {
    let mut entries = Vec::new();
    for grantee in grantees.iter() {
        if !grantee.configs.enabled || grantee.alias() == target.alias() {
            continue;
        }
        let flags = grantee.configs.acls.flags_for_extension(target.id());
        if flags.is_empty() {
            continue;
        }
        let encoded = encode_extension_flags(target.id(), flags, grantee.name())?;
        entries.push(AclEntry {
            id: sha3(grantee.id()),
            addr: grantee.address,
            flags: encoded,
        });
    }
    Ok(entries)
}

/// Value of a `daoConfigs` parameter: an extension (by alias or id) resolves
/// to its address, anything else comes from the context.
pub fn resolve_parameter(
    ctx: &DeployContext,
    extensions: &ContractSet,
    adapter: &DeployedContract,
    parameter: &str,
) -> DeployResult<ArgValue> {
    if let Some(extension) = extensions
        .get(parameter)
        .or_else(|| extensions.find_by_id(parameter))
    {
        return Ok(ArgValue::Address(extension.address));
    }
    ctx.resolve(parameter).ok_or_else(|| {
        error!(contract = %adapter.name(), "Cannot resolve parameter `{}`", parameter);
        DeployError::UnresolvedParameter {
            contract: adapter.name().to_string(),
            parameter: parameter.to_string(),
        }
    })
}

/// Submit the DAO-level access batch through the DAO factory.
pub async fn configure_dao_access<C: ChainClient + ?Sized>(
    chain: &C,
    ctx: &DeployContext,
    adapters: &ContractSet,
    extensions: &ContractSet,
) -> DeployResult<()> {
    let entries = dao_access_entries(adapters, extensions)?;
    if entries.is_empty() {
        debug!("No DAO-level access to configure");
        return Ok(());
    }
    let dao = ctx.dao()?;
    let count = entries.len();
    send(
        chain,
        ctx,
        ctx.dao_factory()?,
        "addAdapters",
        vec![ArgValue::Address(dao.address), ArgValue::Entries(entries)],
    )
    .await?;
    info!("Registered {} adapter entries with DAO {}", count, dao.address);
    Ok(())
}

/// Call `configureDao` on every adapter once per declared parameter group.
pub async fn configure_adapters_with_dao_parameters<C: ChainClient + ?Sized>(
    chain: &C,
    ctx: &DeployContext,
    adapters: &ContractSet,
    extensions: &ContractSet,
) -> DeployResult<()> {
    for adapter in adapters.iter().filter(|a| a.configs.enabled) {
        for group in &adapter.configs.dao_configs {
            let values = group
                .iter()
                .map(|parameter| resolve_parameter(ctx, extensions, adapter, parameter))
                .collect::<DeployResult<Vec<_>>>()?;
            send(chain, ctx, adapter, "configureDao", values).await?;
            debug!("Configured {} with {:?}", adapter.alias(), group);
        }
    }
    Ok(())
}

async fn grant_extension_access<C: ChainClient + ?Sized>(
    chain: &C,
    ctx: &DeployContext,
    extensions: &ContractSet,
    grantees: &ContractSet,
) -> DeployResult<()> {
    let dao = ctx.dao()?;
    let dao_factory = ctx.dao_factory()?;
    // Table order, not deployment order.
    for descriptor in ctx.table.enabled(ContractType::Extension) {
        let Some(target) = extensions.get(&descriptor.alias) else {
            debug!("Extension {} not deployed, skipping grants", descriptor.alias);
            continue;
        };
        let entries = extension_access_entries(target, grantees)?;
        if entries.is_empty() {
            continue;
        }
        let count = entries.len();
        send(
            chain,
            ctx,
            dao_factory,
            "configureExtension",
            vec![
                ArgValue::Address(dao.address),
                ArgValue::Address(target.address),
                ArgValue::Entries(entries),
            ],
        )
        .await?;
        info!("Granted {} contract(s) access to {}", count, target.alias());
    }
    Ok(())
}

/// Grant adapters, then sibling extensions, their declared extension flags.
pub async fn configure_extension_access<C: ChainClient + ?Sized>(
    chain: &C,
    ctx: &DeployContext,
    adapters: &ContractSet,
    extensions: &ContractSet,
) -> DeployResult<()> {
    grant_extension_access(chain, ctx, extensions, adapters).await?;
    grant_extension_access(chain, ctx, extensions, extensions).await
}

/// All access wiring, in fixed order.
pub async fn configure_dao<C: ChainClient + ?Sized>(
    chain: &C,
    ctx: &DeployContext,
    adapters: &ContractSet,
    extensions: &ContractSet,
) -> DeployResult<()> {
    configure_dao_access(chain, ctx, adapters, extensions).await?;
    configure_adapters_with_dao_parameters(chain, ctx, adapters, extensions).await?;
    configure_extension_access(chain, ctx, adapters, extensions).await
}
