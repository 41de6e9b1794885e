use ::daosmith::*;
use anyhow::Result;

use ::daosmith::acl::{sha3, BANK_FLAGS, DAO_FLAGS};

// ===== Test Helper Functions =====

fn bit(schema: &[&str], flag: &str) -> u64 {
    1 << schema.iter().position(|f| *f == flag).unwrap()
}

fn bits(schema: &[&str], flags: &[&str]) -> u64 {
    flags.iter().fold(0, |acc, f| acc | bit(schema, f))
}

async fn deploy_builtin() -> Result<(DaoDeployer<SimulatedChain>, DeploymentResult)> {
    let deployer = DaoDeployer::new(
        SimulatedChain::default(),
        ContractTable::builtin(),
        DeployOptions::default(),
    );
    let result = deployer.deploy().await?;
    Ok((deployer, result))
}

fn with_descriptor(id: &str, edit: impl FnOnce(&mut ContractDescriptor)) -> ContractTable {
    let mut descriptors = ContractTable::builtin().descriptors().to_vec();
    let descriptor = descriptors.iter_mut().find(|d| d.id == id).unwrap();
    edit(descriptor);
    ContractTable::new(descriptors)
}

// ===== DAO-level access =====

#[tokio::test]
async fn test_adapters_registered_with_encoded_dao_flags() -> Result<()> {
    let (deployer, result) = deploy_builtin().await?;
    let state = deployer.chain.dao_state(result.dao.address).unwrap();

    let onboarding = result.adapters.get("onboarding").unwrap();
    assert_eq!(
        state.adapter(&sha3("onboarding")),
        Some((
            onboarding.address,
            bits(DAO_FLAGS, &["SUBMIT_PROPOSAL", "UPDATE_DELEGATE_KEY", "NEW_MEMBER"])
        ))
    );
    // Empty DAO flag list still registers the adapter.
    let voting = result.adapters.get("voting").unwrap();
    assert_eq!(state.adapter(&sha3("voting")), Some((voting.address, 0)));
    Ok(())
}

#[tokio::test]
async fn test_extensions_needing_access_become_pseudo_adapters() -> Result<()> {
    let (deployer, result) = deploy_builtin().await?;
    let state = deployer.chain.dao_state(result.dao.address).unwrap();

    let erc20 = result.extensions.get("erc20Extension").unwrap();
    assert_eq!(state.adapter(&sha3("erc20-ext")), Some((erc20.address, 0)));
    assert!(state.adapter(&sha3("bank")).is_none());
    Ok(())
}

// ===== Extension access =====

#[tokio::test]
async fn test_extension_grants_use_target_schema() -> Result<()> {
    let (deployer, result) = deploy_builtin().await?;
    let state = deployer.chain.dao_state(result.dao.address).unwrap();
    let bank = result.extensions.get("bankExtension").unwrap().address;
    let nft = result.extensions.get("nftExtension").unwrap().address;

    let guildkick = result.adapters.get("guildkick").unwrap().address;
    assert_eq!(
        state.extension_flags(bank, guildkick),
        Some(bits(
            BANK_FLAGS,
            &["WITHDRAW", "INTERNAL_TRANSFER", "SUB_FROM_BALANCE", "ADD_TO_BALANCE"]
        ))
    );

    // Same flag name, different bit per target schema.
    let tribute_nft = result.adapters.get("tributeNFT").unwrap().address;
    assert_eq!(state.extension_flags(nft, tribute_nft), Some(1 << 1));
    assert_eq!(state.extension_flags(bank, tribute_nft), Some(1 << 0));

    // Adapters with no flags for a target get no entry there.
    let voting = result.adapters.get("voting").unwrap().address;
    assert!(state.extension_flags(bank, voting).is_none());
    Ok(())
}

#[tokio::test]
async fn test_extension_to_extension_grant() -> Result<()> {
    let (deployer, result) = deploy_builtin().await?;
    let state = deployer.chain.dao_state(result.dao.address).unwrap();
    let bank = result.extensions.get("bankExtension").unwrap().address;
    let erc20 = result.extensions.get("erc20Extension").unwrap().address;

    assert_eq!(
        state.extension_flags(bank, erc20),
        Some(bit(BANK_FLAGS, "INTERNAL_TRANSFER"))
    );
    assert!(state.extension_flags(bank, bank).is_none());
    Ok(())
}

// ===== Adapter parameters =====

#[tokio::test]
async fn test_adapter_parameters_resolved_in_order() -> Result<()> {
    let (deployer, result) = deploy_builtin().await?;
    let dao = ArgValue::Address(result.dao.address);

    let voting = result.adapters.get("voting").unwrap().address;
    assert_eq!(
        deployer.chain.configurations(voting),
        vec![vec![dao.clone(), ArgValue::Uint(600), ArgValue::Uint(600)]]
    );

    let coupon = result.adapters.get("couponOnboarding").unwrap().address;
    let erc20 = result.extensions.get("erc20Extension").unwrap().address;
    let configured = deployer.chain.configurations(coupon);
    assert_eq!(configured.len(), 1);
    assert_eq!(configured[0][0], dao);
    assert_eq!(configured[0][2], ArgValue::Address(erc20));
    assert_eq!(configured[0][4], ArgValue::Uint(1_000_000));

    let managing = result.adapters.get("managing").unwrap().address;
    assert!(deployer.chain.configurations(managing).is_empty());
    Ok(())
}

// ===== Errors =====

#[tokio::test]
async fn test_unknown_dao_flag_is_configuration_error() -> Result<()> {
    let table = with_descriptor("managing", |d| {
        d.acls.dao = Some(vec!["SUBMIT_PROPOSAL".to_string(), "TAKE_OVER".to_string()]);
    });
    let chain = MockChain::new();
    let deployer = DaoDeployer::new(chain.clone(), table, DeployOptions::default());

    let err = deployer.deploy().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Configuration);
    match err {
        DeployError::UnknownAclFlag { contract, target, flag } => {
            assert_eq!(contract, "ManagingContract");
            assert_eq!(target, "dao");
            assert_eq!(flag, "TAKE_OVER");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!chain.labels().iter().any(|l| l == "DaoFactory.addAdapters"));
    Ok(())
}

#[tokio::test]
async fn test_flag_from_another_schema_is_rejected() -> Result<()> {
    // COLLECT_NFT is an nft flag, not a bank one.
    let table = with_descriptor("distribute", |d| {
        d.acls
            .extensions
            .insert("bank".to_string(), vec!["COLLECT_NFT".to_string()]);
    });
    let deployer = DaoDeployer::new(MockChain::new(), table, DeployOptions::default());

    let err = deployer.deploy().await.unwrap_err();

    assert!(matches!(
        err,
        DeployError::UnknownAclFlag { ref target, ref flag, .. }
            if target == "bank" && flag == "COLLECT_NFT"
    ));
    Ok(())
}

#[tokio::test]
async fn test_unresolvable_parameter_names_adapter() -> Result<()> {
    let table = with_descriptor("voting", |d| {
        d.dao_configs = vec![vec!["daoAddress".to_string(), "quorum".to_string()]];
    });
    let deployer = DaoDeployer::new(MockChain::new(), table, DeployOptions::default());

    let err = deployer.deploy().await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "cannot resolve parameter `quorum` for contract `VotingContract`"
    );
    Ok(())
}

#[tokio::test]
async fn test_extra_parameter_from_options() -> Result<()> {
    let table = with_descriptor("voting", |d| {
        d.dao_configs = vec![vec!["daoAddress".to_string(), "quorum".to_string()]];
    });
    let chain = MockChain::new();
    let options = DeployOptions::default().with_arg("quorum", ArgValue::Uint(51));
    let deployer = DaoDeployer::new(chain.clone(), table, options);

    let result = deployer.deploy().await?;

    let voting = result.adapters.get("voting").unwrap().address;
    assert_eq!(
        chain.inner.configurations(voting),
        vec![vec![ArgValue::Address(result.dao.address), ArgValue::Uint(51)]]
    );
    Ok(())
}
