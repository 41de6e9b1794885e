use ::daosmith::*;
use anyhow::Result;

use ::daosmith::acl::sha3;
use ::daosmith::chain::RecordedCall;

// ===== Test Helper Functions =====

fn simulated_deployer(options: DeployOptions) -> DaoDeployer<SimulatedChain> {
    DaoDeployer::new(SimulatedChain::default(), ContractTable::builtin(), options)
}

fn named(name: &str) -> DeployOptions {
    let mut options = DeployOptions::default();
    options.dao_name = name.to_string();
    options
}

fn position(labels: &[String], label: &str) -> usize {
    labels
        .iter()
        .position(|l| l == label)
        .unwrap_or_else(|| panic!("{} was never called", label))
}

// ===== E2E Tests =====

#[tokio::test]
async fn test_full_deployment_with_builtin_table() -> Result<()> {
    let deployer = simulated_deployer(DeployOptions::default());

    let result = deployer.deploy().await?;

    assert_eq!(result.factories.len(), 7);
    assert_eq!(result.extensions.len(), 7);
    assert_eq!(result.util_contracts.aliases(), vec!["multicall", "pixelNFT", "olToken"]);
    assert!(result.test_contracts.is_empty());
    assert!(result.voting_helpers.is_empty());

    let aliases = result.aliases();
    for expected in ["bankExtension", "erc20Extension", "voting", "onboarding", "couponOnboarding"] {
        assert!(aliases.contains(&expected), "missing {}", expected);
    }
    // Disabled and skip-auto-deploy entries never appear.
    assert!(!aliases.contains(&"kycOnboarding"));
    assert!(!aliases.contains(&"lendNFT"));

    let state = deployer.chain.dao_state(result.dao.address).unwrap();
    assert_eq!(state.name, "test-dao");
    assert_eq!(state.creator, DeployOptions::default().owner);
    assert_eq!(state.extensions.len(), 7);
    assert!(!state.finalized);
    for extension in result.extensions.iter() {
        assert_eq!(state.extensions.get(&sha3(extension.id())), Some(&extension.address));
    }
    Ok(())
}

#[tokio::test]
async fn test_dao_clone_is_bound_to_factory_identity() -> Result<()> {
    let deployer = simulated_deployer(DeployOptions::default());

    let result = deployer.deploy().await?;

    assert_eq!(deployer.chain.contract_at(result.dao.address).as_deref(), Some("DaoRegistry"));
    assert_eq!(
        deployer.chain.contract_at(result.dao_factory.address).as_deref(),
        Some("DaoFactory")
    );
    // Each extension instance is a clone of the identity its factory holds.
    let bank = result.extensions.get("bankExtension").unwrap();
    assert_eq!(deployer.chain.contract_at(bank.address).as_deref(), Some("BankExtension"));
    let bank_factory = result.factories.get("bankExtFactory").unwrap();
    let identity = deployer.chain.constructor_args(bank_factory.address).unwrap();
    assert_eq!(identity.len(), 1);
    assert_ne!(identity[0], ArgValue::Address(bank.address));
    Ok(())
}

#[tokio::test]
async fn test_test_contracts_only_when_requested() -> Result<()> {
    let mut options = DeployOptions::default();
    options.deploy_test_contracts = true;
    let deployer = simulated_deployer(options);

    let result = deployer.deploy().await?;

    assert_eq!(
        result.test_contracts.aliases(),
        vec!["testToken1", "testToken2", "testFairShareCalc"]
    );
    let token = result.test_contracts.get("testToken1").unwrap();
    assert_eq!(
        deployer.chain.constructor_args(token.address).unwrap(),
        vec![ArgValue::Uint(1_000_000)]
    );
    Ok(())
}

#[tokio::test]
async fn test_two_daos_share_shape_not_addresses() -> Result<()> {
    let chain = MockChain::new();
    let first = DaoDeployer::new(chain.clone(), ContractTable::builtin(), named("dao-a"));
    let second = DaoDeployer::new(chain.clone(), ContractTable::builtin(), named("dao-b"));

    let a = first.deploy().await?;
    let b = second.deploy().await?;

    assert_eq!(a.aliases(), b.aliases());
    assert_ne!(a.dao.address, b.dao.address);
    for (x, y) in a.extensions.iter().zip(b.extensions.iter()) {
        assert_eq!(x.alias(), y.alias());
        assert_ne!(x.address, y.address);
    }
    assert_eq!(chain.inner.dao_state(a.dao.address).unwrap().name, "dao-a");
    assert_eq!(chain.inner.dao_state(b.dao.address).unwrap().name, "dao-b");
    Ok(())
}

#[tokio::test]
async fn test_reusing_dao_name_is_rejected_by_chain() -> Result<()> {
    let chain = MockChain::new();
    DaoDeployer::new(chain.clone(), ContractTable::builtin(), named("same"))
        .deploy()
        .await?;

    let err = DaoDeployer::new(chain.clone(), ContractTable::builtin(), named("same"))
        .deploy()
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ChainCall);
    assert!(err.to_string().contains("createDao"));
    Ok(())
}

#[tokio::test]
async fn test_phase_order() -> Result<()> {
    let chain = MockChain::new();
    let mut options = DeployOptions::default();
    options.finalize = true;
    let deployer = DaoDeployer::new(chain.clone(), ContractTable::builtin(), options);

    deployer.deploy().await?;

    let labels = chain.labels();
    assert_eq!(
        &labels[..4],
        &[
            "deploy:DaoRegistry",
            "deploy:DaoFactory",
            "DaoFactory.createDao",
            "DaoFactory.getDaoAddress",
        ]
    );
    let last_factory = position(&labels, "deploy:ERC1155TokenCollectionFactory");
    let first_create = position(&labels, "BankFactory.create");
    let first_adapter = position(&labels, "deploy:DaoRegistryAdapterContract");
    let first_util = position(&labels, "deploy:Multicall");
    let add_adapters = position(&labels, "DaoFactory.addAdapters");
    let first_grant = position(&labels, "DaoFactory.configureExtension");
    let finalize = position(&labels, "DaoRegistry.finalizeDao");

    assert!(last_factory < first_create);
    assert!(first_create < first_adapter);
    assert!(first_adapter < first_util);
    assert!(first_util < add_adapters);
    assert!(add_adapters < first_grant);
    assert_eq!(finalize, labels.len() - 1);
    assert_eq!(
        labels.iter().filter(|l| *l == "DaoFactory.addAdapters").count(),
        1,
        "DAO access is one batch"
    );
    Ok(())
}

#[tokio::test]
async fn test_failure_aborts_remaining_phases() -> Result<()> {
    let chain = MockChain::new();
    chain.fail_on_deploy("VotingContract");
    let deployer = DaoDeployer::new(chain.clone(), ContractTable::builtin(), DeployOptions::default());

    let err = deployer.deploy().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ChainCall);
    assert!(err.to_string().contains("VotingContract"));
    let labels = chain.labels();
    assert_eq!(labels.last().map(String::as_str), Some("deploy:VotingContract"));
    assert!(!labels.iter().any(|l| l == "DaoFactory.addAdapters"));
    // Nothing is rolled back.
    let dao = chain.get_calls().into_iter().find_map(|call| match call {
        RecordedCall::Send(c) if c.method == "addExtension" => Some(c.target),
        _ => None,
    });
    let state = chain.inner.dao_state(dao.unwrap()).unwrap();
    assert_eq!(state.extensions.len(), 7);
    Ok(())
}

#[tokio::test]
async fn test_invalid_table_fails_before_chain_contact() -> Result<()> {
    let chain = MockChain::new();
    let mut descriptors = ContractTable::builtin().descriptors().to_vec();
    let mut dup = descriptors[descriptors.len() - 1].clone();
    dup.id = "another".to_string();
    descriptors.push(dup);
    let deployer = DaoDeployer::new(chain.clone(), ContractTable::new(descriptors), DeployOptions::default());

    let err = deployer.deploy().await.unwrap_err();

    assert!(matches!(err, DeployError::DuplicateAlias { .. }));
    assert!(chain.get_calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_finalize_marks_dao() -> Result<()> {
    let mut options = DeployOptions::default();
    options.finalize = true;
    let deployer = simulated_deployer(options);

    let result = deployer.deploy().await?;

    assert!(deployer.chain.dao_state(result.dao.address).unwrap().finalized);
    Ok(())
}

#[tokio::test]
async fn test_result_serializes_alias_maps() -> Result<()> {
    let deployer = simulated_deployer(DeployOptions::default());
    let result = deployer.deploy().await?;

    let json = serde_json::to_value(&result)?;

    let bank = &json["extensions"]["bankExtension"];
    assert_eq!(bank["address"], result.extensions.get("bankExtension").unwrap().address.to_string());
    assert_eq!(bank["configs"]["id"], "bank");
    assert_eq!(json["daoFactory"]["configs"]["name"], "DaoFactory");
    assert!(json["votingHelpers"]["offchainVoting"].is_null());
    assert!(json["testContracts"].as_object().unwrap().is_empty());
    Ok(())
}
