use ::daosmith::*;
use anyhow::Result;
use clap::Parser;

#[test]
fn test_defaults() {
    let options = DeployOptions::default();

    assert_eq!(options.dao_name, "test-dao");
    assert_eq!(options.network, "ganache");
    assert_eq!(
        options.owner.to_string(),
        "0x5b38da6a701c568545dcfcb03fcb875f56beddc4"
    );
    assert_eq!(options.args.get("votingPeriod"), Some(&ArgValue::Uint(600)));
    assert!(options.artifacts.is_none());
    assert!(!options.offchain_voting && !options.finalize && !options.deploy_test_contracts);
}

#[test]
fn test_load_options_file() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let path = temp_dir.path().join("options.json");
    std::fs::write(
        &path,
        r#"{
            "owner": "0x1111111111111111111111111111111111111111",
            "daoName": "muse0",
            "network": "goerli",
            "args": {
                "votingPeriod": 120,
                "erc20TokenName": "Muse",
                "tokenAddr": "0x2222222222222222222222222222222222222222"
            },
            "artifacts": ["DaoRegistry", "DaoFactory"],
            "offchainVoting": true
        }"#,
    )?;

    let options = DeployOptions::load(&path)?;

    assert_eq!(options.dao_name, "muse0");
    assert_eq!(options.network, "goerli");
    assert!(options.offchain_voting);
    assert!(!options.finalize);
    assert_eq!(options.args.get("votingPeriod"), Some(&ArgValue::Uint(120)));
    assert_eq!(options.args.get("erc20TokenName"), Some(&ArgValue::from("Muse")));
    assert_eq!(
        options.args.get("tokenAddr").and_then(ArgValue::as_address),
        Some("0x2222222222222222222222222222222222222222".parse()?)
    );
    assert_eq!(options.artifacts.as_ref().map(|a| a.len()), Some(2));
    // A file replaces the default arguments rather than merging with them.
    assert!(options.args.get("gracePeriod").is_none());
    Ok(())
}

#[test]
fn test_cli_overrides_options() -> Result<()> {
    let config = BaseConfig::try_parse_from([
        "daosmith",
        "--network",
        "polygon",
        "--dao-name",
        "cli-dao",
        "--owner",
        "0x3333333333333333333333333333333333333333",
        "--offchain-voting",
        "--finalize",
    ])?;

    let options = config.deploy_options()?;

    assert_eq!(config.chain, ChainType::Simulated);
    assert_eq!(options.network, "polygon");
    assert_eq!(options.dao_name, "cli-dao");
    assert_eq!(
        options.owner,
        "0x3333333333333333333333333333333333333333".parse::<Address>()?
    );
    assert!(options.offchain_voting);
    assert!(options.finalize);
    assert!(!options.deploy_test_contracts);
    Ok(())
}

#[test]
fn test_invalid_owner_is_rejected() -> Result<()> {
    let config = BaseConfig {
        owner: Some("0x1234".to_string()),
        ..BaseConfig::default()
    };

    let err = config.deploy_options().unwrap_err();

    assert!(err.to_string().contains("Invalid --owner"));
    Ok(())
}

#[test]
fn test_contract_table_source() -> Result<()> {
    let builtin = BaseConfig::default().contract_table()?;
    assert_eq!(builtin, ContractTable::builtin());

    let temp_dir = tempfile::tempdir()?;
    let path = temp_dir.path().join("contracts.json");
    std::fs::write(&path, include_str!("fixtures/small_table.json"))?;
    let config = BaseConfig {
        contracts_path: Some(path.to_string_lossy().into_owned()),
        ..BaseConfig::default()
    };
    assert_eq!(config.contract_table()?.len(), 12);
    Ok(())
}

#[test]
fn test_options_file_with_uint256_supply() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let path = temp_dir.path().join("options.json");
    std::fs::write(
        &path,
        r#"{
            "owner": "0x1111111111111111111111111111111111111111",
            "daoName": "wei-dao",
            "network": "ganache",
            "args": { "erc20TokenSupply": "1000000000000000000000000" }
        }"#,
    )?;

    let options = DeployOptions::load(&path)?;

    assert_eq!(
        options.args.get("erc20TokenSupply"),
        Some(&ArgValue::Uint256("1000000000000000000000000".parse()?))
    );

    std::fs::write(
        &path,
        r#"{
            "owner": "0x1111111111111111111111111111111111111111",
            "daoName": "wei-dao",
            "network": "ganache",
            "args": { "erc20TokenSupply": 1000000000000000000000000 }
        }"#,
    )?;
    let err = DeployOptions::load(&path).unwrap_err();
    assert!(format!("{:#}", err).contains("decimal strings"), "{:#}", err);
    Ok(())
}
