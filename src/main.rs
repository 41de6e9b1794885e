use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use daosmith::chain::ChainVariant;
use daosmith::config::BaseConfig;
use daosmith::network;
use daosmith::telemetry;
use daosmith::DaoDeployer;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize telemetry
    telemetry::init();
    info!("Starting daosmith");

    // Parse configuration from CLI arguments
    let config = BaseConfig::parse();
    let table = config.contract_table()?;
    let options = config.deploy_options()?;
    info!(
        "Configuration: dao_name={}, network={}, chain={:?}, contracts={}",
        options.dao_name,
        options.network,
        config.chain,
        table.len()
    );

    let chain_id = match network::lookup(&options.network) {
        Some(net) => net.chain_id,
        None => {
            warn!("Unknown network '{}', using ganache chain id", options.network);
            1337
        }
    };
    let chain = ChainVariant::new(config.chain, chain_id);

    let deployer = DaoDeployer::new(chain, table, options);
    let result = deployer.deploy().await.context("Deployment failed")?;

    let json = serde_json::to_string_pretty(&result)?;
    match &config.output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("Failed to write {}", path))?;
            info!("Deployment result written to {}", path);
        }
        None => println!("{}", json),
    }

    info!("daosmith finished");
    Ok(())
}
