// Library exports for testing and external use

pub mod acl;
pub mod chain;
pub mod config;
pub mod contracts;
pub mod deployer;
pub mod error;
pub mod network;
pub mod telemetry;
pub mod traits;
pub mod types;

// Re-export commonly used types and traits
pub use config::{BaseConfig, ChainType, DeployOptions};
pub use contracts::ContractTable;
pub use deployer::{DaoDeployer, DeployContext};
pub use error::{DeployError, DeployResult, ErrorKind};
pub use traits::{ChainClient, ContractCall};
pub use types::{
    Address, ArgValue, ContractDescriptor, ContractSet, ContractType, DeployedContract,
    DeploymentResult, Hash32, Uint256, VotingHelpers,
};

// Re-export variant enums for convenience
pub use chain::{ChainVariant, MockChain, SimulatedChain};
