pub mod chain_client;

pub use chain_client::ChainClient;
pub use chain_client::ContractCall;
