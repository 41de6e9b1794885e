pub mod mock;
pub mod simulated;
pub mod variant;

pub use mock::{MockChain, RecordedCall};
pub use simulated::{DaoState, SimulatedChain};
pub use variant::ChainVariant;
