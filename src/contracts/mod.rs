pub mod defaults;
pub mod table;

pub use defaults::default_contracts;
pub use table::ContractTable;

impl ContractTable {
    /// The built-in table.
    pub fn builtin() -> Self {
        ContractTable::new(default_contracts())
    }
}
