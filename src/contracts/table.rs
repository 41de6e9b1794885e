use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::error::{DeployError, DeployResult};
use crate::types::{ContractDescriptor, ContractType};

/// Ordered, immutable list of contract descriptors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContractTable {
    descriptors: Vec<ContractDescriptor>,
}

impl ContractTable {
    pub fn new(descriptors: Vec<ContractDescriptor>) -> Self {
        Self { descriptors }
    }

    /// Parse a JSON array of descriptors.
    pub fn from_json(json: &str) -> Result<Self> {
        let descriptors: Vec<ContractDescriptor> =
            serde_json::from_str(json).context("Failed to parse contract table")?;
        Ok(Self::new(descriptors))
    }

    /// Load a JSON contract table from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read contract table {}", path.display()))?;
        let table = Self::from_json(&raw)?;
        info!(
            "Loaded {} contract descriptors from {}",
            table.len(),
            path.display()
        );
        Ok(table)
    }

    pub fn descriptors(&self) -> &[ContractDescriptor] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Enabled descriptors of a category, table order, including skipped ones.
    pub fn enabled(&self, contract_type: ContractType) -> impl Iterator<Item = &ContractDescriptor> {
        self.descriptors
            .iter()
            .filter(move |d| d.contract_type == contract_type && d.enabled)
    }

    /// Descriptors the automatic phases deploy for a category.
    pub fn deployable(
        &self,
        contract_type: ContractType,
    ) -> impl Iterator<Item = &ContractDescriptor> {
        self.descriptors
            .iter()
            .filter(move |d| d.contract_type == contract_type && d.is_deployable())
    }

    pub fn find_by_id(&self, id: &str) -> Option<&ContractDescriptor> {
        self.descriptors.iter().find(|d| d.id == id)
    }

    /// Extension descriptor a factory instantiates.
    pub fn generated_extension(
        &self,
        factory: &ContractDescriptor,
    ) -> DeployResult<&ContractDescriptor> {
        let linkage = || DeployError::Linkage {
            factory: factory.name.clone(),
            extension_id: factory.generates_extension_id.clone().unwrap_or_default(),
        };
        let extension_id = factory.generates_extension_id.as_deref().ok_or_else(linkage)?;
        self.descriptors
            .iter()
            .find(|d| d.contract_type == ContractType::Extension && d.id == extension_id)
            .ok_or_else(linkage)
    }

    /// Core descriptor by id, required by the bootstrap phase.
    pub fn core(&self, id: &str) -> DeployResult<&ContractDescriptor> {
        self.descriptors
            .iter()
            .find(|d| d.contract_type == ContractType::Core && d.id == id)
            .ok_or_else(|| DeployError::MissingContract {
                name: id.to_string(),
            })
    }

    /// Reject two enabled descriptors sharing an alias.
    pub fn validate_aliases(&self) -> DeployResult<()> {
        let mut seen: HashMap<&str, &str> = HashMap::new();
        for descriptor in self.descriptors.iter().filter(|d| d.enabled) {
            if let Some(first) = seen.insert(&descriptor.alias, &descriptor.name) {
                return Err(DeployError::DuplicateAlias {
                    alias: descriptor.alias.clone(),
                    first: first.to_string(),
                    second: descriptor.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Every artifact name the table references.
    pub fn artifact_names(&self) -> BTreeSet<String> {
        self.descriptors.iter().map(|d| d.name.clone()).collect()
    }
}
