//! Ledger state.
//!
//! The whole state is a plain value: transactions run against a clone and replace the original only on success.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use starkbench_core::Felt;

use crate::definition::ContractDefinition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BlockInfo {
    pub block_number: u64,
    pub block_timestamp: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContractState {
    pub class_hash: Felt,
    pub storage: HashMap<Felt, Felt>,
}

#[derive(Debug, Clone)]
pub struct StarknetState {
    pub block_info: BlockInfo,
    pub classes: HashMap<Felt, Arc<ContractDefinition>>,
    pub contracts: HashMap<Felt, ContractState>,
    /// Source of default deployment salts.
    pub deploy_counter: u64,
}

impl StarknetState {
    pub fn new(block_info: BlockInfo) -> Self {
        Self {
            block_info,
            classes: HashMap::new(),
            contracts: HashMap::new(),
            deploy_counter: 0,
        }
    }

    /// Register a class; declaring the same definition twice is a no-op.
    pub fn declare(&mut self, definition: Arc<ContractDefinition>) -> Result<Felt, serde_json::Error> {
        let class_hash = definition.class_hash()?;
        self.classes.entry(class_hash.clone()).or_insert(definition);
        Ok(class_hash)
    }

    /// Definition of the contract deployed at `address`.
    pub fn definition_at(&self, address: &Felt) -> Option<Arc<ContractDefinition>> {
        let contract = self.contracts.get(address)?;
        self.classes.get(&contract.class_hash).cloned()
    }

    /// Stored value, zero if never written.
    pub fn storage_read(&self, address: &Felt, key: &Felt) -> Felt {
        self.contracts
            .get(address)
            .and_then(|c| c.storage.get(key))
            .cloned()
            .unwrap_or_default()
    }

    pub fn storage_write(&mut self, address: &Felt, key: Felt, value: Felt) {
        if let Some(contract) = self.contracts.get_mut(address) {
            contract.storage.insert(key, value);
        }
    }
}
