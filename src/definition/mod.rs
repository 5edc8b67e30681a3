//! Compiled contract definitions.
//!
//! A [`ContractDefinition`] is the compiler's output and the runtime's input: bytecode for every function
//! ([`Program`]), the externally callable entry points, and the ABI. It serializes to JSON in a shape close to the
//! StarkNet contract class format.

mod abi;
mod program;

pub use abi::{AbiEntry, AbiFunction, AbiParam, is_len_companion};
pub use program::{DebugInfo, FunctionCode, Instruction, Location, Program};

use serde::{Deserialize, Serialize};
use starkbench_core::Felt;
use starkbench_core::hash::{get_selector_from_name, starknet_keccak};

/// Entry point: a selector and the index of the function it dispatches to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPoint {
    pub selector: Felt,
    /// Index into [`Program::functions`].
    pub function: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPointsByType {
    /// Sorted by selector.
    #[serde(rename = "EXTERNAL")]
    pub external: Vec<EntryPoint>,
    #[serde(rename = "CONSTRUCTOR")]
    pub constructor: Vec<EntryPoint>,
}

/// Which table an entry point lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryPointType {
    External,
    Constructor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractDefinition {
    pub program: Program,
    pub entry_points_by_type: EntryPointsByType,
    pub abi: Vec<AbiEntry>,
}

impl ContractDefinition {
    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// `starknet_keccak` over the compact JSON serialization.
    pub fn class_hash(&self) -> Result<Felt, serde_json::Error> {
        let bytes = serde_json::to_vec(self)?;
        Ok(starknet_keccak(&bytes))
    }

    /// ABI of a callable function (external or view) by name.
    pub fn abi_function(&self, name: &str) -> Option<&AbiFunction> {
        self.abi.iter().find_map(|entry| match entry {
            AbiEntry::Function(f) if f.name == name => Some(f),
            _ => None,
        })
    }

    pub fn constructor_abi(&self) -> Option<&AbiFunction> {
        self.abi.iter().find_map(|entry| match entry {
            AbiEntry::Constructor(f) => Some(f),
            _ => None,
        })
    }

    /// Resolve an external selector; unknown selectors fall back to the `__default__` entry point (selector 0) if
    /// the contract has one.
    pub fn external_entry_point(&self, selector: &Felt) -> Option<&EntryPoint> {
        let external = &self.entry_points_by_type.external;
        external
            .binary_search_by(|ep| ep.selector.cmp(selector))
            .ok()
            .map(|i| &external[i])
            .or_else(|| external.iter().find(|ep| ep.selector.is_zero()))
    }

    pub fn constructor(&self) -> Option<&EntryPoint> {
        self.entry_points_by_type.constructor.first()
    }

    /// ABI for the function an entry point dispatches to.
    pub fn entry_point_abi(&self, entry_point_type: EntryPointType, entry_point: &EntryPoint) -> Option<&AbiFunction> {
        match entry_point_type {
            EntryPointType::Constructor => self.constructor_abi(),
            EntryPointType::External => self.abi.iter().find_map(|entry| match entry {
                AbiEntry::Function(f) if get_selector_from_name(&f.name) == entry_point.selector => Some(f),
                _ => None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn function(name: &str) -> FunctionCode {
        FunctionCode {
            name: format!("__main__.{name}"),
            n_args: 0,
            n_outputs: 1,
            n_locals: 0,
            code: vec![Instruction::PushConst(Felt::one()), Instruction::Return],
        }
    }

    fn abi(name: &str) -> AbiFunction {
        AbiFunction {
            name: name.to_string(),
            inputs: vec![],
            outputs: vec![],
            state_mutability: None,
        }
    }

    fn definition(names: &[&str]) -> ContractDefinition {
        let mut external: Vec<EntryPoint> = names
            .iter()
            .enumerate()
            .map(|(i, name)| EntryPoint {
                selector: get_selector_from_name(name),
                function: i as u32,
            })
            .collect();
        external.sort_by(|a, b| a.selector.cmp(&b.selector));
        ContractDefinition {
            program: Program {
                functions: names.iter().map(|name| function(name)).collect(),
                ..Program::default()
            },
            entry_points_by_type: EntryPointsByType {
                external,
                constructor: vec![],
            },
            abi: names.iter().map(|name| AbiEntry::Function(abi(name))).collect(),
        }
    }

    #[test]
    fn test_external_entry_point_lookup() {
        let def = definition(&["forever_one", "call_self"]);
        let ep = def.external_entry_point(&get_selector_from_name("call_self")).unwrap();
        assert_eq!(def.program.function(ep.function).unwrap().short_name(), "call_self");
        assert!(def.external_entry_point(&get_selector_from_name("missing")).is_none());
        assert!(def.constructor().is_none());
    }

    #[test]
    fn test_unknown_selector_falls_back_to_default() {
        let def = definition(&["forever_one", "__default__"]);
        let ep = def.external_entry_point(&get_selector_from_name("missing")).unwrap();
        assert!(ep.selector.is_zero());
        assert_eq!(def.program.function(ep.function).unwrap().short_name(), "__default__");
    }

    #[test]
    fn test_entry_point_abi_matches_by_selector() {
        let def = definition(&["forever_one", "call_self"]);
        let ep = def.external_entry_point(&get_selector_from_name("forever_one")).unwrap();
        let f = def.entry_point_abi(EntryPointType::External, ep).unwrap();
        assert_eq!(f.name, "forever_one");
        assert!(def.entry_point_abi(EntryPointType::Constructor, ep).is_none());
    }

    #[test]
    fn test_json_keeps_starknet_table_names() {
        let def = definition(&["forever_one"]);
        let json: serde_json::Value = serde_json::from_str(&def.to_json().unwrap()).unwrap();
        assert!(json["entry_points_by_type"]["EXTERNAL"].is_array());
        assert!(json["entry_points_by_type"]["CONSTRUCTOR"].is_array());
        assert!(json["program"].get("debug_info").is_none());
        assert_eq!(ContractDefinition::from_json(&def.to_json().unwrap()).unwrap(), def);
    }

    #[test]
    fn test_class_hash_tracks_content() {
        let a = definition(&["forever_one"]);
        let b = definition(&["forever_two"]);
        assert_eq!(a.class_hash().unwrap(), a.clone().class_hash().unwrap());
        assert_ne!(a.class_hash().unwrap(), b.class_hash().unwrap());
    }
}
