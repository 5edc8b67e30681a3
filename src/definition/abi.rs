//! Contract ABI, serialized in the StarkNet JSON shape:
//! `{"type": "function", "name": ..., "inputs": [{"name": ..., "type": "felt"}], "outputs": [...]}`.

use serde::{Deserialize, Serialize};
use starkbench_core::lang::types::ValueType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AbiEntry {
    Function(AbiFunction),
    Constructor(AbiFunction),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiFunction {
    pub name: String,
    pub inputs: Vec<AbiParam>,
    pub outputs: Vec<AbiParam>,
    /// `Some("view")` for `@view` functions.
    #[serde(rename = "stateMutability", default, skip_serializing_if = "Option::is_none")]
    pub state_mutability: Option<String>,
}

impl AbiFunction {
    pub fn is_view(&self) -> bool {
        self.state_mutability.as_deref() == Some("view")
    }

    /// Inputs the caller supplies explicitly: every `x_len` that precedes an array `x` is derived from the array.
    pub fn user_inputs(&self) -> Vec<&AbiParam> {
        self.inputs
            .iter()
            .enumerate()
            .filter(|(i, _)| !is_len_companion(&self.inputs, *i))
            .map(|(_, p)| p)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiParam {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ValueType,
}

/// Whether `params[index]` is the `x_len : felt` companion of a following `x : felt*`.
pub fn is_len_companion(params: &[AbiParam], index: usize) -> bool {
    let (Some(len), Some(array)) = (params.get(index), params.get(index + 1)) else {
        return false;
    };
    len.ty == ValueType::Felt
        && array.ty == ValueType::FeltPtr
        && len.name.strip_suffix("_len") == Some(array.name.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(name: &str, ty: ValueType) -> AbiParam {
        AbiParam {
            name: name.to_string(),
            ty,
        }
    }

    #[test]
    fn test_serializes_in_starknet_shape() {
        let entry = AbiEntry::Function(AbiFunction {
            name: "forever_one".to_string(),
            inputs: vec![],
            outputs: vec![param("res", ValueType::Felt)],
            state_mutability: Some("view".to_string()),
        });
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "function",
                "name": "forever_one",
                "inputs": [],
                "outputs": [{"name": "res", "type": "felt"}],
                "stateMutability": "view"
            })
        );
    }

    #[test]
    fn test_user_inputs_skip_len_companions() {
        let f = AbiFunction {
            name: "sum".to_string(),
            inputs: vec![
                param("scale", ValueType::Felt),
                param("values_len", ValueType::Felt),
                param("values", ValueType::FeltPtr),
            ],
            outputs: vec![],
            state_mutability: None,
        };
        let names: Vec<&str> = f.user_inputs().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["scale", "values"]);
    }
}
