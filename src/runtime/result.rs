//! Transaction results.

use std::collections::BTreeSet;

use serde::Serialize;
use starkbench_core::Felt;
use starkbench_core::lang::types::ValueType;

use crate::definition::{AbiParam, EntryPointType, is_len_companion};

/// One named output of a call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResultValue {
    Felt(Felt),
    Array(Vec<Felt>),
}

impl ResultValue {
    pub fn as_felt(&self) -> Option<&Felt> {
        match self {
            ResultValue::Felt(v) => Some(v),
            ResultValue::Array(_) => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Felt]> {
        match self {
            ResultValue::Array(v) => Some(v),
            ResultValue::Felt(_) => None,
        }
    }
}

/// Outputs of a call, in declaration order.
///
/// An `x_len` output that precedes an `x : felt*` output is folded into `x`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FunctionResult {
    values: Vec<(String, ResultValue)>,
}

impl FunctionResult {
    /// Split flat return data along the ABI outputs.
    pub fn decode(outputs: &[AbiParam], retdata: &[Felt]) -> Result<Self, String> {
        let mut values = Vec::with_capacity(outputs.len());
        let mut rest = retdata;
        let mut pending_len: Option<usize> = None;
        for (index, param) in outputs.iter().enumerate() {
            match param.ty {
                ValueType::Felt => {
                    let (first, tail) = rest
                        .split_first()
                        .ok_or_else(|| format!("return data ends before output '{}'", param.name))?;
                    rest = tail;
                    if is_len_companion(outputs, index) {
                        let len = first
                            .to_usize()
                            .ok_or_else(|| format!("output '{}' is not a valid length", param.name))?;
                        pending_len = Some(len);
                    } else {
                        values.push((param.name.clone(), ResultValue::Felt(first.clone())));
                    }
                }
                ValueType::FeltPtr => {
                    let len = pending_len
                        .take()
                        .ok_or_else(|| format!("array output '{}' has no length", param.name))?;
                    if rest.len() < len {
                        return Err(format!("return data ends inside array output '{}'", param.name));
                    }
                    let (items, tail) = rest.split_at(len);
                    rest = tail;
                    values.push((param.name.clone(), ResultValue::Array(items.to_vec())));
                }
            }
        }
        if !rest.is_empty() {
            return Err(format!("{} unexpected trailing return values", rest.len()));
        }
        Ok(Self { values })
    }

    pub fn get(&self, name: &str) -> Option<&ResultValue> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResultValue)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub from_address: Felt,
    pub keys: Vec<Felt>,
    pub data: Vec<Felt>,
}

/// Record of one contract call and the calls it made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallInfo {
    pub contract_address: Felt,
    pub caller_address: Felt,
    pub selector: Felt,
    pub entry_point_type: EntryPointType,
    pub calldata: Vec<Felt>,
    pub retdata: Vec<Felt>,
    pub events: Vec<Event>,
    pub internal_calls: Vec<CallInfo>,
    pub accessed_storage_keys: BTreeSet<Felt>,
    /// Instructions executed by this call, nested calls included.
    pub steps: u64,
}

impl CallInfo {
    /// Events of this call and every nested call, in emission order per call.
    pub fn all_events(&self) -> Vec<&Event> {
        let mut events: Vec<&Event> = self.events.iter().collect();
        for call in &self.internal_calls {
            events.extend(call.all_events());
        }
        events
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionExecutionInfo {
    pub result: FunctionResult,
    pub call_info: CallInfo,
    pub block_number: u64,
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
    fn test_decode_folds_len_into_array() {
        let outputs = [param("retdata_len", ValueType::Felt), param("retdata", ValueType::FeltPtr)];
        let result = FunctionResult::decode(&outputs, &[Felt::from(1u64), Felt::from(1u64)]).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.get("retdata"), Some(&ResultValue::Array(vec![Felt::from(1u64)])));
        assert_eq!(result.get("retdata_len"), None);
    }

    #[test]
    fn test_decode_plain_felts_in_order() {
        let outputs = [param("a", ValueType::Felt), param("b", ValueType::Felt)];
        let result = FunctionResult::decode(&outputs, &[Felt::from(4u64), Felt::from(5u64)]).unwrap();
        let names: Vec<&str> = result.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(result.get("b").and_then(ResultValue::as_felt), Some(&Felt::from(5u64)));
    }

    #[test]
    fn test_decode_rejects_short_data() {
        let outputs = [param("xs_len", ValueType::Felt), param("xs", ValueType::FeltPtr)];
        let err = FunctionResult::decode(&outputs, &[Felt::from(3u64), Felt::one()]).unwrap_err();
        assert!(err.contains("inside array output 'xs'"));
    }
}
