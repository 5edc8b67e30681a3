//! Flat calldata and return data.
//!
//! Arguments and outputs cross contract boundaries as flat felt lists. An `x : felt*` value travels as its elements,
//! counted by the `x_len` felt right before it.

use starkbench_core::Felt;
use starkbench_core::lang::types::ValueType;

use super::errors::{ExecutionError, ExecutionErrorKind};
use super::memory::Memory;
use super::vm::Value;
use crate::definition::{AbiFunction, AbiParam, is_len_companion};

/// Host-side argument for [`StarknetContract::method`](super::StarknetContract::method).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallArg {
    Felt(Felt),
    /// A `felt*` argument; its `_len` companion is filled in from the array length.
    Array(Vec<Felt>),
}

impl From<Felt> for CallArg {
    fn from(value: Felt) -> Self {
        CallArg::Felt(value)
    }
}

impl From<&Felt> for CallArg {
    fn from(value: &Felt) -> Self {
        CallArg::Felt(value.clone())
    }
}

impl From<u64> for CallArg {
    fn from(value: u64) -> Self {
        CallArg::Felt(Felt::from(value))
    }
}

impl From<Vec<Felt>> for CallArg {
    fn from(values: Vec<Felt>) -> Self {
        CallArg::Array(values)
    }
}

impl From<Vec<u64>> for CallArg {
    fn from(values: Vec<u64>) -> Self {
        CallArg::Array(values.into_iter().map(Felt::from).collect())
    }
}

/// Flatten host arguments along a function's inputs.
pub fn encode_args(function: &AbiFunction, args: Vec<CallArg>) -> Result<Vec<Felt>, String> {
    let expected = function.user_inputs().len();
    if args.len() != expected {
        return Err(format!("expected {expected} argument(s), got {}", args.len()));
    }
    let mut calldata = Vec::new();
    let mut args = args.into_iter().peekable();
    for (index, param) in function.inputs.iter().enumerate() {
        if is_len_companion(&function.inputs, index) {
            match args.peek() {
                Some(CallArg::Array(items)) => calldata.push(Felt::from(items.len())),
                _ => return Err(format!("'{}' expects an array", function.inputs[index + 1].name)),
            }
            continue;
        }
        match (param.ty, args.next()) {
            (ValueType::Felt, Some(CallArg::Felt(value))) => calldata.push(value),
            (ValueType::FeltPtr, Some(CallArg::Array(items))) => calldata.extend(items),
            (ValueType::Felt, _) => return Err(format!("'{}' expects a felt", param.name)),
            (ValueType::FeltPtr, _) => return Err(format!("'{}' expects an array", param.name)),
        }
    }
    Ok(calldata)
}

fn invalid_calldata(message: String) -> ExecutionError {
    ExecutionError::new(ExecutionErrorKind::InvalidOperand, message)
}

/// Turn calldata into the entry point's arguments, loading arrays into fresh segments.
pub fn decode_calldata(inputs: &[AbiParam], calldata: &[Felt], memory: &mut Memory) -> Result<Vec<Value>, ExecutionError> {
    let mut args = Vec::with_capacity(inputs.len());
    let mut rest = calldata;
    for (index, param) in inputs.iter().enumerate() {
        match param.ty {
            ValueType::Felt => {
                let (first, tail) = rest
                    .split_first()
                    .ok_or_else(|| invalid_calldata(format!("Calldata ends before argument '{}'", param.name)))?;
                rest = tail;
                args.push(Value::Felt(first.clone()));
            }
            ValueType::FeltPtr => {
                let len = match (index.checked_sub(1), args.last()) {
                    (Some(prev), Some(Value::Felt(len))) if is_len_companion(inputs, prev) => len.to_usize(),
                    _ => None,
                }
                .ok_or_else(|| invalid_calldata(format!("Array argument '{}' has no valid length", param.name)))?;
                if rest.len() < len {
                    return Err(invalid_calldata(format!("Calldata ends inside array argument '{}'", param.name)));
                }
                let (items, tail) = rest.split_at(len);
                rest = tail;
                args.push(Value::Ptr(memory.load_segment(items.iter().cloned())));
            }
        }
    }
    if !rest.is_empty() {
        return Err(invalid_calldata(format!("{} unexpected trailing calldata values", rest.len())));
    }
    Ok(args)
}

/// Flatten an entry point's outputs, reading arrays out of memory.
pub fn encode_retdata(outputs: &[AbiParam], values: &[Value], memory: &Memory) -> Result<Vec<Felt>, ExecutionError> {
    let mut retdata = Vec::new();
    for (index, (param, value)) in outputs.iter().zip(values).enumerate() {
        match (param.ty, value) {
            (ValueType::Felt, Value::Felt(v)) => retdata.push(v.clone()),
            (ValueType::FeltPtr, Value::Ptr(ptr)) => {
                let len = match (index.checked_sub(1).map(|prev| (prev, &values[prev])), retdata.last()) {
                    (Some((prev, Value::Felt(_))), Some(len)) if is_len_companion(outputs, prev) => len.to_usize(),
                    _ => None,
                }
                .ok_or_else(|| invalid_calldata(format!("Array output '{}' has no valid length", param.name)))?;
                retdata.extend(memory.get_range(*ptr, len)?);
            }
            _ => {
                return Err(invalid_calldata(format!(
                    "Output '{}' does not match its declared type {}",
                    param.name, param.ty
                )));
            }
        }
    }
    Ok(retdata)
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

    fn sum_fn() -> AbiFunction {
        AbiFunction {
            name: "sum".to_string(),
            inputs: vec![
                param("scale", ValueType::Felt),
                param("values_len", ValueType::Felt),
                param("values", ValueType::FeltPtr),
            ],
            outputs: vec![],
            state_mutability: None,
        }
    }

    #[test]
    fn test_encode_args_fills_len() {
        let calldata = encode_args(&sum_fn(), vec![2u64.into(), vec![5u64, 6].into()]).unwrap();
        let expected: Vec<Felt> = [2u64, 2, 5, 6].into_iter().map(Felt::from).collect();
        assert_eq!(calldata, expected);
    }

    #[test]
    fn test_encode_args_arity_and_kind() {
        assert!(encode_args(&sum_fn(), vec![2u64.into()]).unwrap_err().contains("expected 2 argument(s)"));
        let err = encode_args(&sum_fn(), vec![2u64.into(), 3u64.into()]).unwrap_err();
        assert_eq!(err, "'values' expects an array");
    }

    #[test]
    fn test_decode_then_encode_array() {
        let mut memory = Memory::new();
        let inputs = sum_fn().inputs;
        let calldata: Vec<Felt> = [2u64, 2, 5, 6].into_iter().map(Felt::from).collect();
        let args = decode_calldata(&inputs, &calldata, &mut memory).unwrap();
        assert_eq!(args.len(), 3);
        let retdata = encode_retdata(&inputs, &args, &memory).unwrap();
        assert_eq!(retdata, calldata);
    }

    #[test]
    fn test_decode_rejects_trailing_values() {
        let mut memory = Memory::new();
        let inputs = [param("x", ValueType::Felt)];
        let err = decode_calldata(&inputs, &[Felt::one(), Felt::one()], &mut memory).unwrap_err();
        assert_eq!(err.kind, ExecutionErrorKind::InvalidOperand);
    }
}
