//! Bytecode interpreter.
//!
//! One [`ExecutionContext`] runs one transaction against a mutable snapshot of the ledger. Function calls and
//! nested contract calls push frames onto a heap-allocated [`CallStack`] instead of recursing in Rust, so the only
//! bound on nesting is [`StarknetConfig::max_call_depth`].

use std::collections::BTreeSet;
use std::sync::Arc;

use starkbench_core::Felt;
use starkbench_core::errors::{
    ASSERT_EQ_FAILED_MSG, ASSERT_NOT_EQUAL_MSG, ASSERT_NOT_ZERO_MSG, DIVISION_BY_ZERO_MSG, RANGE_CHECK_MSG,
};
use starkbench_core::hash::storage_address;
use starkbench_core::lang::library::{self, LibraryFn};
use tracing::{debug, warn};

use super::calldata::{decode_calldata, encode_retdata};
use super::config::StarknetConfig;
use super::errors::{ExecutionError, ExecutionErrorKind};
use super::memory::{Memory, Relocatable};
use super::result::{CallInfo, Event};
use super::state::StarknetState;
use crate::definition::{AbiParam, ContractDefinition, EntryPointType, Instruction};

/// `assert_nn` accepts values below `2^RANGE_CHECK_BITS`.
const RANGE_CHECK_BITS: u64 = 128;

/// A runtime value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Felt(Felt),
    Ptr(Relocatable),
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Felt(v) => write!(f, "{v}"),
            Value::Ptr(p) => write!(f, "<pointer {p}>"),
        }
    }
}

/// One activation of a compiled function.
struct Frame {
    definition: Arc<ContractDefinition>,
    function: u32,
    /// Current instruction. A frame waiting on a callee stays on its call instruction.
    pc: usize,
    locals: Vec<Option<Value>>,
    stack: Vec<Value>,
    /// Height of the `with_attr` stack when the frame was entered.
    attrs_on_entry: usize,
}

/// Per-call bookkeeping that ends up in [`CallInfo`].
struct CallScope {
    contract_address: Felt,
    caller_address: Felt,
    selector: Felt,
    entry_point_type: EntryPointType,
    calldata: Vec<Felt>,
    outputs: Vec<AbiParam>,
    events: Vec<Event>,
    internal_calls: Vec<CallInfo>,
    accessed_storage_keys: BTreeSet<Felt>,
    start_steps: u64,
    /// Number of frames below this call's entry frame.
    base: usize,
}

/// Active frames and active contract calls, innermost last.
#[derive(Default)]
struct CallStack {
    frames: Vec<Frame>,
    scopes: Vec<CallScope>,
}

/// Control flow after one instruction.
enum Step {
    Next,
    Jump(usize),
    Call {
        function: u32,
        args: Vec<Value>,
    },
    CallContract {
        contract_address: Felt,
        selector: Felt,
        calldata: Vec<Felt>,
    },
    Return(Vec<Value>),
}

pub(crate) struct ExecutionContext<'a> {
    state: &'a mut StarknetState,
    config: &'a StarknetConfig,
    memory: Memory,
    steps: u64,
    /// Active `with_attr` messages across every frame, outermost first.
    attrs: Vec<String>,
}

fn fail(kind: ExecutionErrorKind, message: impl Into<String>) -> ExecutionError {
    ExecutionError::new(kind, message)
}

fn invalid_program(message: impl Into<String>) -> ExecutionError {
    fail(ExecutionErrorKind::InvalidProgram, message)
}

impl<'a> ExecutionContext<'a> {
    pub(crate) fn new(state: &'a mut StarknetState, config: &'a StarknetConfig) -> Self {
        Self {
            state,
            config,
            memory: Memory::new(),
            steps: 0,
            attrs: Vec::new(),
        }
    }

    /// Run an entry point of the contract at `contract_address`.
    pub(crate) fn call_contract(
        &mut self,
        contract_address: Felt,
        selector: Felt,
        entry_point_type: EntryPointType,
        calldata: Vec<Felt>,
        caller_address: Felt,
    ) -> Result<CallInfo, ExecutionError> {
        let mut calls = CallStack::default();
        let outcome = self
            .enter_contract(&mut calls, contract_address, selector, entry_point_type, calldata, caller_address)
            .and_then(|()| self.run(&mut calls));
        outcome.map_err(|err| self.unwind(err, &calls))
    }

    /// Resolve the entry point, decode its calldata and push its frame.
    fn enter_contract(
        &mut self,
        calls: &mut CallStack,
        contract_address: Felt,
        selector: Felt,
        entry_point_type: EntryPointType,
        calldata: Vec<Felt>,
        caller_address: Felt,
    ) -> Result<(), ExecutionError> {
        let definition = self.state.definition_at(&contract_address).ok_or_else(|| {
            fail(
                ExecutionErrorKind::ContractNotFound,
                format!("Requested contract address {contract_address:#x} is not deployed"),
            )
        })?;
        let entry_point = match entry_point_type {
            EntryPointType::External => definition.external_entry_point(&selector),
            EntryPointType::Constructor => definition.constructor(),
        }
        .cloned()
        .ok_or_else(|| {
            fail(
                ExecutionErrorKind::EntryPointNotFound,
                format!("Entry point {selector:#x} not found in contract {contract_address:#x}"),
            )
        })?;
        let abi = definition
            .entry_point_abi(entry_point_type, &entry_point)
            .cloned()
            .ok_or_else(|| invalid_program(format!("Entry point {:#x} has no ABI entry", entry_point.selector)))?;
        debug!(
            contract = %format!("{contract_address:#x}"),
            function = %abi.name,
            calldata_len = calldata.len(),
            depth = calls.frames.len(),
            "dispatching call"
        );

        let args = decode_calldata(&abi.inputs, &calldata, &mut self.memory)?;
        let base = calls.frames.len();
        self.push_frame(calls, definition, entry_point.function, args)?;
        calls.scopes.push(CallScope {
            contract_address,
            caller_address,
            selector: entry_point.selector,
            entry_point_type,
            calldata,
            outputs: abi.outputs,
            events: Vec::new(),
            internal_calls: Vec::new(),
            accessed_storage_keys: BTreeSet::new(),
            start_steps: self.steps,
            base,
        });
        Ok(())
    }

    fn push_frame(
        &self,
        calls: &mut CallStack,
        definition: Arc<ContractDefinition>,
        function: u32,
        args: Vec<Value>,
    ) -> Result<(), ExecutionError> {
        if calls.frames.len() >= self.config.max_call_depth {
            return Err(fail(
                ExecutionErrorKind::CallDepth,
                format!("Exceeded the maximum call depth ({})", self.config.max_call_depth),
            ));
        }
        let code = definition
            .program
            .function(function)
            .ok_or_else(|| invalid_program(format!("Unknown function index {function}")))?;
        if args.len() != code.n_args as usize {
            return Err(invalid_program(format!(
                "Function {} takes {} argument(s), got {}",
                code.name,
                code.n_args,
                args.len()
            )));
        }
        let mut locals: Vec<Option<Value>> = vec![None; (code.n_locals as usize).max(args.len())];
        for (slot, arg) in locals.iter_mut().zip(args) {
            *slot = Some(arg);
        }
        calls.frames.push(Frame {
            definition,
            function,
            pc: 0,
            locals,
            stack: Vec::new(),
            attrs_on_entry: self.attrs.len(),
        });
        Ok(())
    }

    /// Drive the call stack until the outermost call returns.
    fn run(&mut self, calls: &mut CallStack) -> Result<CallInfo, ExecutionError> {
        loop {
            let (Some(frame), Some(scope)) = (calls.frames.last_mut(), calls.scopes.last_mut()) else {
                return Err(invalid_program("No active call frame"));
            };
            match self.step(frame, scope)? {
                Step::Next => frame.pc += 1,
                Step::Jump(target) => frame.pc = target,
                Step::Call { function, args } => {
                    let definition = Arc::clone(&frame.definition);
                    self.push_frame(calls, definition, function, args)?;
                }
                Step::CallContract {
                    contract_address,
                    selector,
                    calldata,
                } => {
                    let caller_address = scope.contract_address.clone();
                    self.enter_contract(
                        calls,
                        contract_address,
                        selector,
                        EntryPointType::External,
                        calldata,
                        caller_address,
                    )?;
                }
                Step::Return(outputs) => {
                    if let Some(call_info) = self.leave_frame(calls, outputs)? {
                        return Ok(call_info);
                    }
                }
            }
        }
    }

    /// Pop the finished frame and hand its outputs to the caller. Yields the outermost [`CallInfo`] once the
    /// frame stack is empty.
    fn leave_frame(&mut self, calls: &mut CallStack, outputs: Vec<Value>) -> Result<Option<CallInfo>, ExecutionError> {
        let frame = calls.frames.pop().ok_or_else(|| invalid_program("No active call frame"))?;
        self.attrs.truncate(frame.attrs_on_entry);

        if calls.scopes.last().map(|scope| scope.base) != Some(calls.frames.len()) {
            let caller = calls.frames.last_mut().ok_or_else(|| invalid_program("Return without a caller"))?;
            caller.stack.extend(outputs);
            caller.pc += 1;
            return Ok(None);
        }

        let scope = calls.scopes.pop().ok_or_else(|| invalid_program("No active contract call"))?;
        let retdata = encode_retdata(&scope.outputs, &outputs, &self.memory)?;
        let call_info = CallInfo {
            contract_address: scope.contract_address,
            caller_address: scope.caller_address,
            selector: scope.selector,
            entry_point_type: scope.entry_point_type,
            calldata: scope.calldata,
            retdata,
            events: scope.events,
            internal_calls: scope.internal_calls,
            accessed_storage_keys: scope.accessed_storage_keys,
            steps: self.steps - scope.start_steps,
        };
        let Some(caller) = calls.frames.last_mut() else {
            return Ok(Some(call_info));
        };
        let retdata_size = Felt::from(call_info.retdata.len());
        let retdata = self.memory.load_segment(call_info.retdata.iter().cloned());
        caller.stack.extend([Value::Felt(retdata_size), Value::Ptr(retdata)]);
        caller.pc += 1;
        let parent = calls.scopes.last_mut().ok_or_else(|| invalid_program("No active contract call"))?;
        parent.internal_calls.push(call_info);
        Ok(None)
    }

    /// Attach the active `with_attr` messages and one source location per live frame, innermost first.
    fn unwind(&self, mut err: ExecutionError, calls: &CallStack) -> ExecutionError {
        if err.error_attrs.is_empty() {
            err.error_attrs = self.attrs.clone();
        }
        for frame in calls.frames.iter().rev() {
            let location = frame
                .definition
                .program
                .debug_info
                .as_ref()
                .and_then(|info| info.describe(frame.function, frame.pc));
            err.trace.extend(location);
        }
        err
    }

    /// Execute the instruction at `frame.pc`. On error, `frame.pc` stays on the failing instruction.
    fn step(&mut self, frame: &mut Frame, scope: &mut CallScope) -> Result<Step, ExecutionError> {
        let code = frame
            .definition
            .program
            .function(frame.function)
            .ok_or_else(|| invalid_program(format!("Unknown function index {}", frame.function)))?;
        let Some(instruction) = code.code.get(frame.pc) else {
            if code.n_outputs == 0 {
                return Ok(Step::Return(Vec::new()));
            }
            return Err(invalid_program(format!("Function {} ended without returning", code.name)));
        };
        self.steps += 1;
        if self.steps > self.config.max_steps {
            return Err(fail(
                ExecutionErrorKind::StepLimit,
                format!("Exceeded the maximum number of steps ({})", self.config.max_steps),
            ));
        }

        let stack = &mut frame.stack;
        match instruction {
            Instruction::PushConst(value) => stack.push(Value::Felt(value.clone())),
            Instruction::LoadLocal(slot) => {
                let value = frame
                    .locals
                    .get(*slot as usize)
                    .and_then(Option::as_ref)
                    .cloned()
                    .ok_or_else(|| invalid_program(format!("Local slot {slot} is not initialized")))?;
                stack.push(value);
            }
            Instruction::StoreLocal(slot) => {
                let value = pop(stack)?;
                let cell = frame
                    .locals
                    .get_mut(*slot as usize)
                    .ok_or_else(|| invalid_program(format!("Local slot {slot} is out of range")))?;
                *cell = Some(value);
            }
            Instruction::Pop => {
                pop(stack)?;
            }
            Instruction::Add | Instruction::Sub | Instruction::Mul | Instruction::Div => {
                let rhs = pop_felt(stack)?;
                let lhs = pop_felt(stack)?;
                let value = match instruction {
                    Instruction::Add => lhs + rhs,
                    Instruction::Sub => lhs - rhs,
                    Instruction::Mul => lhs * rhs,
                    _ => lhs
                        .checked_div(&rhs)
                        .ok_or_else(|| fail(ExecutionErrorKind::DivisionByZero, DIVISION_BY_ZERO_MSG))?,
                };
                stack.push(Value::Felt(value));
            }
            Instruction::Neg => {
                let value = pop_felt(stack)?;
                stack.push(Value::Felt(-value));
            }
            Instruction::AssertEq => {
                let rhs = pop(stack)?;
                let lhs = pop(stack)?;
                if lhs != rhs {
                    return Err(fail(
                        ExecutionErrorKind::AssertEq,
                        format!("{ASSERT_EQ_FAILED_MSG}: {lhs} != {rhs}"),
                    ));
                }
            }
            Instruction::Index => {
                let addr = pop_address(stack)?;
                let value = self.memory.get(addr)?.clone();
                stack.push(Value::Felt(value));
            }
            Instruction::AssertIndex => {
                let value = pop_felt(stack)?;
                let addr = pop_address(stack)?;
                self.memory.insert(addr, value)?;
            }
            Instruction::NewArray(len) => {
                let items = pop_n(stack, *len as usize)?
                    .into_iter()
                    .map(expect_felt)
                    .collect::<Result<Vec<_>, _>>()?;
                stack.push(Value::Ptr(self.memory.load_segment(items)));
            }
            Instruction::Jump(target) => return Ok(Step::Jump(*target as usize)),
            Instruction::JumpIfZero(target) => {
                if pop_felt(stack)?.is_zero() {
                    return Ok(Step::Jump(*target as usize));
                }
            }
            Instruction::JumpIfNonZero(target) => {
                if !pop_felt(stack)?.is_zero() {
                    return Ok(Step::Jump(*target as usize));
                }
            }
            Instruction::Call(callee) => {
                let n_args = frame
                    .definition
                    .program
                    .function(*callee)
                    .map(|f| f.n_args as usize)
                    .ok_or_else(|| invalid_program(format!("Unknown function index {callee}")))?;
                let args = pop_n(stack, n_args)?;
                return Ok(Step::Call { function: *callee, args });
            }
            Instruction::CallLibrary(id) => {
                let info = library::info_for(*id);
                let args = pop_n(stack, info.params.len())?;
                if *id == LibraryFn::CallContract {
                    let mut args = args.into_iter();
                    let contract_address = take_felt(&mut args)?;
                    let selector = take_felt(&mut args)?;
                    let calldata_size = take_felt(&mut args)?;
                    let calldata_ptr = take_ptr(&mut args)?;
                    let calldata = self.memory.get_range(calldata_ptr, length(&calldata_size)?)?;
                    return Ok(Step::CallContract {
                        contract_address,
                        selector,
                        calldata,
                    });
                }
                let outputs = if info.is_syscall {
                    self.syscall(scope, *id, args)?
                } else {
                    self.builtin(*id, args)?
                };
                stack.extend(outputs);
            }
            Instruction::Return => {
                let outputs = pop_n(stack, code.n_outputs as usize)?;
                return Ok(Step::Return(outputs));
            }
            Instruction::StorageAddr { var, n_keys } => {
                let keys = pop_n(stack, *n_keys as usize)?
                    .into_iter()
                    .map(expect_felt)
                    .collect::<Result<Vec<_>, _>>()?;
                let name = frame
                    .definition
                    .program
                    .storage_vars
                    .get(*var as usize)
                    .ok_or_else(|| invalid_program(format!("Unknown storage variable {var}")))?;
                stack.push(Value::Felt(storage_address(name, &keys)));
            }
            Instruction::StorageRead => {
                let key = pop_felt(stack)?;
                let value = self.storage_read(scope, key);
                stack.push(Value::Felt(value));
            }
            Instruction::StorageWrite => {
                let value = pop_felt(stack)?;
                let key = pop_felt(stack)?;
                self.storage_write(scope, key, value);
            }
            Instruction::EnterAttr(index) => {
                let message = frame
                    .definition
                    .program
                    .error_messages
                    .get(*index as usize)
                    .ok_or_else(|| invalid_program(format!("Unknown error message {index}")))?;
                self.attrs.push(message.clone());
            }
            Instruction::ExitAttr => {
                self.attrs.pop();
            }
            Instruction::Hint(index) => {
                warn!(function = %code.name, hint = index, "hint skipped; hints are not executed");
            }
        }
        Ok(Step::Next)
    }

    fn storage_read(&mut self, scope: &mut CallScope, key: Felt) -> Felt {
        let value = self.state.storage_read(&scope.contract_address, &key);
        scope.accessed_storage_keys.insert(key);
        value
    }

    fn storage_write(&mut self, scope: &mut CallScope, key: Felt, value: Felt) {
        self.state.storage_write(&scope.contract_address, key.clone(), value);
        scope.accessed_storage_keys.insert(key);
    }

    /// Syscalls other than `call_contract`, which the interpreter turns into a new frame.
    fn syscall(&mut self, scope: &mut CallScope, id: LibraryFn, args: Vec<Value>) -> Result<Vec<Value>, ExecutionError> {
        let mut args = args.into_iter();
        let outputs = match id {
            LibraryFn::GetContractAddress => vec![Value::Felt(scope.contract_address.clone())],
            LibraryFn::GetCallerAddress => vec![Value::Felt(scope.caller_address.clone())],
            LibraryFn::GetBlockNumber => vec![Value::Felt(Felt::from(self.state.block_info.block_number))],
            LibraryFn::GetBlockTimestamp => vec![Value::Felt(Felt::from(self.state.block_info.block_timestamp))],
            LibraryFn::StorageRead => {
                let key = take_felt(&mut args)?;
                vec![Value::Felt(self.storage_read(scope, key))]
            }
            LibraryFn::StorageWrite => {
                let key = take_felt(&mut args)?;
                let value = take_felt(&mut args)?;
                self.storage_write(scope, key, value);
                Vec::new()
            }
            LibraryFn::EmitEvent => {
                let keys_len = take_felt(&mut args)?;
                let keys_ptr = take_ptr(&mut args)?;
                let data_len = take_felt(&mut args)?;
                let data_ptr = take_ptr(&mut args)?;
                let keys = self.memory.get_range(keys_ptr, length(&keys_len)?)?;
                let data = self.memory.get_range(data_ptr, length(&data_len)?)?;
                scope.events.push(Event {
                    from_address: scope.contract_address.clone(),
                    keys,
                    data,
                });
                Vec::new()
            }
            other => return Err(invalid_program(format!("{other:?} is not dispatched as a syscall"))),
        };
        Ok(outputs)
    }

    /// Library functions that only look at their arguments and memory.
    fn builtin(&mut self, id: LibraryFn, args: Vec<Value>) -> Result<Vec<Value>, ExecutionError> {
        let mut args = args.into_iter();
        let outputs = match id {
            LibraryFn::Alloc => vec![Value::Ptr(self.memory.add_segment())],
            LibraryFn::AssertNotZero => {
                if take_felt(&mut args)?.is_zero() {
                    return Err(fail(ExecutionErrorKind::AssertNotZero, ASSERT_NOT_ZERO_MSG));
                }
                Vec::new()
            }
            LibraryFn::AssertNotEqual => {
                let a = take_felt(&mut args)?;
                let b = take_felt(&mut args)?;
                if a == b {
                    return Err(fail(ExecutionErrorKind::AssertNotEqual, ASSERT_NOT_EQUAL_MSG));
                }
                Vec::new()
            }
            LibraryFn::AssertNn => {
                let a = take_felt(&mut args)?;
                check_range(&a)?;
                Vec::new()
            }
            LibraryFn::AssertLe => {
                let a = take_felt(&mut args)?;
                let b = take_felt(&mut args)?;
                check_range(&(b - a))?;
                Vec::new()
            }
            LibraryFn::UnsignedDivRem => {
                let value = take_felt(&mut args)?;
                let div = take_felt(&mut args)?;
                let (q, r) = value
                    .div_rem(&div)
                    .ok_or_else(|| fail(ExecutionErrorKind::DivisionByZero, DIVISION_BY_ZERO_MSG))?;
                check_range(&q)?;
                vec![Value::Felt(q), Value::Felt(r)]
            }
            other => return Err(invalid_program(format!("{other:?} needs the execution context"))),
        };
        Ok(outputs)
    }
}

fn check_range(value: &Felt) -> Result<(), ExecutionError> {
    if value.bits() <= RANGE_CHECK_BITS {
        Ok(())
    } else {
        Err(fail(ExecutionErrorKind::RangeCheck, format!("{RANGE_CHECK_MSG}: {value}")))
    }
}

fn take_felt(args: &mut impl Iterator<Item = Value>) -> Result<Felt, ExecutionError> {
    args.next()
        .ok_or_else(|| invalid_program("Missing library argument"))
        .and_then(expect_felt)
}

fn take_ptr(args: &mut impl Iterator<Item = Value>) -> Result<Relocatable, ExecutionError> {
    match args.next() {
        Some(Value::Ptr(ptr)) => Ok(ptr),
        Some(Value::Felt(v)) => Err(fail(
            ExecutionErrorKind::InvalidOperand,
            format!("Expected a pointer, found felt {v}"),
        )),
        None => Err(invalid_program("Missing library argument")),
    }
}

fn length(value: &Felt) -> Result<usize, ExecutionError> {
    value
        .to_usize()
        .ok_or_else(|| fail(ExecutionErrorKind::InvalidOperand, format!("Length {value} is too large")))
}

fn pop(stack: &mut Vec<Value>) -> Result<Value, ExecutionError> {
    stack.pop().ok_or_else(|| invalid_program("Operand stack underflow"))
}

/// Pop `n` values, first pushed first.
fn pop_n(stack: &mut Vec<Value>, n: usize) -> Result<Vec<Value>, ExecutionError> {
    let start = stack
        .len()
        .checked_sub(n)
        .ok_or_else(|| invalid_program("Operand stack underflow"))?;
    Ok(stack.split_off(start))
}

fn expect_felt(value: Value) -> Result<Felt, ExecutionError> {
    match value {
        Value::Felt(v) => Ok(v),
        Value::Ptr(p) => Err(fail(
            ExecutionErrorKind::InvalidOperand,
            format!("Expected a felt, found pointer {p}"),
        )),
    }
}

fn pop_felt(stack: &mut Vec<Value>) -> Result<Felt, ExecutionError> {
    pop(stack).and_then(expect_felt)
}

/// Pop `index` then `ptr`, returning `ptr + index`.
fn pop_address(stack: &mut Vec<Value>) -> Result<Relocatable, ExecutionError> {
    let index = pop_felt(stack)?;
    let base = match pop(stack)? {
        Value::Ptr(p) => p,
        Value::Felt(v) => {
            return Err(fail(
                ExecutionErrorKind::InvalidOperand,
                format!("Expected a pointer, found felt {v}"),
            ));
        }
    };
    let offset = index
        .to_usize()
        .and_then(|i| base.offset.checked_add(i))
        .ok_or_else(|| fail(ExecutionErrorKind::Memory, format!("Index {index} is out of bounds")))?;
    Ok(Relocatable {
        segment: base.segment,
        offset,
    })
}
