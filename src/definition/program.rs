//! Bytecode for compiled functions.
//!
//! Functions run on a stack machine. Operands are field elements or pointers to write-once memory segments; each
//! frame has `n_locals` slots, the first `n_args` of which hold the arguments.

use serde::{Deserialize, Serialize};
use starkbench_core::Felt;
use starkbench_core::lang::library::LibraryFn;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    /// From `%builtins`; recorded, not enforced.
    pub builtins: Vec<String>,
    pub functions: Vec<FunctionCode>,
    /// Storage variable names; [`Instruction::StorageAddr`] indexes this table.
    pub storage_vars: Vec<String>,
    /// `with_attr error_message(...)` texts; [`Instruction::EnterAttr`] indexes this table.
    pub error_messages: Vec<String>,
    /// Hint code, kept for inspection. Hints are never executed.
    pub hints: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_info: Option<DebugInfo>,
}

impl Program {
    pub fn function(&self, index: u32) -> Option<&FunctionCode> {
        self.functions.get(index as usize)
    }

    pub fn function_index(&self, name: &str) -> Option<u32> {
        self.functions
            .iter()
            .position(|f| f.name == name)
            .and_then(|i| u32::try_from(i).ok())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCode {
    /// Qualified name, e.g. `__main__.call_self`.
    pub name: String,
    pub n_args: u32,
    pub n_outputs: u32,
    /// Total frame slots, arguments included.
    pub n_locals: u32,
    pub code: Vec<Instruction>,
}

impl FunctionCode {
    /// Name without the module prefix.
    pub fn short_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Instruction {
    PushConst(Felt),
    LoadLocal(u32),
    StoreLocal(u32),
    /// Discard the top of the stack.
    Pop,

    // Field arithmetic on the two topmost felts
    Add,
    Sub,
    Mul,
    Div,
    Neg,

    /// Pop `rhs`, `lhs`; fail unless equal.
    AssertEq,
    /// Pop `index`, `ptr`; push the cell. Reading an unset cell fails.
    Index,
    /// Pop `value`, `index`, `ptr`; write-once store.
    AssertIndex,
    /// Pop `n` felts (first pushed is element 0) into a fresh segment; push its pointer.
    NewArray(u32),

    /// Absolute jump within the function.
    Jump(u32),
    /// Pop a felt; jump if it is zero.
    JumpIfZero(u32),
    /// Pop a felt; jump if it is non-zero.
    JumpIfNonZero(u32),

    /// Call a function of this program; arguments are on the stack, outputs are pushed in order.
    Call(u32),
    CallLibrary(LibraryFn),
    /// Return the top `n_outputs` values.
    Return,

    /// Pop `n_keys` felts; push the storage address of `storage_vars[var]` for those keys.
    StorageAddr { var: u32, n_keys: u32 },
    /// Pop an address; push the stored value (zero if never written).
    StorageRead,
    /// Pop `value`, `address`; store.
    StorageWrite,

    /// Enter a `with_attr` scope with `error_messages[i]`.
    EnterAttr(u32),
    ExitAttr,
    /// Marker for `hints[i]`; no effect.
    Hint(u32),
}

/// Source locations, parallel to [`Program::functions`] and each function's `code`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugInfo {
    pub files: Vec<String>,
    pub instruction_locations: Vec<Vec<Location>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Index into [`DebugInfo::files`].
    pub file: u32,
    pub line: u32,
    pub column: u32,
}

impl DebugInfo {
    /// `file:line:column` for an instruction.
    pub fn describe(&self, function: u32, pc: usize) -> Option<String> {
        let location = self.instruction_locations.get(function as usize)?.get(pc)?;
        let file = self.files.get(location.file as usize)?;
        Some(format!("{}:{}:{}", file, location.line, location.column))
    }
}
