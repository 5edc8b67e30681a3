//! Built-in library modules (`from starkware... import ...`).
//!
//! The compiler resolves every import under the `starkware.` namespace against this registry instead of the
//! filesystem. Each entry records the signature the checker enforces and the stable [`LibraryFn`] id the runtime
//! dispatches on.
//!
//! ## Notes
//! - Syscalls ([`LibraryFnInfo::is_syscall`]) need the execution context (ledger state, caller, block info).
//!   The rest are pure checks over their arguments.

use super::types::{self, ValueType};

/// Namespace prefix reserved for built-in modules.
pub const LIBRARY_PREFIX: &str = "starkware.";

pub const MODULE_ALLOC: &str = "starkware.cairo.common.alloc";
pub const MODULE_BUILTINS: &str = "starkware.cairo.common.cairo_builtins";
pub const MODULE_MATH: &str = "starkware.cairo.common.math";
pub const MODULE_SYSCALLS: &str = "starkware.starknet.common.syscalls";

/// Every module path the registry knows about.
pub const MODULES: &[&str] = &[MODULE_ALLOC, MODULE_BUILTINS, MODULE_MATH, MODULE_SYSCALLS];

/// Stable identifier for library functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum LibraryFn {
    Alloc,
    CallContract,
    GetContractAddress,
    GetCallerAddress,
    GetBlockNumber,
    GetBlockTimestamp,
    StorageRead,
    StorageWrite,
    EmitEvent,
    AssertNotZero,
    AssertNotEqual,
    AssertNn,
    AssertLe,
    UnsignedDivRem,
}

/// Signature and provenance of a library function.
#[derive(Debug, Clone, Copy)]
pub struct LibraryFnInfo {
    pub id: LibraryFn,
    pub name: &'static str,
    pub module: &'static str,
    pub params: &'static [(&'static str, ValueType)],
    pub outputs: &'static [(&'static str, ValueType)],
    pub is_syscall: bool,
}

const F: ValueType = ValueType::Felt;
const P: ValueType = ValueType::FeltPtr;

const ALLOC: LibraryFnInfo = LibraryFnInfo {
    id: LibraryFn::Alloc,
    name: "alloc",
    module: MODULE_ALLOC,
    params: &[],
    outputs: &[("ptr", P)],
    is_syscall: false,
};

const CALL_CONTRACT: LibraryFnInfo = LibraryFnInfo {
    id: LibraryFn::CallContract,
    name: "call_contract",
    module: MODULE_SYSCALLS,
    params: &[
        ("contract_address", F),
        ("function_selector", F),
        ("calldata_size", F),
        ("calldata", P),
    ],
    outputs: &[("retdata_size", F), ("retdata", P)],
    is_syscall: true,
};

const GET_CONTRACT_ADDRESS: LibraryFnInfo = LibraryFnInfo {
    id: LibraryFn::GetContractAddress,
    name: "get_contract_address",
    module: MODULE_SYSCALLS,
    params: &[],
    outputs: &[("contract_address", F)],
    is_syscall: true,
};

const GET_CALLER_ADDRESS: LibraryFnInfo = LibraryFnInfo {
    id: LibraryFn::GetCallerAddress,
    name: "get_caller_address",
    module: MODULE_SYSCALLS,
    params: &[],
    outputs: &[("caller_address", F)],
    is_syscall: true,
};

const GET_BLOCK_NUMBER: LibraryFnInfo = LibraryFnInfo {
    id: LibraryFn::GetBlockNumber,
    name: "get_block_number",
    module: MODULE_SYSCALLS,
    params: &[],
    outputs: &[("block_number", F)],
    is_syscall: true,
};

const GET_BLOCK_TIMESTAMP: LibraryFnInfo = LibraryFnInfo {
    id: LibraryFn::GetBlockTimestamp,
    name: "get_block_timestamp",
    module: MODULE_SYSCALLS,
    params: &[],
    outputs: &[("block_timestamp", F)],
    is_syscall: true,
};

const STORAGE_READ: LibraryFnInfo = LibraryFnInfo {
    id: LibraryFn::StorageRead,
    name: "storage_read",
    module: MODULE_SYSCALLS,
    params: &[("address", F)],
    outputs: &[("value", F)],
    is_syscall: true,
};

const STORAGE_WRITE: LibraryFnInfo = LibraryFnInfo {
    id: LibraryFn::StorageWrite,
    name: "storage_write",
    module: MODULE_SYSCALLS,
    params: &[("address", F), ("value", F)],
    outputs: &[],
    is_syscall: true,
};

const EMIT_EVENT: LibraryFnInfo = LibraryFnInfo {
    id: LibraryFn::EmitEvent,
    name: "emit_event",
    module: MODULE_SYSCALLS,
    params: &[("keys_len", F), ("keys", P), ("data_len", F), ("data", P)],
    outputs: &[],
    is_syscall: true,
};

const ASSERT_NOT_ZERO: LibraryFnInfo = LibraryFnInfo {
    id: LibraryFn::AssertNotZero,
    name: "assert_not_zero",
    module: MODULE_MATH,
    params: &[("value", F)],
    outputs: &[],
    is_syscall: false,
};

const ASSERT_NOT_EQUAL: LibraryFnInfo = LibraryFnInfo {
    id: LibraryFn::AssertNotEqual,
    name: "assert_not_equal",
    module: MODULE_MATH,
    params: &[("a", F), ("b", F)],
    outputs: &[],
    is_syscall: false,
};

const ASSERT_NN: LibraryFnInfo = LibraryFnInfo {
    id: LibraryFn::AssertNn,
    name: "assert_nn",
    module: MODULE_MATH,
    params: &[("a", F)],
    outputs: &[],
    is_syscall: false,
};

const ASSERT_LE: LibraryFnInfo = LibraryFnInfo {
    id: LibraryFn::AssertLe,
    name: "assert_le",
    module: MODULE_MATH,
    params: &[("a", F), ("b", F)],
    outputs: &[],
    is_syscall: false,
};

const UNSIGNED_DIV_REM: LibraryFnInfo = LibraryFnInfo {
    id: LibraryFn::UnsignedDivRem,
    name: "unsigned_div_rem",
    module: MODULE_MATH,
    params: &[("value", F), ("div", F)],
    outputs: &[("q", F), ("r", F)],
    is_syscall: false,
};

/// Registry of library functions.
pub const LIBRARY_FUNCTIONS: &[LibraryFnInfo] = &[
    ALLOC,
    CALL_CONTRACT,
    GET_CONTRACT_ADDRESS,
    GET_CALLER_ADDRESS,
    GET_BLOCK_NUMBER,
    GET_BLOCK_TIMESTAMP,
    STORAGE_READ,
    STORAGE_WRITE,
    EMIT_EVENT,
    ASSERT_NOT_ZERO,
    ASSERT_NOT_EQUAL,
    ASSERT_NN,
    ASSERT_LE,
    UNSIGNED_DIV_REM,
];

/// What an imported library name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibraryItem {
    Function(LibraryFn),
    /// A builtin struct, only meaningful in implicit argument types.
    Struct,
}

/// Whether a dotted module path belongs to the built-in library namespace.
pub fn is_library_path(path: &str) -> bool {
    path.starts_with(LIBRARY_PREFIX)
}

/// Whether the registry knows the module.
pub fn module_exists(path: &str) -> bool {
    MODULES.contains(&path)
}

/// Resolve `from <module> import <name>`.
pub fn lookup(module: &str, name: &str) -> Option<LibraryItem> {
    if module == MODULE_BUILTINS && types::is_builtin_struct(name) {
        return Some(LibraryItem::Struct);
    }
    LIBRARY_FUNCTIONS
        .iter()
        .find(|f| f.module == module && f.name == name)
        .map(|f| LibraryItem::Function(f.id))
}

/// Signature of a library function.
pub fn info_for(id: LibraryFn) -> &'static LibraryFnInfo {
    match id {
        LibraryFn::Alloc => &ALLOC,
        LibraryFn::CallContract => &CALL_CONTRACT,
        LibraryFn::GetContractAddress => &GET_CONTRACT_ADDRESS,
        LibraryFn::GetCallerAddress => &GET_CALLER_ADDRESS,
        LibraryFn::GetBlockNumber => &GET_BLOCK_NUMBER,
        LibraryFn::GetBlockTimestamp => &GET_BLOCK_TIMESTAMP,
        LibraryFn::StorageRead => &STORAGE_READ,
        LibraryFn::StorageWrite => &STORAGE_WRITE,
        LibraryFn::EmitEvent => &EMIT_EVENT,
        LibraryFn::AssertNotZero => &ASSERT_NOT_ZERO,
        LibraryFn::AssertNotEqual => &ASSERT_NOT_EQUAL,
        LibraryFn::AssertNn => &ASSERT_NN,
        LibraryFn::AssertLe => &ASSERT_LE,
        LibraryFn::UnsignedDivRem => &UNSIGNED_DIV_REM,
    }
}

/// Names exported by a module, for "did you mean" hints.
pub fn exported_names(module: &str) -> Vec<&'static str> {
    let mut names: Vec<&'static str> = LIBRARY_FUNCTIONS
        .iter()
        .filter(|f| f.module == module)
        .map(|f| f.name)
        .collect();
    if module == MODULE_BUILTINS {
        names.extend_from_slice(types::BUILTIN_STRUCTS);
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_function_has_info() {
        let ids = [
            LibraryFn::Alloc,
            LibraryFn::CallContract,
            LibraryFn::GetContractAddress,
            LibraryFn::GetCallerAddress,
            LibraryFn::GetBlockNumber,
            LibraryFn::GetBlockTimestamp,
            LibraryFn::StorageRead,
            LibraryFn::StorageWrite,
            LibraryFn::EmitEvent,
            LibraryFn::AssertNotZero,
            LibraryFn::AssertNotEqual,
            LibraryFn::AssertNn,
            LibraryFn::AssertLe,
            LibraryFn::UnsignedDivRem,
        ];
        for id in ids {
            let info = info_for(id);
            assert_eq!(info.id, id);
            assert!(module_exists(info.module));
            assert_eq!(LIBRARY_FUNCTIONS.iter().filter(|f| f.id == id).count(), 1);
        }
        assert_eq!(LIBRARY_FUNCTIONS.len(), ids.len());
    }

    #[test]
    fn test_syscalls_live_in_the_syscall_module() {
        for info in LIBRARY_FUNCTIONS {
            assert_eq!(info.is_syscall, info.module == MODULE_SYSCALLS, "{}", info.name);
        }
    }

    #[test]
    fn test_lookup_syscall_and_struct() {
        assert_eq!(
            lookup(MODULE_SYSCALLS, "call_contract"),
            Some(LibraryItem::Function(LibraryFn::CallContract))
        );
        assert_eq!(lookup(MODULE_BUILTINS, "HashBuiltin"), Some(LibraryItem::Struct));
        assert_eq!(lookup(MODULE_SYSCALLS, "alloc"), None);
    }

    #[test]
    fn test_library_namespace() {
        assert!(is_library_path("starkware.cairo.common.math"));
        assert!(!is_library_path("contracts.utils"));
    }
}
