//! Module scopes and the contract-wide function and storage tables.

use std::collections::HashMap;

use starkbench_core::Felt;
use starkbench_core::lang::decorators::DecoratorId;
use starkbench_core::lang::library::LibraryFn;
use starkbench_core::lang::types::ValueType;
use starkbench_syntax::ast::Span;

/// Index into [`FunctionTable::functions`]; equal to the function's index in the compiled program.
pub type FunctionId = u32;

/// Index into [`FunctionTable::storage_vars`].
pub type StorageVarId = u32;

/// What a top-level name refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Symbol {
    Const(Felt),
    Function(FunctionId),
    StorageVar(StorageVarId),
    Library(LibraryFn),
    /// `HashBuiltin` and friends; only usable in implicit argument types.
    BuiltinStruct,
}

impl Symbol {
    /// Short description for "'x' is a ..." messages.
    pub fn describe(&self) -> &'static str {
        match self {
            Symbol::Const(_) => "constant",
            Symbol::Function(_) | Symbol::Library(_) => "function",
            Symbol::StorageVar(_) => "storage variable",
            Symbol::BuiltinStruct => "builtin struct",
        }
    }
}

/// Top-level names visible in one module: its own definitions plus its imports.
#[derive(Debug, Default)]
pub struct ModuleScope {
    symbols: HashMap<String, (Symbol, Span)>,
}

impl ModuleScope {
    /// Bind a name; returns the previous definition's span if the name was taken.
    pub fn define(&mut self, name: &str, symbol: Symbol, span: Span) -> Result<(), Span> {
        if let Some((_, previous)) = self.symbols.get(name) {
            return Err(*previous);
        }
        self.symbols.insert(name.to_string(), (symbol, span));
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name).map(|(symbol, _)| symbol)
    }
}

/// A named, typed parameter or output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub ty: ValueType,
}

#[derive(Debug, Clone)]
pub struct FunctionSig {
    /// `module.name`
    pub qualified_name: String,
    pub name: String,
    /// Index of the module scope the body resolves names in.
    pub module: usize,
    pub params: Vec<Param>,
    pub outputs: Vec<Param>,
    /// `@external`, `@view` or `@constructor`.
    pub decorator: Option<DecoratorId>,
}

#[derive(Debug, Clone)]
pub struct StorageVarSig {
    pub name: String,
    pub keys: Vec<String>,
}

/// Functions and storage variables of the whole contract.
#[derive(Debug, Default)]
pub struct FunctionTable {
    pub functions: Vec<FunctionSig>,
    pub storage_vars: Vec<StorageVarSig>,
}

impl FunctionTable {
    pub fn function(&self, id: FunctionId) -> Option<&FunctionSig> {
        self.functions.get(id as usize)
    }

    pub fn storage_var(&self, id: StorageVarId) -> Option<&StorageVarSig> {
        self.storage_vars.get(id as usize)
    }
}
