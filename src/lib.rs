#![forbid(unsafe_code)]
//! starkbench: compile, deploy and exercise StarkNet-style contracts in an in-process simulated ledger.
//!
//! The crate has three layers:
//!
//! - [`compiler`]: contract sources to a [`definition::ContractDefinition`] (bytecode, entry points, ABI).
//! - [`runtime`]: the simulated ledger ([`runtime::Starknet`]) that deploys definitions and executes calls.
//! - [`testing`]: module-scoped fixtures that compile, deploy and share contracts across the tests of one module.
//!
//! ## Panic Policy
//!
//! This codebase follows explicit error handling:
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` and `runtime` modules
//!   enforce `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.

pub mod cli;
pub mod compiler;
pub mod definition;
pub mod error;
pub mod runtime;
pub mod testing;

pub use starkbench_core::Felt;
pub use starkbench_core::hash::get_selector_from_name;
pub use starkbench_syntax::{ast, diagnostics, lexer, parser};

pub use compiler::{CompilationError, CompileOptions, compile_starknet_file, compile_starknet_files};
pub use definition::ContractDefinition;
pub use error::{Error, Result};
pub use runtime::{Starknet, StarknetContract};
