//! Contract language vocabulary registries.
//!
//! This module is the “front door” for language-level vocabulary: reserved keywords, decorators,
//! and the built-in library modules that `from starkware... import ...` resolves against.
//!
//! The design goal is to avoid stringly-typed checks scattered across the compiler and runtime.
//! Instead, callers work with **stable IDs** (e.g. `KeywordId`, `DecoratorId`, `LibraryFn`) and look up
//! spellings/metadata via registry tables.
//!
//! ## Notes
//! - Registries are intentionally **pure**: no AST types, no IO, no side effects.
//! - The lexer/parser enforce syntax; registries provide spellings and metadata for shared use.
//!
//! ## Examples
//! ```rust
//! use starkbench_core::lang::keywords::{self, KeywordId};
//!
//! assert_eq!(keywords::from_str("func"), Some(KeywordId::Func));
//! assert_eq!(keywords::as_str(KeywordId::Func), "func");
//! ```

pub mod decorators;
pub mod keywords;
pub mod library;
pub mod operators;
pub mod punctuation;
pub mod registry;
pub mod types;
