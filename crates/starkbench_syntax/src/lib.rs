//! Syntax frontend for the contract language: lexer, parser, AST, diagnostics.
//!
//! The language is a line-oriented Cairo-0 style dialect: newlines end statements, blocks close with `end`, and
//! newlines inside brackets are ignored.
//!
//! ## Notes
//! - Imports, name resolution and lowering live in the compiler, not here.
//! - Vocabulary identity (keywords/operators/punctuation/decorators) comes from `starkbench_core::lang` registries.
//!
//! ## Examples
//! ```rust
//! use starkbench_syntax::{lexer, parser};
//!
//! let source = "%lang starknet\n\n@view\nfunc one() -> (res : felt):\n    return (res=1)\nend\n";
//! let tokens = lexer::lex(source).unwrap();
//! let program = parser::parse(&tokens).unwrap();
//! assert_eq!(program.items.len(), 2);
//! ```

pub mod ast;
pub mod diagnostics;
pub mod lexer;
pub mod parser;
