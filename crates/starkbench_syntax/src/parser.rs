//! Parser for the contract language
//!
//! Converts a token stream into an AST [`Program`].
//!
//! ## Examples
//!
//! ```rust
//! use starkbench_syntax::{lexer, parser};
//!
//! let source = "func add(a, b) -> (res):\n    return (res=a + b)\nend\n";
//! let tokens = lexer::lex(source).unwrap();
//! let ast = parser::parse(&tokens).unwrap();
//! assert_eq!(ast.items.len(), 1);
//! ```

use crate::ast::*;
use crate::diagnostics::CompileError;
use crate::lexer::{Token, TokenKind};
use starkbench_core::Felt;
use starkbench_core::lang::keywords::KeywordId;
use starkbench_core::lang::operators::OperatorId;
use starkbench_core::lang::punctuation::PunctuationId;

// The parser is one module spread over several files with `include!`, so every chunk sees the private
// `Parser` methods.

include!("parser/core.rs");
include!("parser/helpers.rs");
include!("parser/decl.rs");
include!("parser/stmts.rs");
include!("parser/expr.rs");
include!("parser/tests.rs");
