//! Define the reserved keyword vocabulary of the contract language.
//!
//! This module is the single source of truth for reserved words: a stable identifier ([`KeywordId`]) plus a const
//! metadata table ([`KEYWORDS`]).
//!
//! ## Notes
//! - Lookup via [`from_str`] is **case-sensitive**.
//! - `felt` is *not* a keyword; it is a builtin type name (see [`crate::lang::types`]).
//!
//! ## Examples
//! ```rust
//! use starkbench_core::lang::keywords::{self, KeywordId};
//!
//! assert_eq!(keywords::from_str("tempvar"), Some(KeywordId::Tempvar));
//! assert_eq!(keywords::from_str("felt"), None);
//! ```

use super::registry::{self, LangItemInfo};

/// Stable identifier for every reserved keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordId {
    // Declarations
    Func,
    End,
    Const,
    From,
    Import,
    As,

    // Bindings
    Let,
    Local,
    Tempvar,
    AllocLocals,

    // Statements
    Return,
    Assert,
    If,
    Else,
    WithAttr,

    // Expressions
    New,
}

/// Metadata for a keyword.
pub type KeywordInfo = LangItemInfo<KeywordId>;

/// Registry of all keywords.
pub const KEYWORDS: &[KeywordInfo] = &[
    info(KeywordId::Func, "func", "Declare a function."),
    info(KeywordId::End, "end", "Close a function, `if` or `with_attr` block."),
    info(KeywordId::Const, "const", "Declare a compile-time constant."),
    info(KeywordId::From, "from", "Start an import: `from a.b import c`."),
    info(KeywordId::Import, "import", "Name the imported items."),
    info(KeywordId::As, "as", "Rename an imported item."),
    info(KeywordId::Let, "let", "Bind a name (rebinding allowed)."),
    info(KeywordId::Local, "local", "Bind a local variable."),
    info(KeywordId::Tempvar, "tempvar", "Bind a temporary variable."),
    info(KeywordId::AllocLocals, "alloc_locals", "Reserve the local frame (accepted, no effect)."),
    info(KeywordId::Return, "return", "Return from the current function."),
    info(KeywordId::Assert, "assert", "Assert equality, or write a memory cell."),
    info(KeywordId::If, "if", "Conditional on `==` / `!=`."),
    info(KeywordId::Else, "else", "Alternative branch of an `if`."),
    info(KeywordId::WithAttr, "with_attr", "Attach an error message to a block."),
    info(KeywordId::New, "new", "Allocate a fresh array from a tuple of values."),
];

/// Resolve a spelling to a keyword id.
pub fn from_str(spelling: &str) -> Option<KeywordId> {
    registry::lookup(KEYWORDS, spelling)
}

/// Canonical spelling of a keyword.
pub fn as_str(id: KeywordId) -> &'static str {
    match id {
        KeywordId::Func => "func",
        KeywordId::End => "end",
        KeywordId::Const => "const",
        KeywordId::From => "from",
        KeywordId::Import => "import",
        KeywordId::As => "as",
        KeywordId::Let => "let",
        KeywordId::Local => "local",
        KeywordId::Tempvar => "tempvar",
        KeywordId::AllocLocals => "alloc_locals",
        KeywordId::Return => "return",
        KeywordId::Assert => "assert",
        KeywordId::If => "if",
        KeywordId::Else => "else",
        KeywordId::WithAttr => "with_attr",
        KeywordId::New => "new",
    }
}

const fn info(id: KeywordId, canonical: &'static str, description: &'static str) -> KeywordInfo {
    LangItemInfo {
        id,
        canonical,
        aliases: &[],
        description,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_round_trips_every_keyword() {
        for item in KEYWORDS {
            assert_eq!(from_str(item.canonical), Some(item.id));
            assert_eq!(as_str(item.id), item.canonical);
        }
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        assert_eq!(from_str("Func"), None);
    }
}
