//! Punctuation vocabulary.
//!
//! ## Notes
//! - This module is vocabulary only (spellings). It does not tokenize source text.
//!
//! ## Examples
//! ```rust
//! use starkbench_core::lang::punctuation::{self, PunctuationId};
//!
//! assert_eq!(punctuation::from_str("->"), Some(PunctuationId::Arrow));
//! assert_eq!(punctuation::as_str(PunctuationId::LBrace), "{");
//! ```

/// Stable identifier for punctuation tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PunctuationId {
    Comma,
    Colon,
    Dot,
    At,
    Arrow,

    // Delimiters
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
}

/// Registry of all punctuation tokens, as `(id, spelling)` pairs.
pub const PUNCTUATION: &[(PunctuationId, &str)] = &[
    (PunctuationId::Comma, ","),
    (PunctuationId::Colon, ":"),
    (PunctuationId::Dot, "."),
    (PunctuationId::At, "@"),
    (PunctuationId::Arrow, "->"),
    (PunctuationId::LParen, "("),
    (PunctuationId::RParen, ")"),
    (PunctuationId::LBracket, "["),
    (PunctuationId::RBracket, "]"),
    (PunctuationId::LBrace, "{"),
    (PunctuationId::RBrace, "}"),
];

/// Resolve a punctuation spelling.
pub fn from_str(spelling: &str) -> Option<PunctuationId> {
    PUNCTUATION.iter().find(|(_, s)| *s == spelling).map(|(id, _)| *id)
}

/// Canonical spelling of a punctuation token.
pub fn as_str(id: PunctuationId) -> &'static str {
    match id {
        PunctuationId::Comma => ",",
        PunctuationId::Colon => ":",
        PunctuationId::Dot => ".",
        PunctuationId::At => "@",
        PunctuationId::Arrow => "->",
        PunctuationId::LParen => "(",
        PunctuationId::RParen => ")",
        PunctuationId::LBracket => "[",
        PunctuationId::RBracket => "]",
        PunctuationId::LBrace => "{",
        PunctuationId::RBrace => "}",
    }
}

impl PunctuationId {
    /// Whether this token opens a bracketed group.
    pub fn is_open_delimiter(self) -> bool {
        matches!(self, PunctuationId::LParen | PunctuationId::LBracket | PunctuationId::LBrace)
    }
}
