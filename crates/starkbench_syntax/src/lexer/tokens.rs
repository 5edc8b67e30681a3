//! Tokens produced by [`super::lex`].
//!
//! Reserved words, operators and punctuation carry the registry ids from `starkbench_core::lang`, so the parser
//! matches on ids and never on spellings. Integer literals keep their source text: the parser turns them into field
//! elements, which lets it report out-of-range literals with normal error recovery.

use crate::ast::Span;
use starkbench_core::lang::keywords::{self, KeywordId};
use starkbench_core::lang::operators::{self, OperatorId};
use starkbench_core::lang::punctuation::{self, PunctuationId};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Keyword(KeywordId),
    Operator(OperatorId),
    Punctuation(PunctuationId),

    Ident(String),
    /// Decimal or `0x` hex literal, as written.
    Int(String),
    /// `"..."`
    String(String),
    /// `'...'`
    ShortString(String),

    /// `%lang`, `%builtins`: the word after `%`.
    Directive(String),
    /// `%{ ... %}`: the code between the markers.
    Hint(String),

    Newline,
    Eof,
}

impl TokenKind {
    pub fn is_keyword(&self, id: KeywordId) -> bool {
        *self == TokenKind::Keyword(id)
    }

    pub fn is_operator(&self, id: OperatorId) -> bool {
        *self == TokenKind::Operator(id)
    }

    pub fn is_punctuation(&self, id: PunctuationId) -> bool {
        *self == TokenKind::Punctuation(id)
    }

    /// What an error message calls this token ("found ...").
    pub fn describe(&self) -> String {
        let quoted = |text: &str| format!("'{text}'");
        match self {
            TokenKind::Keyword(id) => quoted(keywords::as_str(*id)),
            TokenKind::Operator(id) => quoted(operators::as_str(*id)),
            TokenKind::Punctuation(id) => quoted(punctuation::as_str(*id)),
            TokenKind::Ident(name) => format!("identifier '{name}'"),
            TokenKind::Int(text) => format!("integer {text}"),
            TokenKind::String(_) => "string literal".into(),
            TokenKind::ShortString(_) => "short string literal".into(),
            TokenKind::Directive(name) => format!("directive '%{name}'"),
            TokenKind::Hint(_) => "hint".into(),
            TokenKind::Newline => "end of line".into(),
            TokenKind::Eof => "end of file".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// The keyword spelled `name`, if `name` is reserved.
pub fn keyword_id(name: &str) -> Option<KeywordId> {
    keywords::from_str(name)
}
