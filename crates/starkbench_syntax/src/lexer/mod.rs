//! Lexer for the contract language
//!
//! The dialect is line oriented. A statement ends at a newline unless the newline sits inside `()`, `[]` or `{}`;
//! blank lines and `#` comments produce no tokens. Besides the usual identifiers, keywords, operators and literals
//! the lexer recognizes `%lang`/`%builtins` directives and `%{ ... %}` hint blocks, whose bodies are kept verbatim.
//!
//! Submodules: `tokens` (token types), `strings` (quoted literals and hints), `numbers` (integer literals).

mod numbers;
mod strings;
pub mod tokens;

pub use tokens::{Token, TokenKind, keyword_id};

use crate::ast::Span;
use crate::diagnostics::CompileError;
use starkbench_core::lang::operators::OperatorId;
use starkbench_core::lang::punctuation::PunctuationId;

/// Single-character tokens that never combine with the next character.
fn single_char_token(c: char) -> Option<TokenKind> {
    let kind = match c {
        '+' => TokenKind::Operator(OperatorId::Plus),
        '*' => TokenKind::Operator(OperatorId::Star),
        '/' => TokenKind::Operator(OperatorId::Slash),
        ',' => TokenKind::Punctuation(PunctuationId::Comma),
        ':' => TokenKind::Punctuation(PunctuationId::Colon),
        '.' => TokenKind::Punctuation(PunctuationId::Dot),
        '@' => TokenKind::Punctuation(PunctuationId::At),
        _ => return None,
    };
    Some(kind)
}

/// Source cursor plus the tokens and errors produced so far.
///
/// The token stream never holds two consecutive `Newline`s, and a non-empty file always ends with `Newline, Eof`.
pub struct Lexer<'a> {
    source: &'a str,
    /// Byte offset of the next unread character.
    pos: usize,
    /// Nothing but whitespace and comments since the last emitted `Newline`.
    line_is_blank: bool,
    /// Open `(`, `[` and `{` count; newlines are ignored while it is non-zero.
    depth: usize,
    tokens: Vec<Token>,
    errors: Vec<CompileError>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            line_is_blank: true,
            depth: 0,
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Consume the whole source. Every bad character is reported, not only the first.
    pub fn tokenize(mut self) -> Result<Vec<Token>, Vec<CompileError>> {
        while self.pos < self.source.len() {
            self.next_token();
        }

        let end = self.pos;
        if self.depth > 0 {
            self.error_at("Unclosed bracket at end of file", end);
        }
        if !self.line_is_blank {
            self.tokens.push(Token::new(TokenKind::Newline, Span::new(end, end)));
        }
        self.tokens.push(Token::new(TokenKind::Eof, Span::new(end, end)));

        match self.errors.is_empty() {
            true => Ok(self.tokens),
            false => Err(self.errors),
        }
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_next(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Consume `expected` if it is next.
    fn eat(&mut self, expected: char) -> bool {
        let found = self.peek() == Some(expected);
        if found {
            self.pos += expected.len_utf8();
        }
        found
    }

    /// Consume characters while `pred` holds and return them.
    fn eat_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        let len = self
            .rest()
            .find(|c: char| !pred(c))
            .unwrap_or(self.source.len() - start);
        self.pos += len;
        &self.source[start..self.pos]
    }

    fn emit(&mut self, kind: TokenKind, start: usize) {
        self.tokens.push(Token::new(kind, Span::new(start, self.pos)));
    }

    fn error_at(&mut self, message: impl Into<String>, start: usize) {
        self.errors.push(CompileError::syntax(message.into(), Span::new(start, self.pos)));
    }

    fn next_token(&mut self) {
        self.eat_while(|c| matches!(c, ' ' | '\t' | '\r'));
        let start = self.pos;
        let Some(c) = self.bump() else {
            return;
        };

        if let Some(kind) = single_char_token(c) {
            self.emit(kind, start);
            self.line_is_blank = false;
            return;
        }

        match c {
            '#' => {
                self.eat_while(|c| c != '\n');
                return;
            }
            '\n' => {
                if self.depth == 0 && !self.line_is_blank {
                    self.emit(TokenKind::Newline, start);
                    self.line_is_blank = true;
                }
                return;
            }
            '%' if self.eat('{') => self.scan_hint(start),
            '%' => self.scan_directive(start),
            '-' if self.eat('>') => self.emit(TokenKind::Punctuation(PunctuationId::Arrow), start),
            '-' => self.emit(TokenKind::Operator(OperatorId::Minus), start),
            '=' if self.eat('=') => self.emit(TokenKind::Operator(OperatorId::EqEq), start),
            '=' => self.emit(TokenKind::Operator(OperatorId::Eq), start),
            '!' if self.eat('=') => self.emit(TokenKind::Operator(OperatorId::NotEq), start),
            '(' => self.open(PunctuationId::LParen, start),
            '[' => self.open(PunctuationId::LBracket, start),
            '{' => self.open(PunctuationId::LBrace, start),
            ')' => self.close(PunctuationId::RParen, start),
            ']' => self.close(PunctuationId::RBracket, start),
            '}' => self.close(PunctuationId::RBrace, start),
            '"' => self.scan_string(start),
            '\'' => self.scan_short_string(start),
            '0'..='9' => self.scan_number(start, c),
            c if is_ident_start(c) => self.scan_word(start),
            c => self.error_at(format!("Unexpected character '{c}'"), start),
        }
        self.line_is_blank = false;
    }

    fn open(&mut self, id: PunctuationId, start: usize) {
        self.depth += 1;
        self.emit(TokenKind::Punctuation(id), start);
    }

    /// A closer without an opener is reported but still emitted, so the parser sees the intended shape.
    fn close(&mut self, id: PunctuationId, start: usize) {
        match self.depth.checked_sub(1) {
            Some(depth) => self.depth = depth,
            None => self.error_at("Unmatched closing bracket", start),
        }
        self.emit(TokenKind::Punctuation(id), start);
    }

    /// Identifier or keyword; the first character is already consumed.
    fn scan_word(&mut self, start: usize) {
        self.eat_while(is_ident_continue);
        let word = &self.source[start..self.pos];
        let kind = match keyword_id(word) {
            Some(id) => TokenKind::Keyword(id),
            None => TokenKind::Ident(word.to_string()),
        };
        self.emit(kind, start);
    }

    /// `%lang`, `%builtins`; the directive word must follow `%` directly.
    fn scan_directive(&mut self, start: usize) {
        let word = self.eat_while(is_ident_continue);
        if word.is_empty() {
            self.error_at("Expected a directive name after '%'", start);
        } else {
            self.emit(TokenKind::Directive(word.to_string()), start);
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Lex a whole source string.
#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn lex(source: &str) -> Result<Vec<Token>, Vec<CompileError>> {
    Lexer::new(source).tokenize()
}
