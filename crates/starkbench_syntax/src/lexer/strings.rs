//! String scanning.
//!
//! Handles double-quoted strings (used by `with_attr error_message("...")`), single-quoted short strings, and
//! `%{ ... %}` hint blocks.

use super::Lexer;
use super::tokens::TokenKind;
use crate::ast::Span;
use crate::diagnostics::CompileError;

/// Result of processing an escape sequence
enum EscapeResult {
    /// Successfully parsed escape character
    Char(char),
    /// Unknown escape - preserve as-is (backslash + char)
    Unknown(char),
    /// End of input during escape
    Eof,
}

impl<'a> Lexer<'a> {
    /// Process an escape sequence. Called after consuming the backslash.
    fn scan_escape(&mut self, quote: char) -> EscapeResult {
        match self.bump() {
            Some('n') => EscapeResult::Char('\n'),
            Some('t') => EscapeResult::Char('\t'),
            Some('\\') => EscapeResult::Char('\\'),
            Some(q) if q == quote => EscapeResult::Char(q),
            Some(c) => EscapeResult::Unknown(c),
            None => EscapeResult::Eof,
        }
    }

    /// Scan the body of a quoted literal. Returns `None` (after recording an error) if it is unterminated.
    fn scan_quoted(&mut self, start: usize, quote: char) -> Option<String> {
        let mut value = String::new();
        loop {
            match self.peek() {
                None | Some('\n') => {
                    self.errors.push(CompileError::syntax(
                        "Unterminated string literal".to_string(),
                        Span::new(start, self.pos),
                    ));
                    return None;
                }
                Some(c) if c == quote => {
                    self.bump();
                    return Some(value);
                }
                Some('\\') => {
                    self.bump();
                    match self.scan_escape(quote) {
                        EscapeResult::Char(c) => value.push(c),
                        EscapeResult::Unknown(c) => {
                            value.push('\\');
                            value.push(c);
                        }
                        EscapeResult::Eof => {
                            self.errors.push(CompileError::syntax(
                                "Unterminated string literal".to_string(),
                                Span::new(start, self.pos),
                            ));
                            return None;
                        }
                    }
                }
                Some(c) => {
                    self.bump();
                    value.push(c);
                }
            }
        }
    }

    pub(super) fn scan_string(&mut self, start: usize) {
        if let Some(value) = self.scan_quoted(start, '"') {
            self.emit(TokenKind::String(value), start);
        }
    }

    pub(super) fn scan_short_string(&mut self, start: usize) {
        if let Some(value) = self.scan_quoted(start, '\'') {
            self.emit(TokenKind::ShortString(value), start);
        }
    }

    /// Scan a hint block; `%{` has already been consumed. Hints may span lines.
    pub(super) fn scan_hint(&mut self, start: usize) {
        let body_start = self.pos;
        loop {
            match self.bump() {
                None => {
                    self.errors.push(CompileError::syntax(
                        "Unterminated hint: expected '%}'".to_string(),
                        Span::new(start, self.pos),
                    ));
                    return;
                }
                Some('%') if self.peek() == Some('}') => {
                    let body_end = self.pos - 1;
                    self.bump();
                    let code = self.source[body_start..body_end].trim().to_string();
                    self.emit(TokenKind::Hint(code), start);
                    return;
                }
                Some(_) => {}
            }
        }
    }
}
