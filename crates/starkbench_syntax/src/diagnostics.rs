//! Diagnostics and error reporting.
//!
//! Every frontend stage (lexer, parser, checker) reports [`CompileError`]s: a message, a byte span, and optional
//! notes/hints. [`CompileError::to_diagnostic`] attaches the source text so the error can be rendered by `miette`.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::ast::Span;

/// An error tied to a byte span of one source file.
#[derive(Debug, Clone, PartialEq)]
pub struct CompileError {
    pub message: String,
    pub span: Span,
    pub kind: ErrorKind,
    pub notes: Vec<String>,
    pub hints: Vec<String>,
}

impl CompileError {
    pub fn new(message: String, span: Span) -> Self {
        Self::with_kind(ErrorKind::Error, message, span)
    }

    pub fn syntax(message: String, span: Span) -> Self {
        Self::with_kind(ErrorKind::Syntax, message, span)
    }

    pub fn type_error(message: String, span: Span) -> Self {
        Self::with_kind(ErrorKind::Type, message, span)
    }

    pub fn import(message: String, span: Span) -> Self {
        Self::with_kind(ErrorKind::Import, message, span)
    }

    fn with_kind(kind: ErrorKind, message: String, span: Span) -> Self {
        Self {
            message,
            span,
            kind,
            notes: Vec::new(),
            hints: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }

    /// Attach the source text so the error can be rendered with a labelled snippet.
    pub fn to_diagnostic(&self, file_name: &str, source: &str) -> SourceDiagnostic {
        let start = self.span.start.min(source.len());
        let len = self.span.end.min(source.len()).saturating_sub(start);
        let mut help: Vec<String> = self.hints.clone();
        help.extend(self.notes.iter().map(|n| format!("note: {n}")));
        SourceDiagnostic {
            kind: self.kind,
            message: self.message.clone(),
            src: NamedSource::new(file_name, source.to_string()),
            span: (start, len).into(),
            help: if help.is_empty() { None } else { Some(help.join("\n")) },
        }
    }
}

/// Which stage rejected the program; shown as the prefix of a rendered error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Error,
    Syntax,
    Type,
    Import,
}

impl ErrorKind {
    pub fn label(self) -> &'static str {
        match self {
            ErrorKind::Error => "error",
            ErrorKind::Syntax => "syntax error",
            ErrorKind::Type => "type error",
            ErrorKind::Import => "import error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A [`CompileError`] bundled with its source, renderable through `miette`.
#[derive(Debug, Error, Diagnostic)]
#[error("{kind}: {message}")]
pub struct SourceDiagnostic {
    pub kind: ErrorKind,
    pub message: String,
    #[source_code]
    pub src: NamedSource<String>,
    #[label("here")]
    pub span: SourceSpan,
    #[help]
    pub help: Option<String>,
}

/// Plain-text rendering with a caret line under the span, for `--lex`/`--parse` output and test failures.
pub fn format_error(file_name: &str, source: &str, error: &CompileError) -> String {
    let start = error.span.start.min(source.len());
    let (line_num, col_num, line_text) = get_line_info(source, start);
    let line_end = start - (col_num - 1) + line_text.len();
    let width = error.span.end.min(line_end).saturating_sub(start).max(1);
    let pad = " ".repeat(line_num.to_string().len());

    let mut lines = vec![
        format!("{}: {}", error.kind, error.message),
        format!("  --> {file_name}:{line_num}:{col_num}"),
        format!("  {pad} |"),
        format!("  {line_num} | {line_text}"),
        format!("  {pad} | {}{}", " ".repeat(col_num - 1), "^".repeat(width)),
    ];
    lines.extend(error.notes.iter().map(|note| format!("  = note: {note}")));
    lines.extend(error.hints.iter().map(|hint| format!("  = hint: {hint}")));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// 1-based line and column of a byte offset, plus the text of that line without its newline.
pub fn get_line_info(source: &str, offset: usize) -> (usize, usize, &str) {
    let mut offset = offset.min(source.len());
    while !source.is_char_boundary(offset) {
        offset -= 1;
    }
    let (before, after) = source.split_at(offset);
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let line_end = after.find('\n').map_or(source.len(), |i| offset + i);
    let line_num = before.matches('\n').count() + 1;
    (line_num, offset - line_start + 1, &source[line_start..line_end])
}

/// Constructors for errors reported from more than one place.
pub mod errors {
    use super::{CompileError, Span};

    pub fn unknown_identifier(name: &str, span: Span) -> CompileError {
        CompileError::type_error(format!("Unknown identifier '{name}'"), span)
            .with_hint("Did you forget to import it or define it?")
    }

    pub fn redefinition(name: &str, span: Span) -> CompileError {
        CompileError::new(format!("Redefinition of '{name}'"), span)
    }

    pub fn type_mismatch(expected: &str, found: &str, span: Span) -> CompileError {
        let error = CompileError::type_error(format!("Type mismatch: expected '{expected}', found '{found}'"), span);
        match (expected, found) {
            ("felt*", "felt") => error.with_hint("Allocate an array with `new (...)` or `alloc()`"),
            ("felt", "felt*") => error.with_hint("Index the array to read an element: `arr[0]`"),
            _ => error,
        }
    }

    pub fn arity_mismatch(callee: &str, expected: usize, found: usize, span: Span) -> CompileError {
        let message = format!("Wrong number of arguments for '{callee}': expected {expected}, found {found}");
        CompileError::type_error(message, span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_info_second_line() {
        let source = "first\nsecond line\n";
        let (line, col, text) = get_line_info(source, 9);
        assert_eq!((line, col, text), (2, 4, "second line"));
    }

    #[test]
    fn test_format_error_points_at_span() {
        let source = "let x = y\n";
        let err = errors::unknown_identifier("y", Span::new(8, 9));
        let rendered = format_error("main.cairo", source, &err);
        assert!(rendered.contains("main.cairo:1:9"));
        assert!(rendered.contains("        ^"));
        assert!(rendered.contains("hint: Did you forget"));
    }

    #[test]
    fn test_diagnostic_clamps_span_to_source() {
        let err = CompileError::syntax("Unexpected end of file".to_string(), Span::new(100, 120));
        let diag = err.to_diagnostic("x.cairo", "abc");
        assert_eq!(diag.span.offset(), 3);
        assert_eq!(diag.span.len(), 0);
    }
}
