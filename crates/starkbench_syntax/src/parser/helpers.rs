/// Cursor over the token slice, matching primitives, and line-based error recovery.
///
/// `check_*` look at the current token, `match_*` consume it if it fits, `expect_*` consume it or fail.
impl<'a> Parser<'a> {
    /// Current token. The slice always ends with `Eof`, and the cursor never moves past it.
    fn peek(&self) -> &'a Token {
        let tokens: &'a [Token] = self.tokens;
        &tokens[self.pos.min(tokens.len() - 1)]
    }

    fn peek_next(&self) -> &'a Token {
        let tokens: &'a [Token] = self.tokens;
        &tokens[(self.pos + 1).min(tokens.len() - 1)]
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    /// Consume the current token (a no-op at `Eof`) and return it.
    fn advance(&mut self) -> &'a Token {
        let token = self.peek();
        if !matches!(token.kind, TokenKind::Eof) {
            self.pos += 1;
        }
        token
    }

    fn eat_if(&mut self, fits: impl FnOnce(&TokenKind) -> bool) -> bool {
        let found = fits(&self.peek().kind);
        if found {
            self.advance();
        }
        found
    }

    fn expect_if(&mut self, fits: impl FnOnce(&TokenKind) -> bool, msg: &str) -> Result<Span, CompileError> {
        if fits(&self.peek().kind) {
            Ok(self.advance().span)
        } else {
            Err(self.unexpected(msg))
        }
    }

    fn check_keyword(&self, id: KeywordId) -> bool {
        self.peek().kind.is_keyword(id)
    }

    fn check_punct(&self, id: PunctuationId) -> bool {
        self.peek().kind.is_punctuation(id)
    }

    fn check_op(&self, id: OperatorId) -> bool {
        self.peek().kind.is_operator(id)
    }

    /// At a line boundary (`Eof` counts).
    fn check_newline(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Newline | TokenKind::Eof)
    }

    fn match_keyword(&mut self, id: KeywordId) -> bool {
        self.eat_if(|k| k.is_keyword(id))
    }

    fn match_punct(&mut self, id: PunctuationId) -> bool {
        self.eat_if(|k| k.is_punctuation(id))
    }

    fn match_op(&mut self, id: OperatorId) -> bool {
        self.eat_if(|k| k.is_operator(id))
    }

    fn expect_keyword(&mut self, id: KeywordId, msg: &str) -> Result<Span, CompileError> {
        self.expect_if(|k| k.is_keyword(id), msg)
    }

    fn expect_punct(&mut self, id: PunctuationId, msg: &str) -> Result<Span, CompileError> {
        self.expect_if(|k| k.is_punctuation(id), msg)
    }

    fn expect_op(&mut self, id: OperatorId, msg: &str) -> Result<Span, CompileError> {
        self.expect_if(|k| k.is_operator(id), msg)
    }

    /// `"{msg}, found {token}"` at the current token.
    fn unexpected(&self, msg: &str) -> CompileError {
        let token = self.peek();
        CompileError::syntax(format!("{msg}, found {}", token.kind.describe()), token.span)
    }

    /// A statement must be the only thing on its line.
    fn expect_line_end(&mut self) -> Result<(), CompileError> {
        if self.is_at_end() || self.eat_if(|k| matches!(k, TokenKind::Newline)) {
            Ok(())
        } else {
            Err(self.unexpected("Expected end of line"))
        }
    }

    fn skip_newlines(&mut self) {
        while self.eat_if(|k| matches!(k, TokenKind::Newline)) {}
    }

    /// Drop the rest of the current line, its `Newline` included.
    fn synchronize_line(&mut self) {
        while !self.is_at_end() {
            if matches!(self.advance().kind, TokenKind::Newline) {
                break;
            }
        }
    }

    /// Drop lines until one that can start a top-level item.
    fn synchronize_item(&mut self) {
        self.synchronize_line();
        while !self.is_at_end() && !self.at_item_start() {
            self.synchronize_line();
        }
    }

    fn at_item_start(&self) -> bool {
        match &self.peek().kind {
            TokenKind::Directive(_) => true,
            TokenKind::Punctuation(PunctuationId::At) => true,
            kind => [KeywordId::Func, KeywordId::From, KeywordId::Const]
                .into_iter()
                .any(|id| kind.is_keyword(id)),
        }
    }

    fn current_span(&self) -> Span {
        self.peek().span
    }

    /// Span of the last consumed token.
    fn previous_span(&self) -> Span {
        self.tokens[self.pos.saturating_sub(1)].span
    }

    /// From `start` to the end of the last consumed token.
    fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.previous_span().end.max(start))
    }

    fn identifier(&mut self) -> Result<Ident, CompileError> {
        self.identifier_spanned().map(|ident| ident.node)
    }

    fn identifier_spanned(&mut self) -> Result<Spanned<Ident>, CompileError> {
        let token = self.peek();
        let TokenKind::Ident(name) = &token.kind else {
            return Err(self.unexpected("Expected identifier"));
        };
        self.advance();
        Ok(Spanned::new(name.clone(), token.span))
    }

    fn string_literal(&mut self) -> Result<String, CompileError> {
        let TokenKind::String(text) = &self.peek().kind else {
            return Err(self.unexpected("Expected string literal"));
        };
        self.advance();
        Ok(text.clone())
    }
}
