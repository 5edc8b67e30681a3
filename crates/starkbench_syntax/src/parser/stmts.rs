/// Statement parsing methods.
///
/// This chunk parses statement forms (`let`, `assert`, `return`, `if`, `with_attr`, ...)
/// and `end`-terminated blocks.
///
/// ## Notes
/// - Every statement occupies one logical line; errors inside a block skip to the next
///   line so one bad statement does not hide the rest.
impl<'a> Parser<'a> {
    // ========================================================================
    // Statements
    // ========================================================================

    /// Parse statements until one of `terminators` (not consumed) or end of file.
    fn block(&mut self, terminators: &[KeywordId]) -> Result<Vec<Spanned<Stmt>>, CompileError> {
        let mut stmts = Vec::new();
        self.skip_newlines();
        while !terminators.iter().any(|k| self.check_keyword(*k)) {
            if self.is_at_end() {
                return Err(self.unexpected("Expected 'end'"));
            }
            match self.statement() {
                Ok(stmt) => stmts.push(stmt),
                Err(e) => {
                    self.errors.push(e);
                    self.synchronize_line();
                }
            }
            self.skip_newlines();
        }
        Ok(stmts)
    }

    fn statement(&mut self) -> Result<Spanned<Stmt>, CompileError> {
        let start = self.current_span().start;

        let stmt = if self.check_keyword(KeywordId::Let) {
            self.let_stmt()?
        } else if self.check_keyword(KeywordId::Local) {
            self.advance();
            self.binding(BindingKind::Local)?
        } else if self.check_keyword(KeywordId::Tempvar) {
            self.advance();
            self.binding(BindingKind::Tempvar)?
        } else if self.match_keyword(KeywordId::AllocLocals) {
            Stmt::AllocLocals
        } else if self.match_keyword(KeywordId::Assert) {
            let lhs = self.expression()?;
            self.expect_op(OperatorId::Eq, "Expected '=' in assert")?;
            let rhs = self.expression()?;
            Stmt::Assert { lhs, rhs }
        } else if self.check_keyword(KeywordId::Return) {
            self.return_stmt()?
        } else if self.check_keyword(KeywordId::If) {
            self.if_stmt()?
        } else if self.check_keyword(KeywordId::WithAttr) {
            self.with_attr_stmt()?
        } else if let TokenKind::Hint(code) = &self.peek().kind {
            let code = code.clone();
            self.advance();
            Stmt::Hint(code)
        } else {
            let expr = self.expression()?;
            match expr.node {
                Expr::Call(call) => Stmt::Call(call),
                _ => {
                    return Err(CompileError::syntax(
                        "Expected a statement; only calls can be used as statements".to_string(),
                        expr.span,
                    ));
                }
            }
        };

        let span = self.span_from(start);
        self.expect_line_end()?;
        Ok(Spanned::new(stmt, span))
    }

    /// `let x = e` or `let (a, b) = f(...)`
    fn let_stmt(&mut self) -> Result<Stmt, CompileError> {
        self.expect_keyword(KeywordId::Let, "Expected 'let'")?;
        if !self.match_punct(PunctuationId::LParen) {
            return self.binding(BindingKind::Let);
        }

        let mut names = Vec::new();
        while !self.check_punct(PunctuationId::RParen) {
            names.push(self.identifier_spanned()?);
            if !self.match_punct(PunctuationId::Comma) {
                break;
            }
        }
        self.expect_punct(PunctuationId::RParen, "Expected ')' after unpacked names")?;
        self.expect_op(OperatorId::Eq, "Expected '=' after unpacked names")?;

        let value = self.expression()?;
        match value.node {
            Expr::Call(call) => Ok(Stmt::Unpack {
                names,
                call: Spanned::new(call, value.span),
            }),
            _ => Err(CompileError::syntax(
                "Expected a function call on the right of 'let (...) ='".to_string(),
                value.span,
            )),
        }
    }

    /// `name [: type] = value`, after the binding keyword.
    fn binding(&mut self, kind: BindingKind) -> Result<Stmt, CompileError> {
        let name = self.identifier_spanned()?;
        let ty = if self.match_punct(PunctuationId::Colon) {
            Some(self.type_expr()?)
        } else {
            None
        };
        self.expect_op(OperatorId::Eq, &format!("Expected '=' in {} binding", kind))?;
        let value = self.expression()?;
        Ok(Stmt::Bind { kind, name, ty, value })
    }

    /// `return (a=e, ...)`, `return (e, ...)` or `return ()`
    fn return_stmt(&mut self) -> Result<Stmt, CompileError> {
        self.expect_keyword(KeywordId::Return, "Expected 'return'")?;
        self.expect_punct(PunctuationId::LParen, "Expected '(' after 'return'")?;
        let values = self.call_args()?;
        Ok(Stmt::Return(values))
    }

    /// `if a == b:` block [`else:` block] `end`
    fn if_stmt(&mut self) -> Result<Stmt, CompileError> {
        self.expect_keyword(KeywordId::If, "Expected 'if'")?;
        let lhs = self.expression()?;
        let op = if self.match_op(OperatorId::EqEq) {
            CompareOp::Eq
        } else if self.match_op(OperatorId::NotEq) {
            CompareOp::NotEq
        } else {
            return Err(self.unexpected("Expected '==' or '!=' in condition"));
        };
        let rhs = self.expression()?;
        self.expect_punct(PunctuationId::Colon, "Expected ':' after condition")?;
        self.expect_line_end()?;

        let then_body = self.block(&[KeywordId::Else, KeywordId::End])?;
        let else_body = if self.match_keyword(KeywordId::Else) {
            self.expect_punct(PunctuationId::Colon, "Expected ':' after 'else'")?;
            self.expect_line_end()?;
            Some(self.block(&[KeywordId::End])?)
        } else {
            None
        };
        self.expect_keyword(KeywordId::End, "Expected 'end' to close 'if'")?;

        Ok(Stmt::If {
            cond: Condition { lhs, op, rhs },
            then_body,
            else_body,
        })
    }

    /// `with_attr error_message("..."):` block `end`
    fn with_attr_stmt(&mut self) -> Result<Stmt, CompileError> {
        self.expect_keyword(KeywordId::WithAttr, "Expected 'with_attr'")?;
        let attr = self.identifier_spanned()?;
        self.expect_punct(PunctuationId::LParen, "Expected '(' after attribute name")?;
        let message_start = self.current_span().start;
        let message = self.string_literal()?;
        let message = Spanned::new(message, self.span_from(message_start));
        self.expect_punct(PunctuationId::RParen, "Expected ')' after attribute value")?;
        self.expect_punct(PunctuationId::Colon, "Expected ':' after 'with_attr'")?;
        self.expect_line_end()?;

        let body = self.block(&[KeywordId::End])?;
        self.expect_keyword(KeywordId::End, "Expected 'end' to close 'with_attr'")?;

        Ok(Stmt::WithAttr { attr, message, body })
    }
}
