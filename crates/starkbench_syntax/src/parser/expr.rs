/// Expression parsing methods.
///
/// Precedence, loosest first: `+ -`, then `* /`, then unary `-`, then postfix `[i]`.
/// Calls are parsed as ordinary primaries; whether a call is allowed in a given
/// position is a checker concern.
impl<'a> Parser<'a> {
    // ========================================================================
    // Expressions
    // ========================================================================

    fn expression(&mut self) -> Result<Spanned<Expr>, CompileError> {
        self.additive()
    }

    fn additive(&mut self) -> Result<Spanned<Expr>, CompileError> {
        let mut lhs = self.multiplicative()?;
        loop {
            let op = if self.match_op(OperatorId::Plus) {
                BinaryOp::Add
            } else if self.match_op(OperatorId::Minus) {
                BinaryOp::Sub
            } else {
                break;
            };
            let rhs = self.multiplicative()?;
            lhs = binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn multiplicative(&mut self) -> Result<Spanned<Expr>, CompileError> {
        let mut lhs = self.unary()?;
        loop {
            let op = if self.match_op(OperatorId::Star) {
                BinaryOp::Mul
            } else if self.match_op(OperatorId::Slash) {
                BinaryOp::Div
            } else {
                break;
            };
            let rhs = self.unary()?;
            lhs = binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Spanned<Expr>, CompileError> {
        if self.check_op(OperatorId::Minus) {
            let start = self.advance().span.start;
            let operand = self.unary()?;
            let span = Span::new(start, operand.span.end);
            return Ok(Spanned::new(Expr::Neg(Box::new(operand)), span));
        }
        self.postfix()
    }

    fn postfix(&mut self) -> Result<Spanned<Expr>, CompileError> {
        let mut expr = self.primary()?;
        while self.match_punct(PunctuationId::LBracket) {
            let index = self.expression()?;
            self.expect_punct(PunctuationId::RBracket, "Expected ']' after index")?;
            let span = self.span_from(expr.span.start);
            expr = Spanned::new(
                Expr::Index {
                    base: Box::new(expr),
                    index: Box::new(index),
                },
                span,
            );
        }
        Ok(expr)
    }

    fn primary(&mut self) -> Result<Spanned<Expr>, CompileError> {
        let start = self.current_span().start;
        match &self.peek().kind {
            TokenKind::Int(text) => {
                let text = text.clone();
                let span = self.advance().span;
                let value = int_literal(&text, span)?;
                Ok(Spanned::new(Expr::Int(value), span))
            }
            TokenKind::ShortString(text) => {
                let text = text.clone();
                let span = self.advance().span;
                let value = Felt::from_short_string(&text).map_err(|e| {
                    CompileError::syntax(format!("Invalid short string '{}': {}", text, e), span)
                })?;
                Ok(Spanned::new(Expr::Int(value), span))
            }
            TokenKind::Ident(_) => {
                let name = self.identifier_spanned()?;
                if self.match_punct(PunctuationId::LParen) {
                    let args = self.call_args()?;
                    let call = CallExpr {
                        target: CallTarget::Function(name),
                        args,
                    };
                    return Ok(Spanned::new(Expr::Call(call), self.span_from(start)));
                }
                if self.check_punct(PunctuationId::Dot) && matches!(self.peek_next().kind, TokenKind::Ident(_)) {
                    self.advance();
                    let accessor = self.identifier_spanned()?;
                    self.expect_punct(PunctuationId::LParen, "Expected '(' after storage accessor")?;
                    let args = self.call_args()?;
                    let call = CallExpr {
                        target: CallTarget::Storage { var: name, accessor },
                        args,
                    };
                    return Ok(Spanned::new(Expr::Call(call), self.span_from(start)));
                }
                Ok(Spanned::new(Expr::Name(name.node), name.span))
            }
            TokenKind::Punctuation(PunctuationId::LParen) => {
                self.advance();
                let inner = self.expression()?;
                self.expect_punct(PunctuationId::RParen, "Expected ')' after expression")?;
                Ok(Spanned::new(inner.node, self.span_from(start)))
            }
            TokenKind::Keyword(KeywordId::New) => {
                self.advance();
                self.expect_punct(PunctuationId::LParen, "Expected '(' after 'new'")?;
                let mut values = Vec::new();
                while !self.check_punct(PunctuationId::RParen) {
                    values.push(self.expression()?);
                    if !self.match_punct(PunctuationId::Comma) {
                        break;
                    }
                }
                self.expect_punct(PunctuationId::RParen, "Expected ')' after 'new' values")?;
                Ok(Spanned::new(Expr::New(values), self.span_from(start)))
            }
            _ => Err(self.unexpected("Expected expression")),
        }
    }

    /// Arguments after an opening `(`, through the closing `)`.
    fn call_args(&mut self) -> Result<Vec<CallArg>, CompileError> {
        let mut args = Vec::new();
        while !self.check_punct(PunctuationId::RParen) {
            let name = if matches!(self.peek().kind, TokenKind::Ident(_))
                && self.peek_next().kind.is_operator(OperatorId::Eq)
            {
                let name = self.identifier_spanned()?;
                self.advance();
                Some(name)
            } else {
                None
            };
            let value = self.expression()?;
            args.push(CallArg { name, value });
            if !self.match_punct(PunctuationId::Comma) {
                break;
            }
        }
        self.expect_punct(PunctuationId::RParen, "Expected ')' after arguments")?;
        Ok(args)
    }
}

fn binary(op: BinaryOp, lhs: Spanned<Expr>, rhs: Spanned<Expr>) -> Spanned<Expr> {
    let span = lhs.span.merge(rhs.span);
    Spanned::new(
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        },
        span,
    )
}

/// Convert an integer literal to a field element; literals `>= P` are errors, not reduced.
fn int_literal(text: &str, span: Span) -> Result<Felt, CompileError> {
    text.parse::<Felt>().map_err(|e| {
        CompileError::syntax(format!("Invalid integer literal '{}': {}", text, e), span)
            .with_note("Integer literals must be below the field prime 2^251 + 17*2^192 + 1")
    })
}
