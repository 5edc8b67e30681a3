/// Top-level item parsing.
///
/// This chunk parses directives, imports, constants and function declarations
/// (including decorators, implicit arguments and typed parameter lists).
impl<'a> Parser<'a> {
    // ========================================================================
    // Items
    // ========================================================================

    fn item(&mut self) -> Result<Spanned<Item>, CompileError> {
        let start = self.current_span().start;

        let item = if let TokenKind::Directive(name) = &self.peek().kind {
            let name = name.clone();
            Item::Directive(self.directive(&name)?)
        } else if self.check_keyword(KeywordId::From) {
            Item::Import(self.import_decl()?)
        } else if self.check_keyword(KeywordId::Const) {
            Item::Const(self.const_decl()?)
        } else if self.check_punct(PunctuationId::At) || self.check_keyword(KeywordId::Func) {
            Item::Function(self.function_decl()?)
        } else {
            return Err(self.unexpected("Expected declaration"));
        };

        let span = self.span_from(start);
        self.expect_line_end()?;
        Ok(Spanned::new(item, span))
    }

    fn directive(&mut self, name: &str) -> Result<Directive, CompileError> {
        let directive_span = self.advance().span;
        match name {
            "lang" => Ok(Directive::Lang(self.identifier_spanned()?)),
            "builtins" => {
                let mut builtins = Vec::new();
                while !self.check_newline() {
                    builtins.push(self.identifier_spanned()?);
                }
                Ok(Directive::Builtins(builtins))
            }
            other => Err(CompileError::syntax(
                format!("Unknown directive '%{}'", other),
                directive_span,
            )
            .with_hint("Supported directives are %lang and %builtins")),
        }
    }

    /// `from a.b.c import x, y as z` or `from a.b import (x, y)`
    fn import_decl(&mut self) -> Result<ImportDecl, CompileError> {
        self.expect_keyword(KeywordId::From, "Expected 'from'")?;

        let path_start = self.current_span().start;
        let mut path = vec![self.identifier()?];
        while self.match_punct(PunctuationId::Dot) {
            path.push(self.identifier()?);
        }
        let module = Spanned::new(path, self.span_from(path_start));

        self.expect_keyword(KeywordId::Import, "Expected 'import'")?;

        let parenthesized = self.match_punct(PunctuationId::LParen);
        let mut items = Vec::new();
        loop {
            if parenthesized && self.check_punct(PunctuationId::RParen) {
                break;
            }
            let name = self.identifier_spanned()?;
            let alias = if self.match_keyword(KeywordId::As) {
                Some(self.identifier_spanned()?)
            } else {
                None
            };
            items.push(ImportItem { name, alias });
            if !self.match_punct(PunctuationId::Comma) {
                break;
            }
        }
        if parenthesized {
            self.expect_punct(PunctuationId::RParen, "Expected ')' after import list")?;
        }
        if items.is_empty() {
            return Err(CompileError::syntax(
                "Import list is empty".to_string(),
                module.span,
            ));
        }

        Ok(ImportDecl { module, items })
    }

    fn const_decl(&mut self) -> Result<ConstDecl, CompileError> {
        self.expect_keyword(KeywordId::Const, "Expected 'const'")?;
        let name = self.identifier_spanned()?;
        self.expect_op(OperatorId::Eq, "Expected '=' after constant name")?;
        let value = self.expression()?;
        Ok(ConstDecl { name, value })
    }

    /// `[@decorator]* func name{implicits}(params) -> (outputs): body end`
    fn function_decl(&mut self) -> Result<FunctionDecl, CompileError> {
        let mut decorators = Vec::new();
        while self.match_punct(PunctuationId::At) {
            decorators.push(self.identifier_spanned()?);
            self.expect_line_end()?;
            self.skip_newlines();
        }

        let header_start = self.current_span().start;
        self.expect_keyword(KeywordId::Func, "Expected 'func' after decorator")?;
        let name = self.identifier_spanned()?;

        let implicit_args = if self.match_punct(PunctuationId::LBrace) {
            let args = self.typed_params(PunctuationId::RBrace)?;
            self.expect_punct(PunctuationId::RBrace, "Expected '}' after implicit arguments")?;
            args
        } else {
            Vec::new()
        };

        self.expect_punct(PunctuationId::LParen, "Expected '(' after function name")?;
        let params = self.typed_params(PunctuationId::RParen)?;
        self.expect_punct(PunctuationId::RParen, "Expected ')' after parameters")?;

        let outputs = if self.match_punct(PunctuationId::Arrow) {
            self.expect_punct(PunctuationId::LParen, "Expected '(' after '->'")?;
            let outputs = self.typed_params(PunctuationId::RParen)?;
            self.expect_punct(PunctuationId::RParen, "Expected ')' after return values")?;
            outputs
        } else {
            Vec::new()
        };

        self.expect_punct(PunctuationId::Colon, "Expected ':' after function signature")?;
        let header_span = self.span_from(header_start);
        self.expect_line_end()?;

        let body = self.block(&[KeywordId::End])?;
        self.expect_keyword(KeywordId::End, "Expected 'end' to close the function")?;

        Ok(FunctionDecl {
            decorators,
            name,
            implicit_args,
            params,
            outputs,
            body,
            header_span,
        })
    }

    /// Comma separated `name [: type]` list, up to (not including) `close`.
    fn typed_params(&mut self, close: PunctuationId) -> Result<Vec<TypedParam>, CompileError> {
        let mut params = Vec::new();
        while !self.check_punct(close) {
            let name = self.identifier_spanned()?;
            let ty = if self.match_punct(PunctuationId::Colon) {
                self.type_expr()?
            } else {
                Spanned::new(TypeExpr::felt(), name.span)
            };
            params.push(TypedParam { name, ty });
            if !self.match_punct(PunctuationId::Comma) {
                break;
            }
        }
        Ok(params)
    }

    /// `felt`, `felt*`, `HashBuiltin*`
    fn type_expr(&mut self) -> Result<Spanned<TypeExpr>, CompileError> {
        let start = self.current_span().start;
        let mut ty = TypeExpr::Named(self.identifier()?);
        while self.match_op(OperatorId::Star) {
            ty = TypeExpr::Pointer(Box::new(ty));
        }
        Ok(Spanned::new(ty, self.span_from(start)))
    }
}
