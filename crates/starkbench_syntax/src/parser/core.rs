/// The [`Parser`] type and the public [`parse`] entry point.
///
/// Parsing is a single pass. A failed item is recorded and skipped up to the next line that can start an item, so
/// one run reports every broken declaration instead of the first one only.
pub struct Parser<'a> {
    /// Lexer output; ends with `Eof`.
    tokens: &'a [Token],
    pos: usize,
    errors: Vec<CompileError>,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            errors: Vec::new(),
        }
    }

    pub fn parse(mut self) -> Result<Program, Vec<CompileError>> {
        let mut items = Vec::new();
        loop {
            self.skip_newlines();
            if self.is_at_end() {
                break;
            }
            match self.item() {
                Ok(item) => items.push(item),
                Err(err) => {
                    self.errors.push(err);
                    self.synchronize_item();
                }
            }
        }
        match self.errors.is_empty() {
            true => Ok(Program { items }),
            false => Err(self.errors),
        }
    }
}

/// Parse a token stream (as produced by [`crate::lexer::lex`]) into a [`Program`].
#[tracing::instrument(skip_all, fields(token_count = tokens.len()))]
pub fn parse(tokens: &[Token]) -> Result<Program, Vec<CompileError>> {
    if tokens.is_empty() {
        return Ok(Program::default());
    }
    Parser::new(tokens).parse()
}
