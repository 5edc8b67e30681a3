//! Number scanning.
//!
//! Integer literals are decimal (`42`) or hex (`0x2a`). The text is kept as written; range checking against the
//! field prime happens in the parser.

use super::Lexer;
use super::tokens::TokenKind;

impl<'a> Lexer<'a> {
    pub(super) fn scan_number(&mut self, start: usize, first: char) {
        let is_hex = first == '0' && matches!(self.peek(), Some('x') | Some('X'))
            && self.peek_next().is_some_and(|c| c.is_ascii_hexdigit());

        if is_hex {
            self.bump();
            self.eat_while(|c| c.is_ascii_hexdigit());
        } else {
            self.eat_while(|c| c.is_ascii_digit());
        }

        // `12abc` or `0xfg`: an identifier character glued to the literal.
        if self.peek().is_some_and(|c| c.is_ascii_alphanumeric() || c == '_') {
            self.eat_while(|c| c.is_ascii_alphanumeric() || c == '_');
            let text = &self.source[start..self.pos];
            self.error_at(format!("Invalid number literal '{text}'"), start);
            return;
        }

        let text = self.source[start..self.pos].to_string();
        self.emit(TokenKind::Int(text), start);
    }
}

#[cfg(test)]
mod tests {
    use super::super::{TokenKind, lex};

    #[test]
    fn test_decimal_and_hex() {
        let tokens = lex("42 0x2A 0").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Int("42".to_string()));
        assert_eq!(tokens[1].kind, TokenKind::Int("0x2A".to_string()));
        assert_eq!(tokens[2].kind, TokenKind::Int("0".to_string()));
    }

    #[test]
    fn test_glued_identifier_is_error() {
        let errs = lex("12abc\n").unwrap_err();
        assert!(errs[0].message.contains("Invalid number literal '12abc'"));
    }
}
