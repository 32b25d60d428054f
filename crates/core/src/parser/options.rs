use super::Parser;
use crate::error::DescError;
use crate::lexer::{Keyword, Token};

// Options are checked for shape and then dropped; nothing downstream
// consumes them.
impl<'a> Parser<'a> {
    /// `optionStatement := 'option' optionName '=' constant ';'`
    pub(super) fn parse_option_statement(&mut self) -> Result<(), DescError> {
        self.expect_keyword(Keyword::Option)?;
        self.parse_option_assignment()?;
        self.expect(Token::Semi)
    }

    /// `fieldOptions := '[' optionName '=' constant (',' optionName '=' constant)* ']'`
    ///
    /// No-op when the next token is not `[`.
    pub(super) fn skip_field_options(&mut self) -> Result<(), DescError> {
        if self.peek() != &Token::LBracket {
            return Ok(());
        }
        self.advance();
        loop {
            self.parse_option_assignment()?;
            match self.peek() {
                Token::Comma => {
                    self.advance();
                }
                Token::RBracket => {
                    self.advance();
                    return Ok(());
                }
                other => {
                    return Err(self.err(format!(
                        "expected ',' or ']' in field options, got {}",
                        other
                    )))
                }
            }
        }
    }

    fn parse_option_assignment(&mut self) -> Result<(), DescError> {
        self.parse_option_name()?;
        self.expect(Token::Eq)?;
        self.parse_constant()
    }

    /// `optionName := (IDENT | '(' IDENT ('.' IDENT)* ')') ('.' IDENT)*`
    ///
    /// Segments may also be reserved words: `(ext).message` is a valid path.
    fn parse_option_name(&mut self) -> Result<(), DescError> {
        if self.peek() == &Token::LParen {
            self.advance();
            self.take_option_segment()?;
            while self.peek() == &Token::Dot {
                self.advance();
                self.take_option_segment()?;
            }
            self.expect(Token::RParen)?;
        } else {
            self.take_option_segment()?;
        }
        while self.peek() == &Token::Dot {
            self.advance();
            self.take_option_segment()?;
        }
        Ok(())
    }

    fn take_option_segment(&mut self) -> Result<(), DescError> {
        match self.peek() {
            Token::Ident(_) | Token::Keyword(_) => {
                self.advance();
                Ok(())
            }
            other => Err(self.err(format!("expected option name, got {}", other))),
        }
    }

    /// `constant := IDENT ('.' IDENT)* | '-'? intLit | '-'? floatLit | strLit`
    fn parse_constant(&mut self) -> Result<(), DescError> {
        if self.peek() == &Token::Minus {
            self.advance();
            return match self.peek() {
                Token::Int(_) | Token::Float(_) | Token::Ident(_) => {
                    // `-inf` is the one identifier that may carry a sign
                    self.advance();
                    Ok(())
                }
                other => Err(self.err(format!("expected number after '-', got {}", other))),
            };
        }
        match self.peek() {
            Token::Int(_) | Token::Float(_) | Token::Str(_) => {
                self.advance();
                Ok(())
            }
            Token::Ident(_) => {
                self.take_dotted_ident()?;
                Ok(())
            }
            other => Err(self.err(format!("expected option value, got {}", other))),
        }
    }
}
