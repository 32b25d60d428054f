use super::Parser;
use crate::ast::{RawEnum, RawEnumValue, RawMessage, RawMessageItem};
use crate::error::DescError;
use crate::lexer::{Keyword, Token};

impl<'a> Parser<'a> {
    // -- Message and enum definitions ---------------------------

    /// `messageDef := 'message' IDENT '{' (fieldDef | messageDef | enumDef)* '}'`
    pub(super) fn parse_message(&mut self) -> Result<RawMessage, DescError> {
        let line = self.expect_keyword(Keyword::Message)?;
        let name = self.take_ident()?;
        self.expect(Token::LBrace)?;

        let mut body = Vec::new();
        loop {
            match self.peek() {
                Token::RBrace => {
                    self.advance();
                    break;
                }
                Token::Keyword(Keyword::Message) => {
                    body.push(RawMessageItem::Message(self.parse_message()?));
                }
                Token::Keyword(Keyword::Enum) => {
                    body.push(RawMessageItem::Enum(self.parse_enum()?));
                }
                Token::Keyword(Keyword::Option) => self.parse_option_statement()?,
                Token::Semi => {
                    self.advance();
                }
                Token::Eof => {
                    return Err(self.err(format!(
                        "expected '}}' to close message '{}', got end of input",
                        name
                    )))
                }
                _ => body.push(RawMessageItem::Field(self.parse_field()?)),
            }
        }

        Ok(RawMessage { name, body, line })
    }

    /// `enumDef := 'enum' IDENT '{' enumField* '}'`
    pub(super) fn parse_enum(&mut self) -> Result<RawEnum, DescError> {
        let line = self.expect_keyword(Keyword::Enum)?;
        let name = self.take_ident()?;
        self.expect(Token::LBrace)?;

        let mut values = Vec::new();
        loop {
            match self.peek() {
                Token::RBrace => {
                    self.advance();
                    break;
                }
                Token::Keyword(Keyword::Option) => self.parse_option_statement()?,
                Token::Semi => {
                    self.advance();
                }
                Token::Eof => {
                    return Err(self.err(format!(
                        "expected '}}' to close enum '{}', got end of input",
                        name
                    )))
                }
                _ => values.push(self.parse_enum_value()?),
            }
        }

        Ok(RawEnum { name, values, line })
    }

    /// `enumField := IDENT '=' '-'? intLit fieldOptions? ';'`
    fn parse_enum_value(&mut self) -> Result<RawEnumValue, DescError> {
        let line = self.cur_line();
        let name = self.take_ident()?;
        self.expect(Token::Eq)?;
        let number = self.take_int(true)?;
        self.skip_field_options()?;
        self.expect(Token::Semi)?;
        Ok(RawEnumValue { name, number, line })
    }
}
