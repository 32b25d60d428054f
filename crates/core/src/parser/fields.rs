use super::Parser;
use crate::ast::{RawField, RawLabel, RawTypeRef};
use crate::error::DescError;
use crate::lexer::{Keyword, Token};

impl<'a> Parser<'a> {
    // -- Field parsing ------------------------------------------

    /// `fieldDef := label? type IDENT '=' intLit fieldOptions? ';'`
    pub(super) fn parse_field(&mut self) -> Result<RawField, DescError> {
        let line = self.cur_line();
        let label = match self.peek() {
            Token::Keyword(Keyword::Optional) => Some(RawLabel::Optional),
            Token::Keyword(Keyword::Required) => Some(RawLabel::Required),
            Token::Keyword(Keyword::Repeated) => Some(RawLabel::Repeated),
            _ => None,
        };
        if label.is_some() {
            self.advance();
        }

        let ty = self.parse_type()?;
        let name = self.take_ident()?;
        self.expect(Token::Eq)?;
        let number = self.take_int(false)?;
        self.skip_field_options()?;
        self.expect(Token::Semi)?;

        Ok(RawField {
            label,
            ty,
            name,
            number,
            line,
        })
    }

    /// `type := scalarKeyword | IDENT ('.' IDENT)*`
    ///
    /// A bare identifier stays unresolved; whether it names a message or an
    /// enum is decided after the whole file has been parsed.
    fn parse_type(&mut self) -> Result<RawTypeRef, DescError> {
        match self.peek() {
            Token::Keyword(Keyword::Scalar(kind)) => {
                let kind = *kind;
                self.advance();
                Ok(RawTypeRef::Scalar(kind))
            }
            Token::Ident(_) => Ok(RawTypeRef::Named(self.take_dotted_ident()?)),
            other => Err(self.err(format!("expected field type, got {}", other))),
        }
    }
}
