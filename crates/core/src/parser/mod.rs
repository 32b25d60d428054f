//! Recursive-descent parser from tokens to the raw AST.
//! The parser does not recover: the first deviation from the grammar is
//! returned as a syntax error and no partial tree is produced.
use crate::ast::{ImportKind, RawDecl, RawFile, RawImport};
use crate::error::DescError;
use crate::lexer::{Keyword, Spanned, Token};

mod definitions;
mod fields;
mod options;

// ──────────────────────────────────────────────
// Parser
// ──────────────────────────────────────────────

struct Parser<'a> {
    tokens: &'a [Spanned],
    pos: usize,
    filename: String,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Spanned], filename: &str) -> Self {
        Parser {
            tokens,
            pos: 0,
            filename: filename.to_owned(),
        }
    }

    fn cur(&self) -> &Spanned {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> &Token {
        &self.cur().token
    }

    fn cur_line(&self) -> u32 {
        self.cur().line
    }

    fn advance(&mut self) -> &Spanned {
        let t = &self.tokens[self.pos.min(self.tokens.len() - 1)];
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        t
    }

    fn err(&self, msg: impl Into<String>) -> DescError {
        DescError::syntax(&self.filename, self.cur_line(), msg)
    }

    fn is_keyword(&self, kw: Keyword) -> bool {
        self.peek() == &Token::Keyword(kw)
    }

    fn expect(&mut self, expected: Token) -> Result<(), DescError> {
        if self.peek() == &expected {
            self.advance();
            Ok(())
        } else {
            Err(self.err(format!("expected {}, got {}", expected, self.peek())))
        }
    }

    fn expect_keyword(&mut self, kw: Keyword) -> Result<u32, DescError> {
        let line = self.cur_line();
        self.expect(Token::Keyword(kw))?;
        Ok(line)
    }

    fn take_ident(&mut self) -> Result<String, DescError> {
        if let Token::Ident(w) = self.peek().clone() {
            self.advance();
            Ok(w)
        } else {
            Err(self.err(format!("expected identifier, got {}", self.peek())))
        }
    }

    fn take_str(&mut self) -> Result<String, DescError> {
        if let Token::Str(s) = self.peek().clone() {
            self.advance();
            Ok(s)
        } else {
            Err(self.err(format!("expected string literal, got {}", self.peek())))
        }
    }

    /// `'-'? intLit`, range-checked into `i32`. The sign is only accepted
    /// when `signed` is set.
    fn take_int(&mut self, signed: bool) -> Result<i32, DescError> {
        let negative = signed && self.peek() == &Token::Minus;
        if negative {
            self.advance();
        }
        match self.peek().clone() {
            Token::Int(n) => {
                let value = if negative { -n } else { n };
                let value = i32::try_from(value).map_err(|_| {
                    if n == i64::MAX {
                        self.err("integer literal out of range")
                    } else {
                        self.err(format!("integer {} out of range", value))
                    }
                })?;
                self.advance();
                Ok(value)
            }
            other => Err(self.err(format!("expected integer, got {}", other))),
        }
    }

    /// `IDENT ('.' IDENT)*`, one entry per segment.
    fn take_dotted_ident(&mut self) -> Result<Vec<String>, DescError> {
        let mut parts = vec![self.take_ident()?];
        while self.peek() == &Token::Dot {
            self.advance();
            parts.push(self.take_ident()?);
        }
        Ok(parts)
    }

    // -- File-level productions ---------------------------------

    /// `proto := 'syntax' '=' strLit ';' decl*`
    fn parse_file(&mut self) -> Result<RawFile, DescError> {
        self.expect_keyword(Keyword::Syntax)?;
        self.expect(Token::Eq)?;
        let syntax = self.take_str()?;
        self.expect(Token::Semi)?;

        let mut decls = Vec::new();
        while self.peek() != &Token::Eof {
            if let Some(d) = self.parse_decl()? {
                decls.push(d);
            }
        }
        Ok(RawFile { syntax, decls })
    }

    /// Returns `None` for statements that leave nothing in the tree
    /// (options and empty statements).
    fn parse_decl(&mut self) -> Result<Option<RawDecl>, DescError> {
        let line = self.cur_line();
        let decl = match self.peek() {
            Token::Keyword(Keyword::Import) => RawDecl::Import(self.parse_import(line)?),
            Token::Keyword(Keyword::Package) => self.parse_package(line)?,
            Token::Keyword(Keyword::Message) => RawDecl::Message(self.parse_message()?),
            Token::Keyword(Keyword::Enum) => RawDecl::Enum(self.parse_enum()?),
            Token::Keyword(Keyword::Option) => {
                self.parse_option_statement()?;
                return Ok(None);
            }
            Token::Semi => {
                self.advance();
                return Ok(None);
            }
            other => {
                return Err(self.err(format!(
                    "expected 'message', 'enum' or 'import', got {}",
                    other
                )))
            }
        };
        Ok(Some(decl))
    }

    /// `importStatement := 'import' ('public' | 'weak')? strLit ';'`
    fn parse_import(&mut self, line: u32) -> Result<RawImport, DescError> {
        self.advance();
        let kind = match self.peek() {
            Token::Ident(w) if w == "public" => ImportKind::Public,
            Token::Ident(w) if w == "weak" => ImportKind::Weak,
            _ => ImportKind::Default,
        };
        if kind != ImportKind::Default {
            self.advance();
        }
        let path = self.take_str()?;
        self.expect(Token::Semi)?;
        Ok(RawImport { path, kind, line })
    }

    /// `packageStatement := 'package' IDENT ('.' IDENT)* ';'`
    fn parse_package(&mut self, line: u32) -> Result<RawDecl, DescError> {
        self.advance();
        let name = self.take_dotted_ident()?.join(".");
        self.expect(Token::Semi)?;
        Ok(RawDecl::Package { name, line })
    }
}

/// Parse a token stream produced by [`crate::lexer::lex`]. The stream must
/// end with `Token::Eof`.
pub fn parse(tokens: &[Spanned], filename: &str) -> Result<RawFile, DescError> {
    match tokens.last() {
        Some(last) if last.token == Token::Eof => {}
        last => {
            return Err(DescError::syntax(
                filename,
                last.map_or(1, |t| t.line),
                "token stream is not terminated by end of input",
            ))
        }
    }
    let mut p = Parser::new(tokens, filename);
    let file = p.parse_file()?;
    tracing::trace!(file = filename, decls = file.decls.len(), "parsed");
    Ok(file)
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
