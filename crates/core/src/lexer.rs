use crate::error::DescError;
use protodesc_descriptor::ScalarKind;
use std::fmt;

/// Reserved words. Scalar type names are keywords too, which is what lets
/// the parser tell `int32 x = 1;` apart from a named-type field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Syntax,
    Package,
    Import,
    Option,
    Message,
    Enum,
    Optional,
    Required,
    Repeated,
    Scalar(ScalarKind),
}

impl Keyword {
    pub fn from_word(word: &str) -> Option<Keyword> {
        let kw = match word {
            "syntax" => Keyword::Syntax,
            "package" => Keyword::Package,
            "import" => Keyword::Import,
            "option" => Keyword::Option,
            "message" => Keyword::Message,
            "enum" => Keyword::Enum,
            "optional" => Keyword::Optional,
            "required" => Keyword::Required,
            "repeated" => Keyword::Repeated,
            other => Keyword::Scalar(ScalarKind::from_keyword(other)?),
        };
        Some(kw)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Syntax => "syntax",
            Keyword::Package => "package",
            Keyword::Import => "import",
            Keyword::Option => "option",
            Keyword::Message => "message",
            Keyword::Enum => "enum",
            Keyword::Optional => "optional",
            Keyword::Required => "required",
            Keyword::Repeated => "repeated",
            Keyword::Scalar(k) => k.keyword(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Keyword(Keyword),
    Ident(String),
    /// Unsigned decimal or hex literal, saturated at `i64::MAX`; the sign is
    /// a separate `Minus` token
    Int(i64),
    /// Decimal literal with a fraction or exponent, kept as written
    Float(String),
    /// Quoted string literal (content without quotes, escapes resolved)
    Str(String),
    // Punctuation
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Semi,
    Eq,
    Dot,
    Comma,
    Minus,
    // End of input
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Keyword(k) => write!(f, "'{}'", k.as_str()),
            Token::Ident(s) => write!(f, "identifier '{}'", s),
            Token::Int(n) => write!(f, "integer {}", n),
            Token::Float(s) => write!(f, "number {}", s),
            Token::Str(s) => write!(f, "string \"{}\"", s),
            Token::LBrace => f.write_str("'{'"),
            Token::RBrace => f.write_str("'}'"),
            Token::LBracket => f.write_str("'['"),
            Token::RBracket => f.write_str("']'"),
            Token::LParen => f.write_str("'('"),
            Token::RParen => f.write_str("')'"),
            Token::Semi => f.write_str("';'"),
            Token::Eq => f.write_str("'='"),
            Token::Dot => f.write_str("'.'"),
            Token::Comma => f.write_str("','"),
            Token::Minus => f.write_str("'-'"),
            Token::Eof => f.write_str("end of input"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Spanned {
    pub token: Token,
    pub line: u32,
    pub col: u32,
}

fn punctuation(c: char) -> Option<Token> {
    let t = match c {
        '{' => Token::LBrace,
        '}' => Token::RBrace,
        '[' => Token::LBracket,
        ']' => Token::RBracket,
        '(' => Token::LParen,
        ')' => Token::RParen,
        ';' => Token::Semi,
        '=' => Token::Eq,
        '.' => Token::Dot,
        ',' => Token::Comma,
        '-' => Token::Minus,
        _ => return None,
    };
    Some(t)
}

/// Tokenize `src`. The returned stream always ends with `Token::Eof`.
/// Lexing is all-or-nothing: the first bad character fails the whole file.
pub fn lex(src: &str, filename: &str) -> Result<Vec<Spanned>, DescError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = src.chars().collect();
    let mut pos = 0usize;
    let mut line: u32 = 1;
    let mut col: u32 = 1;

    // Advances over chars[pos], keeping line/col in step.
    macro_rules! bump {
        () => {{
            if chars[pos] == '\n' {
                line += 1;
                col = 1;
            } else {
                col += 1;
            }
            pos += 1;
        }};
    }

    while pos < chars.len() {
        let c = chars[pos];

        // Line comment
        if c == '/' && pos + 1 < chars.len() && chars[pos + 1] == '/' {
            while pos < chars.len() && chars[pos] != '\n' {
                bump!();
            }
            continue;
        }

        // Block comment
        if c == '/' && pos + 1 < chars.len() && chars[pos + 1] == '*' {
            let (start_line, start_col) = (line, col);
            bump!();
            bump!();
            loop {
                if pos >= chars.len() {
                    return Err(DescError::lex(filename, start_line, start_col, '/'));
                }
                if chars[pos] == '*' && pos + 1 < chars.len() && chars[pos + 1] == '/' {
                    bump!();
                    bump!();
                    break;
                }
                bump!();
            }
            continue;
        }

        if c.is_whitespace() {
            bump!();
            continue;
        }

        let (tok_line, tok_col) = (line, col);

        // String literal, either quote style
        if c == '"' || c == '\'' {
            let quote = c;
            bump!();
            let mut s = String::new();
            loop {
                if pos >= chars.len() || chars[pos] == '\n' {
                    return Err(DescError::lex(filename, tok_line, tok_col, quote));
                }
                let sc = chars[pos];
                if sc == quote {
                    bump!();
                    break;
                }
                if sc == '\\' {
                    bump!();
                    if pos >= chars.len() {
                        return Err(DescError::lex(filename, tok_line, tok_col, quote));
                    }
                    match chars[pos] {
                        '"' => s.push('"'),
                        '\'' => s.push('\''),
                        '\\' => s.push('\\'),
                        'n' => s.push('\n'),
                        't' => s.push('\t'),
                        other => {
                            s.push('\\');
                            s.push(other);
                        }
                    }
                    bump!();
                    continue;
                }
                s.push(sc);
                bump!();
            }
            tokens.push(Spanned {
                token: Token::Str(s),
                line: tok_line,
                col: tok_col,
            });
            continue;
        }

        // Number: decimal or hex integer, or a decimal with fraction
        // and/or exponent. Integers past i64 saturate; the parser
        // range-checks every integer it keeps.
        if c.is_ascii_digit() {
            let start = pos;
            let is_hex = c == '0'
                && pos + 2 < chars.len()
                && matches!(chars[pos + 1], 'x' | 'X')
                && chars[pos + 2].is_ascii_hexdigit();
            if is_hex {
                bump!();
                bump!();
                let digits_start = pos;
                while pos < chars.len() && chars[pos].is_ascii_hexdigit() {
                    bump!();
                }
                let digits: String = chars[digits_start..pos].iter().collect();
                tokens.push(Spanned {
                    token: Token::Int(i64::from_str_radix(&digits, 16).unwrap_or(i64::MAX)),
                    line: tok_line,
                    col: tok_col,
                });
                continue;
            }

            while pos < chars.len() && chars[pos].is_ascii_digit() {
                bump!();
            }
            let mut is_float = false;
            if pos + 1 < chars.len() && chars[pos] == '.' && chars[pos + 1].is_ascii_digit() {
                is_float = true;
                bump!(); // consume '.'
                while pos < chars.len() && chars[pos].is_ascii_digit() {
                    bump!();
                }
            }
            if pos < chars.len() && matches!(chars[pos], 'e' | 'E') {
                let mut exp_digits = pos + 1;
                if exp_digits < chars.len() && matches!(chars[exp_digits], '+' | '-') {
                    exp_digits += 1;
                }
                if exp_digits < chars.len() && chars[exp_digits].is_ascii_digit() {
                    is_float = true;
                    while pos < exp_digits {
                        bump!();
                    }
                    while pos < chars.len() && chars[pos].is_ascii_digit() {
                        bump!();
                    }
                }
            }
            let s: String = chars[start..pos].iter().collect();
            let token = if is_float {
                Token::Float(s)
            } else {
                // Only digits were consumed, so overflow is the sole failure.
                Token::Int(s.parse().unwrap_or(i64::MAX))
            };
            tokens.push(Spanned {
                token,
                line: tok_line,
                col: tok_col,
            });
            continue;
        }

        if let Some(token) = punctuation(c) {
            tokens.push(Spanned {
                token,
                line: tok_line,
                col: tok_col,
            });
            bump!();
            continue;
        }

        // Identifier / keyword
        if c.is_ascii_alphabetic() || c == '_' {
            let start = pos;
            while pos < chars.len() && (chars[pos].is_ascii_alphanumeric() || chars[pos] == '_') {
                bump!();
            }
            let word: String = chars[start..pos].iter().collect();
            let token = match Keyword::from_word(&word) {
                Some(kw) => Token::Keyword(kw),
                None => Token::Ident(word),
            };
            tokens.push(Spanned {
                token,
                line: tok_line,
                col: tok_col,
            });
            continue;
        }

        return Err(DescError::lex(filename, tok_line, tok_col, c));
    }

    tokens.push(Spanned {
        token: Token::Eof,
        line,
        col,
    });
    tracing::trace!(file = filename, tokens = tokens.len(), "lexed");
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<Token> {
        lex(src, "t.proto")
            .unwrap()
            .into_iter()
            .map(|s| s.token)
            .collect()
    }

    #[test]
    fn keywords_identifiers_and_punctuation() {
        let toks = kinds("message Foo { int32 id = 1; }");
        assert_eq!(
            toks,
            vec![
                Token::Keyword(Keyword::Message),
                Token::Ident("Foo".into()),
                Token::LBrace,
                Token::Keyword(Keyword::Scalar(ScalarKind::Int32)),
                Token::Ident("id".into()),
                Token::Eq,
                Token::Int(1),
                Token::Semi,
                Token::RBrace,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn all_fifteen_scalar_keywords_are_reserved() {
        let src = "string bool int32 int64 uint32 uint64 sint32 sint64 \
                   fixed32 fixed64 sfixed32 sfixed64 float double bytes";
        let toks = kinds(src);
        assert_eq!(toks.len(), 16);
        assert!(toks[..15]
            .iter()
            .all(|t| matches!(t, Token::Keyword(Keyword::Scalar(_)))));
    }

    #[test]
    fn both_quote_styles_and_escapes() {
        let toks = kinds(r#"import "a/b.proto"; import 'c.proto'; "x\"y\n""#);
        assert_eq!(toks[1], Token::Str("a/b.proto".into()));
        assert_eq!(toks[4], Token::Str("c.proto".into()));
        assert_eq!(toks[6], Token::Str("x\"y\n".into()));
    }

    #[test]
    fn comments_are_skipped_and_lines_tracked() {
        let src = "// header\n/* block\n comment */ message\n  Foo";
        let toks = lex(src, "t.proto").unwrap();
        assert_eq!(toks[0].token, Token::Keyword(Keyword::Message));
        assert_eq!((toks[0].line, toks[0].col), (3, 13));
        assert_eq!(toks[1].token, Token::Ident("Foo".into()));
        assert_eq!((toks[1].line, toks[1].col), (4, 3));
    }

    #[test]
    fn numbers_and_signs() {
        let toks = kinds("= -42 1.5");
        assert_eq!(
            toks,
            vec![
                Token::Eq,
                Token::Minus,
                Token::Int(42),
                Token::Float("1.5".into()),
                Token::Eof
            ]
        );
    }

    #[test]
    fn hex_and_exponent_literals() {
        let toks = kinds("0x1F 1e10 2.5E-3 7");
        assert_eq!(
            toks,
            vec![
                Token::Int(31),
                Token::Float("1e10".into()),
                Token::Float("2.5E-3".into()),
                Token::Int(7),
                Token::Eof
            ]
        );
    }

    #[test]
    fn oversized_integer_saturates() {
        let toks = kinds("99999999999999999999");
        assert_eq!(toks[0], Token::Int(i64::MAX));
    }

    #[test]
    fn dotted_names_split_into_parts() {
        let toks = kinds("Outer.Inner");
        assert_eq!(
            toks,
            vec![
                Token::Ident("Outer".into()),
                Token::Dot,
                Token::Ident("Inner".into()),
                Token::Eof
            ]
        );
    }

    #[test]
    fn unrecognized_character_reports_position() {
        let err = lex("message Foo {\n  int32 #x = 1;\n}", "bad.proto").unwrap_err();
        assert_eq!(
            err,
            DescError::Lex {
                file: "bad.proto".into(),
                line: 2,
                col: 9,
                ch: '#',
            }
        );
    }

    #[test]
    fn unterminated_string_is_fatal() {
        let err = lex("syntax = \"proto3;\n", "s.proto").unwrap_err();
        assert!(matches!(err, DescError::Lex { line: 1, col: 10, ch: '"', .. }));
    }

    #[test]
    fn unterminated_block_comment_is_fatal() {
        let err = lex("message /* never closed", "c.proto").unwrap_err();
        assert!(matches!(err, DescError::Lex { line: 1, col: 9, .. }));
    }
}
