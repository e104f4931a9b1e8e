//! Lexical analysis: converts Kira source text into a flat token sequence.
//!
//! A hand-rolled scanner over a [`Peekable`] char iterator that tracks
//! line/column as it goes, reporting malformed input as a [`LexError`] tied
//! to the offending position.

use std::error::Error;
use std::fmt::{self, Display};
use std::iter::Peekable;
use std::str::Chars;

use crate::token::{lookup_identifier, Literal, Position, Token, TokenKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub message: String,
    pub position: Position,
}

impl LexError {
    fn new(message: impl Into<String>, position: Position) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

impl Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "at {}: {}", self.position, self.message)
    }
}

impl Error for LexError {}

pub type LexResult<T> = Result<T, LexError>;

#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the entire source, returning tokens terminated by a single
    /// trailing `Eof` token. Internal newline markers are filtered out
    /// before returning, matching the Language's newline-insensitive grammar.
    pub fn tokenize(mut self) -> LexResult<Vec<Token>> {
        let mut tokens = vec![];

        loop {
            let token = self.next_token()?;
            let is_eof = token.kind == TokenKind::Eof;
            if token.kind != TokenKind::Newline {
                tokens.push(token);
            }
            if is_eof {
                break;
            }
        }

        Ok(tokens)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn peek2(&self) -> Option<char> {
        let mut clone = self.chars.clone();
        clone.next();
        clone.next()
    }

    fn advance(&mut self) -> Option<char> {
        let next = self.chars.next();
        match next {
            Some('\n') => {
                self.line += 1;
                self.column = 1;
            }
            Some(_) => self.column += 1,
            None => {}
        }
        next
    }

    fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(' ') | Some('\t') | Some('\r')) {
            self.advance();
        }
    }

    fn skip_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn next_token(&mut self) -> LexResult<Token> {
        self.skip_whitespace();

        let Some(c) = self.peek() else {
            return Ok(Token::new(TokenKind::Eof, "", self.position()));
        };

        if c == '#' {
            self.skip_comment();
            return self.next_token();
        }

        if c == '\n' {
            let position = self.position();
            self.advance();
            return Ok(Token::new(TokenKind::Newline, "\n", position));
        }

        if c == '"' || c == '\'' {
            return self.read_string(c);
        }

        if c.is_ascii_digit() {
            return self.read_number();
        }

        if c.is_alphabetic() || c == '_' {
            return self.read_identifier();
        }

        self.read_operator()
    }

    fn read_string(&mut self, quote: char) -> LexResult<Token> {
        let position = self.position();
        self.advance(); // opening quote

        let mut value = String::new();

        loop {
            match self.peek() {
                None => return Err(LexError::new("unterminated string literal", position)),
                Some('\n') => return Err(LexError::new("unterminated string literal", position)),
                Some(c) if c == quote => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    match self.peek() {
                        Some('n') => {
                            value.push('\n');
                            self.advance();
                        }
                        Some('t') => {
                            value.push('\t');
                            self.advance();
                        }
                        Some('r') => {
                            value.push('\r');
                            self.advance();
                        }
                        Some('\\') => {
                            value.push('\\');
                            self.advance();
                        }
                        Some(c) if c == quote => {
                            value.push(quote);
                            self.advance();
                        }
                        Some(c) => {
                            value.push('\\');
                            value.push(c);
                            self.advance();
                        }
                        None => return Err(LexError::new("unterminated string literal", position)),
                    }
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
            }
        }

        let literal = value.clone();
        Ok(Token::new(TokenKind::String, literal, position).with_value(Literal::Str(value)))
    }

    fn read_number(&mut self) -> LexResult<Token> {
        let position = self.position();
        let mut literal = String::new();
        let mut has_dot = false;

        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                literal.push(c);
                self.advance();
            } else if c == '.' && !has_dot && self.peek2().is_some_and(|n| n.is_ascii_digit()) {
                has_dot = true;
                literal.push(c);
                self.advance();
            } else {
                break;
            }
        }

        if has_dot {
            let value: f64 = literal
                .parse()
                .map_err(|_| LexError::new("invalid float literal", position))?;
            Ok(Token::new(TokenKind::Float, literal, position).with_value(Literal::Float(value)))
        } else {
            let value: i64 = literal
                .parse()
                .map_err(|_| LexError::new("invalid integer literal", position))?;
            Ok(Token::new(TokenKind::Integer, literal, position).with_value(Literal::Integer(value)))
        }
    }

    fn read_identifier(&mut self) -> LexResult<Token> {
        let position = self.position();
        let mut literal = String::new();

        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                literal.push(c);
                self.advance();
            } else {
                break;
            }
        }

        let kind = lookup_identifier(&literal);
        let mut token = Token::new(kind, literal, position);
        token = match kind {
            TokenKind::True => token.with_value(Literal::Bool(true)),
            TokenKind::False => token.with_value(Literal::Bool(false)),
            _ => token,
        };
        Ok(token)
    }

    fn read_operator(&mut self) -> LexResult<Token> {
        let position = self.position();
        let c = self.advance().expect("checked by caller");

        macro_rules! two_char {
            ($second:expr, $kind:expr, $lit:expr) => {
                if self.peek() == Some($second) {
                    self.advance();
                    return Ok(Token::new($kind, $lit, position));
                }
            };
        }

        match c {
            '=' => {
                two_char!('=', TokenKind::Eq, "==");
                Ok(Token::new(TokenKind::Assign, "=", position))
            }
            '!' => {
                two_char!('=', TokenKind::NotEq, "!=");
                Err(LexError::new("unexpected character '!'", position))
            }
            '<' => {
                two_char!('=', TokenKind::LtEq, "<=");
                Ok(Token::new(TokenKind::Lt, "<", position))
            }
            '>' => {
                two_char!('=', TokenKind::GtEq, ">=");
                Ok(Token::new(TokenKind::Gt, ">", position))
            }
            '*' => {
                two_char!('*', TokenKind::Power, "**");
                Ok(Token::new(TokenKind::Asterisk, "*", position))
            }
            '+' => {
                two_char!('=', TokenKind::PlusAssign, "+=");
                Ok(Token::new(TokenKind::Plus, "+", position))
            }
            '-' => {
                two_char!('=', TokenKind::MinusAssign, "-=");
                two_char!('>', TokenKind::Arrow, "->");
                Ok(Token::new(TokenKind::Minus, "-", position))
            }
            '/' => Ok(Token::new(TokenKind::Slash, "/", position)),
            '%' => Ok(Token::new(TokenKind::Percent, "%", position)),
            '(' => Ok(Token::new(TokenKind::LParen, "(", position)),
            ')' => Ok(Token::new(TokenKind::RParen, ")", position)),
            '{' => Ok(Token::new(TokenKind::LBrace, "{", position)),
            '}' => Ok(Token::new(TokenKind::RBrace, "}", position)),
            '[' => Ok(Token::new(TokenKind::LBracket, "[", position)),
            ']' => Ok(Token::new(TokenKind::RBracket, "]", position)),
            ',' => Ok(Token::new(TokenKind::Comma, ",", position)),
            ':' => Ok(Token::new(TokenKind::Colon, ":", position)),
            ';' => Ok(Token::new(TokenKind::Semicolon, ";", position)),
            '.' => Ok(Token::new(TokenKind::Dot, ".", position)),
            other => Err(LexError::new(
                format!("unexpected character '{other}'"),
                position,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_lex_let_statement() {
        assert_eq!(
            kinds("let foo = 42;"),
            vec![
                TokenKind::Let,
                TokenKind::Identifier,
                TokenKind::Assign,
                TokenKind::Integer,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_lex_float_vs_trailing_dot() {
        let tokens = Lexer::new("3.14 5.").tokenize().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Float);
        assert_eq!(tokens[1].kind, TokenKind::Integer);
        assert_eq!(tokens[2].kind, TokenKind::Dot);
    }

    #[test]
    fn test_lex_multi_char_operators() {
        assert_eq!(
            kinds("== != <= >= ** += -= ->"),
            vec![
                TokenKind::Eq,
                TokenKind::NotEq,
                TokenKind::LtEq,
                TokenKind::GtEq,
                TokenKind::Power,
                TokenKind::PlusAssign,
                TokenKind::MinusAssign,
                TokenKind::Arrow,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_string_escapes() {
        let tokens = Lexer::new(r#""a\nb\tc\"d\q""#).tokenize().unwrap();
        let Some(Literal::Str(value)) = &tokens[0].value else {
            panic!("expected string literal");
        };
        assert_eq!(value, "a\nb\tc\"d\\q");
    }

    #[test]
    fn test_unterminated_string_errors() {
        let err = Lexer::new("\"abc").tokenize().unwrap_err();
        assert_eq!(err.message, "unterminated string literal");
    }

    #[test]
    fn test_comment_is_skipped() {
        assert_eq!(
            kinds("let x = 1 # trailing comment\nlet y = 2"),
            vec![
                TokenKind::Let,
                TokenKind::Identifier,
                TokenKind::Assign,
                TokenKind::Integer,
                TokenKind::Let,
                TokenKind::Identifier,
                TokenKind::Assign,
                TokenKind::Integer,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_keyword_reclassification() {
        assert_eq!(
            kinds("if else while for in break continue and or not"),
            vec![
                TokenKind::If,
                TokenKind::Else,
                TokenKind::While,
                TokenKind::For,
                TokenKind::In,
                TokenKind::Break,
                TokenKind::Continue,
                TokenKind::And,
                TokenKind::Or,
                TokenKind::Not,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_unexpected_character_errors() {
        let err = Lexer::new("@").tokenize().unwrap_err();
        assert_eq!(err.message, "unexpected character '@'");
    }
}
