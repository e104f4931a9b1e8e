//! Token definitions for the Kira lexer.
//!
//! A [`Token`] pairs a [`TokenKind`] with the raw source text it was scanned
//! from, an optional pre-parsed literal value, and its 1-based source
//! position. Tokens are produced once by the lexer and never mutated.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt::{self, Display};

/// 1-based (line, column) location of a token's first character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Literals
    Integer,
    Float,
    String,
    True,
    False,
    Null,

    // Identifiers and keywords
    Identifier,
    Let,
    Const,
    Fn,
    Return,
    If,
    Else,
    While,
    For,
    In,
    Break,
    Continue,

    // Operators
    Plus,
    Minus,
    Asterisk,
    Slash,
    Percent,
    Power,

    // Comparison
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,

    // Logical
    And,
    Or,
    Not,

    // Assignment
    Assign,
    PlusAssign,
    MinusAssign,

    // Delimiters
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Colon,
    Semicolon,
    Dot,
    Arrow,

    // Special
    Newline,
    Eof,
}

/// Parsed literal payload for tokens that carry one (numbers, strings,
/// booleans). Identifiers and punctuation carry `None`.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Integer(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
    pub value: Option<Literal>,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>, position: Position) -> Self {
        Self {
            kind,
            literal: literal.into(),
            value: None,
            position,
        }
    }

    pub fn with_value(mut self, value: Literal) -> Self {
        self.value = Some(value);
        self
    }
}

/// Reserved-word table, consulted by the lexer once an identifier has been
/// scanned in full (§6 of the language spec).
pub static KEYWORDS: Lazy<HashMap<&'static str, TokenKind>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("let", TokenKind::Let);
    m.insert("const", TokenKind::Const);
    m.insert("fn", TokenKind::Fn);
    m.insert("return", TokenKind::Return);
    m.insert("if", TokenKind::If);
    m.insert("else", TokenKind::Else);
    m.insert("while", TokenKind::While);
    m.insert("for", TokenKind::For);
    m.insert("in", TokenKind::In);
    m.insert("break", TokenKind::Break);
    m.insert("continue", TokenKind::Continue);
    m.insert("true", TokenKind::True);
    m.insert("false", TokenKind::False);
    m.insert("null", TokenKind::Null);
    m.insert("and", TokenKind::And);
    m.insert("or", TokenKind::Or);
    m.insert("not", TokenKind::Not);
    m
});

/// Classify an identifier, returning the keyword's token kind if reserved.
pub fn lookup_identifier(ident: &str) -> TokenKind {
    KEYWORDS.get(ident).copied().unwrap_or(TokenKind::Identifier)
}
