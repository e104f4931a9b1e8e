//! Top-level error type unifying every phase of the pipeline, plus the
//! public [`run`] entry point that drives lexing → parsing → evaluation.

use std::error::Error;
use std::fmt::{self, Display};

use colored::Colorize;

use crate::environment::Environment;
use crate::evaluator::{self, RuntimeError};
use crate::lexer::{LexError, Lexer};
use crate::parser::{ParseError, Parser};
use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum KiraError {
    Lexer(LexError),
    Parser(ParseError),
    Runtime(RuntimeError),
}

impl Display for KiraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (label, body) = match self {
            KiraError::Lexer(e) => ("Lexer Error", e.to_string()),
            KiraError::Parser(e) => ("Parse Error", e.to_string()),
            KiraError::Runtime(e) => ("Runtime Error", e.to_string()),
        };
        write!(f, "{} {}", label.bold(), body)
    }
}

impl Error for KiraError {}

impl From<LexError> for KiraError {
    fn from(err: LexError) -> Self {
        KiraError::Lexer(err)
    }
}

impl From<ParseError> for KiraError {
    fn from(err: ParseError) -> Self {
        KiraError::Parser(err)
    }
}

impl From<RuntimeError> for KiraError {
    fn from(err: RuntimeError) -> Self {
        KiraError::Runtime(err)
    }
}

/// Lex, parse, and evaluate `source` against `env`, returning the value of
/// its last top-level expression statement.
pub fn run(source: &str, env: &Environment) -> Result<Value, KiraError> {
    let tokens = Lexer::new(source).tokenize()?;
    let program = Parser::new(tokens).parse()?;
    let value = evaluator::eval_program(&program, env)?;
    Ok(value)
}

/// Process exit code for a given outcome: 0 on success, 1 for any
/// lexer/parser/runtime error surfaced to the user.
pub fn exit_code(result: &Result<Value, KiraError>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(_) => 1,
    }
}
