//! Tree-walking interpreter for the Kira scripting language.
//!
//! The pipeline is the usual one: [`lexer`] turns source text into a flat
//! token stream, [`parser`] builds an [`ast::Program`] from it with a Pratt
//! parser, and [`evaluator`] walks that tree against an [`environment`].
//! [`builtins`] supplies the standard library consulted when a name
//! resolves to nothing in scope. [`error`] unifies the three stages'
//! error types and exposes the crate's single public entry point, [`run`].

pub mod ast;
pub mod builtins;
pub mod environment;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod repl;
pub mod token;
pub mod value;

pub use environment::Environment;
pub use error::{run, KiraError};
pub use value::Value;
