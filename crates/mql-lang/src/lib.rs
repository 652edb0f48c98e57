//! `mql-lang` provides the parser, compiler and evaluator for mql queries.
//!
//! A query is a `|`-separated pipeline of selectors, function calls and
//! literals that is compiled once into a [`Pipeline`] and evaluated against
//! a sequence of [`RuntimeValue`]s borrowed from a parsed document.
//!
//! ## Examples
//!
//! ```rust
//! use mql_lang::{Engine, RuntimeValue};
//!
//! let doc = mql_markdown::parse_markdown("# Hello\n\nWorld");
//! let values = Engine::default()
//!     .eval(".h1 | to_text", RuntimeValue::sequence_from(&doc))
//!     .unwrap();
//!
//! assert_eq!(values, vec![RuntimeValue::String("Hello".to_string())]);
//! ```
mod ast;
mod compiler;
mod engine;
mod error;
mod eval;
mod lexer;
mod number;
mod range;
mod selector;

use lexer::Lexer;

pub use ast::Program;
pub use ast::error::ParseError;
pub use ast::node::Expr as AstExpr;
pub use ast::node::Ident as AstIdent;
pub use ast::node::Literal as AstLiteral;
pub use ast::node::Node as AstNode;
pub use ast::parser::Parser as AstParser;
pub use compiler::{Call, Compiler, Pipeline, Stage, ValueType};
pub use engine::{Engine, Options};
pub use error::{Error, InnerError};
pub use eval::builtin::{BUILTIN_FUNCTIONS, BuiltinFunction, ParamNum};
pub use eval::error::EvalError;
pub use eval::runtime_value::{NodeRef, RuntimeValue};
pub use lexer::Options as LexerOptions;
pub use lexer::error::LexerError;
pub use lexer::token::{Token, TokenKind};
pub use number::Number;
pub use range::{Position, Range};
pub use selector::{AttrKind, Selector, UnknownSelector};

pub type Shared<T> = std::sync::Arc<T>;

#[allow(clippy::result_large_err)]
pub fn tokenize(code: &str, options: LexerOptions) -> Result<Vec<Token>, Error> {
    Lexer::new(options)
        .tokenize(code)
        .map_err(|e| Error::from_error(code, InnerError::Lexer(e)))
}

#[allow(clippy::result_large_err)]
pub fn parse(code: &str) -> Result<Program, Error> {
    let tokens = tokenize(code, LexerOptions::default())?
        .into_iter()
        .map(Shared::new)
        .collect::<Vec<_>>();

    AstParser::new(tokens.iter())
        .parse()
        .map_err(|e| Error::from_error(code, InnerError::Parse(e)))
}

/// Parses and compiles `code` into a reusable [`Pipeline`].
#[allow(clippy::result_large_err)]
pub fn compile(code: &str) -> Result<Pipeline, Error> {
    Compiler::new()
        .compile(&parse(code)?)
        .map_err(|e| Error::from_error(code, InnerError::Parse(e)))
}
