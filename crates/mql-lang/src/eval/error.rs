use smol_str::SmolStr;
use thiserror::Error;

use crate::lexer::token::Token;

type FunctionName = SmolStr;
type ArgType = Vec<SmolStr>;
type ErrorToken = Token;

#[derive(Error, Debug, PartialEq)]
pub enum EvalError {
    #[error(r#"Invalid types for "{}", got {}"#, name, args.join(", "))]
    InvalidTypes {
        token: ErrorToken,
        name: FunctionName,
        args: ArgType,
    },
    #[error("Cannot apply `{stage}` to a value of type {value_type}")]
    InvalidStageInput {
        token: ErrorToken,
        stage: SmolStr,
        value_type: SmolStr,
    },
    #[error("Invalid regular expression \"{1}\"")]
    InvalidRegularExpression(ErrorToken, String),
    #[error("Maximum recursion depth exceeded \"{0}\"")]
    RecursionError(u32),
}

impl EvalError {
    #[cold]
    pub fn token(&self) -> Option<&Token> {
        match self {
            EvalError::InvalidTypes { token, .. }
            | EvalError::InvalidStageInput { token, .. }
            | EvalError::InvalidRegularExpression(token, _) => Some(token),
            EvalError::RecursionError(_) => None,
        }
    }
}
