use smol_str::SmolStr;
use thiserror::Error;

use crate::lexer::token::Token;
use crate::selector::UnknownSelector;

#[derive(Error, Debug, PartialEq)]
pub enum ParseError {
    #[error("Unexpected token `{}`", if .0.is_eof() { "EOF".to_string() } else { .0.to_string() })]
    UnexpectedToken(Token),
    #[error("Unexpected EOF detected")]
    UnexpectedEOFDetected,
    #[error("Expected a closing parenthesis `)` but got `{}` delimiter", if .0.is_eof() { "EOF".to_string() } else { .0.to_string() })]
    ExpectedClosingParen(Token),
    #[error("Expected a closing bracket `]` but got `{}` delimiter", if .0.is_eof() { "EOF".to_string() } else { .0.to_string() })]
    ExpectedClosingBracket(Token),
    #[error("Expected an expression after `|`")]
    EmptyPipe(Token),
    #[error(transparent)]
    UnknownSelector(#[from] UnknownSelector),
    #[error("\"{1}\" is not defined")]
    UnknownFunction(Token, SmolStr),
    #[error("Invalid number of arguments in \"{1}\", expected {2}, got {3}")]
    InvalidNumberOfArguments(Token, SmolStr, u8, u8),
    #[error("Query nesting exceeds the maximum depth of {1}")]
    NestingTooDeep(Token, usize),
}

impl ParseError {
    #[cold]
    pub fn token(&self) -> Option<&Token> {
        match self {
            ParseError::UnexpectedToken(token)
            | ParseError::ExpectedClosingParen(token)
            | ParseError::ExpectedClosingBracket(token)
            | ParseError::EmptyPipe(token)
            | ParseError::UnknownFunction(token, _)
            | ParseError::InvalidNumberOfArguments(token, _, _, _)
            | ParseError::NestingTooDeep(token, _) => Some(token),
            ParseError::UnknownSelector(UnknownSelector(token)) => Some(token),
            ParseError::UnexpectedEOFDetected => None,
        }
    }
}
