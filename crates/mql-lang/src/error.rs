use miette::{Diagnostic, SourceOffset, SourceSpan};

use crate::{
    ast::error::ParseError, eval::error::EvalError, lexer::error::LexerError, range::Range,
};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum InnerError {
    #[error(transparent)]
    Eval(#[from] EvalError),
    #[error(transparent)]
    Lexer(#[from] LexerError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl InnerError {
    fn range(&self) -> Option<Range> {
        match self {
            InnerError::Lexer(LexerError::UnexpectedCharacter(_, range))
            | InnerError::Lexer(LexerError::UnterminatedString(range)) => Some(*range),
            InnerError::Parse(err) => err.token().map(|token| token.range),
            InnerError::Eval(err) => err.token().map(|token| token.range),
        }
    }
}

/// A query error with enough context to render a diagnostic against the query text.
#[derive(PartialEq, Debug, thiserror::Error)]
#[error("{cause}")]
pub struct Error {
    pub cause: InnerError,
    /// The query the error was raised for.
    pub source_code: String,
    pub location: SourceSpan,
}

impl Error {
    pub fn from_error(source_code: impl Into<String>, cause: InnerError) -> Self {
        let source_code = source_code.into();

        let location = match cause.range() {
            Some(range) => {
                let start = SourceOffset::from_location(
                    &source_code,
                    range.start.line as usize,
                    range.start.column,
                );
                let end = SourceOffset::from_location(
                    &source_code,
                    range.end.line as usize,
                    range.end.column,
                );

                SourceSpan::new(
                    start,
                    std::cmp::max(end.offset().saturating_sub(start.offset()), 1),
                )
            }
            None if matches!(cause, InnerError::Parse(ParseError::UnexpectedEOFDetected)) => {
                let line = source_code.lines().count().max(1);
                let column = source_code.lines().last().map_or(0, str::len) + 1;
                SourceSpan::new(SourceOffset::from_location(&source_code, line, column), 1)
            }
            None => SourceSpan::new(SourceOffset::from_location(&source_code, 1, 1), 1),
        };

        Self {
            cause,
            source_code,
            location,
        }
    }
}

impl Diagnostic for Error {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        let code = match &self.cause {
            InnerError::Lexer(LexerError::UnexpectedCharacter(..)) => {
                "LexerError::UnexpectedCharacter"
            }
            InnerError::Lexer(LexerError::UnterminatedString(_)) => "LexerError::UnterminatedString",
            InnerError::Parse(ParseError::UnexpectedToken(_)) => "ParseError::UnexpectedToken",
            InnerError::Parse(ParseError::UnexpectedEOFDetected) => {
                "ParseError::UnexpectedEOFDetected"
            }
            InnerError::Parse(ParseError::ExpectedClosingParen(_)) => {
                "ParseError::ExpectedClosingParen"
            }
            InnerError::Parse(ParseError::ExpectedClosingBracket(_)) => {
                "ParseError::ExpectedClosingBracket"
            }
            InnerError::Parse(ParseError::EmptyPipe(_)) => "ParseError::EmptyPipe",
            InnerError::Parse(ParseError::UnknownSelector(_)) => "ParseError::UnknownSelector",
            InnerError::Parse(ParseError::UnknownFunction(..)) => "ParseError::UnknownFunction",
            InnerError::Parse(ParseError::InvalidNumberOfArguments(..)) => {
                "ParseError::InvalidNumberOfArguments"
            }
            InnerError::Parse(ParseError::NestingTooDeep(..)) => "ParseError::NestingTooDeep",
            InnerError::Eval(EvalError::InvalidTypes { .. }) => "EvalError::InvalidTypes",
            InnerError::Eval(EvalError::InvalidStageInput { .. }) => "EvalError::InvalidStageInput",
            InnerError::Eval(EvalError::InvalidRegularExpression(..)) => {
                "EvalError::InvalidRegularExpression"
            }
            InnerError::Eval(EvalError::RecursionError(_)) => "EvalError::RecursionError",
        };

        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        let msg = match &self.cause {
            InnerError::Lexer(LexerError::UnexpectedCharacter(..)) => {
                "Remove the character or quote it inside a string literal."
            }
            InnerError::Lexer(LexerError::UnterminatedString(_)) => {
                "Close the string literal with a matching `\"`."
            }
            InnerError::Parse(ParseError::UnexpectedToken(_)) => {
                "Check for syntax errors or misplaced tokens."
            }
            InnerError::Parse(ParseError::UnexpectedEOFDetected) => {
                "The query ended unexpectedly. Make sure all expressions are complete."
            }
            InnerError::Parse(ParseError::ExpectedClosingParen(_)) => {
                "Add the missing `)` to close the argument list or group."
            }
            InnerError::Parse(ParseError::ExpectedClosingBracket(_)) => {
                "Add the missing `]` to close the index."
            }
            InnerError::Parse(ParseError::EmptyPipe(_)) => "Add an expression after `|`.",
            InnerError::Parse(ParseError::UnknownSelector(_)) => {
                "Use a known selector such as `.h`, `.code`, `.list` or `.link`."
            }
            InnerError::Parse(ParseError::UnknownFunction(..)) => {
                "Check the spelling of the function name."
            }
            InnerError::Parse(ParseError::InvalidNumberOfArguments(..)) => {
                "Check the number of arguments passed to the function."
            }
            InnerError::Parse(ParseError::NestingTooDeep(..)) => {
                "Flatten the query by removing redundant parentheses or operators."
            }
            InnerError::Eval(EvalError::InvalidTypes { .. }) => {
                "Check that the arguments have the types the function accepts."
            }
            InnerError::Eval(EvalError::InvalidStageInput { .. }) => {
                "Selectors only apply to markdown nodes. Move the selector before any string conversion."
            }
            InnerError::Eval(EvalError::InvalidRegularExpression(..)) => {
                "Check the regular expression syntax."
            }
            InnerError::Eval(EvalError::RecursionError(_)) => {
                "Reduce the nesting of the query."
            }
        };

        Some(Box::new(msg))
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = miette::LabeledSpan> + '_>> {
        Some(Box::new(std::iter::once(
            miette::LabeledSpan::new_with_span(Some(format!("{}", self.cause)), self.location),
        )))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.source_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::token::{Token, TokenKind};
    use crate::range::Position;
    use rstest::rstest;

    fn token(start: usize, end: usize) -> Token {
        Token::new(
            Range::new(Position::new(1, start), Position::new(1, end)),
            TokenKind::Not,
        )
    }

    #[rstest]
    #[case::token(".h1 !!!", InnerError::Parse(ParseError::UnexpectedToken(token(5, 6))), 4, 1)]
    #[case::lexer(
        ".h1 @",
        InnerError::Lexer(LexerError::UnexpectedCharacter('@', Range::new(Position::new(1, 5), Position::new(1, 6)))),
        4,
        1
    )]
    #[case::eof(".h1 ==", InnerError::Parse(ParseError::UnexpectedEOFDetected), 6, 1)]
    #[case::without_token(".h1", InnerError::Eval(EvalError::RecursionError(1)), 0, 1)]
    fn test_from_error_location(
        #[case] code: &str,
        #[case] cause: InnerError,
        #[case] offset: usize,
        #[case] len: usize,
    ) {
        let err = Error::from_error(code, cause);
        assert_eq!(err.location, SourceSpan::new(offset.into(), len));
        assert_eq!(err.source_code, code);
    }

    #[test]
    fn test_diagnostic() {
        let err = Error::from_error(
            ".h1 !!!",
            InnerError::Parse(ParseError::UnexpectedToken(token(5, 6))),
        );

        assert_eq!(
            err.code().map(|c| c.to_string()),
            Some("ParseError::UnexpectedToken".to_string())
        );
        assert!(err.help().is_some());
        assert_eq!(err.labels().map(|l| l.count()), Some(1));
        assert_eq!(err.to_string(), "Unexpected token `!`");
    }
}
