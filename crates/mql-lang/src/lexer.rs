pub mod error;
pub mod token;

use error::LexerError;
use nom::Parser;
use nom::{
    IResult,
    branch::alt,
    bytes::complete::{escaped_transform, is_not, tag, take_while_m_n},
    character::complete::{alpha1, alphanumeric1, char, digit1, multispace0, none_of},
    combinator::{map, map_opt, map_res, opt, recognize, value},
    multi::many0,
    sequence::{delimited, pair, preceded},
};
use nom_locate::position;
use smol_str::SmolStr;
use token::{Token, TokenKind};

use crate::number::Number;
use crate::range::{Position, Range, Span};

const SELECTOR_PREFIX: &str = ".";

macro_rules! define_token_parser {
    ($name:ident, $tag:expr, $kind:expr) => {
        fn $name(input: Span) -> IResult<Span, Token> {
            map(tag($tag), |span: Span| Token {
                range: span.into(),
                kind: $kind,
            })
            .parse(input)
        }
    };
}

#[derive(Debug, Clone, Default)]
pub struct Options {
    pub include_comments: bool,
}

pub struct Lexer {
    options: Options,
}

impl Lexer {
    pub fn new(options: Options) -> Self {
        Self { options }
    }

    pub fn tokenize(&self, input: &str) -> Result<Vec<Token>, LexerError> {
        let (rest, mut tokens) = match tokens(Span::new(input)) {
            Ok(result) => result,
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => (e.input, Vec::new()),
            Err(nom::Err::Incomplete(_)) => (Span::new(""), Vec::new()),
        };

        if let Some(ch) = rest.fragment().chars().next() {
            let start = Position::from(rest);
            let range = Range::new(start, Position::new(start.line, start.column + 1));

            return Err(if ch == '"' {
                LexerError::UnterminatedString(range)
            } else {
                LexerError::UnexpectedCharacter(ch, range)
            });
        }

        if !self.options.include_comments {
            tokens.retain(|token| !matches!(token.kind, TokenKind::Comment(_)));
        }

        tokens.push(Token {
            range: rest.into(),
            kind: TokenKind::Eof,
        });

        Ok(tokens)
    }
}

fn unicode(input: Span) -> IResult<Span, char> {
    map_opt(
        map_res(
            preceded(
                char('u'),
                delimited(
                    char('{'),
                    take_while_m_n(1, 6, |c: char| c.is_ascii_hexdigit()),
                    char('}'),
                ),
            ),
            |span: Span| u32::from_str_radix(span.fragment(), 16),
        ),
        char::from_u32,
    )
    .parse(input)
}

fn inline_comment(input: Span) -> IResult<Span, Token> {
    map(
        recognize(preceded(char('#'), opt(is_not("\n\r")))),
        |span: Span| Token {
            range: span.into(),
            kind: TokenKind::Comment(span.fragment()[1..].to_string()),
        },
    )
    .parse(input)
}

define_token_parser!(comma, ",", TokenKind::Comma);
define_token_parser!(l_paren, "(", TokenKind::LParen);
define_token_parser!(r_paren, ")", TokenKind::RParen);
define_token_parser!(l_bracket, "[", TokenKind::LBracket);
define_token_parser!(r_bracket, "]", TokenKind::RBracket);
define_token_parser!(and, "&&", TokenKind::And);
define_token_parser!(or, "||", TokenKind::Or);
define_token_parser!(pipe, "|", TokenKind::Pipe);
define_token_parser!(eq_eq, "==", TokenKind::EqEq);
define_token_parser!(ne_eq, "!=", TokenKind::NeEq);
define_token_parser!(not, "!", TokenKind::Not);
define_token_parser!(lte, "<=", TokenKind::Lte);
define_token_parser!(lt, "<", TokenKind::Lt);
define_token_parser!(gte, ">=", TokenKind::Gte);
define_token_parser!(gt, ">", TokenKind::Gt);
define_token_parser!(plus, "+", TokenKind::Plus);
define_token_parser!(minus, "-", TokenKind::Minus);
define_token_parser!(
    empty_string,
    "\"\"",
    TokenKind::StringLiteral(String::new())
);

fn punctuations(input: Span) -> IResult<Span, Token> {
    alt((l_paren, r_paren, comma, l_bracket, r_bracket)).parse(input)
}

fn operators(input: Span) -> IResult<Span, Token> {
    alt((
        and, or, pipe, eq_eq, ne_eq, not, lte, lt, gte, gt, plus, minus,
    ))
    .parse(input)
}

fn number_literal(input: Span) -> IResult<Span, Token> {
    map_res(
        recognize(pair(digit1, opt(pair(char('.'), digit1)))),
        |span: Span| {
            str::parse::<f64>(span.fragment()).map(|n| Token {
                range: span.into(),
                kind: TokenKind::NumberLiteral(Number::new(n)),
            })
        },
    )
    .parse(input)
}

fn string_literal(input: Span) -> IResult<Span, Token> {
    let (span, start) = position(input)?;
    let (span, s) = delimited(
        char('"'),
        escaped_transform(
            none_of("\"\\"),
            '\\',
            alt((
                value('\\', char('\\')),
                value('\"', char('\"')),
                value('\r', char('r')),
                value('\n', char('n')),
                value('\t', char('t')),
                unicode,
            )),
        ),
        char('"'),
    )
    .parse(span)?;
    let (span, end) = position(span)?;

    Ok((
        span,
        Token {
            range: Range {
                start: start.into(),
                end: end.into(),
            },
            kind: TokenKind::StringLiteral(s),
        },
    ))
}

fn literals(input: Span) -> IResult<Span, Token> {
    alt((number_literal, empty_string, string_literal)).parse(input)
}

fn ident(input: Span) -> IResult<Span, Token> {
    map(
        recognize(pair(
            alt((alpha1, tag("_"), tag(SELECTOR_PREFIX))),
            many0(alt((alphanumeric1, tag("_")))),
        )),
        |span: Span| {
            let fragment = *span.fragment();
            let kind = match fragment {
                "true" => TokenKind::BoolLiteral(true),
                "false" => TokenKind::BoolLiteral(false),
                "None" => TokenKind::None,
                "self" => TokenKind::Self_,
                _ if fragment.starts_with(SELECTOR_PREFIX) => {
                    TokenKind::Selector(SmolStr::new(fragment))
                }
                _ => TokenKind::Ident(SmolStr::new(fragment)),
            };

            Token {
                range: span.into(),
                kind,
            }
        },
    )
    .parse(input)
}

fn token(input: Span) -> IResult<Span, Token> {
    alt((inline_comment, punctuations, operators, literals, ident)).parse(input)
}

fn tokens(input: Span) -> IResult<Span, Vec<Token>> {
    preceded(multispace0, many0(delimited(multispace0, token, multispace0))).parse(input)
}
