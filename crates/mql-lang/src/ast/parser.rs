use std::iter::Peekable;

use smallvec::smallvec;

use crate::Shared;
use crate::lexer::token::{Token, TokenKind};
use crate::range::Position;
use crate::selector::Selector;

use super::Program;
use super::error::ParseError;
use super::node::{Args, Expr, Ident, Literal, Node};

pub const NOT: &str = "not";
pub const NEGATE: &str = "negate";

/// Deepest nesting of groups, arguments and unary operators the parser accepts.
pub const MAX_NESTING_DEPTH: usize = 256;

pub struct Parser<'a> {
    tokens: Peekable<core::slice::Iter<'a, Shared<Token>>>,
    last_end: Position,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: core::slice::Iter<'a, Shared<Token>>) -> Self {
        Self {
            tokens: tokens.peekable(),
            last_end: Position::default(),
            depth: 0,
        }
    }

    pub fn parse(&mut self) -> Result<Program, ParseError> {
        let first = self.advance().ok_or(ParseError::UnexpectedEOFDetected)?;
        if matches!(first.kind, TokenKind::Eof) {
            return Err(ParseError::UnexpectedEOFDetected);
        }

        let program = self.parse_pipeline(first)?;

        match self.advance() {
            Some(token) if !token.is_eof() => Err(ParseError::UnexpectedToken((**token).clone())),
            _ => Ok(program),
        }
    }

    fn advance(&mut self) -> Option<&'a Shared<Token>> {
        let token = self.tokens.next()?;
        self.last_end = token.range.end;
        Some(token)
    }

    fn peek_kind(&mut self) -> Option<&TokenKind> {
        self.tokens.peek().map(|token| &token.kind)
    }

    fn parse_pipeline(&mut self, first: &'a Shared<Token>) -> Result<Program, ParseError> {
        if matches!(first.kind, TokenKind::Pipe) {
            return Err(ParseError::UnexpectedToken((**first).clone()));
        }

        let mut program = vec![self.parse_expr(first)?];

        while matches!(self.peek_kind(), Some(TokenKind::Pipe)) {
            let pipe = self.advance().ok_or(ParseError::UnexpectedEOFDetected)?;
            let next = match self.advance() {
                Some(token)
                    if !matches!(
                        token.kind,
                        TokenKind::Eof | TokenKind::Pipe | TokenKind::RParen | TokenKind::Comma
                    ) =>
                {
                    token
                }
                _ => return Err(ParseError::EmptyPipe((**pipe).clone())),
            };
            program.push(self.parse_expr(next)?);
        }

        Ok(program)
    }

    fn parse_expr(&mut self, token: &'a Shared<Token>) -> Result<Shared<Node>, ParseError> {
        let lhs = self.parse_primary_expr(token)?;
        self.parse_binary_op(1, lhs)
    }

    fn binary_op_precedence(kind: &TokenKind) -> u8 {
        match kind {
            TokenKind::Or => 1,
            TokenKind::And => 2,
            TokenKind::EqEq | TokenKind::NeEq => 3,
            TokenKind::Lt | TokenKind::Lte | TokenKind::Gt | TokenKind::Gte => 4,
            TokenKind::Plus | TokenKind::Minus => 5,
            _ => 0,
        }
    }

    fn binary_op_function_name(kind: &TokenKind) -> Option<&'static str> {
        match kind {
            TokenKind::Or => Some("or"),
            TokenKind::And => Some("and"),
            TokenKind::EqEq => Some("eq"),
            TokenKind::NeEq => Some("ne"),
            TokenKind::Lt => Some("lt"),
            TokenKind::Lte => Some("lte"),
            TokenKind::Gt => Some("gt"),
            TokenKind::Gte => Some("gte"),
            TokenKind::Plus => Some("add"),
            TokenKind::Minus => Some("sub"),
            _ => None,
        }
    }

    fn next_binary_op_precedence(&mut self) -> u8 {
        self.peek_kind().map_or(0, Self::binary_op_precedence)
    }

    fn parse_binary_op(
        &mut self,
        min_prec: u8,
        mut lhs: Shared<Node>,
    ) -> Result<Shared<Node>, ParseError> {
        loop {
            let prec = self.next_binary_op_precedence();
            if prec == 0 || prec < min_prec {
                break;
            }

            let operator_token = self.advance().ok_or(ParseError::UnexpectedEOFDetected)?;
            let name = Self::binary_op_function_name(&operator_token.kind)
                .ok_or_else(|| ParseError::UnexpectedToken((**operator_token).clone()))?;
            let rhs_token = self.advance().ok_or(ParseError::UnexpectedEOFDetected)?;
            let mut rhs = self.parse_primary_expr(rhs_token)?;

            while self.next_binary_op_precedence() > prec {
                let next_prec = self.next_binary_op_precedence();
                rhs = self.parse_binary_op(next_prec, rhs)?;
            }

            lhs = Shared::new(Node::new(
                Shared::clone(operator_token),
                Expr::Call(
                    Ident::new(name, Shared::clone(operator_token)),
                    smallvec![lhs, rhs],
                ),
            ));
        }

        Ok(lhs)
    }

    fn parse_primary_expr(&mut self, token: &'a Shared<Token>) -> Result<Shared<Node>, ParseError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(ParseError::NestingTooDeep((**token).clone(), MAX_NESTING_DEPTH));
        }

        self.depth += 1;
        let node = self.parse_primary(token);
        self.depth -= 1;
        node
    }

    fn parse_primary(&mut self, token: &'a Shared<Token>) -> Result<Shared<Node>, ParseError> {
        match &token.kind {
            TokenKind::Selector(_) => self.parse_selector(token),
            TokenKind::Ident(name) => self.parse_ident(name, token),
            TokenKind::StringLiteral(s) => Ok(Self::literal(token, Literal::String(s.clone()))),
            TokenKind::NumberLiteral(n) => Ok(Self::literal(token, Literal::Number(*n))),
            TokenKind::BoolLiteral(b) => Ok(Self::literal(token, Literal::Bool(*b))),
            TokenKind::None => Ok(Self::literal(token, Literal::None)),
            TokenKind::Self_ => Ok(Shared::new(Node::new(Shared::clone(token), Expr::Self_))),
            TokenKind::LParen => self.parse_paren(token),
            TokenKind::Not => self.parse_unary(token, NOT),
            TokenKind::Minus => self.parse_unary(token, NEGATE),
            TokenKind::Eof => Err(ParseError::UnexpectedEOFDetected),
            _ => Err(ParseError::UnexpectedToken((**token).clone())),
        }
    }

    fn literal(token: &Shared<Token>, literal: Literal) -> Shared<Node> {
        Shared::new(Node::new(Shared::clone(token), Expr::Literal(literal)))
    }

    fn parse_paren(&mut self, lparen_token: &'a Shared<Token>) -> Result<Shared<Node>, ParseError> {
        let first = self.advance().ok_or(ParseError::UnexpectedEOFDetected)?;
        match first.kind {
            TokenKind::Eof => return Err(ParseError::ExpectedClosingParen((**first).clone())),
            TokenKind::RParen => return Err(ParseError::UnexpectedToken((**first).clone())),
            _ => {}
        }

        let program = self.parse_pipeline(first)?;
        self.expect_closing_paren()?;

        Ok(Shared::new(Node::new(
            Shared::clone(lparen_token),
            Expr::Paren(program),
        )))
    }

    fn parse_unary(
        &mut self,
        operator_token: &'a Shared<Token>,
        name: &str,
    ) -> Result<Shared<Node>, ParseError> {
        let operand_token = self.advance().ok_or(ParseError::UnexpectedEOFDetected)?;
        let operand = self.parse_primary_expr(operand_token)?;

        Ok(Shared::new(Node::new(
            Shared::clone(operator_token),
            Expr::Call(
                Ident::new(name, Shared::clone(operator_token)),
                smallvec![operand],
            ),
        )))
    }

    fn parse_ident(&mut self, name: &str, token: &'a Shared<Token>) -> Result<Shared<Node>, ParseError> {
        let args = if matches!(self.peek_kind(), Some(TokenKind::LParen)) {
            self.advance();
            self.parse_args()?
        } else {
            Args::new()
        };

        Ok(Shared::new(Node::new(
            Shared::clone(token),
            Expr::Call(Ident::new(name, Shared::clone(token)), args),
        )))
    }

    /// Parses comma separated arguments after an already consumed `(`.
    fn parse_args(&mut self) -> Result<Args, ParseError> {
        let mut args = Args::new();

        if matches!(self.peek_kind(), Some(TokenKind::RParen)) {
            self.advance();
            return Ok(args);
        }

        loop {
            let token = self.advance().ok_or(ParseError::UnexpectedEOFDetected)?;
            match token.kind {
                TokenKind::Eof => return Err(ParseError::ExpectedClosingParen((**token).clone())),
                TokenKind::Comma | TokenKind::RParen => {
                    return Err(ParseError::UnexpectedToken((**token).clone()));
                }
                _ => {}
            }

            let mut program = self.parse_pipeline(token)?;
            args.push(if program.len() == 1 {
                program.remove(0)
            } else {
                Shared::new(Node::new(Shared::clone(token), Expr::Paren(program)))
            });

            match self.advance() {
                Some(token) if matches!(token.kind, TokenKind::Comma) => continue,
                Some(token) if matches!(token.kind, TokenKind::RParen) => break,
                Some(token) => return Err(ParseError::ExpectedClosingParen((**token).clone())),
                None => return Err(ParseError::UnexpectedEOFDetected),
            }
        }

        Ok(args)
    }

    fn expect_closing_paren(&mut self) -> Result<(), ParseError> {
        match self.advance() {
            Some(token) if matches!(token.kind, TokenKind::RParen) => Ok(()),
            Some(token) => Err(ParseError::ExpectedClosingParen((**token).clone())),
            None => Err(ParseError::UnexpectedEOFDetected),
        }
    }

    fn parse_selector(&mut self, token: &'a Shared<Token>) -> Result<Shared<Node>, ParseError> {
        let head = self.parse_selector_direct(token)?;
        let mut chain = vec![head];

        // `.h.depth` arrives as two selector tokens with no gap between them.
        while let Some(next) = self.tokens.peek() {
            let adjacent = next.range.start == self.last_end;
            if !adjacent || !matches!(&next.kind, TokenKind::Selector(s) if s != ".") {
                break;
            }
            let next = self.advance().ok_or(ParseError::UnexpectedEOFDetected)?;
            chain.push(self.parse_selector_direct(next)?);
        }

        if chain.len() == 1 {
            Ok(chain.remove(0))
        } else {
            Ok(Shared::new(Node::new(Shared::clone(token), Expr::Paren(chain))))
        }
    }

    fn parse_selector_direct(&mut self, token: &'a Shared<Token>) -> Result<Shared<Node>, ParseError> {
        if matches!(&token.kind, TokenKind::Selector(s) if s == ".") {
            let expr = if matches!(self.peek_kind(), Some(TokenKind::LBracket)) {
                self.advance();
                Expr::Iterate(self.parse_index()?)
            } else {
                Expr::Identity
            };
            return Ok(Shared::new(Node::new(Shared::clone(token), expr)));
        }

        let selector = match Selector::try_from(&**token)? {
            Selector::Heading(None) if matches!(self.peek_kind(), Some(TokenKind::LParen)) => {
                self.advance();
                Selector::Heading(Some(self.parse_heading_level_arg()?))
            }
            Selector::Code(None) if matches!(self.peek_kind(), Some(TokenKind::LParen)) => {
                self.advance();
                Selector::Code(Some(self.parse_string_arg()?.into()))
            }
            selector => selector,
        };

        Ok(Shared::new(Node::new(
            Shared::clone(token),
            Expr::Selector(selector),
        )))
    }

    /// Parses the rest of `.[]` or `.[n]` after the `[`.
    fn parse_index(&mut self) -> Result<Option<usize>, ParseError> {
        let token = self.advance().ok_or(ParseError::UnexpectedEOFDetected)?;
        let index = match &token.kind {
            TokenKind::RBracket => return Ok(None),
            TokenKind::NumberLiteral(n) => n
                .as_index()
                .ok_or_else(|| ParseError::UnexpectedToken((**token).clone()))?,
            _ => return Err(ParseError::UnexpectedToken((**token).clone())),
        };

        match self.advance() {
            Some(token) if matches!(token.kind, TokenKind::RBracket) => Ok(Some(index)),
            Some(token) => Err(ParseError::ExpectedClosingBracket((**token).clone())),
            None => Err(ParseError::UnexpectedEOFDetected),
        }
    }

    fn parse_heading_level_arg(&mut self) -> Result<u8, ParseError> {
        let token = self.advance().ok_or(ParseError::UnexpectedEOFDetected)?;
        let level = match &token.kind {
            TokenKind::NumberLiteral(n) => n
                .as_index()
                .filter(|level| (1..=6).contains(level))
                .ok_or_else(|| ParseError::UnexpectedToken((**token).clone()))?,
            _ => return Err(ParseError::UnexpectedToken((**token).clone())),
        };
        self.expect_closing_paren()?;

        Ok(level as u8)
    }

    fn parse_string_arg(&mut self) -> Result<String, ParseError> {
        let token = self.advance().ok_or(ParseError::UnexpectedEOFDetected)?;
        let TokenKind::StringLiteral(s) = &token.kind else {
            return Err(ParseError::UnexpectedToken((**token).clone()));
        };
        let s = s.clone();
        self.expect_closing_paren()?;

        Ok(s)
    }
}
