use std::fmt::{self, Display, Formatter};

use smallvec::SmallVec;
use smol_str::SmolStr;

use crate::{Shared, lexer::token::Token, number::Number, selector::Selector};

use super::Program;

pub type Args = SmallVec<[Shared<Node>; 4]>;

#[derive(PartialEq, Debug, Clone)]
pub struct Node {
    pub token: Shared<Token>,
    pub expr: Shared<Expr>,
}

impl Node {
    pub fn new(token: Shared<Token>, expr: Expr) -> Self {
        Self {
            token,
            expr: Shared::new(expr),
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct Ident {
    pub name: SmolStr,
    pub token: Shared<Token>,
}

impl Ident {
    pub fn new(name: &str, token: Shared<Token>) -> Self {
        Self {
            name: SmolStr::new(name),
            token,
        }
    }
}

impl Display for Ident {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.name)
    }
}

#[derive(PartialEq, Debug, Clone)]
pub enum Literal {
    String(String),
    Number(Number),
    Bool(bool),
    None,
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Literal::String(s) => write!(f, "{:?}", s),
            Literal::Number(n) => write!(f, "{}", n),
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::None => write!(f, "None"),
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub enum Expr {
    /// `.`
    Identity,
    Selector(Selector),
    /// `.[]` when `None`, `.[n]` otherwise.
    Iterate(Option<usize>),
    Call(Ident, Args),
    Literal(Literal),
    Self_,
    /// A parenthesized sub-pipeline, also used for chained selectors such as `.h.depth`.
    Paren(Program),
}
