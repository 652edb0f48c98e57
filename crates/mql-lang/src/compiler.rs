use std::fmt::{self, Display, Formatter};

use itertools::Itertools;
use smol_str::SmolStr;

use crate::{
    Shared,
    ast::{
        Program,
        error::ParseError,
        node::{Expr, Ident, Literal, Node},
    },
    eval::{
        builtin::{BUILTIN_FUNCTIONS, BuiltinFunction},
        error::EvalError,
        runtime_value::RuntimeValue,
    },
    lexer::token::Token,
    selector::{AttrKind, Selector},
};

const SELECT: &str = "select";

/// Static approximation of the values a stage produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Markdown,
    String,
    Number,
    Bool,
    Array,
    None,
    Any,
}

impl ValueType {
    /// Values of a scalar type have no nodes to select from.
    pub fn is_scalar(self) -> bool {
        matches!(
            self,
            ValueType::String | ValueType::Number | ValueType::Bool | ValueType::None
        )
    }

    /// The common type of a value sequence, `Any` when it is mixed or empty.
    pub fn of(values: &[RuntimeValue<'_>]) -> ValueType {
        values
            .iter()
            .map(ValueType::of_value)
            .dedup()
            .exactly_one()
            .unwrap_or(ValueType::Any)
    }

    fn of_value(value: &RuntimeValue<'_>) -> ValueType {
        match value {
            RuntimeValue::Markdown(_) => ValueType::Markdown,
            RuntimeValue::String(_) => ValueType::String,
            RuntimeValue::Number(_) => ValueType::Number,
            RuntimeValue::Bool(_) => ValueType::Bool,
            RuntimeValue::Array(_) => ValueType::Array,
            RuntimeValue::None => ValueType::None,
        }
    }

    fn of_literal(literal: &Literal) -> ValueType {
        match literal {
            Literal::String(_) => ValueType::String,
            Literal::Number(_) => ValueType::Number,
            Literal::Bool(_) => ValueType::Bool,
            Literal::None => ValueType::None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ValueType::Markdown => "markdown",
            ValueType::String => "string",
            ValueType::Number => "number",
            ValueType::Bool => "bool",
            ValueType::Array => "array",
            ValueType::None => "None",
            ValueType::Any => "any",
        }
    }
}

/// A compiled query. Immutable once built and safe to share between threads.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    pub stages: Vec<Stage>,
}

#[derive(Debug, Clone)]
pub struct Call {
    pub ident: Ident,
    pub builtin: &'static BuiltinFunction,
    pub args: Vec<Pipeline>,
    /// The current value is passed as the first argument.
    pub implicit_self: bool,
}

#[derive(Debug, Clone)]
pub enum Stage {
    Identity,
    Literal(Literal),
    Selector(Selector, Shared<Token>),
    Attribute(AttrKind, Shared<Token>),
    Iterate(Option<usize>, Shared<Token>),
    /// `select(predicate)`
    Filter(Pipeline),
    Call(Call),
    Group(Pipeline),
}

impl Pipeline {
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Walks the stages with the type of the incoming values and rejects
    /// node-only stages that would receive scalars.
    pub fn check(&self, input: ValueType) -> Result<ValueType, EvalError> {
        self.stages
            .iter()
            .try_fold(input, |input, stage| stage.check(input))
    }
}

impl Stage {
    fn check(&self, input: ValueType) -> Result<ValueType, EvalError> {
        match self {
            Stage::Identity => Ok(input),
            Stage::Literal(literal) => Ok(ValueType::of_literal(literal)),
            Stage::Selector(_, token) => {
                self.ensure_node_input(input, token)?;
                Ok(ValueType::Markdown)
            }
            Stage::Attribute(_, token) => {
                self.ensure_node_input(input, token)?;
                Ok(ValueType::Any)
            }
            Stage::Iterate(_, token) => {
                self.ensure_node_input(input, token)?;
                Ok(if input == ValueType::Markdown {
                    ValueType::Markdown
                } else {
                    ValueType::Any
                })
            }
            Stage::Filter(predicate) => {
                predicate.check(input)?;
                Ok(input)
            }
            Stage::Call(call) => {
                for arg in &call.args {
                    arg.check(input)?;
                }
                Ok(call.builtin.returns)
            }
            Stage::Group(pipeline) => pipeline.check(input),
        }
    }

    fn ensure_node_input(&self, input: ValueType, token: &Token) -> Result<(), EvalError> {
        if input.is_scalar() {
            Err(EvalError::InvalidStageInput {
                token: token.clone(),
                stage: SmolStr::new(self.to_string()),
                value_type: SmolStr::new(input.name()),
            })
        } else {
            Ok(())
        }
    }
}

impl Display for Pipeline {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.stages.iter().join(" | "))
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Stage::Identity => write!(f, "."),
            Stage::Literal(literal) => write!(f, "{}", literal),
            Stage::Selector(selector, _) => write!(f, "{}", selector),
            Stage::Attribute(attr, _) => write!(f, "{}", attr),
            Stage::Iterate(None, _) => write!(f, ".[]"),
            Stage::Iterate(Some(i), _) => write!(f, ".[{}]", i),
            Stage::Filter(predicate) => write!(f, "{}({})", SELECT, predicate),
            Stage::Call(call) => write!(f, "{}({})", call.ident, call.args.iter().join(", ")),
            Stage::Group(pipeline) => write!(f, "({})", pipeline),
        }
    }
}

/// Turns a parsed program into a [`Pipeline`], resolving every function name
/// against the builtin table.
#[derive(Debug, Default)]
pub struct Compiler;

impl Compiler {
    pub fn new() -> Self {
        Self
    }

    pub fn compile(&self, program: &Program) -> Result<Pipeline, ParseError> {
        let stages = program
            .iter()
            .map(|node| self.compile_node(node))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Pipeline { stages })
    }

    fn compile_node(&self, node: &Shared<Node>) -> Result<Stage, ParseError> {
        match &*node.expr {
            Expr::Identity | Expr::Self_ => Ok(Stage::Identity),
            Expr::Literal(literal) => Ok(Stage::Literal(literal.clone())),
            Expr::Selector(Selector::Attr(attr)) => {
                Ok(Stage::Attribute(*attr, Shared::clone(&node.token)))
            }
            Expr::Selector(selector) => {
                Ok(Stage::Selector(selector.clone(), Shared::clone(&node.token)))
            }
            Expr::Iterate(index) => Ok(Stage::Iterate(*index, Shared::clone(&node.token))),
            Expr::Paren(program) => Ok(Stage::Group(self.compile(program)?)),
            Expr::Call(ident, args) if ident.name == SELECT => match args.as_slice() {
                [predicate] => Ok(Stage::Filter(self.compile_arg(predicate)?)),
                _ => Err(ParseError::InvalidNumberOfArguments(
                    (*ident.token).clone(),
                    ident.name.clone(),
                    1,
                    arg_count(args.len()),
                )),
            },
            Expr::Call(ident, args) => {
                let builtin = BUILTIN_FUNCTIONS.get(ident.name.as_str()).ok_or_else(|| {
                    ParseError::UnknownFunction((*ident.token).clone(), ident.name.clone())
                })?;
                let num_args = arg_count(args.len());

                let implicit_self = if builtin.num_params.is_valid(num_args) {
                    false
                } else if builtin.num_params.is_missing_one_params(num_args) {
                    true
                } else {
                    return Err(ParseError::InvalidNumberOfArguments(
                        (*ident.token).clone(),
                        ident.name.clone(),
                        builtin.num_params.to_num(),
                        num_args,
                    ));
                };

                let args = args
                    .iter()
                    .map(|arg| self.compile_arg(arg))
                    .collect::<Result<Vec<_>, _>>()?;

                Ok(Stage::Call(Call {
                    ident: ident.clone(),
                    builtin,
                    args,
                    implicit_self,
                }))
            }
        }
    }

    fn compile_arg(&self, arg: &Shared<Node>) -> Result<Pipeline, ParseError> {
        match &*arg.expr {
            Expr::Paren(program) => self.compile(program),
            _ => Ok(Pipeline {
                stages: vec![self.compile_node(arg)?],
            }),
        }
    }
}

fn arg_count(len: usize) -> u8 {
    u8::try_from(len).unwrap_or(u8::MAX)
}
