use std::fmt;

use itertools::Itertools;
use mql_lang::{Number, RuntimeValue};
use mql_markdown::{NodeKind, RenderOptions};

/// An owned, rendered query result, detached from the document it was selected from.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Markdown { value: String, kind: NodeKind },
    String(String),
    Number(Number),
    Bool(bool),
    Array(Vec<QueryValue>),
    None,
}

impl QueryValue {
    pub fn from_runtime(value: &RuntimeValue<'_>, options: &RenderOptions) -> Self {
        match value {
            RuntimeValue::Markdown(node) => QueryValue::Markdown {
                value: node.node.to_string_with(options),
                kind: node.node.kind(),
            },
            RuntimeValue::String(s) => QueryValue::String(s.clone()),
            RuntimeValue::Number(n) => QueryValue::Number(*n),
            RuntimeValue::Bool(b) => QueryValue::Bool(*b),
            RuntimeValue::Array(values) => QueryValue::Array(
                values
                    .iter()
                    .map(|v| QueryValue::from_runtime(v, options))
                    .collect(),
            ),
            RuntimeValue::None => QueryValue::None,
        }
    }

    pub fn text(&self) -> String {
        self.to_string()
    }

    pub fn kind(&self) -> Option<NodeKind> {
        match self {
            QueryValue::Markdown { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn is_markdown(&self) -> bool {
        matches!(self, QueryValue::Markdown { .. })
    }

    pub fn is_none(&self) -> bool {
        matches!(self, QueryValue::None)
    }

    /// Whether the value renders to nothing.
    pub fn is_empty(&self) -> bool {
        match self {
            QueryValue::Markdown { value, .. } | QueryValue::String(value) => value.is_empty(),
            QueryValue::Array(values) => values.iter().all(QueryValue::is_empty),
            QueryValue::Number(_) | QueryValue::Bool(_) => false,
            QueryValue::None => true,
        }
    }
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryValue::Markdown { value, .. } | QueryValue::String(value) => write!(f, "{}", value),
            QueryValue::Number(n) => write!(f, "{}", n),
            QueryValue::Bool(b) => write!(f, "{}", b),
            QueryValue::Array(values) => write!(
                f,
                "{}",
                values.iter().filter(|v| !v.is_empty()).join("\n")
            ),
            QueryValue::None => Ok(()),
        }
    }
}
