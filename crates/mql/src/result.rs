use std::fmt;

use itertools::Itertools;
use mql_lang::RuntimeValue;
use mql_markdown::RenderOptions;

use crate::value::QueryValue;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryResult {
    pub values: Vec<QueryValue>,
}

impl QueryResult {
    pub fn from_runtime(values: &[RuntimeValue<'_>], options: &RenderOptions) -> Self {
        Self {
            values: values
                .iter()
                .map(|v| QueryValue::from_runtime(v, options))
                .collect(),
        }
    }

    /// Rendered values, skipping those that render to nothing.
    pub fn values(&self) -> Vec<String> {
        self.values
            .iter()
            .filter(|v| !v.is_empty())
            .map(QueryValue::text)
            .collect()
    }

    pub fn text(&self) -> String {
        self.values().iter().join("\n")
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&QueryValue> {
        self.values.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, QueryValue> {
        self.values.iter()
    }

    /// Whether one of [`values`](Self::values) is exactly `text`.
    pub fn contains(&self, text: &str) -> bool {
        self.values().iter().any(|v| v == text)
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text())
    }
}

impl From<Vec<QueryValue>> for QueryResult {
    fn from(values: Vec<QueryValue>) -> Self {
        Self { values }
    }
}

impl IntoIterator for QueryResult {
    type Item = QueryValue;
    type IntoIter = std::vec::IntoIter<QueryValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a> IntoIterator for &'a QueryResult {
    type Item = &'a QueryValue;
    type IntoIter = std::slice::Iter<'a, QueryValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}
