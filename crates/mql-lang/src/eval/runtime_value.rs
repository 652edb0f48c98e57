use std::{cmp::Ordering, fmt};

use itertools::Itertools;
use mql_markdown::{Code, Image, ListItem, Node, Path, RenderOptions};

use crate::{number::Number, selector::AttrKind};

/// A node borrowed from the document tree, with its position relative to the root.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRef<'a> {
    pub node: &'a Node,
    pub path: Path,
}

impl<'a> NodeRef<'a> {
    pub fn new(node: &'a Node, path: Path) -> Self {
        Self { node, path }
    }

    /// Nodes at or beneath this one, in document order.
    pub fn descendants(&self) -> impl Iterator<Item = NodeRef<'a>> + '_ {
        self.node
            .walk()
            .map(|(node, path)| NodeRef::new(node, self.path.join(&path)))
    }

    pub fn children(&self) -> Vec<RuntimeValue<'a>> {
        self.node
            .children()
            .iter()
            .enumerate()
            .map(|(i, child)| RuntimeValue::Markdown(NodeRef::new(child, self.path.child(i))))
            .collect()
    }

    pub fn attr(&self, attr: AttrKind) -> RuntimeValue<'a> {
        match (attr, self.node) {
            (AttrKind::Depth | AttrKind::Level, Node::Heading(heading)) => {
                Number::from(heading.depth).into()
            }
            (AttrKind::Level, Node::ListItem(ListItem { level, .. })) => Number::from(*level).into(),
            (AttrKind::Index, Node::ListItem(ListItem { index, .. })) => Number::from(*index).into(),
            (AttrKind::Ordered, Node::ListItem(ListItem { ordered, .. })) => (*ordered).into(),
            (AttrKind::Checked, Node::ListItem(ListItem { checked, .. })) => {
                checked.map_or(RuntimeValue::None, RuntimeValue::Bool)
            }
            (AttrKind::Lang, node) => node.lang().map_or(RuntimeValue::None, Into::into),
            (AttrKind::Meta, Node::Code(Code { meta, .. })) => {
                meta.as_deref().map_or(RuntimeValue::None, Into::into)
            }
            (AttrKind::Url, node) => node.url().map_or(RuntimeValue::None, Into::into),
            (AttrKind::Title, node) => node.title().map_or(RuntimeValue::None, Into::into),
            (AttrKind::Alt, Node::Image(Image { alt, .. })) => alt.as_str().into(),
            (AttrKind::Value, node) => node.to_text().into(),
            (AttrKind::Children, _) => RuntimeValue::Array(self.children()),
            _ => RuntimeValue::None,
        }
    }
}

/// The unit flowing between pipeline stages.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RuntimeValue<'a> {
    Markdown(NodeRef<'a>),
    String(String),
    Number(Number),
    Bool(bool),
    Array(Vec<RuntimeValue<'a>>),
    #[default]
    None,
}

impl From<bool> for RuntimeValue<'_> {
    fn from(b: bool) -> Self {
        RuntimeValue::Bool(b)
    }
}

impl From<String> for RuntimeValue<'_> {
    fn from(s: String) -> Self {
        RuntimeValue::String(s)
    }
}

impl From<&str> for RuntimeValue<'_> {
    fn from(s: &str) -> Self {
        RuntimeValue::String(s.to_string())
    }
}

impl From<Number> for RuntimeValue<'_> {
    fn from(n: Number) -> Self {
        RuntimeValue::Number(n)
    }
}

impl From<usize> for RuntimeValue<'_> {
    fn from(n: usize) -> Self {
        RuntimeValue::Number(Number::from(n))
    }
}

impl<'a> From<Vec<RuntimeValue<'a>>> for RuntimeValue<'a> {
    fn from(values: Vec<RuntimeValue<'a>>) -> Self {
        RuntimeValue::Array(values)
    }
}

impl<'a> From<NodeRef<'a>> for RuntimeValue<'a> {
    fn from(node: NodeRef<'a>) -> Self {
        RuntimeValue::Markdown(node)
    }
}

impl PartialOrd for RuntimeValue<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (RuntimeValue::Number(a), RuntimeValue::Number(b)) => a.partial_cmp(b),
            (RuntimeValue::Bool(a), RuntimeValue::Bool(b)) => a.partial_cmp(b),
            (RuntimeValue::String(a), RuntimeValue::String(b)) => a.partial_cmp(b),
            (RuntimeValue::Markdown(a), RuntimeValue::Markdown(b)) => {
                a.node.to_text().partial_cmp(&b.node.to_text())
            }
            (RuntimeValue::Markdown(a), RuntimeValue::String(b)) => a.node.to_text().partial_cmp(b),
            (RuntimeValue::String(a), RuntimeValue::Markdown(b)) => a.partial_cmp(&b.node.to_text()),
            (RuntimeValue::Array(a), RuntimeValue::Array(b)) => a.partial_cmp(b),
            (RuntimeValue::None, RuntimeValue::None) => Some(Ordering::Equal),
            _ => None,
        }
    }
}

impl fmt::Display for RuntimeValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_with(&RenderOptions::default()))
    }
}

impl<'a> RuntimeValue<'a> {
    /// The initial value sequence for a document: one value per top-level block.
    pub fn sequence_from(root: &'a Node) -> Vec<RuntimeValue<'a>> {
        match root {
            Node::Root(_) => NodeRef::new(root, Path::new()).children(),
            node => vec![RuntimeValue::Markdown(NodeRef::new(node, Path::new()))],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RuntimeValue::Markdown(_) => "markdown",
            RuntimeValue::String(_) => "string",
            RuntimeValue::Number(_) => "number",
            RuntimeValue::Bool(_) => "bool",
            RuntimeValue::Array(_) => "array",
            RuntimeValue::None => "None",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, RuntimeValue::None)
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            RuntimeValue::Bool(b) => *b,
            RuntimeValue::Number(n) => n.value() != 0.0,
            RuntimeValue::String(s) => !s.is_empty(),
            RuntimeValue::Array(a) => !a.is_empty(),
            RuntimeValue::Markdown(_) => true,
            RuntimeValue::None => false,
        }
    }

    /// Plain text with markup removed; used by string builtins.
    pub fn to_text(&self) -> String {
        match self {
            RuntimeValue::Markdown(node) => node.node.to_text(),
            RuntimeValue::Array(values) => values.iter().map(RuntimeValue::to_text).join(""),
            value => value.to_string(),
        }
    }

    /// Canonical textual form of the value.
    pub fn to_string_with(&self, options: &RenderOptions) -> String {
        match self {
            RuntimeValue::Markdown(node) => node.node.to_string_with(options),
            RuntimeValue::String(s) => s.clone(),
            RuntimeValue::Number(n) => n.to_string(),
            RuntimeValue::Bool(b) => b.to_string(),
            RuntimeValue::Array(values) => values
                .iter()
                .map(|v| v.to_string_with(options))
                .filter(|s| !s.is_empty())
                .join("\n"),
            RuntimeValue::None => String::new(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            RuntimeValue::Markdown(node) => node.node.to_text().chars().count(),
            RuntimeValue::String(s) => s.chars().count(),
            RuntimeValue::Array(values) => values.len(),
            RuntimeValue::Number(_) | RuntimeValue::Bool(_) => 1,
            RuntimeValue::None => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mql_markdown::{Heading, Origin, Strong};
    use rstest::rstest;

    fn document() -> Node {
        Node::root(vec![
            Node::Heading(Heading::new(2, vec!["Title".into()])),
            Node::paragraph(vec![
                "a ".into(),
                Node::Strong(Strong {
                    values: vec!["b".into()],
                }),
            ]),
        ])
    }

    #[test]
    fn test_sequence_from_root_yields_top_level_blocks() {
        let root = document();
        let values = RuntimeValue::sequence_from(&root);

        assert_eq!(values.len(), 2);
        assert_eq!(values[0].to_string(), "## Title");
        assert_eq!(values[1].to_string(), "a **b**");
    }

    #[test]
    fn test_descendants_keep_absolute_paths() {
        let root = document();
        let values = RuntimeValue::sequence_from(&root);
        let RuntimeValue::Markdown(paragraph) = &values[1] else {
            panic!("expected a node");
        };

        let paths = paragraph
            .descendants()
            .map(|n| n.path.to_string())
            .collect::<Vec<_>>();
        assert_eq!(paths, vec!["/1", "/1/0", "/1/1", "/1/1/0"]);
    }

    #[rstest]
    #[case::heading_depth(Node::Heading(Heading::new(3, vec![])), AttrKind::Depth, RuntimeValue::Number(Number::new(3.0)))]
    #[case::heading_level(Node::Heading(Heading::new(3, vec![])), AttrKind::Level, RuntimeValue::Number(Number::new(3.0)))]
    #[case::code_lang(
        Node::Code(Code { value: "x".into(), lang: Some("rust".into()), meta: None }),
        AttrKind::Lang,
        "rust".into()
    )]
    #[case::code_without_meta(
        Node::Code(Code { value: "x".into(), lang: None, meta: None }),
        AttrKind::Meta,
        RuntimeValue::None
    )]
    #[case::value(Node::raw("<A />", Origin::Mdx), AttrKind::Value, "<A />".into())]
    #[case::missing(Node::paragraph(vec![]), AttrKind::Url, RuntimeValue::None)]
    fn test_attr(#[case] node: Node, #[case] attr: AttrKind, #[case] expected: RuntimeValue) {
        assert_eq!(NodeRef::new(&node, Path::new()).attr(attr), expected);
    }

    #[rstest]
    #[case::bool_false(RuntimeValue::Bool(false), false)]
    #[case::zero(RuntimeValue::Number(Number::new(0.0)), false)]
    #[case::empty_string("".into(), false)]
    #[case::string("a".into(), true)]
    #[case::none(RuntimeValue::None, false)]
    #[case::empty_array(RuntimeValue::Array(vec![]), false)]
    fn test_is_truthy(#[case] value: RuntimeValue, #[case] expected: bool) {
        assert_eq!(value.is_truthy(), expected);
    }

    #[rstest]
    #[case::number(RuntimeValue::Number(Number::new(1.5)), "1.5")]
    #[case::bool(RuntimeValue::Bool(true), "true")]
    #[case::none(RuntimeValue::None, "")]
    #[case::array(RuntimeValue::Array(vec!["a".into(), RuntimeValue::Number(Number::new(2.0))]), "a\n2")]
    #[case::array_skips_empty(RuntimeValue::Array(vec!["a".into(), RuntimeValue::None, "".into(), "b".into()]), "a\nb")]
    fn test_display(#[case] value: RuntimeValue, #[case] expected: &str) {
        assert_eq!(value.to_string(), expected);
    }
}
