use std::fmt::{self, Display};

use itertools::Itertools;

use crate::render::RenderOptions;
use crate::traverse::Walk;

pub type Level = usize;

/// Which reader produced a raw node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Origin {
    #[default]
    Markdown,
    Mdx,
    Html,
    Text,
}

impl Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Markdown => write!(f, "markdown"),
            Origin::Mdx => write!(f, "mdx"),
            Origin::Html => write!(f, "html"),
            Origin::Text => write!(f, "text"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Url(String);

impl Url {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Title(String);

impl Title {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A whole document. Its values are the top-level blocks.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Root {
    pub values: Vec<Node>,
}

/// An ATX or setext heading holding inline content.
#[derive(Debug, Clone, PartialEq)]
pub struct Heading {
    pub depth: u8,
    pub values: Vec<Node>,
}

impl Heading {
    /// Creates a heading, clamping `depth` into `1..=6`.
    pub fn new(depth: u8, values: Vec<Node>) -> Self {
        Self {
            depth: depth.clamp(1, 6),
            values,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    pub values: Vec<Node>,
}

/// One item of a list.
///
/// Lists have no node of their own. A list is the run of sibling items sharing
/// `level`, and nested lists follow their parent item as siblings one level deeper.
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    pub values: Vec<Node>,
    pub ordered: bool,
    /// Position within its list, restarting at zero for every list.
    pub index: usize,
    /// Nesting depth, zero for top-level lists.
    pub level: Level,
    /// `Some` for task list items.
    pub checked: Option<bool>,
}

/// A fenced or indented code block.
#[derive(Debug, Clone, PartialEq)]
pub struct Code {
    pub value: String,
    /// First word of the fence info string.
    pub lang: Option<String>,
    /// Rest of the fence info string.
    pub meta: Option<String>,
}

/// A block quote holding blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct Blockquote {
    pub values: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CodeInline {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Emphasis {
    pub values: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Strong {
    pub values: Vec<Node>,
}

/// An inline link or autolink.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub url: Url,
    pub title: Option<Title>,
    pub values: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub url: Url,
    pub alt: String,
    pub title: Option<Title>,
}

/// Verbatim markup the readers could not (or should not) model structurally,
/// such as HTML tags or MDX components.
#[derive(Debug, Clone, PartialEq)]
pub struct RawInline {
    pub value: String,
    pub origin: Origin,
}

/// A run of plain text, unescaped.
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub value: String,
}

/// A node of the document tree every reader produces.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Root(Root),
    Heading(Heading),
    Paragraph(Paragraph),
    ListItem(ListItem),
    Code(Code),
    Blockquote(Blockquote),
    HorizontalRule,
    CodeInline(CodeInline),
    Emphasis(Emphasis),
    Strong(Strong),
    Link(Link),
    Image(Image),
    Break,
    RawInline(RawInline),
    Text(Text),
}

/// The kind of a [`Node`] without its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Root,
    Heading,
    Paragraph,
    ListItem,
    Code,
    Blockquote,
    HorizontalRule,
    CodeInline,
    Emphasis,
    Strong,
    Link,
    Image,
    Break,
    RawInline,
    Text,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Root => "root",
            NodeKind::Heading => "heading",
            NodeKind::Paragraph => "paragraph",
            NodeKind::ListItem => "list_item",
            NodeKind::Code => "code",
            NodeKind::Blockquote => "blockquote",
            NodeKind::HorizontalRule => "horizontal_rule",
            NodeKind::CodeInline => "inline_code",
            NodeKind::Emphasis => "emphasis",
            NodeKind::Strong => "strong",
            NodeKind::Link => "link",
            NodeKind::Image => "image",
            NodeKind::Break => "break",
            NodeKind::RawInline => "raw_inline",
            NodeKind::Text => "text",
        }
    }

    pub fn is_block(&self) -> bool {
        matches!(
            self,
            NodeKind::Heading
                | NodeKind::Paragraph
                | NodeKind::ListItem
                | NodeKind::Code
                | NodeKind::Blockquote
                | NodeKind::HorizontalRule
        )
    }
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_with(&RenderOptions::default()))
    }
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Root(_) => NodeKind::Root,
            Node::Heading(_) => NodeKind::Heading,
            Node::Paragraph(_) => NodeKind::Paragraph,
            Node::ListItem(_) => NodeKind::ListItem,
            Node::Code(_) => NodeKind::Code,
            Node::Blockquote(_) => NodeKind::Blockquote,
            Node::HorizontalRule => NodeKind::HorizontalRule,
            Node::CodeInline(_) => NodeKind::CodeInline,
            Node::Emphasis(_) => NodeKind::Emphasis,
            Node::Strong(_) => NodeKind::Strong,
            Node::Link(_) => NodeKind::Link,
            Node::Image(_) => NodeKind::Image,
            Node::Break => NodeKind::Break,
            Node::RawInline(_) => NodeKind::RawInline,
            Node::Text(_) => NodeKind::Text,
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Root(Root { values })
            | Node::Heading(Heading { values, .. })
            | Node::Paragraph(Paragraph { values })
            | Node::ListItem(ListItem { values, .. })
            | Node::Blockquote(Blockquote { values })
            | Node::Emphasis(Emphasis { values })
            | Node::Strong(Strong { values })
            | Node::Link(Link { values, .. }) => values,
            Node::Code(_)
            | Node::HorizontalRule
            | Node::CodeInline(_)
            | Node::Image(_)
            | Node::Break
            | Node::RawInline(_)
            | Node::Text(_) => &[],
        }
    }

    /// Depth-first, pre-order traversal of this node and everything beneath it.
    pub fn walk(&self) -> Walk<'_> {
        Walk::new(self)
    }

    /// The plain-text content of this node, markup removed.
    pub fn to_text(&self) -> String {
        match self {
            Node::Code(Code { value, .. })
            | Node::CodeInline(CodeInline { value })
            | Node::RawInline(RawInline { value, .. })
            | Node::Text(Text { value }) => value.clone(),
            Node::Image(Image { alt, .. }) => alt.clone(),
            Node::Break => "\n".to_string(),
            Node::HorizontalRule => String::new(),
            Node::Root(Root { values }) | Node::Blockquote(Blockquote { values }) => {
                values.iter().map(Node::to_text).join("\n")
            }
            _ => self.children().iter().map(Node::to_text).join(""),
        }
    }

    pub fn is_mdx(&self) -> bool {
        matches!(
            self,
            Node::RawInline(RawInline {
                origin: Origin::Mdx,
                ..
            })
        )
    }

    pub fn depth(&self) -> Option<u8> {
        match self {
            Node::Heading(Heading { depth, .. }) => Some(*depth),
            _ => None,
        }
    }

    pub fn lang(&self) -> Option<&str> {
        match self {
            Node::Code(Code { lang, .. }) => lang.as_deref(),
            _ => None,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            Node::Link(Link { url, .. }) | Node::Image(Image { url, .. }) => Some(url.as_str()),
            _ => None,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            Node::Link(Link { title, .. }) | Node::Image(Image { title, .. }) => {
                title.as_ref().map(Title::as_str)
            }
            _ => None,
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Node::Text(Text {
            value: value.into(),
        })
    }

    pub fn raw(value: impl Into<String>, origin: Origin) -> Self {
        Node::RawInline(RawInline {
            value: value.into(),
            origin,
        })
    }

    pub fn paragraph(values: Vec<Node>) -> Self {
        Node::Paragraph(Paragraph { values })
    }

    pub fn root(values: Vec<Node>) -> Self {
        Node::Root(Root { values })
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::text(value)
    }
}
