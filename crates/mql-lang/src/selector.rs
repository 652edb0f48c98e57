use std::fmt::{self, Display, Formatter};

use mql_markdown::{Code, Heading, Node};
use smol_str::SmolStr;
use thiserror::Error;

use crate::lexer::token::{Token, TokenKind};

#[derive(Error, Clone, Debug, PartialEq)]
#[error("Unknown selector `{0}`")]
pub struct UnknownSelector(pub Token);

/// Matches nodes of one structural kind anywhere at or beneath a value.
#[derive(PartialEq, Debug, Eq, Clone, Hash)]
pub enum Selector {
    /// `.h`, `.h1` .. `.h6`. `None` matches every heading level.
    Heading(Option<u8>),
    /// `.p`
    Paragraph,
    /// `.code`, a fenced or indented block. `None` matches code blocks in any language.
    Code(Option<SmolStr>),
    /// `.code_inline`
    InlineCode,
    /// `.list`, a single list item.
    ListItem,
    Blockquote,
    HorizontalRule,
    Strong,
    Emphasis,
    /// `.link`, an inline or resolved reference link.
    Link,
    Image,
    /// A hard line break.
    Break,
    /// Plain text runs.
    Text,
    /// Raw markup from any reader.
    Raw,
    /// Raw markup produced by the MDX reader only.
    Mdx,
    /// Reads a property of the current node, see [`AttrKind`].
    Attr(AttrKind),
}

/// A property read from the current node instead of a node search.
///
/// Properties a node does not carry evaluate to `None`.
#[derive(PartialEq, Debug, Eq, Clone, Copy, Hash)]
pub enum AttrKind {
    /// Heading level.
    Depth,
    /// Heading level, or the nesting level of a list item.
    Level,
    /// Code block language.
    Lang,
    /// Text following the language on a code fence.
    Meta,
    /// Link or image destination.
    Url,
    /// Link or image title.
    Title,
    /// Image alternative text.
    Alt,
    Ordered,
    /// Position of a list item within its list.
    Index,
    /// Task list state, `None` for plain items.
    Checked,
    /// The node's text content.
    Value,
    /// Direct children as an array.
    Children,
}

impl AttrKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "depth" => Some(AttrKind::Depth),
            "level" => Some(AttrKind::Level),
            "lang" => Some(AttrKind::Lang),
            "meta" => Some(AttrKind::Meta),
            "url" => Some(AttrKind::Url),
            "title" => Some(AttrKind::Title),
            "alt" => Some(AttrKind::Alt),
            "ordered" => Some(AttrKind::Ordered),
            "index" => Some(AttrKind::Index),
            "checked" => Some(AttrKind::Checked),
            "value" => Some(AttrKind::Value),
            "children" => Some(AttrKind::Children),
            _ => None,
        }
    }
}

impl Display for AttrKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        let name = match self {
            AttrKind::Depth => "depth",
            AttrKind::Level => "level",
            AttrKind::Lang => "lang",
            AttrKind::Meta => "meta",
            AttrKind::Url => "url",
            AttrKind::Title => "title",
            AttrKind::Alt => "alt",
            AttrKind::Ordered => "ordered",
            AttrKind::Index => "index",
            AttrKind::Checked => "checked",
            AttrKind::Value => "value",
            AttrKind::Children => "children",
        };
        write!(f, ".{}", name)
    }
}

impl TryFrom<&Token> for Selector {
    type Error = UnknownSelector;

    fn try_from(token: &Token) -> Result<Self, Self::Error> {
        let TokenKind::Selector(s) = &token.kind else {
            return Err(UnknownSelector(token.clone()));
        };

        match s.as_str() {
            ".h" | ".heading" => Ok(Selector::Heading(None)),
            ".h1" => Ok(Selector::Heading(Some(1))),
            ".h2" => Ok(Selector::Heading(Some(2))),
            ".h3" => Ok(Selector::Heading(Some(3))),
            ".h4" => Ok(Selector::Heading(Some(4))),
            ".h5" => Ok(Selector::Heading(Some(5))),
            ".h6" => Ok(Selector::Heading(Some(6))),
            ".p" | ".paragraph" => Ok(Selector::Paragraph),
            ".code" => Ok(Selector::Code(None)),
            ".code_inline" | ".inline_code" => Ok(Selector::InlineCode),
            ".list" | ".list_item" | ".li" => Ok(Selector::ListItem),
            ".blockquote" => Ok(Selector::Blockquote),
            ".hr" | ".horizontal_rule" => Ok(Selector::HorizontalRule),
            ".strong" => Ok(Selector::Strong),
            ".emphasis" | ".em" => Ok(Selector::Emphasis),
            ".link" => Ok(Selector::Link),
            ".image" => Ok(Selector::Image),
            ".break" => Ok(Selector::Break),
            ".text" => Ok(Selector::Text),
            ".raw" | ".html" => Ok(Selector::Raw),
            ".mdx" => Ok(Selector::Mdx),

            name => name
                .strip_prefix('.')
                .and_then(AttrKind::from_name)
                .map(Selector::Attr)
                .ok_or_else(|| UnknownSelector(token.clone())),
        }
    }
}

impl Display for Selector {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Selector::Heading(None) => write!(f, ".h"),
            Selector::Heading(Some(n)) => write!(f, ".h{}", n),
            Selector::Paragraph => write!(f, ".paragraph"),
            Selector::Code(None) => write!(f, ".code"),
            Selector::Code(Some(lang)) => write!(f, ".code(\"{}\")", lang),
            Selector::InlineCode => write!(f, ".code_inline"),
            Selector::ListItem => write!(f, ".list"),
            Selector::Blockquote => write!(f, ".blockquote"),
            Selector::HorizontalRule => write!(f, ".horizontal_rule"),
            Selector::Strong => write!(f, ".strong"),
            Selector::Emphasis => write!(f, ".emphasis"),
            Selector::Link => write!(f, ".link"),
            Selector::Image => write!(f, ".image"),
            Selector::Break => write!(f, ".break"),
            Selector::Text => write!(f, ".text"),
            Selector::Raw => write!(f, ".raw"),
            Selector::Mdx => write!(f, ".mdx"),
            Selector::Attr(attr) => write!(f, "{}", attr),
        }
    }
}

impl Selector {
    pub fn is_attribute_selector(&self) -> bool {
        matches!(self, Selector::Attr(_))
    }

    /// Whether `node` itself is of the kind this selector names.
    pub fn matches(&self, node: &Node) -> bool {
        match (self, node) {
            (Selector::Heading(None), Node::Heading(_)) => true,
            (Selector::Heading(Some(level)), Node::Heading(Heading { depth, .. })) => {
                depth == level
            }
            (Selector::Code(None), Node::Code(_)) => true,
            (Selector::Code(Some(expected)), Node::Code(Code { lang, .. })) => {
                lang.as_deref() == Some(expected.as_str())
            }
            (Selector::Paragraph, Node::Paragraph(_))
            | (Selector::InlineCode, Node::CodeInline(_))
            | (Selector::ListItem, Node::ListItem(_))
            | (Selector::Blockquote, Node::Blockquote(_))
            | (Selector::HorizontalRule, Node::HorizontalRule)
            | (Selector::Strong, Node::Strong(_))
            | (Selector::Emphasis, Node::Emphasis(_))
            | (Selector::Link, Node::Link(_))
            | (Selector::Image, Node::Image(_))
            | (Selector::Break, Node::Break)
            | (Selector::Text, Node::Text(_))
            | (Selector::Raw, Node::RawInline(_)) => true,
            (Selector::Mdx, node) => node.is_mdx(),
            _ => false,
        }
    }
}
