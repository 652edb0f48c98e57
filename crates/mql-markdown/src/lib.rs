//! Document model for mql.
//!
//! Markdown, MDX, HTML and plain text are read into one [`Node`] tree, which can
//! be traversed with [`Node::walk`] and rendered back to canonical Markdown.
//!
//! ```rust
//! use mql_markdown::{Reader, MarkdownReader};
//!
//! let root = MarkdownReader.read("# Hello\n\n- a\n- b");
//! assert_eq!(root.to_string(), "# Hello\n\n- a\n- b\n");
//! ```
pub mod html_to_markdown;
mod node;
pub mod reader;
mod render;
mod traverse;

pub use html_to_markdown::{
    ConversionOptions, HtmlToMarkdownError, convert_html_to_markdown,
    convert_html_to_markdown_with,
};
pub use node::{
    Blockquote, Code, CodeInline, Emphasis, Heading, Image, Level, Link, ListItem, Node, NodeKind,
    Origin, Paragraph, RawInline, Root, Strong, Text, Title, Url,
};
pub use reader::{
    HtmlReader, MarkdownReader, MdxReader, Reader, TextReader, parse_html, parse_markdown,
    parse_mdx, parse_text,
};
pub use render::{ListStyle, RenderOptions, TitleSurroundStyle, UrlSurroundStyle};
pub use traverse::{Path, Walk};
