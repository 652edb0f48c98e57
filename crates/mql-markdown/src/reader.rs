//! Format readers turning raw text into a [`Node::Root`] tree.
//!
//! Readers never fail: content a reader cannot model is kept verbatim in the
//! most generic node kind that fits (`Text` or `RawInline`).
mod html;
mod markdown;
mod mdx;
mod text;

pub use html::HtmlReader;
pub use markdown::MarkdownReader;
pub use mdx::MdxReader;
pub use text::TextReader;

use crate::node::Node;

pub trait Reader {
    /// Parses `content` into a `Root` node.
    fn read(&self, content: &str) -> Node;
}

pub fn parse_markdown(content: &str) -> Node {
    MarkdownReader.read(content)
}

pub fn parse_mdx(content: &str) -> Node {
    MdxReader.read(content)
}

pub fn parse_text(content: &str) -> Node {
    TextReader.read(content)
}

pub fn parse_html(content: &str) -> Node {
    HtmlReader::default().read(content)
}
