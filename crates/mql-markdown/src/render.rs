use std::fmt::{self, Display};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::node::{
    Blockquote, Code, CodeInline, Emphasis, Heading, Image, Link, ListItem, Node, Paragraph,
    RawInline, Root, Strong, Text, Title, Url,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderOptions {
    pub list_style: ListStyle,
    pub link_url_style: UrlSurroundStyle,
    pub link_title_style: TitleSurroundStyle,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ListStyle {
    #[default]
    Dash,
    Plus,
    Star,
}

impl Display for ListStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListStyle::Dash => write!(f, "-"),
            ListStyle::Plus => write!(f, "+"),
            ListStyle::Star => write!(f, "*"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UrlSurroundStyle {
    #[default]
    None,
    Angle,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TitleSurroundStyle {
    #[default]
    Double,
    Single,
    Paren,
}

impl Url {
    pub fn to_string_with(&self, options: &RenderOptions) -> String {
        match options.link_url_style {
            UrlSurroundStyle::None => self.as_str().to_string(),
            UrlSurroundStyle::Angle => format!("<{}>", self.as_str()),
        }
    }
}

impl Title {
    pub fn to_string_with(&self, options: &RenderOptions) -> String {
        match options.link_title_style {
            TitleSurroundStyle::Double => format!("\"{}\"", self),
            TitleSurroundStyle::Single => format!("'{}'", self),
            TitleSurroundStyle::Paren => format!("({})", self),
        }
    }
}

impl Node {
    pub fn to_string_with(&self, options: &RenderOptions) -> String {
        match self {
            Node::Root(Root { values }) => {
                let blocks = render_blocks(values, options);
                if blocks.is_empty() {
                    blocks
                } else {
                    format!("{}\n", blocks)
                }
            }
            Node::Heading(Heading { depth, values }) => format!(
                "{} {}",
                "#".repeat(*depth as usize),
                render_inline(values, options)
            ),
            Node::Paragraph(Paragraph { values }) => render_inline(values, options),
            Node::ListItem(item) => render_list_item(item, options),
            Node::Code(Code { value, lang, meta }) => {
                let fence = "`".repeat(fence_len(value));
                let info = match (lang, meta) {
                    (Some(lang), Some(meta)) => format!("{} {}", lang, meta),
                    (Some(lang), None) => lang.clone(),
                    (None, Some(meta)) => meta.clone(),
                    (None, None) => String::new(),
                };

                if value.is_empty() {
                    format!("{fence}{info}\n{fence}")
                } else {
                    format!("{fence}{info}\n{value}\n{fence}")
                }
            }
            Node::Blockquote(Blockquote { values }) => render_blocks(values, options)
                .split('\n')
                .map(|line| {
                    if line.is_empty() {
                        ">".to_string()
                    } else {
                        format!("> {}", line)
                    }
                })
                .join("\n"),
            Node::HorizontalRule => "---".to_string(),
            Node::CodeInline(CodeInline { value }) => {
                if value.contains('`') {
                    format!("`` {} ``", value)
                } else {
                    format!("`{}`", value)
                }
            }
            Node::Emphasis(Emphasis { values }) => format!("*{}*", render_inline(values, options)),
            Node::Strong(Strong { values }) => format!("**{}**", render_inline(values, options)),
            Node::Link(Link { url, title, values }) => format!(
                "[{}]({})",
                render_inline(values, options),
                destination(url, title.as_ref(), options)
            ),
            Node::Image(Image { url, alt, title }) => {
                format!("![{}]({})", alt, destination(url, title.as_ref(), options))
            }
            Node::Break => "\\\n".to_string(),
            Node::RawInline(RawInline { value, .. }) | Node::Text(Text { value }) => value.clone(),
        }
    }
}

/// Renders block nodes separated by a blank line, keeping consecutive list items tight.
pub(crate) fn render_blocks(values: &[Node], options: &RenderOptions) -> String {
    let mut buf = String::new();
    let mut prev: Option<&Node> = None;

    for node in values {
        let rendered = node.to_string_with(options);
        if rendered.is_empty() {
            continue;
        }

        if let Some(prev) = prev {
            match (prev, node) {
                (Node::ListItem(_), Node::ListItem(_)) => buf.push('\n'),
                _ => buf.push_str("\n\n"),
            }
        }

        buf.push_str(&rendered);
        prev = Some(node);
    }

    buf
}

fn render_inline(values: &[Node], options: &RenderOptions) -> String {
    values.iter().map(|v| v.to_string_with(options)).join("")
}

fn render_list_item(item: &ListItem, options: &RenderOptions) -> String {
    let indent = "  ".repeat(item.level);
    let marker = if item.ordered {
        format!("{}.", item.index + 1)
    } else {
        options.list_style.to_string()
    };
    let checkbox = match item.checked {
        Some(true) => "[x] ",
        Some(false) => "[ ] ",
        None => "",
    };
    let continuation = format!("\n{}  ", indent);
    let content = item
        .values
        .iter()
        .map(|v| v.to_string_with(options))
        .filter(|v| !v.is_empty())
        .join("\n")
        .replace('\n', &continuation);

    format!("{}{} {}{}", indent, marker, checkbox, content)
}

fn destination(url: &Url, title: Option<&Title>, options: &RenderOptions) -> String {
    match title {
        Some(title) => format!(
            "{} {}",
            url.to_string_with(options),
            title.to_string_with(options)
        ),
        None => url.to_string_with(options),
    }
}

fn fence_len(value: &str) -> usize {
    let longest = value
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or_default();
    longest.max(2) + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Origin;
    use rstest::rstest;

    fn item(text: &str, ordered: bool, index: usize, level: usize) -> Node {
        Node::ListItem(ListItem {
            values: vec![text.into()],
            ordered,
            index,
            level,
            checked: None,
        })
    }

    #[rstest]
    #[case::h1(Node::Heading(Heading::new(1, vec!["Hello World".into()])), "# Hello World")]
    #[case::h3(Node::Heading(Heading::new(3, vec!["x".into()])), "### x")]
    #[case::bullet(item("Item 1", false, 0, 0), "- Item 1")]
    #[case::ordered(item("Second", true, 1, 0), "2. Second")]
    #[case::nested(item("Inner", false, 0, 1), "  - Inner")]
    #[case::task(
        Node::ListItem(ListItem { values: vec!["done".into()], ordered: false, index: 0, level: 0, checked: Some(true) }),
        "- [x] done"
    )]
    #[case::code(
        Node::Code(Code { value: "print('Hello')".into(), lang: Some("python".into()), meta: None }),
        "```python\nprint('Hello')\n```"
    )]
    #[case::code_with_meta(
        Node::Code(Code { value: "x".into(), lang: Some("rs".into()), meta: Some("title=a.rs".into()) }),
        "```rs title=a.rs\nx\n```"
    )]
    #[case::code_with_fence_inside(
        Node::Code(Code { value: "```\ninner\n```".into(), lang: None, meta: None }),
        "````\n```\ninner\n```\n````"
    )]
    #[case::blockquote(
        Node::Blockquote(Blockquote { values: vec![Node::paragraph(vec!["a".into()]), Node::paragraph(vec!["b".into()])] }),
        "> a\n>\n> b"
    )]
    #[case::strong(
        Node::paragraph(vec!["This is a ".into(), Node::Strong(Strong { values: vec!["test".into()] }), ".".into()]),
        "This is a **test**."
    )]
    #[case::emphasis(Node::Emphasis(Emphasis { values: vec!["x".into()] }), "*x*")]
    #[case::inline_code(Node::CodeInline(CodeInline { value: "a".into() }), "`a`")]
    #[case::link(
        Node::Link(Link { url: Url::new("https://a.b"), title: Some(Title::new("t")), values: vec!["a".into()] }),
        "[a](https://a.b \"t\")"
    )]
    #[case::image(
        Node::Image(Image { url: Url::new("a.png"), alt: "pic".into(), title: None }),
        "![pic](a.png)"
    )]
    #[case::raw(Node::raw("<Component />", Origin::Mdx), "<Component />")]
    #[case::rule(Node::HorizontalRule, "---")]
    fn test_render(#[case] node: Node, #[case] expected: &str) {
        assert_eq!(node.to_string(), expected);
    }

    #[rstest]
    #[case::plus(ListStyle::Plus, "+ a")]
    #[case::star(ListStyle::Star, "* a")]
    fn test_list_style(#[case] list_style: ListStyle, #[case] expected: &str) {
        let options = RenderOptions {
            list_style,
            ..Default::default()
        };
        assert_eq!(item("a", false, 0, 0).to_string_with(&options), expected);
    }

    #[rstest]
    #[case::angle_single(UrlSurroundStyle::Angle, TitleSurroundStyle::Single, "[a](<u> 't')")]
    #[case::none_paren(UrlSurroundStyle::None, TitleSurroundStyle::Paren, "[a](u (t))")]
    fn test_link_styles(
        #[case] link_url_style: UrlSurroundStyle,
        #[case] link_title_style: TitleSurroundStyle,
        #[case] expected: &str,
    ) {
        let options = RenderOptions {
            link_url_style,
            link_title_style,
            ..Default::default()
        };
        let link = Node::Link(Link {
            url: Url::new("u"),
            title: Some(Title::new("t")),
            values: vec!["a".into()],
        });
        assert_eq!(link.to_string_with(&options), expected);
    }

    #[test]
    fn test_root_joins_blocks() {
        let root = Node::root(vec![
            Node::Heading(Heading::new(1, vec!["List".into()])),
            item("Item 1", false, 0, 0),
            item("Item 2", false, 1, 0),
            Node::paragraph(vec!["After".into()]),
        ]);
        assert_eq!(root.to_string(), "# List\n\n- Item 1\n- Item 2\n\nAfter\n");
    }

    #[test]
    fn test_empty_root() {
        assert_eq!(Node::root(vec![]).to_string(), "");
    }
}
