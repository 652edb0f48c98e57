use itertools::Itertools;
use scraper::{ElementRef, Html};

use super::Reader;
use crate::html_to_markdown::ConversionOptions;
use crate::node::{
    Blockquote, Code, CodeInline, Emphasis, Heading, Image, Link, ListItem, Node, Origin, Strong,
    Title, Url,
};

const TRANSPARENT_BLOCKS: &[&str] = &[
    "html", "body", "div", "section", "article", "main", "header", "footer", "nav", "hgroup",
    "aside", "figure", "figcaption", "center", "details", "summary", "form", "fieldset",
];

const TRANSPARENT_INLINES: &[&str] = &[
    "span", "u", "mark", "small", "sub", "sup", "abbr", "cite", "q", "time", "label", "font",
    "del", "s", "strike", "ins", "dfn", "var", "bdi", "bdo", "data", "p", "div", "nobr",
];

/// Elements that carry no renderable content. Kept as raw html unless
/// [`ConversionOptions::strip_non_content`] is set.
const NON_CONTENT: &[&str] = &[
    "style", "meta", "link", "title", "noscript", "template", "base",
];

/// Maps an HTML document onto the node model with [`scraper`].
///
/// Nothing in the input is lost by default: comments and non-content elements
/// become [`Node::RawInline`] with [`Origin::Html`].
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlReader {
    pub options: ConversionOptions,
}

impl HtmlReader {
    pub fn new(options: ConversionOptions) -> Self {
        Self { options }
    }
}

impl Reader for HtmlReader {
    #[tracing::instrument(level = "debug", skip_all, fields(len = content.len()))]
    fn read(&self, content: &str) -> Node {
        let document = Html::parse_document(content);
        let mut blocks = BlockBuilder::new(self.options);

        if self.options.use_title_as_h1
            && let Some(title) = find_element(document.root_element(), "title")
        {
            let title = collapse_whitespace(&title.text().collect::<String>());
            let title = title.trim();
            if !title.is_empty() {
                blocks.push(Node::Heading(Heading::new(1, vec![Node::text(title)])));
            }
        }

        // Comments before `<html>` hang off the document itself.
        for child in document.tree.root().children() {
            match child.value() {
                scraper::Node::Element(_) => {
                    if let Some(element) = ElementRef::wrap(child) {
                        blocks.visit(element);
                    }
                }
                scraper::Node::Comment(comment) => blocks.comment(comment),
                _ => {}
            }
        }

        Node::root(blocks.finish())
    }
}

struct BlockBuilder {
    options: ConversionOptions,
    blocks: Vec<Node>,
    pending: Vec<Node>,
}

impl BlockBuilder {
    fn new(options: ConversionOptions) -> Self {
        Self {
            options,
            blocks: Vec::new(),
            pending: Vec::new(),
        }
    }

    fn finish(mut self) -> Vec<Node> {
        self.flush();
        self.blocks
    }

    fn push(&mut self, node: Node) {
        self.flush();
        self.blocks.push(node);
    }

    /// Wraps loose inline content collected so far into a paragraph.
    fn flush(&mut self) {
        let values = normalize_inlines(std::mem::take(&mut self.pending));
        if !values.is_empty() {
            self.blocks.push(Node::paragraph(values));
        }
    }

    /// Keeps `html` as a raw node unless non-content markup is stripped.
    fn raw(&self, html: String) -> Option<Node> {
        if self.options.strip_non_content {
            tracing::debug!(len = html.len(), "non-content markup stripped");
            None
        } else {
            Some(Node::raw(html, Origin::Html))
        }
    }

    fn visit(&mut self, element: ElementRef<'_>) {
        for child in element.children() {
            match child.value() {
                scraper::Node::Text(text) => {
                    if !(self.pending.is_empty() && text.trim().is_empty()) {
                        self.pending.push(Node::text(collapse_whitespace(text)));
                    }
                }
                scraper::Node::Element(_) => {
                    if let Some(child) = ElementRef::wrap(child) {
                        self.element(child);
                    }
                }
                scraper::Node::Comment(comment) => self.comment(comment),
                _ => {}
            }
        }
    }

    /// A comment joins the current inline run, or stands as its own block.
    fn comment(&mut self, comment: &str) {
        if let Some(node) = self.raw(format!("<!--{}-->", comment)) {
            if self.pending.is_empty() {
                self.blocks.push(node);
            } else {
                self.pending.push(node);
            }
        }
    }

    fn element(&mut self, element: ElementRef<'_>) {
        let name = element.value().name();

        match name {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let depth = name[1..].parse::<u8>().unwrap_or(1);
                let values = self.inlines(element);
                self.push(Node::Heading(Heading::new(depth, values)));
            }
            "p" => {
                self.flush();
                let values = self.inlines(element);
                if !values.is_empty() {
                    self.blocks.push(Node::paragraph(values));
                }
            }
            "pre" => self.push(code_block(element)),
            "code" if element.text().any(|t| t.contains('\n')) || stands_alone(element) => {
                self.push(code_block(element))
            }
            "ul" | "ol" => {
                self.flush();
                let items = self.list_items(element, 0);
                self.blocks.extend(items);
            }
            "li" => {
                self.flush();
                let items = self.list_item(element, false, 0, 0);
                self.blocks.extend(items);
            }
            "blockquote" => {
                let mut inner = BlockBuilder::new(self.options);
                inner.visit(element);
                self.push(Node::Blockquote(Blockquote {
                    values: inner.finish(),
                }));
            }
            "hr" => self.push(Node::HorizontalRule),
            "table" => {
                let table = self.pipe_table(element);
                self.push(Node::paragraph(vec![Node::text(table)]));
            }
            "script" => {
                self.flush();
                if self.options.extract_scripts_as_code_blocks {
                    self.blocks.push(script_block(element));
                } else if let Some(node) = self.raw(element.html()) {
                    self.blocks.push(node);
                }
            }
            // Already emitted as the leading heading.
            "title" if self.options.use_title_as_h1 => {}
            _ if NON_CONTENT.contains(&name) => {
                self.flush();
                if let Some(node) = self.raw(element.html()) {
                    self.blocks.push(node);
                }
            }
            _ if name == "head" || TRANSPARENT_BLOCKS.contains(&name) => {
                self.flush();
                self.visit(element);
                self.flush();
            }
            _ if is_inline(name) => {
                let values = self.inline(element);
                self.pending.extend(values);
            }
            _ => {
                tracing::debug!(tag = name, "unrecognized element kept as raw html");
                self.push(Node::raw(element.html(), Origin::Html));
            }
        }
    }

    fn inlines(&self, element: ElementRef<'_>) -> Vec<Node> {
        normalize_inlines(self.inline_children(element))
    }

    fn inline_children(&self, element: ElementRef<'_>) -> Vec<Node> {
        element
            .children()
            .flat_map(|child| match child.value() {
                scraper::Node::Text(text) => vec![Node::text(collapse_whitespace(text))],
                scraper::Node::Element(_) => ElementRef::wrap(child)
                    .map(|el| self.inline(el))
                    .unwrap_or_default(),
                scraper::Node::Comment(comment) => {
                    self.raw(format!("<!--{}-->", &**comment)).into_iter().collect()
                }
                _ => Vec::new(),
            })
            .collect()
    }

    fn inline(&self, element: ElementRef<'_>) -> Vec<Node> {
        let name = element.value().name();

        let node = match name {
            "strong" | "b" => Node::Strong(Strong {
                values: self.inline_children(element),
            }),
            "em" | "i" => Node::Emphasis(Emphasis {
                values: self.inline_children(element),
            }),
            "code" | "kbd" | "samp" | "tt" => Node::CodeInline(CodeInline {
                value: element.text().collect(),
            }),
            "a" => Node::Link(Link {
                url: Url::new(element.value().attr("href").unwrap_or_default()),
                title: element.value().attr("title").map(Title::new),
                values: self.inline_children(element),
            }),
            "img" => Node::Image(Image {
                url: Url::new(element.value().attr("src").unwrap_or_default()),
                alt: element.value().attr("alt").unwrap_or_default().to_string(),
                title: element.value().attr("title").map(Title::new),
            }),
            "br" => Node::Break,
            // The checkbox state lives on the list item.
            "input" if element.value().attr("type") == Some("checkbox") => return Vec::new(),
            "script" | "style" => return self.raw(element.html()).into_iter().collect(),
            _ if TRANSPARENT_INLINES.contains(&name) => return self.inline_children(element),
            _ => Node::raw(element.html(), Origin::Html),
        };

        vec![node]
    }

    fn list_items(&self, element: ElementRef<'_>, level: usize) -> Vec<Node> {
        let ordered = element.value().name() == "ol";

        element
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|child| child.value().name() == "li")
            .enumerate()
            .flat_map(|(index, li)| self.list_item(li, ordered, index, level))
            .collect()
    }

    fn list_item(&self, li: ElementRef<'_>, ordered: bool, index: usize, level: usize) -> Vec<Node> {
        let checked = li
            .children()
            .filter_map(ElementRef::wrap)
            .find(|child| {
                child.value().name() == "input" && child.value().attr("type") == Some("checkbox")
            })
            .map(|input| input.value().attr("checked").is_some());

        let mut content = Vec::new();
        let mut nested = Vec::new();
        for child in li.children() {
            match ElementRef::wrap(child) {
                Some(el) if matches!(el.value().name(), "ul" | "ol") => {
                    nested.extend(self.list_items(el, level + 1))
                }
                Some(el) => content.extend(self.inline(el)),
                None => match child.value() {
                    scraper::Node::Text(text) => content.push(Node::text(collapse_whitespace(text))),
                    scraper::Node::Comment(comment) => {
                        content.extend(self.raw(format!("<!--{}-->", &**comment)))
                    }
                    _ => {}
                },
            }
        }

        let mut items = vec![Node::ListItem(ListItem {
            values: normalize_inlines(content),
            ordered,
            index,
            level,
            checked,
        })];
        items.extend(nested);
        items
    }

    fn pipe_table(&self, table: ElementRef<'_>) -> String {
        let rows = table
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().name() == "tr")
            .map(|tr| {
                tr.children()
                    .filter_map(ElementRef::wrap)
                    .filter(|cell| matches!(cell.value().name(), "th" | "td"))
                    .map(|cell| {
                        self.inlines(cell)
                            .iter()
                            .map(Node::to_string)
                            .join("")
                            .replace('|', "\\|")
                    })
                    .collect::<Vec<_>>()
            })
            .filter(|cells| !cells.is_empty())
            .collect::<Vec<_>>();

        let columns = rows.iter().map(Vec::len).max().unwrap_or_default();
        let line = |cells: &Vec<String>| {
            let padding = columns.saturating_sub(cells.len());
            format!(
                "| {} |",
                cells
                    .iter()
                    .map(String::as_str)
                    .chain(std::iter::repeat_n("", padding))
                    .join(" | ")
            )
        };

        rows.iter()
            .enumerate()
            .flat_map(|(i, cells)| {
                if i == 0 {
                    vec![line(cells), format!("|{}", "---|".repeat(columns))]
                } else {
                    vec![line(cells)]
                }
            })
            .join("\n")
    }
}

fn is_inline(name: &str) -> bool {
    matches!(
        name,
        "strong" | "b" | "em" | "i" | "code" | "kbd" | "samp" | "tt" | "a" | "img" | "br"
    ) || TRANSPARENT_INLINES.contains(&name)
}

/// True when `element` has no inline content next to it, so it forms a block on its own.
fn stands_alone(element: ElementRef<'_>) -> bool {
    element
        .prev_siblings()
        .chain(element.next_siblings())
        .all(|sibling| match sibling.value() {
            scraper::Node::Text(text) => text.trim().is_empty(),
            scraper::Node::Element(el) => {
                !is_inline(el.name()) || matches!(el.name(), "p" | "div")
            }
            _ => true,
        })
}

/// Drops empty text and trims whitespace at the edges of an inline run.
fn normalize_inlines(values: Vec<Node>) -> Vec<Node> {
    let mut values = values
        .into_iter()
        .filter(|node| !matches!(node, Node::Text(text) if text.value.is_empty()))
        .collect::<Vec<_>>();

    if let Some(Node::Text(first)) = values.first_mut() {
        first.value = first.value.trim_start().to_string();
    }
    if let Some(Node::Text(last)) = values.last_mut() {
        last.value = last.value.trim_end().to_string();
    }
    values.retain(|node| !matches!(node, Node::Text(text) if text.value.is_empty()));
    values
}

fn code_block(element: ElementRef<'_>) -> Node {
    let code = if element.value().name() == "code" {
        Some(element)
    } else {
        element
            .children()
            .filter_map(ElementRef::wrap)
            .find(|child| child.value().name() == "code")
    };

    let lang = code.and_then(|code| {
        code.value().classes().find_map(|class| {
            class
                .strip_prefix("language-")
                .or_else(|| class.strip_prefix("lang-"))
                .map(str::to_string)
        })
    });

    let value = element.text().collect::<String>();
    let value = value.strip_prefix('\n').unwrap_or(&value);

    Node::Code(Code {
        value: value.trim_end_matches('\n').to_string(),
        lang,
        meta: None,
    })
}

fn script_block(element: ElementRef<'_>) -> Node {
    let lang = match element.value().attr("type") {
        Some("application/json" | "application/ld+json") => "json",
        _ => "javascript",
    };

    Node::Code(Code {
        value: element.text().collect::<String>().trim().to_string(),
        lang: Some(lang.to_string()),
        meta: None,
    })
}

fn find_element<'a>(element: ElementRef<'a>, name: &str) -> Option<ElementRef<'a>> {
    element
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == name)
}

fn collapse_whitespace(text: &str) -> String {
    let mut collapsed = String::with_capacity(text.len());
    let mut in_whitespace = false;

    for c in text.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                collapsed.push(' ');
            }
            in_whitespace = true;
        } else {
            collapsed.push(c);
            in_whitespace = false;
        }
    }

    collapsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn rendered(content: &str, options: ConversionOptions) -> Vec<String> {
        let Node::Root(root) = HtmlReader::new(options).read(content) else {
            unreachable!()
        };
        root.values.iter().map(Node::to_string).collect()
    }

    #[rstest]
    #[case::heading_and_paragraph("<h1>Hello</h1><p>World</p>", vec!["# Hello", "World"])]
    #[case::strong("<p>This is a <strong>test</strong>.</p>", vec!["This is a **test**."])]
    #[case::bold_italic("<p><b>a</b> <i>b</i></p>", vec!["**a** *b*"])]
    #[case::whitespace("<p>\n  spaced\n   out  </p>", vec!["spaced out"])]
    #[case::list("<ul><li>one</li><li>two</li></ul>", vec!["- one", "- two"])]
    #[case::ordered("<ol><li>one</li><li>two</li></ol>", vec!["1. one", "2. two"])]
    #[case::nested("<ul><li>a<ul><li>b</li></ul></li></ul>", vec!["- a", "  - b"])]
    #[case::task(r#"<ul><li><input type="checkbox" checked> done</li></ul>"#, vec!["- [x] done"])]
    #[case::pre(
        r#"<pre><code class="language-rust">fn main() {}
</code></pre>"#,
        vec!["```rust\nfn main() {}\n```"]
    )]
    #[case::link(r#"<p><a href="https://a.b" title="t">x</a></p>"#, vec![r#"[x](https://a.b "t")"#])]
    #[case::image(r#"<img src="a.png" alt="pic">"#, vec!["![pic](a.png)"])]
    #[case::blockquote("<blockquote><p>q</p></blockquote>", vec!["> q"])]
    #[case::hr("<p>a</p><hr><p>b</p>", vec!["a", "---", "b"])]
    #[case::loose_inline("Hello <b>World</b>", vec!["Hello **World**"])]
    #[case::div_separates("<div>a</div><div>b</div>", vec!["a", "b"])]
    #[case::unknown("<custom-el x=\"1\">hi</custom-el>", vec!["<custom-el x=\"1\">hi</custom-el>"])]
    #[case::script_kept("<script>alert(1)</script><p>x</p>", vec!["<script>alert(1)</script>", "x"])]
    #[case::style_kept("<style>p {}</style><p>x</p>", vec!["<style>p {}</style>", "x"])]
    #[case::comment_between_blocks("<p>a</p><!-- note --><p>b</p>", vec!["a", "<!-- note -->", "b"])]
    #[case::comment_inline("<p>a <!--x--> b</p>", vec!["a <!--x--> b"])]
    #[case::bare_code("<code>x = 1</code>", vec!["```\nx = 1\n```"])]
    #[case::code_in_div("<div><code>x = 1</code></div>", vec!["```\nx = 1\n```"])]
    #[case::code_beside_text("<div>run <code>x</code></div>", vec!["run `x`"])]
    #[case::table(
        "<table><tr><th>a</th><th>b</th></tr><tr><td>1</td><td>2</td></tr></table>",
        vec!["| a | b |\n|---|---|\n| 1 | 2 |"]
    )]
    #[case::empty("", vec![])]
    fn test_read(#[case] content: &str, #[case] expected: Vec<&str>) {
        assert_eq!(rendered(content, ConversionOptions::default()), expected);
    }

    #[rstest]
    #[case::script("<script>alert(1)</script><p>x</p>", vec!["x"])]
    #[case::head(
        "<html><head><title>T</title><meta charset=\"utf-8\"><style>p {}</style></head><body><p>x</p></body></html>",
        vec!["x"]
    )]
    #[case::comments("<p>a <!--x-->b</p><!-- note -->", vec!["a b"])]
    fn test_strip_non_content(#[case] content: &str, #[case] expected: Vec<&str>) {
        let options = ConversionOptions {
            strip_non_content: true,
            ..Default::default()
        };
        assert_eq!(rendered(content, options), expected);
    }

    #[test]
    fn test_head_is_kept_by_default() {
        assert_eq!(
            rendered(
                "<html><head><title>T</title></head><body><p>x</p></body></html>",
                ConversionOptions::default()
            ),
            vec!["<title>T</title>", "x"]
        );
    }

    #[test]
    fn test_extract_scripts() {
        let options = ConversionOptions {
            extract_scripts_as_code_blocks: true,
            ..Default::default()
        };
        assert_eq!(
            rendered("<script>console.log(1)</script>", options),
            vec!["```javascript\nconsole.log(1)\n```"]
        );
    }

    #[test]
    fn test_title_as_h1() {
        let options = ConversionOptions {
            use_title_as_h1: true,
            ..Default::default()
        };
        assert_eq!(
            rendered(
                "<html><head><title>Doc</title></head><body><p>x</p></body></html>",
                options
            ),
            vec!["# Doc", "x"]
        );
    }

    #[test]
    fn test_raw_html_is_not_mdx() {
        let Node::Root(root) = HtmlReader::default().read("<Component />") else {
            unreachable!()
        };
        assert!(root.values.iter().all(|n| !n.is_mdx()));
    }
}
