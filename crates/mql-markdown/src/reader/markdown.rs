use ::markdown::mdast;
use ::markdown::{Constructs, ParseOptions};

use super::Reader;
use crate::node::{
    Blockquote, Code, CodeInline, Emphasis, Heading, Image, Link, ListItem, Node, Origin, Strong,
    Title, Url,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownReader;

impl Reader for MarkdownReader {
    #[tracing::instrument(level = "debug", skip_all, fields(len = content.len()))]
    fn read(&self, content: &str) -> Node {
        let options = ParseOptions {
            constructs: Constructs {
                frontmatter: true,
                math_flow: true,
                math_text: true,
                ..Constructs::gfm()
            },
            gfm_strikethrough_single_tilde: true,
            math_text_single_dollar: true,
            ..ParseOptions::default()
        };

        match ::markdown::to_mdast(content, &options) {
            Ok(root) => Lowering::new(content, Origin::Markdown).root(&root),
            Err(e) => {
                tracing::debug!(reason = %e, "markdown parse failed, keeping content as text");
                fallback(content)
            }
        }
    }
}

pub(super) fn fallback(content: &str) -> Node {
    if content.is_empty() {
        Node::root(Vec::new())
    } else {
        Node::root(vec![Node::paragraph(vec![Node::text(content)])])
    }
}

/// Lowers an mdast tree into the node model.
///
/// `raw_origin` tags HTML spans; MDX components are always tagged `Mdx`.
pub(super) struct Lowering<'s> {
    source: &'s str,
    raw_origin: Origin,
}

impl<'s> Lowering<'s> {
    pub(super) fn new(source: &'s str, raw_origin: Origin) -> Self {
        Self { source, raw_origin }
    }

    pub(super) fn root(&self, node: &mdast::Node) -> Node {
        match node {
            mdast::Node::Root(root) => Node::root(self.blocks(&root.children)),
            other => Node::root(self.blocks(std::slice::from_ref(other))),
        }
    }

    fn blocks(&self, nodes: &[mdast::Node]) -> Vec<Node> {
        nodes.iter().flat_map(|node| self.block(node)).collect()
    }

    fn block(&self, node: &mdast::Node) -> Vec<Node> {
        match node {
            mdast::Node::Heading(heading) => {
                vec![Node::Heading(Heading::new(
                    heading.depth,
                    self.inlines(&heading.children),
                ))]
            }
            mdast::Node::Paragraph(paragraph) => {
                vec![Node::paragraph(self.inlines(&paragraph.children))]
            }
            mdast::Node::List(list) => self.list_items(list, 0),
            mdast::Node::Code(code) => vec![Node::Code(Code {
                value: code.value.clone(),
                lang: code.lang.clone(),
                meta: code.meta.clone(),
            })],
            mdast::Node::Blockquote(blockquote) => vec![Node::Blockquote(Blockquote {
                values: self.blocks(&blockquote.children),
            })],
            mdast::Node::ThematicBreak(_) => vec![Node::HorizontalRule],
            mdast::Node::Html(html) => vec![Node::raw(html.value.clone(), self.raw_origin)],
            mdast::Node::MdxJsxFlowElement(_)
            | mdast::Node::MdxjsEsm(_)
            | mdast::Node::MdxFlowExpression(_) => vec![Node::raw(self.slice(node), Origin::Mdx)],
            mdast::Node::Yaml(_) | mdast::Node::Toml(_) => {
                vec![Node::raw(self.slice(node), Origin::Markdown)]
            }
            mdast::Node::Table(_)
            | mdast::Node::Math(_)
            | mdast::Node::Definition(_)
            | mdast::Node::FootnoteDefinition(_) => {
                tracing::trace!(source = %self.slice(node), "kept block verbatim");
                vec![Node::paragraph(vec![Node::text(self.slice(node))])]
            }
            inline => vec![Node::paragraph(self.inlines(std::slice::from_ref(inline)))],
        }
    }

    /// Flattens a list into `ListItem`s, nested lists following their parent item.
    fn list_items(&self, list: &mdast::List, level: usize) -> Vec<Node> {
        let mut items = Vec::new();

        for (index, child) in list.children.iter().enumerate() {
            let mdast::Node::ListItem(item) = child else {
                items.extend(self.block(child));
                continue;
            };

            let (nested, content): (Vec<_>, Vec<_>) = item
                .children
                .iter()
                .partition(|n| matches!(n, mdast::Node::List(_)));
            let mut values = content
                .into_iter()
                .flat_map(|n| self.block(n))
                .collect::<Vec<_>>();

            if values.len() == 1
                && matches!(values[0], Node::Paragraph(_))
                && let Some(Node::Paragraph(paragraph)) = values.pop()
            {
                values = paragraph.values;
            }

            items.push(Node::ListItem(ListItem {
                values,
                ordered: list.ordered,
                index,
                level,
                checked: item.checked,
            }));

            for sub_list in nested {
                if let mdast::Node::List(sub_list) = sub_list {
                    items.extend(self.list_items(sub_list, level + 1));
                }
            }
        }

        items
    }

    fn inlines(&self, nodes: &[mdast::Node]) -> Vec<Node> {
        nodes.iter().map(|node| self.inline(node)).collect()
    }

    fn inline(&self, node: &mdast::Node) -> Node {
        match node {
            mdast::Node::Text(text) => Node::text(text.value.clone()),
            mdast::Node::Strong(strong) => Node::Strong(Strong {
                values: self.inlines(&strong.children),
            }),
            mdast::Node::Emphasis(emphasis) => Node::Emphasis(Emphasis {
                values: self.inlines(&emphasis.children),
            }),
            mdast::Node::InlineCode(code) => Node::CodeInline(CodeInline {
                value: code.value.clone(),
            }),
            mdast::Node::Link(link) => Node::Link(Link {
                url: Url::new(link.url.clone()),
                title: link.title.clone().map(Title::new),
                values: self.inlines(&link.children),
            }),
            mdast::Node::Image(image) => Node::Image(Image {
                url: Url::new(image.url.clone()),
                alt: image.alt.clone(),
                title: image.title.clone().map(Title::new),
            }),
            mdast::Node::Break(_) => Node::Break,
            mdast::Node::Html(html) => Node::raw(html.value.clone(), self.raw_origin),
            mdast::Node::MdxJsxTextElement(_) | mdast::Node::MdxTextExpression(_) => {
                Node::raw(self.slice(node), Origin::Mdx)
            }
            _ => Node::text(self.slice(node)),
        }
    }

    /// The verbatim source of `node`, or its text content when positions are missing.
    fn slice(&self, node: &mdast::Node) -> String {
        node.position()
            .and_then(|p| self.source.get(p.start.offset..p.end.offset))
            .map(str::to_string)
            .unwrap_or_else(|| node.to_string())
    }
}
