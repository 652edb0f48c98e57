use ::markdown::{Constructs, ParseOptions};

use super::Reader;
use super::markdown::{Lowering, MarkdownReader};
use crate::node::{Node, Origin, Paragraph, RawInline, Root};

#[derive(Debug, Clone, Copy, Default)]
pub struct MdxReader;

impl Reader for MdxReader {
    #[tracing::instrument(level = "debug", skip_all, fields(len = content.len()))]
    fn read(&self, content: &str) -> Node {
        let options = ParseOptions {
            constructs: Constructs {
                frontmatter: true,
                gfm_autolink_literal: true,
                gfm_strikethrough: true,
                gfm_table: true,
                gfm_task_list_item: true,
                ..Constructs::mdx()
            },
            ..ParseOptions::mdx()
        };

        match ::markdown::to_mdast(content, &options) {
            Ok(root) => Lowering::new(content, Origin::Mdx).root(&root),
            Err(e) => {
                // Unbalanced JSX or expressions: read as Markdown and recover components from raw HTML.
                tracing::debug!(reason = %e, "mdx parse failed, recovering components from markdown");
                retag(MarkdownReader.read(content))
            }
        }
    }
}

fn retag(root: Node) -> Node {
    let Node::Root(Root { values }) = root else {
        return root;
    };

    Node::root(values.into_iter().map(retag_block).collect())
}

fn retag_block(node: Node) -> Node {
    match node {
        Node::RawInline(raw) if is_component(&raw.value) => Node::raw(raw.value, Origin::Mdx),
        Node::Paragraph(Paragraph { values }) => {
            let source = values.iter().map(Node::to_string).collect::<String>();
            if is_esm(&source) || is_expression(&source) {
                Node::raw(source, Origin::Mdx)
            } else {
                Node::paragraph(merge_components(values))
            }
        }
        other => other,
    }
}

/// Retags component tags in an inline run, folding `<Tag>...</Tag>` into one node.
fn merge_components(values: Vec<Node>) -> Vec<Node> {
    let mut merged = Vec::with_capacity(values.len());
    let mut iter = values.into_iter();

    while let Some(node) = iter.next() {
        let Node::RawInline(RawInline { value, .. }) = &node else {
            merged.push(node);
            continue;
        };

        if !is_component(value) {
            merged.push(node);
            continue;
        }

        let Some(name) = open_tag_name(value) else {
            merged.push(Node::raw(value.clone(), Origin::Mdx));
            continue;
        };

        let closing = format!("</{}>", name);
        let rest = iter.clone().collect::<Vec<_>>();
        match rest.iter().position(|n| matches!(n, Node::RawInline(r) if r.value.trim() == closing)) {
            Some(end) => {
                let body = rest[..=end].iter().map(Node::to_string).collect::<String>();
                merged.push(Node::raw(format!("{}{}", value, body), Origin::Mdx));
                iter = rest.into_iter().skip(end + 1).collect::<Vec<_>>().into_iter();
            }
            None => merged.push(Node::raw(value.clone(), Origin::Mdx)),
        }
    }

    merged
}

/// `<Tag`, `</Tag` or a fragment, where components start with an upper-case letter.
fn is_component(value: &str) -> bool {
    let value = value.trim_start();
    let rest = value
        .strip_prefix("</")
        .or_else(|| value.strip_prefix('<'))
        .unwrap_or_default();

    value.starts_with('<')
        && (rest.starts_with('>') || rest.chars().next().is_some_and(|c| c.is_ascii_uppercase()))
}

fn open_tag_name(value: &str) -> Option<&str> {
    let value = value.trim();
    if value.starts_with("</") || value.ends_with("/>") {
        return None;
    }

    let name = value.strip_prefix('<')?;
    let end = name
        .find(|c: char| c.is_whitespace() || c == '>')
        .unwrap_or(name.len());
    Some(&name[..end])
}

fn is_esm(source: &str) -> bool {
    source.starts_with("import ") || source.starts_with("export ")
}

fn is_expression(source: &str) -> bool {
    let source = source.trim();
    source.starts_with('{') && source.ends_with('}')
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn top_level(content: &str) -> Vec<Node> {
        match MdxReader.read(content) {
            Node::Root(root) => root.values,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_component_is_mdx() {
        let nodes = top_level("# MDX Content\n\n<Component />");
        assert_eq!(nodes.len(), 2);
        assert!(!nodes[0].is_mdx());
        assert!(nodes[1].is_mdx());
        assert_eq!(nodes[1].to_string(), "<Component />");
    }

    #[test]
    fn test_esm_is_mdx() {
        let nodes = top_level("import { Chart } from './chart'\n\n# Title");
        assert!(nodes[0].is_mdx());
        assert_eq!(nodes[1].to_string(), "# Title");
    }

    #[test]
    fn test_code_block_content_is_not_a_component() {
        let nodes = top_level("```jsx\n<Component />\n```");
        assert!(nodes.iter().all(|n| !n.is_mdx()));
    }

    #[test]
    fn test_recovery_merges_paired_tags() {
        let merged = merge_components(vec![
            Node::text("before "),
            Node::raw("<Badge>", Origin::Markdown),
            Node::text("new"),
            Node::raw("</Badge>", Origin::Markdown),
            Node::text(" after"),
        ]);

        assert_eq!(
            merged,
            vec![
                Node::text("before "),
                Node::raw("<Badge>new</Badge>", Origin::Mdx),
                Node::text(" after"),
            ]
        );
    }

    #[rstest]
    #[case::self_closing("<Component />", true)]
    #[case::open("<Tabs items={[1]}>", true)]
    #[case::close("</Tabs>", true)]
    #[case::fragment("<>", true)]
    #[case::html("<div>", false)]
    #[case::comment("<!-- x -->", false)]
    #[case::text("Component", false)]
    fn test_is_component(#[case] value: &str, #[case] expected: bool) {
        assert_eq!(is_component(value), expected);
    }

    #[test]
    fn test_recovery_retags_html_blocks() {
        let root = retag(Node::root(vec![
            Node::raw("<Callout />", Origin::Markdown),
            Node::raw("<div>", Origin::Markdown),
        ]));
        let Node::Root(Root { values }) = root else {
            unreachable!()
        };
        assert!(values[0].is_mdx());
        assert!(!values[1].is_mdx());
    }
}
