use super::Reader;
use crate::node::Node;

/// Reads every non-blank line as its own paragraph.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextReader;

impl Reader for TextReader {
    fn read(&self, content: &str) -> Node {
        Node::root(
            content
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(|line| Node::paragraph(vec![Node::text(line)]))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::lines("Line 1\nLine 2\nLine 3", vec!["Line 1", "Line 2", "Line 3"])]
    #[case::blank_lines("a\n\n  \nb\n", vec!["a", "b"])]
    #[case::crlf("a\r\nb", vec!["a", "b"])]
    #[case::markdown_is_not_parsed("# not a heading", vec!["# not a heading"])]
    #[case::empty("", vec![])]
    fn test_read(#[case] content: &str, #[case] expected: Vec<&str>) {
        let Node::Root(root) = TextReader.read(content) else {
            unreachable!()
        };
        assert_eq!(
            root.values.iter().map(Node::to_string).collect::<Vec<_>>(),
            expected
        );
    }
}
