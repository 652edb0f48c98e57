//! Run mql queries over Markdown, MDX, HTML and plain text.
//!
//! ```rust
//! let result = mql::run(".h2", "# Title\n\n## A\n\ntext\n\n## B", None).unwrap();
//! assert_eq!(result.values(), vec!["## A", "## B"]);
//!
//! let options = mql::Options::default().with_input_format(mql::InputFormat::Text);
//! let result = mql::run("select(contains(\"2\"))", "Line 1\nLine 2", Some(options)).unwrap();
//! assert_eq!(result.values(), vec!["Line 2"]);
//! ```
mod error;
mod options;
mod result;
mod value;

pub use error::Error;
pub use mql_markdown::{ConversionOptions, ListStyle, NodeKind, TitleSurroundStyle, UrlSurroundStyle};
pub use options::{InputFormat, Options};
pub use result::QueryResult;
pub use value::QueryValue;

use mql_lang::{Engine, RuntimeValue};

/// Reads `content` in the configured input format, evaluates `query` over it and
/// renders every resulting value.
#[allow(clippy::result_large_err)]
#[tracing::instrument(level = "debug", skip(content, options), fields(len = content.len()))]
pub fn run(query: &str, content: &str, options: Option<Options>) -> Result<QueryResult, Error> {
    let options = options.unwrap_or_default();
    let input_format = options.input_format.unwrap_or_default();

    let document = input_format.read(content);
    let input = match (&document, input_format) {
        (Some(root), _) => RuntimeValue::sequence_from(root),
        (None, InputFormat::Null) => vec![RuntimeValue::None],
        (None, _) => vec![RuntimeValue::String(content.to_string())],
    };
    tracing::debug!(%input_format, input = input.len(), "content read");

    let values = Engine::default().eval(query, input)?;
    Ok(QueryResult::from_runtime(&values, &options.render_options()))
}

/// Converts an HTML document to Markdown.
#[allow(clippy::result_large_err)]
pub fn html_to_markdown(html: &str, options: Option<ConversionOptions>) -> Result<String, Error> {
    Ok(mql_markdown::convert_html_to_markdown(
        html,
        options.unwrap_or_default(),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::raw(InputFormat::Raw, "upcase", vec!["# A"])]
    #[case::null(InputFormat::Null, "\"x\"", vec!["x"])]
    fn test_run_unparsed_inputs(
        #[case] format: InputFormat,
        #[case] query: &str,
        #[case] expected: Vec<&str>,
    ) {
        let result = run(query, "# a", Some(Options::default().with_input_format(format))).unwrap();
        assert_eq!(result.values(), expected);
    }

    #[test]
    fn test_run_error_prefix() {
        let err = run(".h1 !!!", "# a", None).unwrap_err();
        assert!(err.to_string().starts_with("Error evaluating query: "));
    }

    #[test]
    fn test_html_to_markdown_empty() {
        assert_eq!(html_to_markdown("", None).unwrap(), "");
    }
}
