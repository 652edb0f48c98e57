use mql::{ConversionOptions, InputFormat, ListStyle, NodeKind, Options, QueryValue, run};
use rstest::rstest;

fn with_format(input_format: InputFormat) -> Option<Options> {
    Some(Options::default().with_input_format(input_format))
}

#[rstest]
#[case::h1(".h1", "# Hello World\n\n## Heading2\n\nText", None, vec!["# Hello World"])]
#[case::h2_in_order(
    ".h2",
    "# Main Title\n\n## Heading2A\n\nText\n\n## Heading2B\n\nMore text",
    None,
    vec!["## Heading2A", "## Heading2B"]
)]
#[case::select_contains(
    ".h2 | select(contains(\"Feature\"))",
    "# Product\n\n## Features\n\nText\n\n## Installation\n\nMore text",
    None,
    vec!["## Features"]
)]
#[case::iterate_list(
    ".[]",
    "# List\n\n- Item 1\n- Item 2\n- Item 3",
    None,
    vec!["- Item 1", "- Item 2", "- Item 3"]
)]
#[case::code_block(
    ".code",
    "# Code\n\n```python\nprint('Hello')\n```",
    None,
    vec!["```python\nprint('Hello')\n```"]
)]
#[case::text_lines(
    "select(contains(\"2\"))",
    "Line 1\nLine 2\nLine 3",
    with_format(InputFormat::Text),
    vec!["Line 2"]
)]
#[case::mdx_component(
    "select(is_mdx())",
    "# MDX Content\n\n<Component />",
    with_format(InputFormat::Mdx),
    vec!["<Component />"]
)]
#[case::html_heading(
    "select(contains(\"Hello\"))",
    "<h1>Hello</h1><p>World</p>",
    with_format(InputFormat::Html),
    vec!["# Hello"]
)]
#[case::no_match(".h3", "# Only h1", None, vec![])]
#[case::empty_content(".h1", "", None, vec![])]
fn test_run(
    #[case] query: &str,
    #[case] content: &str,
    #[case] options: Option<Options>,
    #[case] expected: Vec<&str>,
) {
    assert_eq!(run(query, content, options).unwrap().values(), expected);
}

#[rstest]
#[case::markdown(InputFormat::Markdown, "# Title\n\n<div>x</div>")]
#[case::html(InputFormat::Html, "<h1>Title</h1><custom-el>x</custom-el>")]
fn test_is_mdx_false_outside_mdx(#[case] format: InputFormat, #[case] content: &str) {
    let result = run("select(is_mdx())", content, with_format(format)).unwrap();
    assert!(result.values().is_empty());
}

#[rstest]
#[case::unclosed_fence(InputFormat::Markdown, "# Title\n\n```rust\nlet x = 1;", vec!["Title", "let x = 1;"])]
#[case::dangling_markup(InputFormat::Markdown, "**bold [link](", vec!["bold", "link"])]
#[case::stray_html(InputFormat::Markdown, "<div>\n\nunclosed <span>text", vec!["unclosed", "text"])]
#[case::unclosed_component(InputFormat::Mdx, "# Doc\n\n<Component prop={1}", vec!["Doc", "Component"])]
#[case::unclosed_expression(InputFormat::Mdx, "Text {unclosed", vec!["Text", "unclosed"])]
#[case::mismatched_tags(InputFormat::Mdx, "<Open>\n\nbody\n\n</Close>", vec!["Open", "body", "Close"])]
#[case::unbalanced_html(
    InputFormat::Html,
    "<div><p>unclosed <b>bold</div></span>trailing",
    vec!["unclosed", "bold", "trailing"]
)]
#[case::stray_angles(InputFormat::Html, "a < b && c > d <p>x", vec!["b && c", "x"])]
#[case::comment_only(InputFormat::Html, "<!-- only a note -->", vec!["only a note"])]
#[case::text_markup(InputFormat::Text, "  indented\n\n\n# not a heading", vec!["indented", "# not a heading"])]
fn test_run_malformed_content_is_kept(
    #[case] format: InputFormat,
    #[case] content: &str,
    #[case] fragments: Vec<&str>,
) {
    let text = run(".", content, with_format(format)).unwrap().text();
    for fragment in fragments {
        assert!(text.contains(fragment), "{fragment:?} missing from {text:?}");
    }
}

#[test]
fn test_run_invalid_query() {
    let err = run(".h1 !!!", "# Hello", None).unwrap_err();
    assert!(err.to_string().contains("Error evaluating query"));
}

#[rstest]
#[case::unknown_function("nope()")]
#[case::unknown_selector(".nope")]
#[case::unclosed_paren("select(contains(\"a\")")]
#[case::selector_after_string(".h1 | to_text | .h")]
fn test_run_errors_are_prefixed(#[case] query: &str) {
    let err = run(query, "# Hello", None).unwrap_err();
    assert!(err.to_string().starts_with("Error evaluating query: "), "{err}");
}

#[test]
fn test_run_deeply_nested_query_is_an_error() {
    let query = format!("{}.h1{}", "(".repeat(200_000), ")".repeat(200_000));
    let err = run(&query, "# Hello", None).unwrap_err();
    assert!(err.to_string().starts_with("Error evaluating query: "), "{err}");
}

#[test]
fn test_run_value_kinds() {
    let result = run(".h1", "# Hi", None).unwrap();
    assert_eq!(result.get(0).and_then(QueryValue::kind), Some(NodeKind::Heading));

    let result = run(".h1 | len", "# Hi", None).unwrap();
    assert!(matches!(result.get(0), Some(QueryValue::Number(_))));

    let result = run(".h1 | to_text | split(\"l\")", "# Hello", None).unwrap();
    assert!(matches!(result.get(0), Some(QueryValue::Array(_))));
    assert_eq!(result.values(), vec!["He\no"]);
}

#[test]
fn test_run_render_options() {
    let options = Options {
        list_style: Some(ListStyle::Star),
        ..Default::default()
    };
    let result = run(".[]", "- a\n- b", Some(options)).unwrap();
    assert_eq!(result.values(), vec!["* a", "* b"]);
    assert_eq!(result.text(), "* a\n* b");
}

#[test]
fn test_html_to_markdown() {
    let markdown = mql::html_to_markdown(
        "<h1>Hello World</h1><p>This is a <strong>test</strong>.</p>",
        None,
    )
    .unwrap();
    assert_eq!(markdown.trim(), "# Hello World\n\nThis is a **test**.");
}

#[test]
fn test_html_to_markdown_title_as_h1() {
    let markdown = mql::html_to_markdown(
        "<html><head><title>Doc</title></head><body><p>Body</p></body></html>",
        Some(ConversionOptions {
            use_title_as_h1: true,
            ..Default::default()
        }),
    )
    .unwrap();
    assert_eq!(markdown.trim(), "# Doc\n\nBody");
}

#[test]
fn test_options_from_json() {
    let options: Options = serde_json::from_str(
        r#"{"input_format": "TEXT", "list_style": "PLUS", "link_url_style": "ANGLE"}"#,
    )
    .unwrap();

    assert_eq!(options.input_format, Some(InputFormat::Text));
    assert_eq!(options.list_style, Some(ListStyle::Plus));
    assert_eq!(options.link_title_style, None);

    let result = run("select(contains(\"b\"))", "a\nb", Some(options)).unwrap();
    assert_eq!(result.values(), vec!["b"]);
}

#[test]
fn test_options_from_empty_json() {
    let options: Options = serde_json::from_str("{}").unwrap();
    assert_eq!(options, Options::default());
}

#[test]
fn test_run_under_trace_subscriber() {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let result = run(".h1 | to_text", "# Traced", None).unwrap();
        assert_eq!(result.values(), vec!["Traced"]);
    });
}
