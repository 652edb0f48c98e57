use mql_markdown::{ConversionOptions, convert_html_to_markdown};
use rstest::rstest;

fn assert_conversion_with_options(html: &str, expected: &str, options: ConversionOptions) {
    match convert_html_to_markdown(html, options) {
        Ok(markdown) => assert_eq!(markdown.trim_end_matches('\n'), expected),
        Err(e) => panic!("Conversion failed for HTML '{}': {:?}", html, e),
    }
}

fn assert_conversion(html: &str, expected: &str) {
    assert_conversion_with_options(html, expected, ConversionOptions::default());
}

#[test]
fn test_heading_and_paragraph_with_strong() {
    assert_conversion(
        "<h1>Hello World</h1><p>This is a <strong>test</strong>.</p>",
        "# Hello World\n\nThis is a **test**.",
    );
}

#[rstest]
#[case::h2("<h2>Two</h2>", "## Two")]
#[case::h6("<h6>Six</h6>", "###### Six")]
#[case::em("<p><em>a</em> and <i>b</i></p>", "*a* and *b*")]
#[case::inline_code("<p>run <code>cargo</code></p>", "run `cargo`")]
#[case::br("<p>a<br>b</p>", "a\\\nb")]
#[case::link_without_title(r#"<a href="https://example.com">site</a>"#, "[site](https://example.com)")]
#[case::nested_inline("<p><strong>bold <em>both</em></strong></p>", "**bold *both***")]
fn test_inline_elements(#[case] html: &str, #[case] expected: &str) {
    assert_conversion(html, expected);
}

#[test]
fn test_full_document() {
    let html = r#"<!DOCTYPE html>
<html>
  <head><title>Ignored</title><style>body { color: red }</style></head>
  <body>
    <header><nav><a href="/">Home</a></nav></header>
    <main>
      <article>
        <h2>Install</h2>
        <pre><code class="language-sh">cargo install mql
</code></pre>
        <ol>
          <li>Download</li>
          <li>Run</li>
        </ol>
        <blockquote><p>Note</p></blockquote>
      </article>
    </main>
  </body>
</html>"#;

    assert_conversion_with_options(
        html,
        "[Home](/)\n\n## Install\n\n```sh\ncargo install mql\n```\n\n1. Download\n2. Run\n\n> Note",
        ConversionOptions {
            strip_non_content: true,
            ..Default::default()
        },
    );
}

#[test]
fn test_comments_and_styles_are_kept_by_default() {
    assert_conversion(
        "<html><head><style>p { color: red }</style></head><body><!-- draft --><p>Text</p></body></html>",
        "<style>p { color: red }</style>\n\n<!-- draft -->\n\nText",
    );
}

#[test]
fn test_scripts_extracted_as_code_blocks() {
    assert_conversion_with_options(
        r#"<p>Before</p><script type="application/json">{"a": 1}</script>"#,
        "Before\n\n```json\n{\"a\": 1}\n```",
        ConversionOptions {
            extract_scripts_as_code_blocks: true,
            ..Default::default()
        },
    );
}

#[test]
fn test_title_as_h1_and_front_matter() {
    assert_conversion_with_options(
        r#"<html><head><title>Guide</title><meta name="author" content="Ann"></head><body><p>Text</p></body></html>"#,
        "---\nauthor: Ann\ntitle: Guide\n---\n\n# Guide\n\nText",
        ConversionOptions {
            generate_front_matter: true,
            use_title_as_h1: true,
            strip_non_content: true,
            ..Default::default()
        },
    );
}

#[test]
fn test_malformed_html_is_not_lost() {
    assert_conversion("<p>unclosed <b>bold", "unclosed **bold**");
}
