use miette::Diagnostic;
use mql_markdown::HtmlToMarkdownError;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Error evaluating query: {0}")]
    #[diagnostic(transparent)]
    Query(#[from] mql_lang::Error),
    #[error("Error converting HTML to Markdown: {0}")]
    #[diagnostic(transparent)]
    Conversion(#[from] HtmlToMarkdownError),
    #[error("Unknown input format `{0}`")]
    #[diagnostic(
        code(mql::input_format),
        help("Use one of MARKDOWN, MDX, TEXT, HTML, RAW or NULL.")
    )]
    UnknownInputFormat(String),
}
