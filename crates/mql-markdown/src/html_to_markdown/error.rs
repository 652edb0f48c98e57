use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum HtmlToMarkdownError {
    #[error("Failed to serialize front matter: {0}")]
    #[diagnostic(
        code(mql_markdown::html::front_matter),
        help("The document metadata could not be written as YAML.")
    )]
    FrontMatter(#[from] serde_yaml::Error),
}
