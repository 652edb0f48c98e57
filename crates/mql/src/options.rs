use std::{fmt, str::FromStr};

use mql_markdown::{
    HtmlReader, ListStyle, MarkdownReader, MdxReader, Node, Reader, RenderOptions, TextReader,
    TitleSurroundStyle, UrlSurroundStyle,
};
use serde::{Deserialize, Serialize};

use crate::Error;

/// How the `content` passed to [`run`](crate::run) is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InputFormat {
    #[default]
    Markdown,
    Mdx,
    Text,
    Html,
    /// The whole content as a single string value.
    Raw,
    /// A single `None` value; the content is ignored.
    Null,
}

impl InputFormat {
    /// Reads `content` into a document tree, or `None` for the formats that skip parsing.
    pub fn read(self, content: &str) -> Option<Node> {
        match self {
            InputFormat::Markdown => Some(MarkdownReader.read(content)),
            InputFormat::Mdx => Some(MdxReader.read(content)),
            InputFormat::Text => Some(TextReader.read(content)),
            InputFormat::Html => Some(HtmlReader::default().read(content)),
            InputFormat::Raw | InputFormat::Null => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InputFormat::Markdown => "MARKDOWN",
            InputFormat::Mdx => "MDX",
            InputFormat::Text => "TEXT",
            InputFormat::Html => "HTML",
            InputFormat::Raw => "RAW",
            InputFormat::Null => "NULL",
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(InputFormat::Markdown),
            "mdx" => Ok(InputFormat::Mdx),
            "text" | "txt" => Ok(InputFormat::Text),
            "html" => Ok(InputFormat::Html),
            "raw" => Ok(InputFormat::Raw),
            "null" => Ok(InputFormat::Null),
            _ => Err(Error::UnknownInputFormat(s.to_string())),
        }
    }
}

/// Options for a single [`run`](crate::run). Unset fields fall back to their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub input_format: Option<InputFormat>,
    pub list_style: Option<ListStyle>,
    pub link_title_style: Option<TitleSurroundStyle>,
    pub link_url_style: Option<UrlSurroundStyle>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input_format(mut self, input_format: InputFormat) -> Self {
        self.input_format = Some(input_format);
        self
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            list_style: self.list_style.unwrap_or_default(),
            link_url_style: self.link_url_style.unwrap_or_default(),
            link_title_style: self.link_title_style.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::upper("MARKDOWN", InputFormat::Markdown)]
    #[case::lower("mdx", InputFormat::Mdx)]
    #[case::mixed("Html", InputFormat::Html)]
    #[case::text("TEXT", InputFormat::Text)]
    #[case::raw("raw", InputFormat::Raw)]
    #[case::null("NULL", InputFormat::Null)]
    fn test_input_format_from_str(#[case] input: &str, #[case] expected: InputFormat) {
        assert_eq!(input.parse::<InputFormat>().unwrap(), expected);
        assert_eq!(expected.to_string().parse::<InputFormat>().unwrap(), expected);
    }

    #[test]
    fn test_input_format_from_str_unknown() {
        assert!(matches!(
            "yaml".parse::<InputFormat>(),
            Err(Error::UnknownInputFormat(s)) if s == "yaml"
        ));
    }

    #[test]
    fn test_render_options_defaults() {
        assert_eq!(Options::default().render_options(), RenderOptions::default());
    }

    #[test]
    fn test_render_options_overrides() {
        let options = Options {
            list_style: Some(ListStyle::Star),
            link_url_style: Some(UrlSurroundStyle::Angle),
            ..Default::default()
        };
        let render = options.render_options();

        assert_eq!(render.list_style, ListStyle::Star);
        assert_eq!(render.link_url_style, UrlSurroundStyle::Angle);
        assert_eq!(render.link_title_style, TitleSurroundStyle::Double);
    }

    #[rstest]
    #[case::raw(InputFormat::Raw)]
    #[case::null(InputFormat::Null)]
    fn test_read_skips_parsing(#[case] format: InputFormat) {
        assert!(format.read("# a").is_none());
    }
}
