//! Converts HTML content to Markdown by reading it into the node model and
//! rendering the resulting tree.
mod error;
mod options;

use std::collections::BTreeMap;

pub use error::HtmlToMarkdownError;
pub use options::ConversionOptions;
use scraper::{ElementRef, Html};

use crate::reader::{HtmlReader, Reader};
use crate::render::RenderOptions;

pub fn convert_html_to_markdown(
    html_input: &str,
    options: ConversionOptions,
) -> Result<String, HtmlToMarkdownError> {
    convert_html_to_markdown_with(html_input, options, &RenderOptions::default())
}

#[tracing::instrument(level = "debug", skip(html_input, render_options))]
pub fn convert_html_to_markdown_with(
    html_input: &str,
    options: ConversionOptions,
    render_options: &RenderOptions,
) -> Result<String, HtmlToMarkdownError> {
    if html_input.trim().is_empty() {
        return Ok(String::new());
    }

    let body = HtmlReader::new(options)
        .read(html_input)
        .to_string_with(render_options);

    if !options.generate_front_matter {
        return Ok(body);
    }

    let document = Html::parse_document(html_input);
    match extract_front_matter(document.root_element()) {
        Some(front_matter) => {
            let yaml = serde_yaml::to_string(&front_matter)?;
            Ok(format!("---\n{}---\n\n{}", yaml, body))
        }
        None => Ok(body),
    }
}

/// Collects `<title>` and the description, keywords and author `<meta>` tags.
fn extract_front_matter(root: ElementRef<'_>) -> Option<BTreeMap<String, serde_yaml::Value>> {
    let head = root
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "head")?;
    let mut front_matter = BTreeMap::new();
    let mut keywords = Vec::new();

    for el in head.descendants().filter_map(ElementRef::wrap) {
        match el.value().name() {
            "title" => {
                let title = el.text().collect::<String>().trim().to_string();
                if !title.is_empty() {
                    front_matter.insert("title".to_string(), serde_yaml::Value::String(title));
                }
            }
            "meta" => {
                let (Some(name), Some(content)) = (el.value().attr("name"), el.value().attr("content"))
                else {
                    continue;
                };
                if content.is_empty() {
                    continue;
                }

                match name.to_lowercase().as_str() {
                    "description" | "author" => {
                        front_matter.insert(
                            name.to_lowercase(),
                            serde_yaml::Value::String(content.to_string()),
                        );
                    }
                    "keywords" => keywords.extend(
                        content
                            .split(',')
                            .map(str::trim)
                            .filter(|k| !k.is_empty())
                            .map(|k| serde_yaml::Value::String(k.to_string())),
                    ),
                    _ => {}
                }
            }
            _ => {}
        }
    }

    if !keywords.is_empty() {
        front_matter.insert("keywords".to_string(), serde_yaml::Value::Sequence(keywords));
    }

    if front_matter.is_empty() {
        None
    } else {
        Some(front_matter)
    }
}
