use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionOptions {
    pub extract_scripts_as_code_blocks: bool,
    pub generate_front_matter: bool,
    pub use_title_as_h1: bool,
    /// Drops comments, `<script>`, `<style>`, `<meta>` and similar markup
    /// instead of keeping it as raw html.
    pub strip_non_content: bool,
}
