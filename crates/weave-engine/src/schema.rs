//! Tag classification driven by [`weave_config::Config`].

use std::collections::{HashMap, HashSet};

use weave_config::Config;

use crate::editing::Format;

/// Rendering-relevant classification of tags and classes.
#[derive(Debug, Clone)]
pub struct Schema {
    block_tags: HashSet<String>,
    void_tags: HashSet<String>,
    preformatted_tags: HashSet<String>,
    font_size_classes: HashSet<String>,
    selected_container_class: String,
    preferred_tags: HashMap<Format, String>,
}

impl Default for Schema {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

fn lowercase_set(tags: &[String]) -> HashSet<String> {
    tags.iter().map(|t| t.to_ascii_lowercase()).collect()
}

impl Schema {
    pub fn from_config(config: &Config) -> Self {
        let schema = &config.schema;
        let formats = &config.formats;
        let preferred_tags = [
            (Format::Bold, &formats.bold),
            (Format::Italic, &formats.italic),
            (Format::Underline, &formats.underline),
            (Format::StrikeThrough, &formats.strikethrough),
        ]
        .into_iter()
        .filter(|(_, tag)| !tag.trim().is_empty())
        .map(|(format, tag)| (format, tag.trim().to_ascii_lowercase()))
        .collect();

        Self {
            block_tags: lowercase_set(&schema.block_tags),
            void_tags: lowercase_set(&schema.void_tags),
            preformatted_tags: lowercase_set(&schema.preformatted_tags),
            font_size_classes: schema.font_size_classes.iter().cloned().collect(),
            selected_container_class: schema.selected_container_class.clone(),
            preferred_tags,
        }
    }

    pub fn is_block_tag(&self, tag: &str) -> bool {
        self.block_tags.contains(tag)
    }

    pub fn is_void_tag(&self, tag: &str) -> bool {
        self.void_tags.contains(tag)
    }

    pub fn is_preformatted_tag(&self, tag: &str) -> bool {
        self.preformatted_tags.contains(tag)
    }

    pub fn is_font_size_class(&self, class: &str) -> bool {
        self.font_size_classes.contains(class)
    }

    pub fn selected_container_class(&self) -> &str {
        &self.selected_container_class
    }

    /// Dedicated wrapper tag for `format`, if one is configured.
    pub fn preferred_tag(&self, format: Format) -> Option<&str> {
        self.preferred_tags.get(&format).map(String::as_str)
    }
}
