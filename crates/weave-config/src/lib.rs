use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// Editing kernel configuration.
///
/// Every section falls back to its defaults, so a config file only needs to
/// name the values it changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub schema: SchemaConfig,
    pub formats: FormatConfig,
}

/// Tag classification used by the kernel's rendering rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// Elements that start a new visual line.
    pub block_tags: Vec<String>,
    /// Self-closing elements that cannot host a cursor.
    pub void_tags: Vec<String>,
    /// Elements whose whitespace is rendered verbatim.
    pub preformatted_tags: Vec<String>,
    /// Classes that only carry a font size and never a format.
    pub font_size_classes: Vec<String>,
    /// Class marking a container whose whole content counts as selected.
    pub selected_container_class: String,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        let owned = |tags: &[&str]| tags.iter().map(|t| t.to_string()).collect();
        Self {
            block_tags: owned(&[
                "address",
                "article",
                "aside",
                "blockquote",
                "dd",
                "div",
                "dl",
                "dt",
                "fieldset",
                "figure",
                "footer",
                "form",
                "h1",
                "h2",
                "h3",
                "h4",
                "h5",
                "h6",
                "header",
                "hr",
                "li",
                "main",
                "nav",
                "ol",
                "p",
                "pre",
                "section",
                "table",
                "tbody",
                "td",
                "tfoot",
                "th",
                "thead",
                "tr",
                "ul",
            ]),
            void_tags: owned(&["br", "hr", "img", "input", "wbr"]),
            preformatted_tags: owned(&["pre"]),
            font_size_classes: owned(&["fs-small", "fs-normal", "fs-large", "fs-huge"]),
            selected_container_class: "selected".to_string(),
        }
    }
}

/// Preferred wrapper tag per inline format.
///
/// An empty string means the format has no dedicated tag and is always
/// applied as a style on a `span`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    pub bold: String,
    pub italic: String,
    pub underline: String,
    pub strikethrough: String,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            bold: "b".to_string(),
            italic: "i".to_string(),
            underline: "u".to_string(),
            strikethrough: "s".to_string(),
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    /// Load the user config, falling back to the defaults when no file exists.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        Ok(Self::load()?.unwrap_or_default())
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/weave");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }
}
