use hypewriter_engine::editing::{EditorOptions, IndentOptions};
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

/// Editor behaviour knobs, the `[editor]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Left margin per indent level, in em.
    pub indent_size: f32,
    pub min_indent_level: u8,
    pub max_indent_level: u8,
    pub line_highlight_class: String,
}

impl Default for EditorSettings {
    fn default() -> Self {
        let options = EditorOptions::default();
        Self {
            indent_size: options.indent.indent_size,
            min_indent_level: options.indent.min_level,
            max_indent_level: options.indent.max_level,
            line_highlight_class: options.highlight_class,
        }
    }
}

impl From<&EditorSettings> for EditorOptions {
    fn from(settings: &EditorSettings) -> Self {
        EditorOptions {
            indent: IndentOptions {
                indent_size: settings.indent_size,
                min_level: settings.min_indent_level,
                max_level: settings.max_indent_level,
            },
            highlight_class: settings.line_highlight_class.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    /// Directory new projects are created in.
    pub projects_path: PathBuf,
    #[serde(default)]
    pub editor: EditorSettings,
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

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the loaded projects path
        config.projects_path =
            Self::expand_path(&config.projects_path).unwrap_or(config.projects_path);

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
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
        let config_dir = shellexpand::tilde("~/.config/hypewriter");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    pub fn editor_options(&self) -> EditorOptions {
        EditorOptions::from(&self.editor)
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}
