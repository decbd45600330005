use serde::{Deserialize, Serialize};

/// Indent sizing passed explicitly into the indent commands and the
/// markup layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndentOptions {
    /// Left margin per level, in em.
    pub indent_size: f32,
    pub min_level: u8,
    pub max_level: u8,
}

impl Default for IndentOptions {
    fn default() -> Self {
        Self {
            indent_size: 2.0,
            min_level: 0,
            max_level: 8,
        }
    }
}

impl IndentOptions {
    pub fn clamp(&self, level: u8) -> u8 {
        level.clamp(self.min_level, self.max_level.max(self.min_level))
    }
}

/// Options for one editor instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorOptions {
    pub indent: IndentOptions,
    /// Class attached to the line-highlight decoration.
    pub highlight_class: String,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            indent: IndentOptions::default(),
            highlight_class: "line-highlight".to_string(),
        }
    }
}
