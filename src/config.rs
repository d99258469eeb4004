use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Editor session settings, stored as RON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Snapshots kept on each of the undo and redo stacks.
    pub undo_capacity: usize,
    /// Size of the bare rectangle a new board starts with.
    pub default_width: u32,
    pub default_height: u32,
    /// Deflate level for saved boards.
    pub compression_level: u32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            undo_capacity: 64,
            default_width: 2,
            default_height: 2,
            compression_level: 9,
        }
    }
}

impl EditorConfig {
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_ron(&self) -> String {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.undo_capacity == 0 {
            return Err(ConfigError::ZeroUndoCapacity);
        }
        if self.compression_level > 9 {
            return Err(ConfigError::CompressionLevel(self.compression_level));
        }
        Ok(())
    }
}
