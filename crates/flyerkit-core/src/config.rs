//! Editor configuration loaded from JSON.

use crate::history::MAX_UNDO_HISTORY;
use crate::selection::HANDLE_HIT_THRESHOLD;
use crate::shapes::Rgba;
use crate::snap::GRID_SIZE;
use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid setting: {0}")]
    Invalid(String),
}

/// Tunable editor settings. Every field has a default, so a partial file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Canvas width in canvas units.
    pub canvas_width: f64,
    /// Canvas height in canvas units.
    pub canvas_height: f64,
    /// Grid interval used when snapping.
    pub grid_size: f64,
    /// Snap dragged positions to the grid.
    pub snap_to_grid: bool,
    /// Maximum number of undo snapshots.
    pub history_limit: usize,
    /// Resize handle hit threshold, per axis.
    pub handle_threshold: f64,
    /// Color of the selection outline and handles.
    pub selection_color: Rgba,
    /// Directory relative image paths are resolved against.
    pub image_base_dir: Option<PathBuf>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            canvas_width: 800.0,
            canvas_height: 600.0,
            grid_size: GRID_SIZE,
            snap_to_grid: false,
            history_limit: MAX_UNDO_HISTORY,
            handle_threshold: HANDLE_HIT_THRESHOLD,
            selection_color: Rgba::from_hex(0x667eea),
            image_base_dir: None,
        }
    }
}

impl EditorConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EditorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::debug!("Loaded editor config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.canvas_width > 0.0 && self.canvas_height > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "canvas size must be positive, got {}x{}",
                self.canvas_width, self.canvas_height
            )));
        }
        if !(self.grid_size > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "grid_size must be positive, got {}",
                self.grid_size
            )));
        }
        if self.history_limit == 0 {
            return Err(ConfigError::Invalid("history_limit must be at least 1".to_string()));
        }
        if !(self.handle_threshold > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "handle_threshold must be positive, got {}",
                self.handle_threshold
            )));
        }
        Ok(())
    }

    pub fn canvas_size(&self) -> Size {
        Size::new(self.canvas_width, self.canvas_height)
    }
}
