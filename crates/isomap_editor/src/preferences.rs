//! Editor preferences stored as JSON in the platform config directory

use crate::export::ExportFormat;
use crate::history::MAX_HISTORY;
use directories::ProjectDirs;
use isomap_core::{
    Orientation, Size, DEFAULT_MAP_COLS, DEFAULT_MAP_ROWS, DEFAULT_TILE_HEIGHT, DEFAULT_TILE_WIDTH,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const PREFERENCES_FILE: &str = "preferences.json";

/// Most recent files kept in [`EditorPreferences::recent_files`]
pub const MAX_RECENT_FILES: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum PreferencesError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid preferences file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Could not determine config directory")]
    NoConfigDir,
}

/// Defaults for new documents and a few editor-wide settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorPreferences {
    /// Size in tiles for new maps
    pub default_map_size: Size,
    /// Tile size in pixels for new maps and tilesets
    pub default_tile_size: Size,
    pub default_orientation: Orientation,
    /// Undo depth
    pub history_limit: usize,
    pub export_format: ExportFormat,
    /// Most recent first
    pub recent_files: Vec<PathBuf>,
}

impl Default for EditorPreferences {
    fn default() -> Self {
        Self {
            default_map_size: Size::new(DEFAULT_MAP_COLS, DEFAULT_MAP_ROWS),
            default_tile_size: Size::new(DEFAULT_TILE_WIDTH, DEFAULT_TILE_HEIGHT),
            default_orientation: Orientation::default(),
            history_limit: MAX_HISTORY,
            export_format: ExportFormat::default(),
            recent_files: Vec::new(),
        }
    }
}

impl EditorPreferences {
    /// Get the config directory path for the editor
    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "isomap", "isomap").map(|dirs| dirs.config_dir().to_path_buf())
    }

    pub fn preferences_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join(PREFERENCES_FILE))
    }

    /// Load preferences, returning defaults if they cannot be read
    pub fn load() -> Self {
        let loaded = Self::preferences_path()
            .ok_or(PreferencesError::NoConfigDir)
            .and_then(|path| Self::load_from(&path));
        match loaded {
            Ok(prefs) => prefs,
            Err(e) => {
                tracing::warn!("Could not load preferences: {}. Using defaults.", e);
                Self::default()
            }
        }
    }

    /// Load from a specific file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, PreferencesError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save to the platform config directory
    pub fn save(&self) -> Result<(), PreferencesError> {
        let path = Self::preferences_path().ok_or(PreferencesError::NoConfigDir)?;
        self.save_to(&path)
    }

    /// Save to a specific file, creating its directory
    pub fn save_to(&self, path: &Path) -> Result<(), PreferencesError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        tracing::info!("Saved preferences to {:?}", path);
        Ok(())
    }

    /// Move `path` to the front of the recent list
    pub fn add_recent_file(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        self.recent_files.retain(|existing| existing != &path);
        self.recent_files.insert(0, path);
        self.recent_files.truncate(MAX_RECENT_FILES);
    }
}
