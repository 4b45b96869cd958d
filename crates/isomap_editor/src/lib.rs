//! isomap_editor - editing engine for isomap projects
//!
//! This crate holds the UI-independent half of a map editor:
//! - Undo/redo history with batched tile strokes
//! - Flood fill and wang terrain painting tools
//! - Sprite atlas to tileset import
//! - TMX/TMJ export helpers
//! - Persistent editor preferences
//!
//! # Usage
//!
//! ```rust,ignore
//! use isomap_editor::{flood_fill, History};
//!
//! let mut history = History::with_limit(prefs.history_limit);
//! flood_fill(&mut project, &mut history, &map_id, &layer_id, GridCoord::new(0, 0), grass)?;
//! history.undo(&mut project)?;
//! ```

pub mod export;
pub mod history;
pub mod import;
pub mod preferences;
pub mod tools;

pub use export::{export_map, map_filename, ExportFormat};
pub use history::{
    History, HistoryEntry, HistoryError, LayerAttribute, TileChange, MAX_HISTORY,
};
pub use import::atlas_to_tileset;
pub use preferences::{EditorPreferences, PreferencesError};
pub use tools::{flood_fill, TerrainBrush, TerrainPainter, ToolError};
