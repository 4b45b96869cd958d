//! # isomap
//!
//! Isometric tile-map toolkit: a document model, Tiled and native file
//! formats, wang terrain auto-tiling, pathfinding, and an editing engine with
//! undo/redo.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use isomap::prelude::*;
//!
//! let project = deserialize_project_from_str(&std::fs::read_to_string("town.json")?)?;
//! if let Some(map) = project.map(&map_id) {
//!     std::fs::write("town.tmx", write_tmx(map))?;
//! }
//! ```
//!
//! ## Features
//!
//! - `runtime` (default) - Grid graphs, A* and path following
//! - `editor` (default) - History, tools, import/export and preferences
//!
//! ## Crate Structure
//!
//! This umbrella crate re-exports all isomap_* sub-crates:
//!
//! - [`core`] - Data model (Map, Layer, Tileset, Project, ids, gids, geometry)
//! - [`formats`] - Tile data codecs, Tiled TMX/TMJ/TSX/TSJ, native JSON, atlases
//! - [`autotile`] - Wang terrain painting
//! - [`runtime`] - Pathfinding and movement (requires `runtime` feature)
//! - [`editor`] - Editing engine (requires `editor` feature)

// =============================================================================
// Core module - document model
// =============================================================================

/// Core data types for isometric maps.
///
/// - [`Map`] - Layers plus bound tilesets
/// - [`Layer`] - Tile, object, image or group layer
/// - [`Tileset`] - Atlas geometry and per-tile metadata
/// - [`Project`] - Maps and the tilesets they share
pub mod core {
    pub use isomap_core::*;
}

pub use isomap_core::{
    grid_to_screen, screen_to_grid, GridCoord, IdGenerator, Layer, LayerKind, Map, MapOptions,
    ModelError, Project, Property, Size, TileData, TileLayer, Tileset, TilesetOptions, WangSet,
};

// =============================================================================
// Formats module - reading and writing documents
// =============================================================================

/// Interchange formats: tile data codecs, Tiled documents, native project
/// files and sprite atlases.
pub mod formats {
    pub use isomap_formats::*;
}

pub use isomap_formats::{
    deserialize_project, deserialize_project_from_str, detect_format, parse_tmj, parse_tmx,
    serialize_project, serialize_project_to_string, write_tmj, write_tmx, FormatError,
    ImportFormat, NativeError,
};

// =============================================================================
// Autotile module - wang terrain painting
// =============================================================================

/// Tiled-compatible wang terrain auto-tiling.
pub mod autotile {
    pub use isomap_autotile::*;
}

pub use isomap_autotile::{paint_terrain, TerrainChange, TerrainMap};

// =============================================================================
// Runtime module - pathfinding and movement (optional)
// =============================================================================

/// Walkability grids, A* search and path following.
///
/// Requires the `runtime` feature (enabled by default).
#[cfg(feature = "runtime")]
pub mod runtime {
    pub use isomap_runtime::*;
}

#[cfg(feature = "runtime")]
pub use isomap_runtime::{astar, Direction, GridGraph, PathFollower, PathResult};

// =============================================================================
// Editor module - editing engine (optional)
// =============================================================================

/// Undo/redo history, tools, import/export and preferences.
///
/// Requires the `editor` feature (enabled by default).
#[cfg(feature = "editor")]
pub mod editor {
    pub use isomap_editor::*;
}

#[cfg(feature = "editor")]
pub use isomap_editor::{
    atlas_to_tileset, export_map, flood_fill, EditorPreferences, ExportFormat, History,
    HistoryEntry, TerrainPainter,
};

// =============================================================================
// Prelude - import everything commonly needed
// =============================================================================

/// Commonly used types and functions.
///
/// ```rust,ignore
/// use isomap::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use crate::{
        GridCoord, IdGenerator, Layer, LayerKind, Map, MapOptions, Project, Size, Tileset,
        TilesetOptions,
    };

    // Formats
    pub use crate::{
        deserialize_project_from_str, detect_format, parse_tmj, parse_tmx,
        serialize_project_to_string, write_tmj, write_tmx, ImportFormat,
    };

    // Autotile
    pub use crate::{paint_terrain, TerrainMap};

    #[cfg(feature = "runtime")]
    pub use crate::{astar, GridGraph, PathFollower};

    #[cfg(feature = "editor")]
    pub use crate::{flood_fill, EditorPreferences, History, TerrainPainter};
}
