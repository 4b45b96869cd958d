//! Core data structures for isomap
//!
//! This crate provides the fundamental types for representing isometric tile maps:
//! - `Map` - A map document with layers and bound tilesets
//! - `Layer` - Tile, object, image or group layer
//! - `Tileset` - Tile atlas with per-tile metadata and wang sets
//! - `Project` - Maps plus their shared tilesets
//! - `IdGenerator` - Session-unique ids for every model element
//! - GID encoding helpers (`compose_gid`, `extract_gid`, `extract_flip_flags`)
//! - Isometric projection and rectangle math

mod error;
mod geometry;
mod gid;
mod id;
mod layer;
mod map;
mod project;
mod properties;
mod tileset;
mod wang;

pub use error::{ModelError, Result};
pub use geometry::{
    grid_to_screen, screen_to_grid, snap_to_grid, GridCoord, Point, Rect, ScreenCoord, Size,
};
pub use gid::{
    compose_gid, extract_flip_flags, extract_gid, toggle_flip_horizontal, toggle_flip_vertical,
    FlipFlags, FLAG_MASK, FLIP_DIAGONAL, FLIP_HORIZONTAL, FLIP_VERTICAL, GID_MASK,
};
pub use id::IdGenerator;
pub use layer::{
    Layer, LayerKind, LayerType, MapObject, TileLayer, DEFAULT_GROUP_LAYER_NAME,
    DEFAULT_IMAGE_LAYER_NAME, DEFAULT_OBJECT_LAYER_NAME, DEFAULT_TILE_LAYER_NAME,
};
pub use map::{
    Map, MapOptions, Orientation, RenderOrder, UnknownVariant, DEFAULT_MAP_COLS,
    DEFAULT_MAP_NAME, DEFAULT_MAP_ROWS, DEFAULT_TILE_HEIGHT, DEFAULT_TILE_WIDTH,
};
pub use project::{Project, PROJECT_VERSION};
pub use properties::{insert_property, Property, PropertyBag, PropertyType, PropertyValue};
pub use tileset::{
    grid_dimensions, AnimationFrame, CollisionShape, CollisionShapeKind, TileData, Tileset,
    TilesetOptions, TilesetRef,
};
pub use wang::{
    wang_id_from_slice, WangColor, WangId, WangPosition, WangSet, WangSetType, WangTile,
    WANG_SLOTS,
};
