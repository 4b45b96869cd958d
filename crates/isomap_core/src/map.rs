//! Map documents

use crate::error::{ModelError, Result};
use crate::geometry::Size;
use crate::id::IdGenerator;
use crate::layer::{Layer, TileLayer};
use crate::properties::PropertyBag;
use crate::tileset::{Tileset, TilesetRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default tile width in pixels
pub const DEFAULT_TILE_WIDTH: u32 = 64;
/// Default tile height in pixels
pub const DEFAULT_TILE_HEIGHT: u32 = 32;
/// Default map width in tiles
pub const DEFAULT_MAP_COLS: u32 = 20;
/// Default map height in tiles
pub const DEFAULT_MAP_ROWS: u32 = 20;
/// Default name for new maps
pub const DEFAULT_MAP_NAME: &str = "Untitled Map";

/// Map projection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Isometric,
    Orthogonal,
    Staggered,
    Hexagonal,
}

impl Orientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Isometric => "isometric",
            Orientation::Orthogonal => "orthogonal",
            Orientation::Staggered => "staggered",
            Orientation::Hexagonal => "hexagonal",
        }
    }
}

/// Error for unrecognized enum tags in map attributes
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl FromStr for Orientation {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "isometric" => Ok(Orientation::Isometric),
            "orthogonal" => Ok(Orientation::Orthogonal),
            "staggered" => Ok(Orientation::Staggered),
            "hexagonal" => Ok(Orientation::Hexagonal),
            _ => Err(UnknownVariant {
                kind: "orientation",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order in which tiles are drawn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderOrder {
    #[default]
    RightDown,
    RightUp,
    LeftDown,
    LeftUp,
}

impl RenderOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderOrder::RightDown => "right-down",
            RenderOrder::RightUp => "right-up",
            RenderOrder::LeftDown => "left-down",
            RenderOrder::LeftUp => "left-up",
        }
    }
}

impl FromStr for RenderOrder {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "right-down" => Ok(RenderOrder::RightDown),
            "right-up" => Ok(RenderOrder::RightUp),
            "left-down" => Ok(RenderOrder::LeftDown),
            "left-up" => Ok(RenderOrder::LeftUp),
            _ => Err(UnknownVariant {
                kind: "render order",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for RenderOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tile map: layers plus the tilesets bound into its GID space.
///
/// `tilesets` is kept sorted ascending by `first_gid`.
#[derive(Debug, Clone, PartialEq)]
pub struct Map {
    pub id: String,
    pub name: String,
    pub orientation: Orientation,
    pub render_order: RenderOrder,
    /// Size in tiles
    pub map_size: Size,
    /// Tile size in pixels
    pub tile_size: Size,
    pub layers: Vec<Layer>,
    pub tilesets: Vec<TilesetRef>,
    pub properties: Option<PropertyBag>,
}

/// Options for [`Map::new`]
#[derive(Debug, Clone)]
pub struct MapOptions {
    pub name: String,
    pub map_size: Size,
    pub tile_size: Size,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            name: DEFAULT_MAP_NAME.to_string(),
            map_size: Size::new(DEFAULT_MAP_COLS, DEFAULT_MAP_ROWS),
            tile_size: Size::new(DEFAULT_TILE_WIDTH, DEFAULT_TILE_HEIGHT),
        }
    }
}

impl Map {
    /// Create an isometric map with a single empty tile layer named "Layer 1"
    pub fn new(ids: &mut IdGenerator, options: MapOptions) -> Result<Self> {
        let MapOptions {
            name,
            map_size,
            tile_size,
        } = options;
        if map_size.width == 0 || map_size.height == 0 {
            return Err(ModelError::InvalidMapDimensions {
                width: map_size.width,
                height: map_size.height,
            });
        }
        if tile_size.width == 0 || tile_size.height == 0 {
            return Err(ModelError::InvalidTileDimensions {
                width: tile_size.width,
                height: tile_size.height,
            });
        }

        let layer =
            Layer::new_tile_layer(ids, map_size.width, map_size.height)?.named("Layer 1");

        Ok(Self {
            id: ids.generate(),
            name,
            orientation: Orientation::Isometric,
            render_order: RenderOrder::RightDown,
            map_size,
            tile_size,
            layers: vec![layer],
            tilesets: Vec::new(),
            properties: None,
        })
    }

    /// Find a layer by id at any nesting depth
    pub fn find_layer(&self, id: &str) -> Option<&Layer> {
        self.layers.iter().find_map(|layer| layer.find(id))
    }

    /// Find a layer by id at any nesting depth (mutable)
    pub fn find_layer_mut(&mut self, id: &str) -> Option<&mut Layer> {
        self.layers.iter_mut().find_map(|layer| layer.find_mut(id))
    }

    /// Tile grid of a tile layer by id
    pub fn tile_layer(&self, id: &str) -> Option<&TileLayer> {
        self.find_layer(id).and_then(Layer::as_tile)
    }

    /// Tile grid of a tile layer by id (mutable)
    pub fn tile_layer_mut(&mut self, id: &str) -> Option<&mut TileLayer> {
        self.find_layer_mut(id).and_then(Layer::as_tile_mut)
    }

    /// Index of a top-level layer
    pub fn layer_index(&self, id: &str) -> Option<usize> {
        self.layers.iter().position(|layer| layer.id == id)
    }

    /// Tileset binding by tileset id
    pub fn tileset_ref(&self, tileset_id: &str) -> Option<&TilesetRef> {
        self.tilesets.iter().find(|r| r.tileset.id == tileset_id)
    }

    /// First GID after every bound tileset
    pub fn next_first_gid(&self) -> u32 {
        self.tilesets
            .iter()
            .map(TilesetRef::next_gid)
            .max()
            .unwrap_or(1)
    }

    /// Bind a tileset after the existing ones, returning its first GID
    pub fn add_tileset(&mut self, tileset: Tileset) -> u32 {
        let first_gid = self.next_first_gid();
        self.tilesets.push(TilesetRef::new(first_gid, tileset));
        self.sort_tilesets();
        first_gid
    }

    /// Restore ascending `first_gid` order
    pub fn sort_tilesets(&mut self) {
        self.tilesets.sort_by_key(|r| r.first_gid);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tileset::TilesetOptions;

    #[test]
    fn test_new_map_defaults() {
        let mut ids = IdGenerator::with_session("m");
        let map = Map::new(&mut ids, MapOptions::default()).unwrap();

        assert_eq!(map.name, "Untitled Map");
        assert_eq!(map.orientation, Orientation::Isometric);
        assert_eq!(map.render_order, RenderOrder::RightDown);
        assert_eq!(map.map_size, Size::new(20, 20));
        assert_eq!(map.tile_size, Size::new(64, 32));
        assert_eq!(map.layers.len(), 1);
        assert_eq!(map.layers[0].name, "Layer 1");
        assert_eq!(map.layers[0].as_tile().unwrap().data.len(), 400);
        assert!(map.tilesets.is_empty());
        assert_ne!(map.id, map.layers[0].id);
    }

    #[test]
    fn test_new_map_validates_dimensions() {
        let mut ids = IdGenerator::with_session("m");
        let err = Map::new(
            &mut ids,
            MapOptions {
                map_size: Size::new(0, 10),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert_eq!(
            err,
            ModelError::InvalidMapDimensions {
                width: 0,
                height: 10
            }
        );

        let err = Map::new(
            &mut ids,
            MapOptions {
                tile_size: Size::new(64, 0),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid tile dimensions: 64x0 (must be positive)"
        );
    }

    #[test]
    fn test_orientation_round_trip() {
        for o in [
            Orientation::Isometric,
            Orientation::Orthogonal,
            Orientation::Staggered,
            Orientation::Hexagonal,
        ] {
            assert_eq!(o.as_str().parse::<Orientation>(), Ok(o));
        }
        assert!("diagonal".parse::<Orientation>().is_err());
        assert_eq!("left-up".parse::<RenderOrder>(), Ok(RenderOrder::LeftUp));
    }

    #[test]
    fn test_add_tileset_assigns_gids() {
        let mut ids = IdGenerator::with_session("m");
        let mut map = Map::new(&mut ids, MapOptions::default()).unwrap();
        let options = TilesetOptions {
            name: "a".into(),
            image_source: "a.png".into(),
            image_size: Size::new(256, 128),
            tile_size: Size::new(64, 32),
            ..Default::default()
        };
        let a = Tileset::new(&mut ids, options.clone());
        let b = Tileset::new(&mut ids, options);
        let b_id = b.id.clone();
        assert_eq!(map.add_tileset(a), 1);
        assert_eq!(map.add_tileset(b), 17);
        assert_eq!(map.tileset_ref(&b_id).map(|r| r.first_gid), Some(17));
    }
}
