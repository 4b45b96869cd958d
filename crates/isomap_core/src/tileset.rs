//! Tileset definitions and per-tile metadata

use crate::geometry::Size;
use crate::id::IdGenerator;
use crate::properties::PropertyBag;
use crate::wang::WangSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind of collision shape attached to a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionShapeKind {
    /// `[x, y, width, height]`
    Rect,
    /// `[x, y, width, height]` of the bounding box
    Ellipse,
    /// Flat list of absolute `x, y` pairs
    Polygon,
}

/// Collision shape in tile-local pixel space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionShape {
    #[serde(rename = "type")]
    pub kind: CollisionShapeKind,
    pub data: Vec<f64>,
}

impl CollisionShape {
    pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            kind: CollisionShapeKind::Rect,
            data: vec![x, y, width, height],
        }
    }

    pub fn ellipse(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            kind: CollisionShapeKind::Ellipse,
            data: vec![x, y, width, height],
        }
    }

    pub fn polygon(points: Vec<f64>) -> Self {
        Self {
            kind: CollisionShapeKind::Polygon,
            data: points,
        }
    }
}

/// One frame of a tile animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationFrame {
    /// Local tile id shown during this frame
    pub tile_id: u32,
    /// Frame duration in milliseconds
    pub duration: u32,
}

/// Metadata for a single tile of a tileset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileData {
    pub local_id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collision: Option<Vec<CollisionShape>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<Vec<AnimationFrame>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<PropertyBag>,
}

impl TileData {
    pub fn new(local_id: u32) -> Self {
        Self {
            local_id,
            ..Default::default()
        }
    }

    /// True when the tile carries no metadata at all
    pub fn is_empty(&self) -> bool {
        self.collision.is_none()
            && self.animation.is_none()
            && self.probability.is_none()
            && self.properties.as_ref().map_or(true, |p| p.is_empty())
    }
}

/// A tile atlas: one image cut into a grid of equally sized tiles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tileset {
    pub id: String,
    pub name: String,
    pub image_source: String,
    pub image_size: Size,
    pub tile_size: Size,
    pub columns: u32,
    pub tile_count: u32,
    pub spacing: u32,
    pub margin: u32,
    /// Per-tile metadata keyed by local tile id
    #[serde(default)]
    pub tiles: BTreeMap<u32, TileData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<PropertyBag>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub wang_sets: Vec<WangSet>,
}

/// Options for [`Tileset::new`]
#[derive(Debug, Clone, Default)]
pub struct TilesetOptions {
    pub name: String,
    pub image_source: String,
    pub image_size: Size,
    pub tile_size: Size,
    pub spacing: u32,
    pub margin: u32,
}

impl Tileset {
    /// Create a tileset, deriving `columns` and `tile_count` from the image geometry.
    ///
    /// Tile size is expected to be positive; a zero-sized tile yields an empty grid.
    pub fn new(ids: &mut IdGenerator, options: TilesetOptions) -> Self {
        let (columns, rows) = grid_dimensions(
            options.image_size,
            options.tile_size,
            options.spacing,
            options.margin,
        );

        Self {
            id: ids.generate(),
            name: options.name,
            image_source: options.image_source,
            image_size: options.image_size,
            tile_size: options.tile_size,
            columns,
            tile_count: columns.saturating_mul(rows),
            spacing: options.spacing,
            margin: options.margin,
            tiles: BTreeMap::new(),
            properties: None,
            wang_sets: Vec::new(),
        }
    }

    /// Number of tile rows in the atlas
    pub fn rows(&self) -> u32 {
        if self.columns == 0 {
            0
        } else {
            self.tile_count.div_ceil(self.columns)
        }
    }

    /// Metadata for a tile, if any
    pub fn tile(&self, local_id: u32) -> Option<&TileData> {
        self.tiles.get(&local_id)
    }

    /// Metadata for a tile, created on demand
    pub fn tile_mut(&mut self, local_id: u32) -> &mut TileData {
        self.tiles
            .entry(local_id)
            .or_insert_with(|| TileData::new(local_id))
    }

    /// Pixel rectangle `(x, y)` of a tile inside the atlas image
    pub fn tile_origin(&self, local_id: u32) -> Option<(u32, u32)> {
        if self.columns == 0 || local_id >= self.tile_count {
            return None;
        }
        let col = local_id % self.columns;
        let row = local_id / self.columns;
        Some((
            self.margin + col * (self.tile_size.width + self.spacing),
            self.margin + row * (self.tile_size.height + self.spacing),
        ))
    }
}

/// Columns and rows that fit in an image.
///
/// `usable = image - 2 * margin + spacing`, `count = usable / (tile + spacing)`.
pub fn grid_dimensions(image: Size, tile: Size, spacing: u32, margin: u32) -> (u32, u32) {
    let axis = |image: u32, tile: u32| -> u32 {
        let usable = image as i64 - 2 * margin as i64 + spacing as i64;
        let step = tile as i64 + spacing as i64;
        if usable <= 0 || step <= 0 {
            return 0;
        }
        (usable / step) as u32
    };
    (
        axis(image.width, tile.width),
        axis(image.height, tile.height),
    )
}

/// Binding of a tileset into a map's GID space
#[derive(Debug, Clone, PartialEq)]
pub struct TilesetRef {
    pub first_gid: u32,
    pub tileset: Tileset,
}

impl TilesetRef {
    pub fn new(first_gid: u32, tileset: Tileset) -> Self {
        Self { first_gid, tileset }
    }

    /// Last GID covered by this tileset (inclusive)
    pub fn last_gid(&self) -> u32 {
        self.next_gid().saturating_sub(1)
    }

    /// First GID available after this tileset
    pub fn next_gid(&self) -> u32 {
        self.first_gid.saturating_add(self.tileset.tile_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn options(image: Size, tile: Size, spacing: u32, margin: u32) -> TilesetOptions {
        TilesetOptions {
            name: "Terrain".to_string(),
            image_source: "terrain.png".to_string(),
            image_size: image,
            tile_size: tile,
            spacing,
            margin,
        }
    }

    #[test_case(Size::new(256, 128), Size::new(64, 32), 0, 0, 4, 16 ; "plain grid")]
    #[test_case(Size::new(138, 70), Size::new(64, 32), 2, 1, 2, 4 ; "spacing and margin")]
    #[test_case(Size::new(10, 10), Size::new(64, 32), 0, 0, 0, 0 ; "image smaller than tile")]
    #[test_case(Size::new(10, 10), Size::new(8, 8), 0, 20, 0, 0 ; "margin wider than image")]
    fn test_derived_geometry(
        image: Size,
        tile: Size,
        spacing: u32,
        margin: u32,
        columns: u32,
        count: u32,
    ) {
        let mut ids = IdGenerator::with_session("ts");
        let tileset = Tileset::new(&mut ids, options(image, tile, spacing, margin));
        assert_eq!(tileset.columns, columns);
        assert_eq!(tileset.tile_count, count);
    }

    #[test]
    fn test_huge_grid_saturates_tile_count() {
        let mut ids = IdGenerator::with_session("ts");
        let tileset = Tileset::new(
            &mut ids,
            options(Size::new(100_000, 100_000), Size::new(1, 1), 0, 0),
        );
        assert_eq!(tileset.columns, 100_000);
        assert_eq!(tileset.tile_count, u32::MAX);
    }

    #[test]
    fn test_zero_tile_size_does_not_panic() {
        let (cols, rows) = grid_dimensions(Size::new(64, 64), Size::new(0, 0), 0, 0);
        assert_eq!((cols, rows), (0, 0));
    }

    #[test]
    fn test_tile_origin() {
        let mut ids = IdGenerator::with_session("ts");
        let tileset = Tileset::new(
            &mut ids,
            options(Size::new(138, 70), Size::new(64, 32), 2, 1),
        );
        assert_eq!(tileset.tile_origin(0), Some((1, 1)));
        assert_eq!(tileset.tile_origin(3), Some((67, 35)));
        assert_eq!(tileset.tile_origin(4), None);
        assert_eq!(tileset.rows(), 2);
    }

    #[test]
    fn test_tile_mut_creates_entry() {
        let mut ids = IdGenerator::with_session("ts");
        let mut tileset = Tileset::new(
            &mut ids,
            options(Size::new(256, 128), Size::new(64, 32), 0, 0),
        );
        assert!(tileset.tile(5).is_none());
        tileset.tile_mut(5).probability = Some(0.5);
        assert_eq!(tileset.tile(5).and_then(|t| t.probability), Some(0.5));
        assert_eq!(tileset.tile(5).map(|t| t.local_id), Some(5));
    }

    #[test]
    fn test_ref_gid_range() {
        let mut ids = IdGenerator::with_session("ts");
        let tileset = Tileset::new(
            &mut ids,
            options(Size::new(256, 128), Size::new(64, 32), 0, 0),
        );
        let tileset_ref = TilesetRef::new(11, tileset);
        assert_eq!(tileset_ref.last_gid(), 26);
        assert_eq!(tileset_ref.next_gid(), 27);

        let mut high = tileset_ref.clone();
        high.first_gid = u32::MAX - 4;
        assert_eq!(high.next_gid(), u32::MAX);
        assert_eq!(high.last_gid(), u32::MAX - 1);
    }
}
