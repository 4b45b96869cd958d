//! Layer types: tile, object, image and group layers

use crate::error::{ModelError, Result};
use crate::geometry::Point;
use crate::id::IdGenerator;
use crate::properties::PropertyBag;
use serde::{Deserialize, Serialize};

/// Default name for new tile layers
pub const DEFAULT_TILE_LAYER_NAME: &str = "Tile Layer";
/// Default name for new object layers
pub const DEFAULT_OBJECT_LAYER_NAME: &str = "Object Layer";
/// Default name for new image layers
pub const DEFAULT_IMAGE_LAYER_NAME: &str = "Image Layer";
/// Default name for new group layers
pub const DEFAULT_GROUP_LAYER_NAME: &str = "Group";

/// A layer of a map. Attributes shared by every layer kind live here, the
/// kind-specific payload lives in [`LayerKind`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub id: String,
    pub name: String,
    pub visible: bool,
    pub locked: bool,
    /// Opacity in `[0, 1]`
    pub opacity: f64,
    /// Pixel offset
    pub offset: Point,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<PropertyBag>,
    #[serde(flatten)]
    pub kind: LayerKind,
}

/// The payload of a layer, tagged by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LayerKind {
    Tile(TileLayer),
    Object {
        #[serde(default)]
        objects: Vec<MapObject>,
    },
    Image {
        #[serde(rename = "imageSource", default)]
        image_source: String,
    },
    Group {
        #[serde(default)]
        layers: Vec<Layer>,
    },
}

/// The type of a layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerType {
    Tile,
    Object,
    Image,
    Group,
}

impl LayerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayerType::Tile => "tile",
            LayerType::Object => "object",
            LayerType::Image => "image",
            LayerType::Group => "group",
        }
    }
}

/// Dense row-major grid of raw cell values (GID plus flip flags, 0 = empty)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileLayer {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u32>,
}

impl TileLayer {
    /// Create an empty grid. Dimensions must be positive.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(ModelError::InvalidTileLayerDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            data: vec![0; width as usize * height as usize],
        })
    }

    /// Flat index of a cell, if it lies inside the grid
    pub fn index(&self, col: i32, row: i32) -> Option<usize> {
        if col < 0 || row < 0 || col as u32 >= self.width || row as u32 >= self.height {
            return None;
        }
        Some(row as usize * self.width as usize + col as usize)
    }

    /// Raw value at a cell
    pub fn get(&self, col: i32, row: i32) -> Option<u32> {
        self.index(col, row).and_then(|i| self.data.get(i).copied())
    }

    /// Set a cell, returning the previous raw value. Out-of-bounds writes are ignored.
    pub fn set(&mut self, col: i32, row: i32, value: u32) -> Option<u32> {
        let index = self.index(col, row)?;
        let cell = self.data.get_mut(index)?;
        Some(std::mem::replace(cell, value))
    }

    /// Number of non-empty cells
    pub fn occupied(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }
}

/// An object placed on an object layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapObject {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
    /// Tile object reference (raw GID with flip flags)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gid: Option<u32>,
    pub visible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<PropertyBag>,
}

impl MapObject {
    /// Create a visible, zero-sized object at a position
    pub fn new(ids: &mut IdGenerator, name: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            id: ids.generate(),
            name: name.into(),
            ty: String::new(),
            x,
            y,
            width: 0.0,
            height: 0.0,
            rotation: 0.0,
            gid: None,
            visible: true,
            properties: None,
        }
    }
}

impl Layer {
    fn with_kind(ids: &mut IdGenerator, name: &str, kind: LayerKind) -> Self {
        Self {
            id: ids.generate(),
            name: name.to_string(),
            visible: true,
            locked: false,
            opacity: 1.0,
            offset: Point::ZERO,
            properties: None,
            kind,
        }
    }

    /// Create an empty tile layer
    pub fn new_tile_layer(ids: &mut IdGenerator, width: u32, height: u32) -> Result<Self> {
        let tiles = TileLayer::new(width, height)?;
        Ok(Self::with_kind(
            ids,
            DEFAULT_TILE_LAYER_NAME,
            LayerKind::Tile(tiles),
        ))
    }

    /// Create an empty object layer
    pub fn new_object_layer(ids: &mut IdGenerator) -> Self {
        Self::with_kind(
            ids,
            DEFAULT_OBJECT_LAYER_NAME,
            LayerKind::Object {
                objects: Vec::new(),
            },
        )
    }

    /// Create an image layer showing `image_source`
    pub fn new_image_layer(ids: &mut IdGenerator, image_source: impl Into<String>) -> Self {
        Self::with_kind(
            ids,
            DEFAULT_IMAGE_LAYER_NAME,
            LayerKind::Image {
                image_source: image_source.into(),
            },
        )
    }

    /// Create an empty group layer
    pub fn new_group_layer(ids: &mut IdGenerator) -> Self {
        Self::with_kind(
            ids,
            DEFAULT_GROUP_LAYER_NAME,
            LayerKind::Group { layers: Vec::new() },
        )
    }

    /// Replace the layer name
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Get the type of this layer
    pub fn layer_type(&self) -> LayerType {
        match &self.kind {
            LayerKind::Tile(_) => LayerType::Tile,
            LayerKind::Object { .. } => LayerType::Object,
            LayerKind::Image { .. } => LayerType::Image,
            LayerKind::Group { .. } => LayerType::Group,
        }
    }

    pub fn as_tile(&self) -> Option<&TileLayer> {
        match &self.kind {
            LayerKind::Tile(tiles) => Some(tiles),
            _ => None,
        }
    }

    pub fn as_tile_mut(&mut self) -> Option<&mut TileLayer> {
        match &mut self.kind {
            LayerKind::Tile(tiles) => Some(tiles),
            _ => None,
        }
    }

    pub fn objects(&self) -> Option<&[MapObject]> {
        match &self.kind {
            LayerKind::Object { objects } => Some(objects),
            _ => None,
        }
    }

    pub fn objects_mut(&mut self) -> Option<&mut Vec<MapObject>> {
        match &mut self.kind {
            LayerKind::Object { objects } => Some(objects),
            _ => None,
        }
    }

    /// Child layers of a group (empty for other kinds)
    pub fn children(&self) -> &[Layer] {
        match &self.kind {
            LayerKind::Group { layers } => layers,
            _ => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Layer>> {
        match &mut self.kind {
            LayerKind::Group { layers } => Some(layers),
            _ => None,
        }
    }

    /// Find this layer or a descendant by id
    pub fn find(&self, id: &str) -> Option<&Layer> {
        if self.id == id {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find(id))
    }

    /// Find this layer or a descendant by id (mutable)
    pub fn find_mut(&mut self, id: &str) -> Option<&mut Layer> {
        if self.id == id {
            return Some(self);
        }
        match &mut self.kind {
            LayerKind::Group { layers } => layers.iter_mut().find_map(|child| child.find_mut(id)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_tile_layer() {
        let mut ids = IdGenerator::with_session("t");
        let layer = Layer::new_tile_layer(&mut ids, 10, 10).unwrap();

        assert_eq!(layer.name, "Tile Layer");
        assert!(layer.visible);
        assert!(!layer.locked);
        assert_eq!(layer.opacity, 1.0);
        assert_eq!(layer.layer_type(), LayerType::Tile);

        let tiles = layer.as_tile().expect("Expected tile layer");
        assert_eq!(tiles.data.len(), 100);
        assert!(tiles.data.iter().all(|&t| t == 0));
    }

    #[test]
    fn test_tile_layer_rejects_zero_dimensions() {
        let mut ids = IdGenerator::with_session("t");
        let err = Layer::new_tile_layer(&mut ids, 0, 5).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid tile layer dimensions: 0x5 (must be positive)"
        );
    }

    #[test]
    fn test_default_names() {
        let mut ids = IdGenerator::with_session("t");
        assert_eq!(Layer::new_object_layer(&mut ids).name, "Object Layer");
        assert_eq!(Layer::new_image_layer(&mut ids, "bg.png").name, "Image Layer");
        assert_eq!(Layer::new_group_layer(&mut ids).name, "Group");
        assert_eq!(
            Layer::new_object_layer(&mut ids).named("Spawns").name,
            "Spawns"
        );
    }

    #[test]
    fn test_get_set_bounds() {
        let mut tiles = TileLayer::new(4, 3).unwrap();
        assert_eq!(tiles.set(3, 2, 9), Some(0));
        assert_eq!(tiles.get(3, 2), Some(9));
        assert_eq!(tiles.data[11], 9);
        assert_eq!(tiles.set(4, 0, 1), None);
        assert_eq!(tiles.get(-1, 0), None);
        assert_eq!(tiles.occupied(), 1);
    }

    #[test]
    fn test_find_nested_layer() {
        let mut ids = IdGenerator::with_session("t");
        let inner = Layer::new_tile_layer(&mut ids, 2, 2).unwrap().named("Inner");
        let inner_id = inner.id.clone();
        let mut group = Layer::new_group_layer(&mut ids);
        let mut nested = Layer::new_group_layer(&mut ids);
        nested.children_mut().unwrap().push(inner);
        group.children_mut().unwrap().push(nested);

        assert_eq!(group.find(&inner_id).map(|l| l.name.as_str()), Some("Inner"));
        group.find_mut(&inner_id).unwrap().visible = false;
        assert!(!group.find(&inner_id).unwrap().visible);
        assert!(group.find("missing").is_none());
    }

    #[test]
    fn test_layer_serde_shape() {
        let mut ids = IdGenerator::with_session("t");
        let layer = Layer::new_image_layer(&mut ids, "sky.png");
        let json = serde_json::to_value(&layer).unwrap();
        assert_eq!(json["type"], "image");
        assert_eq!(json["imageSource"], "sky.png");
        assert_eq!(json["offset"]["x"], 0.0);
        let back: Layer = serde_json::from_value(json).unwrap();
        assert_eq!(back, layer);
    }
}
