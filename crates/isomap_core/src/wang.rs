//! Wang set definitions for terrain auto-tiling
//!
//! A wang id assigns a terrain color to each of the eight positions around a
//! tile, indexed clockwise from the top: N, NE, E, SE, S, SW, W, NW. Color 0
//! means "no terrain".

use crate::properties::PropertyBag;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Eight terrain color slots in N, NE, E, SE, S, SW, W, NW order
pub type WangId = [u32; 8];

/// Number of positions in a wang id
pub const WANG_SLOTS: usize = 8;

// =============================================================================
// WangPosition - the eight slots of a wang id
// =============================================================================

/// A position around a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WangPosition {
    North = 0,
    NorthEast = 1,
    East = 2,
    SouthEast = 3,
    South = 4,
    SouthWest = 5,
    West = 6,
    NorthWest = 7,
}

impl WangPosition {
    pub const ALL: [WangPosition; 8] = [
        WangPosition::North,
        WangPosition::NorthEast,
        WangPosition::East,
        WangPosition::SouthEast,
        WangPosition::South,
        WangPosition::SouthWest,
        WangPosition::West,
        WangPosition::NorthWest,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Grid offset `(dcol, drow)` of the neighbor at this position
    pub fn offset(self) -> (i32, i32) {
        match self {
            WangPosition::North => (0, -1),
            WangPosition::NorthEast => (1, -1),
            WangPosition::East => (1, 0),
            WangPosition::SouthEast => (1, 1),
            WangPosition::South => (0, 1),
            WangPosition::SouthWest => (-1, 1),
            WangPosition::West => (-1, 0),
            WangPosition::NorthWest => (-1, -1),
        }
    }

    pub fn is_corner(self) -> bool {
        matches!(
            self,
            WangPosition::NorthEast
                | WangPosition::SouthEast
                | WangPosition::SouthWest
                | WangPosition::NorthWest
        )
    }
}

// =============================================================================
// WangSet
// =============================================================================

/// Which wang id slots a set constrains
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WangSetType {
    #[default]
    Corner,
    Edge,
    Mixed,
}

impl WangSetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WangSetType::Corner => "corner",
            WangSetType::Edge => "edge",
            WangSetType::Mixed => "mixed",
        }
    }

    /// Parse a type tag, defaulting to `corner` for unknown values
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "edge" => WangSetType::Edge,
            "mixed" => WangSetType::Mixed,
            _ => WangSetType::Corner,
        }
    }

    /// Wang id slots compared when matching tiles of this set type
    pub fn relevant_slots(&self) -> &'static [usize] {
        match self {
            WangSetType::Corner => &[1, 3, 5, 7],
            WangSetType::Edge => &[0, 2, 4, 6],
            WangSetType::Mixed => &[0, 1, 2, 3, 4, 5, 6, 7],
        }
    }
}

impl fmt::Display for WangSetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A terrain color in a wang set (referenced by 1-based index from wang ids)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WangColor {
    pub name: String,
    pub color: String,
    /// Representative local tile id, -1 for none
    pub tile: i64,
    pub probability: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<PropertyBag>,
}

impl Default for WangColor {
    fn default() -> Self {
        Self {
            name: String::new(),
            color: "#000000".to_string(),
            tile: -1,
            probability: 1.0,
            properties: None,
        }
    }
}

/// The terrain pattern of one tile in the set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WangTile {
    pub tile_id: u32,
    pub wang_id: WangId,
}

/// A set of terrain colors and the tiles that realize their transitions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WangSet {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: WangSetType,
    pub colors: Vec<WangColor>,
    pub wang_tiles: Vec<WangTile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<PropertyBag>,
}

impl WangSet {
    pub fn new(name: impl Into<String>, ty: WangSetType) -> Self {
        Self {
            name: name.into(),
            ty,
            ..Default::default()
        }
    }

    /// Add a tile pattern
    pub fn with_tile(mut self, tile_id: u32, wang_id: WangId) -> Self {
        self.wang_tiles.push(WangTile { tile_id, wang_id });
        self
    }
}

/// Build a wang id from an arbitrary list, padding or truncating to eight slots
pub fn wang_id_from_slice(values: &[u32]) -> WangId {
    let mut id = [0; WANG_SLOTS];
    for (slot, value) in id.iter_mut().zip(values) {
        *slot = *value;
    }
    id
}
