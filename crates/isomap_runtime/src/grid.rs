//! Walkability grid used as the pathfinding search space

use isomap_core::{extract_gid, GridCoord, Map};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Tile layer \"{0}\" not found")]
    TileLayerNotFound(String),
}

const CARDINAL: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const DIAGONAL: [(i32, i32); 4] = [(-1, -1), (1, -1), (-1, 1), (1, 1)];

/// Grid of walkable/blocked cells with 4- or 8-way connectivity.
///
/// Diagonal steps are allowed whenever the target cell is walkable, even if
/// both flanking cardinal cells are blocked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridGraph {
    width: u32,
    height: u32,
    walkable: Vec<bool>,
    pub allow_diagonals: bool,
}

impl GridGraph {
    /// All cells start walkable
    pub fn new(width: u32, height: u32, allow_diagonals: bool) -> Self {
        Self {
            width,
            height,
            walkable: vec![true; width as usize * height as usize],
            allow_diagonals,
        }
    }

    /// Build a graph from a tile layer: occupied cells block, empty cells are walkable.
    ///
    /// The layer is looked up at any nesting depth.
    pub fn from_map(map: &Map, layer_id: &str, allow_diagonals: bool) -> Result<Self, GraphError> {
        let layer = map
            .tile_layer(layer_id)
            .ok_or_else(|| GraphError::TileLayerNotFound(layer_id.to_string()))?;

        let mut graph = Self::new(layer.width, layer.height, allow_diagonals);
        for (cell, raw) in graph.walkable.iter_mut().zip(&layer.data) {
            *cell = extract_gid(*raw) == 0;
        }
        tracing::debug!(
            "Built {}x{} walkability grid from layer {}",
            layer.width,
            layer.height,
            layer_id
        );
        Ok(graph)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn in_bounds(&self, col: i32, row: i32) -> bool {
        col >= 0 && row >= 0 && (col as u32) < self.width && (row as u32) < self.height
    }

    fn index(&self, col: i32, row: i32) -> Option<usize> {
        self.in_bounds(col, row)
            .then(|| row as usize * self.width as usize + col as usize)
    }

    /// Out-of-bounds writes are ignored
    pub fn set_walkable(&mut self, col: i32, row: i32, walkable: bool) {
        if let Some(cell) = self
            .index(col, row)
            .and_then(|i| self.walkable.get_mut(i))
        {
            *cell = walkable;
        }
    }

    /// `false` outside the grid
    pub fn is_walkable(&self, col: i32, row: i32) -> bool {
        self.index(col, row)
            .and_then(|i| self.walkable.get(i).copied())
            .unwrap_or(false)
    }

    /// Walkable neighbors: cardinals first, then diagonals when enabled
    pub fn neighbors(&self, col: i32, row: i32) -> Vec<GridCoord> {
        let diagonals: &[(i32, i32)] = if self.allow_diagonals { &DIAGONAL } else { &[] };
        CARDINAL
            .iter()
            .chain(diagonals)
            .map(|&(dc, dr)| GridCoord::new(col + dc, row + dr))
            .filter(|c| self.is_walkable(c.col, c.row))
            .collect()
    }
}
