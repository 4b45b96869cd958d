//! Neighbor-driven wang tile selection

use crate::terrain::TerrainMap;
use isomap_core::{GridCoord, WangId, WangPosition, WangSet, WANG_SLOTS};

/// A tile choice produced by painting terrain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerrainChange {
    pub col: i32,
    pub row: i32,
    /// Local tile id inside the wang set's tileset
    pub tile_id: u32,
}

/// The cell itself followed by its in-bounds neighbors in N..NW order
pub fn get_affected_cells(col: i32, row: i32, width: u32, height: u32) -> Vec<GridCoord> {
    let in_bounds =
        |c: i32, r: i32| c >= 0 && r >= 0 && (c as u32) < width && (r as u32) < height;

    let mut cells = Vec::with_capacity(WANG_SLOTS + 1);
    cells.push(GridCoord::new(col, row));
    for position in WangPosition::ALL {
        let (dc, dr) = position.offset();
        if in_bounds(col + dc, row + dr) {
            cells.push(GridCoord::new(col + dc, row + dr));
        }
    }
    cells
}

/// Build the wang id a cell should have for `color`.
///
/// Each slot takes `color` when the neighbor in that direction holds it.
/// When the cell itself holds `color`, every slot starts at `color` and only
/// in-bounds neighbors with a different color clear theirs, so the map edge
/// counts as matching. Off-map neighbors of a cell that does not hold the
/// color count as not matching.
pub fn build_wang_id_for_cell(col: i32, row: i32, color: u32, terrain: &TerrainMap) -> WangId {
    let mut wang_id = [0; WANG_SLOTS];

    for position in WangPosition::ALL {
        let (dc, dr) = position.offset();
        if terrain.get(col + dc, row + dr) == Some(color) {
            wang_id[position.index()] = color;
        }
    }

    if terrain.get(col, row) == Some(color) {
        wang_id = [color; WANG_SLOTS];
        for position in WangPosition::ALL {
            let (dc, dr) = position.offset();
            match terrain.get(col + dc, row + dr) {
                Some(neighbor) if neighbor != color => wang_id[position.index()] = 0,
                _ => {}
            }
        }
    }

    wang_id
}

/// Find the tile whose relevant slots all equal `wang_id`'s.
///
/// The slots compared depend on the set type. Among full matches the first
/// definition with the most matching slots wins.
pub fn resolve_wang_tile_at(wang_id: &WangId, wang_set: &WangSet) -> Option<u32> {
    let relevant = wang_set.ty.relevant_slots();
    let mut best: Option<(usize, u32)> = None;

    for tile in &wang_set.wang_tiles {
        let score = relevant
            .iter()
            .filter(|&&slot| tile.wang_id[slot] == wang_id[slot])
            .count();
        if score != relevant.len() {
            continue;
        }
        if best.map_or(true, |(best_score, _)| score > best_score) {
            best = Some((score, tile.tile_id));
        }
    }

    best.map(|(_, tile_id)| tile_id)
}

/// Paint `color` at a cell and pick tiles for it and its neighbors.
///
/// Only the painted cell's terrain color changes. Cells without a matching
/// wang tile are left out of the result.
pub fn paint_terrain(
    col: i32,
    row: i32,
    color: u32,
    wang_set: &WangSet,
    terrain: &mut TerrainMap,
) -> Vec<TerrainChange> {
    if !terrain.set(col, row, color) {
        tracing::trace!("Terrain paint outside the grid at ({}, {})", col, row);
        return Vec::new();
    }

    get_affected_cells(col, row, terrain.width(), terrain.height())
        .into_iter()
        .filter_map(|cell| {
            let wang_id = build_wang_id_for_cell(cell.col, cell.row, color, terrain);
            resolve_wang_tile_at(&wang_id, wang_set).map(|tile_id| TerrainChange {
                col: cell.col,
                row: cell.row,
                tile_id,
            })
        })
        .collect()
}
