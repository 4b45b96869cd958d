//! Editing tools that mutate tile layers and record history

use crate::history::History;
use isomap_autotile::{paint_terrain, TerrainMap};
use isomap_core::{GridCoord, Project, TileLayer};
use std::collections::{HashMap, VecDeque};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    #[error("Map \"{0}\" not found")]
    MapNotFound(String),

    #[error("Tile layer \"{0}\" not found")]
    TileLayerNotFound(String),

    #[error("Tileset \"{0}\" is not bound to the map")]
    TilesetNotBound(String),

    #[error("Tileset \"{tileset_id}\" has no wang set {index}")]
    WangSetNotFound { tileset_id: String, index: usize },
}

fn tile_layer_mut<'a>(
    project: &'a mut Project,
    map_id: &str,
    layer_id: &str,
) -> Result<&'a mut TileLayer, ToolError> {
    project
        .map_mut(map_id)
        .ok_or_else(|| ToolError::MapNotFound(map_id.to_string()))?
        .tile_layer_mut(layer_id)
        .ok_or_else(|| ToolError::TileLayerNotFound(layer_id.to_string()))
}

/// Bucket fill: replace the 4-connected region sharing the start cell's raw
/// value with `gid`, recorded as one history entry.
///
/// Returns the number of cells changed. Filling outside the layer or with the
/// value already under the cursor changes nothing.
pub fn flood_fill(
    project: &mut Project,
    history: &mut History,
    map_id: &str,
    layer_id: &str,
    start: GridCoord,
    gid: u32,
) -> Result<usize, ToolError> {
    let layer = tile_layer_mut(project, map_id, layer_id)?;
    let Some(target) = layer.get(start.col, start.row) else {
        return Ok(0);
    };
    if target == gid {
        return Ok(0);
    }

    let mut visited = vec![false; layer.data.len()];
    let mut queue = VecDeque::from([start]);
    history.begin_batch(map_id, layer_id);
    let mut filled = 0;

    while let Some(cell) = queue.pop_front() {
        let Some(index) = layer.index(cell.col, cell.row) else {
            continue;
        };
        let (Some(seen), Some(value)) = (visited.get_mut(index), layer.data.get_mut(index))
        else {
            continue;
        };
        if *seen || *value != target {
            continue;
        }
        *seen = true;
        *value = gid;
        history.add_to_batch(cell.col, cell.row, target, gid);
        filled += 1;

        queue.extend([
            GridCoord::new(cell.col - 1, cell.row),
            GridCoord::new(cell.col + 1, cell.row),
            GridCoord::new(cell.col, cell.row - 1),
            GridCoord::new(cell.col, cell.row + 1),
        ]);
    }

    history.end_batch();
    tracing::debug!("Flood fill set {} cells to {}", filled, gid);
    Ok(filled)
}

/// What the terrain tool paints with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerrainBrush {
    /// Tileset holding the wang set, bound to the map being painted
    pub tileset_id: String,
    /// Index into the tileset's wang sets
    pub wang_set: usize,
    /// 1-based wang color index
    pub color: u32,
}

/// Terrain tool state: one terrain color map per painted layer.
///
/// A stroke spans `paint` calls until `end_stroke` and is undone as one step.
#[derive(Debug, Default)]
pub struct TerrainPainter {
    terrain: HashMap<(String, String), TerrainMap>,
}

impl TerrainPainter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Terrain colors painted so far on a layer
    pub fn terrain_map(&self, map_id: &str, layer_id: &str) -> Option<&TerrainMap> {
        self.terrain
            .get(&(map_id.to_string(), layer_id.to_string()))
    }

    /// Forget painted terrain, e.g. after the layer was resized or cleared
    pub fn reset(&mut self) {
        self.terrain.clear();
    }

    /// Paint one cell and update the tiles around it.
    ///
    /// Opens a history batch if none is open. Returns the number of cells
    /// whose tile changed.
    pub fn paint(
        &mut self,
        project: &mut Project,
        history: &mut History,
        map_id: &str,
        layer_id: &str,
        brush: &TerrainBrush,
        cell: GridCoord,
    ) -> Result<usize, ToolError> {
        let map = project
            .map(map_id)
            .ok_or_else(|| ToolError::MapNotFound(map_id.to_string()))?;
        let binding = map
            .tileset_ref(&brush.tileset_id)
            .ok_or_else(|| ToolError::TilesetNotBound(brush.tileset_id.clone()))?;
        let wang_set = binding
            .tileset
            .wang_sets
            .get(brush.wang_set)
            .ok_or_else(|| ToolError::WangSetNotFound {
                tileset_id: brush.tileset_id.clone(),
                index: brush.wang_set,
            })?;
        let first_gid = binding.first_gid;
        let layer = map
            .tile_layer(layer_id)
            .ok_or_else(|| ToolError::TileLayerNotFound(layer_id.to_string()))?;
        let (width, height) = (layer.width, layer.height);

        let terrain = self
            .terrain
            .entry((map_id.to_string(), layer_id.to_string()))
            .or_insert_with(|| TerrainMap::new(width, height));
        if terrain.width() != width || terrain.height() != height {
            *terrain = TerrainMap::new(width, height);
        }
        if !terrain.contains(cell) {
            return Ok(0);
        }

        let changes = paint_terrain(cell.col, cell.row, brush.color, wang_set, terrain);

        if !history.in_batch() {
            history.begin_batch(map_id, layer_id);
        }
        let layer = tile_layer_mut(project, map_id, layer_id)?;
        let mut changed = 0;
        for change in changes {
            let Some(new_gid) = first_gid.checked_add(change.tile_id) else {
                continue;
            };
            if let Some(old_gid) = layer.set(change.col, change.row, new_gid) {
                if old_gid != new_gid {
                    history.add_to_batch(change.col, change.row, old_gid, new_gid);
                    changed += 1;
                }
            }
        }
        Ok(changed)
    }

    /// Close the stroke's history batch. Returns whether anything was recorded.
    pub fn end_stroke(&mut self, history: &mut History) -> bool {
        history.end_batch()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use isomap_core::{
        IdGenerator, Map, MapOptions, Size, Tileset, TilesetOptions, WangSet, WangSetType,
    };
    use pretty_assertions::assert_eq;

    fn setup(cols: u32, rows: u32) -> (Project, String, String) {
        let mut ids = IdGenerator::with_session("t");
        let map = Map::new(
            &mut ids,
            MapOptions {
                name: "tools".into(),
                map_size: Size::new(cols, rows),
                tile_size: Size::new(64, 32),
            },
        )
        .unwrap();
        let (map_id, layer_id) = (map.id.clone(), map.layers[0].id.clone());
        let mut project = Project::new("Tools");
        project.maps.push(map);
        (project, map_id, layer_id)
    }

    fn layer_data(project: &Project, map_id: &str, layer_id: &str) -> Vec<u32> {
        project.map(map_id).unwrap().tile_layer(layer_id).unwrap().data.clone()
    }

    #[test]
    fn test_flood_fill_whole_layer() {
        let (mut project, map_id, layer_id) = setup(3, 3);
        let mut history = History::new();
        let filled =
            flood_fill(&mut project, &mut history, &map_id, &layer_id, GridCoord::new(1, 1), 7)
                .unwrap();
        assert_eq!(filled, 9);
        assert_eq!(layer_data(&project, &map_id, &layer_id), vec![7; 9]);
        assert_eq!(history.undo_len(), 1);

        history.undo(&mut project).unwrap();
        assert_eq!(layer_data(&project, &map_id, &layer_id), vec![0; 9]);
    }

    #[test]
    fn test_flood_fill_short_layer_data() {
        let (mut project, map_id, layer_id) = setup(4, 4);
        let map = project.map_mut(&map_id).unwrap();
        map.tile_layer_mut(&layer_id).unwrap().data.truncate(3);
        let mut history = History::new();

        let filled =
            flood_fill(&mut project, &mut history, &map_id, &layer_id, GridCoord::new(0, 0), 7)
                .unwrap();
        assert_eq!(filled, 3);
        assert_eq!(layer_data(&project, &map_id, &layer_id), vec![7; 3]);
    }

    #[test]
    fn test_flood_fill_stops_at_boundary() {
        let (mut project, map_id, layer_id) = setup(3, 3);
        // Vertical wall in the middle column
        for row in 0..3 {
            project.set_tile(&map_id, &layer_id, 1, row, 5);
        }
        let mut history = History::new();
        let filled =
            flood_fill(&mut project, &mut history, &map_id, &layer_id, GridCoord::new(0, 0), 2)
                .unwrap();
        assert_eq!(filled, 3);
        assert_eq!(
            layer_data(&project, &map_id, &layer_id),
            vec![2, 5, 0, 2, 5, 0, 2, 5, 0]
        );
    }

    #[test]
    fn test_flood_fill_noops() {
        let (mut project, map_id, layer_id) = setup(2, 2);
        let mut history = History::new();
        let outside =
            flood_fill(&mut project, &mut history, &map_id, &layer_id, GridCoord::new(5, 0), 3);
        assert_eq!(outside, Ok(0));
        let same =
            flood_fill(&mut project, &mut history, &map_id, &layer_id, GridCoord::new(0, 0), 0);
        assert_eq!(same, Ok(0));
        assert!(!history.can_undo());
    }

    #[test]
    fn test_flood_fill_missing_layer() {
        let (mut project, map_id, _) = setup(2, 2);
        let mut history = History::new();
        let err = flood_fill(&mut project, &mut history, &map_id, "nope", GridCoord::new(0, 0), 1)
            .unwrap_err();
        assert_eq!(err.to_string(), "Tile layer \"nope\" not found");
    }

    fn with_terrain_tileset(project: &mut Project, map_id: &str) -> String {
        let mut ids = IdGenerator::with_session("ts");
        let mut tileset = Tileset::new(
            &mut ids,
            TilesetOptions {
                name: "grass".into(),
                image_source: "grass.png".into(),
                image_size: Size::new(256, 128),
                tile_size: Size::new(64, 32),
                ..Default::default()
            },
        );
        tileset
            .wang_sets
            .push(WangSet::new("ground", WangSetType::Corner).with_tile(4, [1; 8]));
        let id = tileset.id.clone();
        let map = project.map_mut(map_id).unwrap();
        // Occupy GIDs 1..=16 with another tileset so the offset is visible
        let filler = Tileset::new(&mut ids, TilesetOptions {
            name: "filler".into(),
            image_source: "filler.png".into(),
            image_size: Size::new(256, 128),
            tile_size: Size::new(64, 32),
            ..Default::default()
        });
        map.add_tileset(filler);
        map.add_tileset(tileset);
        id
    }

    #[test]
    fn test_terrain_stroke_is_one_entry() {
        let (mut project, map_id, layer_id) = setup(3, 3);
        let tileset_id = with_terrain_tileset(&mut project, &map_id);
        let brush = TerrainBrush {
            tileset_id,
            wang_set: 0,
            color: 1,
        };
        let mut painter = TerrainPainter::new();
        let mut history = History::new();

        for row in 0..3 {
            for col in 0..3 {
                painter
                    .paint(&mut project, &mut history, &map_id, &layer_id, &brush, GridCoord::new(col, row))
                    .unwrap();
            }
        }
        assert!(painter.end_stroke(&mut history));

        // Every cell ends up fully surrounded, so every tile is local 4 at firstgid 17
        assert_eq!(layer_data(&project, &map_id, &layer_id), vec![21; 9]);
        assert_eq!(history.undo_len(), 1);
        assert_eq!(
            painter.terrain_map(&map_id, &layer_id).unwrap().cells(),
            &[1; 9]
        );

        history.undo(&mut project).unwrap();
        assert_eq!(layer_data(&project, &map_id, &layer_id), vec![0; 9]);
    }

    #[test]
    fn test_terrain_errors() {
        let (mut project, map_id, layer_id) = setup(2, 2);
        let mut painter = TerrainPainter::new();
        let mut history = History::new();
        let unbound = TerrainBrush {
            tileset_id: "missing".into(),
            wang_set: 0,
            color: 1,
        };
        let err = painter
            .paint(&mut project, &mut history, &map_id, &layer_id, &unbound, GridCoord::new(0, 0))
            .unwrap_err();
        assert_eq!(err, ToolError::TilesetNotBound("missing".into()));

        let tileset_id = with_terrain_tileset(&mut project, &map_id);
        let no_set = TerrainBrush {
            tileset_id: tileset_id.clone(),
            wang_set: 3,
            color: 1,
        };
        let err = painter
            .paint(&mut project, &mut history, &map_id, &layer_id, &no_set, GridCoord::new(0, 0))
            .unwrap_err();
        assert_eq!(err, ToolError::WangSetNotFound { tileset_id, index: 3 });
        assert!(!history.in_batch());
    }
}
