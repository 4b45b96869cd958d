//! Undo/redo history for project edits
//!
//! Every entry captures both the before and after state of its edit, so
//! undoing and redoing never needs to diff the document. Entries address
//! maps, layers and tilesets by id and are applied to the [`Project`] passed
//! in by the caller.
//!
//! Tile painting is recorded through batches:
//!
//! ```rust,ignore
//! history.begin_batch(&map_id, &layer_id);
//! for (col, row) in stroke {
//!     let old = project.set_tile(&map_id, &layer_id, col, row, gid).unwrap_or(0);
//!     history.add_to_batch(col, row, old, gid);
//! }
//! history.end_batch();
//! ```

use isomap_core::{
    insert_property, AnimationFrame, CollisionShape, Layer, Map, Point, Project, Property,
    PropertyBag, TileData,
};
use std::collections::VecDeque;
use thiserror::Error;

/// Default number of entries kept on the undo stack
pub const MAX_HISTORY: usize = 100;

/// Failure to apply an entry because its target no longer exists
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    #[error("Map \"{0}\" not found")]
    MapNotFound(String),

    #[error("Layer \"{layer_id}\" not found in map \"{map_id}\"")]
    LayerNotFound { map_id: String, layer_id: String },

    #[error("Tile layer \"{layer_id}\" not found in map \"{map_id}\"")]
    TileLayerNotFound { map_id: String, layer_id: String },

    #[error("Tileset \"{0}\" not found")]
    TilesetNotFound(String),

    #[error("Layer index {index} out of range for {len} layers")]
    IndexOutOfRange { index: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, HistoryError>;

/// One cell edit inside a tile batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileChange {
    pub col: i32,
    pub row: i32,
    pub old_gid: u32,
    pub new_gid: u32,
}

/// A layer attribute value as captured before or after an edit
#[derive(Debug, Clone, PartialEq)]
pub enum LayerAttribute {
    Name(String),
    Visible(bool),
    Locked(bool),
    Opacity(f64),
    Offset(Point),
    /// Custom property by name; `None` means the property is absent
    Property(String, Option<Property>),
}

impl LayerAttribute {
    fn apply(&self, layer: &mut Layer) {
        match self {
            LayerAttribute::Name(name) => layer.name = name.clone(),
            LayerAttribute::Visible(visible) => layer.visible = *visible,
            LayerAttribute::Locked(locked) => layer.locked = *locked,
            LayerAttribute::Opacity(opacity) => layer.opacity = *opacity,
            LayerAttribute::Offset(offset) => layer.offset = *offset,
            LayerAttribute::Property(name, value) => {
                set_property(&mut layer.properties, name, value.as_ref())
            }
        }
    }
}

/// A reversible edit
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryEntry {
    /// Tile edits on one layer, undone as a unit
    TileBatch {
        map_id: String,
        layer_id: String,
        changes: Vec<TileChange>,
    },
    /// `layer` was inserted at top-level `index`
    LayerAdd {
        map_id: String,
        layer: Layer,
        index: usize,
    },
    /// `layer` was removed from top-level `index`
    LayerRemove {
        map_id: String,
        layer: Layer,
        index: usize,
    },
    LayerAttributeChange {
        map_id: String,
        layer_id: String,
        old: LayerAttribute,
        new: LayerAttribute,
    },
    TilePropertyChange {
        tileset_id: String,
        local_id: u32,
        name: String,
        old: Option<Property>,
        new: Option<Property>,
    },
    /// Empty shape lists clear the tile's collision
    CollisionChange {
        tileset_id: String,
        local_id: u32,
        old: Vec<CollisionShape>,
        new: Vec<CollisionShape>,
    },
    /// Empty frame lists clear the tile's animation
    AnimationChange {
        tileset_id: String,
        local_id: u32,
        old: Vec<AnimationFrame>,
        new: Vec<AnimationFrame>,
    },
    /// Top-level layer moved from `from` to `to`
    LayerReorder {
        map_id: String,
        from: usize,
        to: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Reverse,
}

impl HistoryEntry {
    /// Short label for menus ("Undo Paint Tiles")
    pub fn label(&self) -> &'static str {
        match self {
            HistoryEntry::TileBatch { .. } => "Paint Tiles",
            HistoryEntry::LayerAdd { .. } => "Add Layer",
            HistoryEntry::LayerRemove { .. } => "Remove Layer",
            HistoryEntry::LayerAttributeChange { .. } => "Change Layer",
            HistoryEntry::TilePropertyChange { .. } => "Change Tile Property",
            HistoryEntry::CollisionChange { .. } => "Edit Collision",
            HistoryEntry::AnimationChange { .. } => "Edit Animation",
            HistoryEntry::LayerReorder { .. } => "Reorder Layers",
        }
    }

    fn apply(&self, project: &mut Project, direction: Direction) -> Result<()> {
        let forward = direction == Direction::Forward;
        match self {
            HistoryEntry::TileBatch {
                map_id,
                layer_id,
                changes,
            } => {
                let tiles = find_map(project, map_id)?
                    .tile_layer_mut(layer_id)
                    .ok_or_else(|| HistoryError::TileLayerNotFound {
                        map_id: map_id.clone(),
                        layer_id: layer_id.clone(),
                    })?;
                if forward {
                    for change in changes {
                        tiles.set(change.col, change.row, change.new_gid);
                    }
                } else {
                    for change in changes.iter().rev() {
                        tiles.set(change.col, change.row, change.old_gid);
                    }
                }
            }
            HistoryEntry::LayerAdd {
                map_id,
                layer,
                index,
            } => {
                let map = find_map(project, map_id)?;
                if forward {
                    insert_layer(map, layer, *index)?;
                } else {
                    remove_layer(map, &layer.id);
                }
            }
            HistoryEntry::LayerRemove {
                map_id,
                layer,
                index,
            } => {
                let map = find_map(project, map_id)?;
                if forward {
                    remove_layer(map, &layer.id);
                } else {
                    insert_layer(map, layer, *index)?;
                }
            }
            HistoryEntry::LayerAttributeChange {
                map_id,
                layer_id,
                old,
                new,
            } => {
                let layer = find_map(project, map_id)?
                    .find_layer_mut(layer_id)
                    .ok_or_else(|| HistoryError::LayerNotFound {
                        map_id: map_id.clone(),
                        layer_id: layer_id.clone(),
                    })?;
                let attribute = if forward { new } else { old };
                attribute.apply(layer);
            }
            HistoryEntry::TilePropertyChange {
                tileset_id,
                local_id,
                name,
                old,
                new,
            } => {
                let value = if forward { new } else { old };
                edit_tile(project, tileset_id, *local_id, |tile| {
                    set_property(&mut tile.properties, name, value.as_ref())
                })?;
            }
            HistoryEntry::CollisionChange {
                tileset_id,
                local_id,
                old,
                new,
            } => {
                let shapes = if forward { new } else { old };
                edit_tile(project, tileset_id, *local_id, |tile| {
                    tile.collision = (!shapes.is_empty()).then(|| shapes.clone());
                })?;
            }
            HistoryEntry::AnimationChange {
                tileset_id,
                local_id,
                old,
                new,
            } => {
                let frames = if forward { new } else { old };
                edit_tile(project, tileset_id, *local_id, |tile| {
                    tile.animation = (!frames.is_empty()).then(|| frames.clone());
                })?;
            }
            HistoryEntry::LayerReorder { map_id, from, to } => {
                let map = find_map(project, map_id)?;
                let (from, to) = if forward { (*from, *to) } else { (*to, *from) };
                move_layer(map, from, to)?;
            }
        }
        Ok(())
    }
}

fn find_map<'a>(project: &'a mut Project, map_id: &str) -> Result<&'a mut Map> {
    project
        .map_mut(map_id)
        .ok_or_else(|| HistoryError::MapNotFound(map_id.to_string()))
}

fn insert_layer(map: &mut Map, layer: &Layer, index: usize) -> Result<()> {
    let len = map.layers.len();
    if index > len {
        return Err(HistoryError::IndexOutOfRange { index, len });
    }
    map.layers.insert(index, layer.clone());
    Ok(())
}

fn remove_layer(map: &mut Map, layer_id: &str) {
    if let Some(index) = map.layer_index(layer_id) {
        map.layers.remove(index);
    }
}

fn move_layer(map: &mut Map, from: usize, to: usize) -> Result<()> {
    let len = map.layers.len();
    if from >= len || to >= len {
        return Err(HistoryError::IndexOutOfRange {
            index: from.max(to),
            len,
        });
    }
    let layer = map.layers.remove(from);
    map.layers.insert(to, layer);
    Ok(())
}

/// Apply an edit to tile metadata in every copy of the tileset
fn edit_tile(
    project: &mut Project,
    tileset_id: &str,
    local_id: u32,
    mut edit: impl FnMut(&mut TileData),
) -> Result<()> {
    let updated = project.update_tileset(tileset_id, |tileset| {
        let tile = tileset.tile_mut(local_id);
        edit(tile);
        if tile.is_empty() {
            tileset.tiles.remove(&local_id);
        }
    });
    if updated == 0 {
        return Err(HistoryError::TilesetNotFound(tileset_id.to_string()));
    }
    Ok(())
}

/// Write or delete one property; an emptied bag becomes `None`
fn set_property(bag: &mut Option<PropertyBag>, name: &str, value: Option<&Property>) {
    match value {
        Some(property) => insert_property(bag.get_or_insert_with(PropertyBag::new), property.clone()),
        None => {
            if let Some(properties) = bag {
                properties.remove(name);
                if properties.is_empty() {
                    *bag = None;
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
struct PendingBatch {
    map_id: String,
    layer_id: String,
    changes: Vec<TileChange>,
}

/// Capped undo stack plus redo stack.
///
/// Not thread-safe; one history belongs to one editing session.
#[derive(Debug, Clone)]
pub struct History {
    undo_stack: VecDeque<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,
    batch: Option<PendingBatch>,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self::with_limit(MAX_HISTORY)
    }

    /// History keeping at most `limit` undo entries (at least one)
    pub fn with_limit(limit: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            batch: None,
            limit: limit.max(1),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Entry that `undo` would revert
    pub fn peek_undo(&self) -> Option<&HistoryEntry> {
        self.undo_stack.back()
    }

    pub fn peek_redo(&self) -> Option<&HistoryEntry> {
        self.redo_stack.last()
    }

    /// Record an edit that has already been applied. Clears the redo stack.
    pub fn push(&mut self, entry: HistoryEntry) {
        self.undo_stack.push_back(entry);
        while self.undo_stack.len() > self.limit {
            if let Some(evicted) = self.undo_stack.pop_front() {
                tracing::debug!("History full, dropped oldest entry: {}", evicted.label());
            }
        }
        self.redo_stack.clear();
    }

    /// Start collecting tile edits on one layer, discarding any open batch
    pub fn begin_batch(&mut self, map_id: &str, layer_id: &str) {
        self.batch = Some(PendingBatch {
            map_id: map_id.to_string(),
            layer_id: layer_id.to_string(),
            changes: Vec::new(),
        });
    }

    /// Add a cell edit to the open batch. No-op edits are skipped.
    pub fn add_to_batch(&mut self, col: i32, row: i32, old_gid: u32, new_gid: u32) {
        if old_gid == new_gid {
            return;
        }
        match &mut self.batch {
            Some(batch) => batch.changes.push(TileChange {
                col,
                row,
                old_gid,
                new_gid,
            }),
            None => tracing::trace!("Tile edit at ({}, {}) outside a batch ignored", col, row),
        }
    }

    pub fn in_batch(&self) -> bool {
        self.batch.is_some()
    }

    /// Close the open batch, pushing it if it holds any change.
    /// Returns whether an entry was recorded.
    pub fn end_batch(&mut self) -> bool {
        match self.batch.take() {
            Some(batch) if !batch.changes.is_empty() => {
                self.push(HistoryEntry::TileBatch {
                    map_id: batch.map_id,
                    layer_id: batch.layer_id,
                    changes: batch.changes,
                });
                true
            }
            _ => false,
        }
    }

    /// Revert the latest entry. Returns `Ok(false)` when there is nothing to undo.
    ///
    /// An entry whose target is gone still moves to the redo stack, so older
    /// entries stay reachable; the lookup failure is returned.
    pub fn undo(&mut self, project: &mut Project) -> Result<bool> {
        let Some(entry) = self.undo_stack.pop_back() else {
            return Ok(false);
        };
        let applied = entry.apply(project, Direction::Reverse);
        self.redo_stack.push(entry);
        applied.map(|()| true)
    }

    /// Re-apply the latest undone entry. Returns `Ok(false)` when there is nothing to redo.
    pub fn redo(&mut self, project: &mut Project) -> Result<bool> {
        let Some(entry) = self.redo_stack.pop() else {
            return Ok(false);
        };
        let applied = entry.apply(project, Direction::Forward);
        self.undo_stack.push_back(entry);
        applied.map(|()| true)
    }

    /// Forget everything, including an open batch. The project is untouched.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.batch = None;
    }
}
