//! Project container bundling maps and their shared tilesets

use crate::map::Map;
use crate::tileset::Tileset;

/// Current project schema version
pub const PROJECT_VERSION: u32 = 1;

/// A project: a set of maps and the tilesets they draw from.
///
/// `tilesets` is the authoritative list. Maps hold their own bound copies in
/// [`Map::tilesets`]; edits that go through [`Project::update_tileset`] keep
/// every copy with the same id in sync.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub version: u32,
    pub name: String,
    pub maps: Vec<Map>,
    pub tilesets: Vec<Tileset>,
}

impl Default for Project {
    fn default() -> Self {
        Self::new("Untitled Project")
    }
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: PROJECT_VERSION,
            name: name.into(),
            maps: Vec::new(),
            tilesets: Vec::new(),
        }
    }

    /// Get a map by id
    pub fn map(&self, id: &str) -> Option<&Map> {
        self.maps.iter().find(|m| m.id == id)
    }

    /// Get a mutable map by id
    pub fn map_mut(&mut self, id: &str) -> Option<&mut Map> {
        self.maps.iter_mut().find(|m| m.id == id)
    }

    /// Get a tileset by id
    pub fn tileset(&self, id: &str) -> Option<&Tileset> {
        self.tilesets.iter().find(|t| t.id == id)
    }

    /// Whether any copy of the tileset exists in the project or a map binding
    pub fn has_tileset(&self, id: &str) -> bool {
        self.tileset(id).is_some() || self.maps.iter().any(|m| m.tileset_ref(id).is_some())
    }

    /// Apply an edit to every copy of a tileset. Returns the number of copies updated.
    pub fn update_tileset(&mut self, id: &str, mut edit: impl FnMut(&mut Tileset)) -> usize {
        let mut updated = 0;
        for tileset in self.tilesets.iter_mut().filter(|t| t.id == id) {
            edit(tileset);
            updated += 1;
        }
        for map in &mut self.maps {
            for binding in map.tilesets.iter_mut().filter(|r| r.tileset.id == id) {
                edit(&mut binding.tileset);
                updated += 1;
            }
        }
        updated
    }

    /// Raw cell value of a tile layer
    pub fn tile(&self, map_id: &str, layer_id: &str, col: i32, row: i32) -> Option<u32> {
        self.map(map_id)?.tile_layer(layer_id)?.get(col, row)
    }

    /// Set a cell of a tile layer, returning the previous value
    pub fn set_tile(
        &mut self,
        map_id: &str,
        layer_id: &str,
        col: i32,
        row: i32,
        value: u32,
    ) -> Option<u32> {
        self.map_mut(map_id)?
            .tile_layer_mut(layer_id)?
            .set(col, row, value)
    }
}
