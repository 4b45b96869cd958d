//! Wang tile terrain auto-tiling for isomap
//!
//! Painting a terrain color updates a [`TerrainMap`] and asks the wang set
//! which tile best fits each affected cell given the colors around it.

mod terrain;
mod wang;

pub use terrain::TerrainMap;
pub use wang::{
    build_wang_id_for_cell, get_affected_cells, paint_terrain, resolve_wang_tile_at,
    TerrainChange,
};
