//! Game-side helpers for isomap maps
//!
//! - [`GridGraph`] - walkability grid built from a tile layer
//! - [`astar`] - shortest paths with 4- or 8-way movement
//! - [`PathFollower`] - moves an actor along a path in isometric screen space
//!
//! # Usage
//!
//! ```rust,ignore
//! use isomap_runtime::{astar, GridGraph, PathFollower};
//!
//! let graph = GridGraph::from_map(&map, &walls_layer_id, true)?;
//! let result = astar(&graph, hero.grid, target);
//! if result.found {
//!     hero.set_path(result.path.into_iter().skip(1));
//! }
//! // every frame
//! hero.advance(dt, map.tile_size);
//! ```

mod astar;
mod grid;
mod movement;

pub use astar::{astar, PathResult};
pub use grid::{GraphError, GridGraph};
pub use movement::{Direction, PathFollower, DEFAULT_SPEED};
