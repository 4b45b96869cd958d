//! Moving an actor along a grid path in isometric screen space

use isomap_core::{grid_to_screen, GridCoord, Point, Size};
use std::collections::VecDeque;
use std::fmt;

/// Default speed in tiles per second
pub const DEFAULT_SPEED: f64 = 3.0;

/// Eight-way facing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    #[default]
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    /// Facing for a screen-space movement vector (y grows downward)
    pub fn from_delta(dx: f64, dy: f64) -> Self {
        let degrees = dy.atan2(dx).to_degrees().rem_euclid(360.0);
        match degrees {
            d if !(22.5..337.5).contains(&d) => Direction::East,
            d if d < 67.5 => Direction::SouthEast,
            d if d < 112.5 => Direction::South,
            d if d < 157.5 => Direction::SouthWest,
            d if d < 202.5 => Direction::West,
            d if d < 247.5 => Direction::NorthWest,
            d if d < 292.5 => Direction::North,
            _ => Direction::NorthEast,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::North => "n",
            Direction::NorthEast => "ne",
            Direction::East => "e",
            Direction::SouthEast => "se",
            Direction::South => "s",
            Direction::SouthWest => "sw",
            Direction::West => "w",
            Direction::NorthWest => "nw",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Follows a list of grid waypoints at a fixed speed
#[derive(Debug, Clone, PartialEq)]
pub struct PathFollower {
    /// Last cell reached
    pub grid: GridCoord,
    /// Screen position in pixels
    pub pixel: Point,
    /// Tiles per second
    pub speed: f64,
    pub direction: Direction,
    path: VecDeque<GridCoord>,
}

impl PathFollower {
    /// Place a follower on a cell, snapped to its screen position
    pub fn new(grid: GridCoord, tile_size: Size) -> Self {
        Self {
            grid,
            pixel: cell_screen_point(grid, tile_size),
            speed: DEFAULT_SPEED,
            direction: Direction::default(),
            path: VecDeque::new(),
        }
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    /// Replace the remaining waypoints
    pub fn set_path(&mut self, path: impl IntoIterator<Item = GridCoord>) {
        self.path = path.into_iter().collect();
    }

    pub fn stop(&mut self) {
        self.path.clear();
    }

    pub fn is_moving(&self) -> bool {
        !self.path.is_empty()
    }

    pub fn remaining(&self) -> impl Iterator<Item = &GridCoord> {
        self.path.iter()
    }

    /// Advance by `dt` seconds toward the next waypoint.
    ///
    /// Moves at `speed · (tw + th) / 2` pixels per second. A waypoint within
    /// reach this tick is snapped to and removed.
    pub fn advance(&mut self, dt: f64, tile_size: Size) {
        let Some(&target) = self.path.front() else {
            return;
        };
        let target_px = cell_screen_point(target, tile_size);
        let dx = target_px.x - self.pixel.x;
        let dy = target_px.y - self.pixel.y;
        let distance = dx.hypot(dy);

        let px_per_sec = self.speed * (tile_size.width + tile_size.height) as f64 / 2.0;
        let step = px_per_sec * dt;

        if distance <= step {
            self.pixel = target_px;
            self.grid = target;
            self.path.pop_front();
            if self.path.is_empty() {
                tracing::trace!("Path finished at ({}, {})", target.col, target.row);
            }
        } else {
            self.pixel.x += dx / distance * step;
            self.pixel.y += dy / distance * step;
        }

        if distance > 0.0 {
            self.direction = Direction::from_delta(dx, dy);
        }
    }
}

fn cell_screen_point(cell: GridCoord, tile_size: Size) -> Point {
    let screen = grid_to_screen(
        cell.col as f64,
        cell.row as f64,
        tile_size.width as f64,
        tile_size.height as f64,
    );
    Point::new(screen.sx, screen.sy)
}
