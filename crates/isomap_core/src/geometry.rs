//! Geometry primitives and isometric projection helpers

use serde::{Deserialize, Serialize};

/// A 2D point in pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

/// Integer width/height pair (map size in tiles, tile size in pixels, image size)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of cells in a grid of this size
    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Check if two rectangles overlap
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Check if `inner` lies entirely within this rectangle
    pub fn contains(&self, inner: &Rect) -> bool {
        self.x <= inner.x
            && self.y <= inner.y
            && self.right() >= inner.right()
            && self.bottom() >= inner.bottom()
    }

    /// Half-open containment: `[x, x+width) x [y, y+height)`
    pub fn contains_point(&self, px: f64, py: f64) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    /// Smallest rectangle containing both rectangles
    pub fn expand_to_contain(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, right - x, bottom - y)
    }
}

/// Integer cell coordinate on a map grid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    pub col: i32,
    pub row: i32,
}

impl GridCoord {
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }
}

/// Pixel coordinate in isometric screen space
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenCoord {
    pub sx: f64,
    pub sy: f64,
}

/// Convert grid coordinates to the screen position of the tile's top diamond point
pub fn grid_to_screen(col: f64, row: f64, tile_width: f64, tile_height: f64) -> ScreenCoord {
    ScreenCoord {
        sx: (col - row) * (tile_width / 2.0),
        sy: (col + row) * (tile_height / 2.0),
    }
}

/// Convert a screen position back to fractional grid coordinates.
///
/// Returns `(col, row)`; inverse of [`grid_to_screen`].
pub fn screen_to_grid(sx: f64, sy: f64, tile_width: f64, tile_height: f64) -> (f64, f64) {
    let half_w = tile_width / 2.0;
    let half_h = tile_height / 2.0;
    let col = (sx / half_w + sy / half_h) / 2.0;
    let row = (sy / half_h - sx / half_w) / 2.0;
    (col, row)
}

/// Screen position to the grid cell that contains it
pub fn snap_to_grid(sx: f64, sy: f64, tile_width: f64, tile_height: f64) -> GridCoord {
    let (col, row) = screen_to_grid(sx, sy, tile_width, tile_height);
    GridCoord::new(col.floor() as i32, row.floor() as i32)
}
