//! Per-cell terrain colors backing a painted tile layer

use isomap_core::GridCoord;

/// Dense row-major grid of wang color indices (0 = no terrain)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerrainMap {
    width: u32,
    height: u32,
    cells: Vec<u32>,
}

impl TerrainMap {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![0; width as usize * height as usize],
        }
    }

    /// Wrap existing colors; `None` when the length does not match the size
    pub fn from_cells(width: u32, height: u32, cells: Vec<u32>) -> Option<Self> {
        (cells.len() == width as usize * height as usize).then_some(Self {
            width,
            height,
            cells,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn cells(&self) -> &[u32] {
        &self.cells
    }

    pub fn in_bounds(&self, col: i32, row: i32) -> bool {
        col >= 0 && row >= 0 && (col as u32) < self.width && (row as u32) < self.height
    }

    /// Color at a cell, `None` outside the grid
    pub fn get(&self, col: i32, row: i32) -> Option<u32> {
        if !self.in_bounds(col, row) {
            return None;
        }
        self.cells
            .get(row as usize * self.width as usize + col as usize)
            .copied()
    }

    /// Set a cell's color; returns false outside the grid
    pub fn set(&mut self, col: i32, row: i32, color: u32) -> bool {
        if !self.in_bounds(col, row) {
            return false;
        }
        let index = row as usize * self.width as usize + col as usize;
        match self.cells.get_mut(index) {
            Some(cell) => {
                *cell = color;
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, coord: GridCoord) -> bool {
        self.in_bounds(coord.col, coord.row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set_bounds() {
        let mut map = TerrainMap::new(3, 2);
        assert!(map.set(2, 1, 4));
        assert_eq!(map.get(2, 1), Some(4));
        assert_eq!(map.cells()[5], 4);
        assert!(!map.set(3, 0, 1));
        assert_eq!(map.get(-1, 0), None);
        assert!(!map.contains(GridCoord::new(0, 2)));
    }

    #[test]
    fn test_from_cells_checks_length() {
        assert!(TerrainMap::from_cells(2, 2, vec![0; 4]).is_some());
        assert!(TerrainMap::from_cells(2, 2, vec![0; 3]).is_none());
    }
}
