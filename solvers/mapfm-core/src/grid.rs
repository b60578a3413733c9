//! Immutable rectangular grid with obstacles.

use crate::coordinate::{Coordinate, Direction};

/// A single cell in a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    /// Agent can traverse this cell.
    Passable,
    /// Obstacle; agent cannot enter.
    Blocked,
}

/// A rectangular grid. Immutable for the lifetime of a solve.
#[derive(Debug, Clone)]
pub struct Grid {
    width: u32,
    height: u32,
    /// Row-major; index = y * width + x
    tiles: Vec<Tile>,
}

impl Grid {
    /// Create from raw bytes (row-major, nonzero = passable, 0 = blocked).
    /// Returns `None` if `data.len() != width * height`.
    pub fn from_bytes(width: u32, height: u32, data: &[u8]) -> Option<Self> {
        if data.len() != (width as usize) * (height as usize) {
            return None;
        }
        let tiles = data
            .iter()
            .map(|&b| if b != 0 { Tile::Passable } else { Tile::Blocked })
            .collect();
        Some(Self { width, height, tiles })
    }

    /// A fully open grid with no obstacles.
    pub fn open(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            tiles: vec![Tile::Passable; (width as usize) * (height as usize)],
        }
    }

    /// Width of the grid (x dimension).
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height of the grid (y dimension).
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get tile at (x, y). Returns `None` if out of bounds.
    pub fn get(&self, x: u32, y: u32) -> Option<Tile> {
        if x < self.width && y < self.height {
            Some(self.tiles[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    /// Check if cell (x, y) is traversable (returns false for out-of-bounds).
    pub fn is_traversable(&self, x: u32, y: u32) -> bool {
        self.get(x, y) == Some(Tile::Passable)
    }

    /// The neighbor of `coord` one step in `direction`, if it is in bounds
    /// and traversable.
    pub fn step(&self, coord: Coordinate, direction: Direction) -> Option<Coordinate> {
        let (dx, dy) = direction.offset();
        let nx = coord.x as i64 + dx as i64;
        let ny = coord.y as i64 + dy as i64;
        if nx < 0 || ny < 0 {
            return None;
        }
        let (nx, ny) = (nx as u32, ny as u32);
        if self.is_traversable(nx, ny) {
            Some(Coordinate::new(nx, ny))
        } else {
            None
        }
    }
}
