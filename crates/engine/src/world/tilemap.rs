use thiserror::Error;

use super::geometry::{Rect, Vec2};

/// Row-major grid of map symbols. `0` is an empty cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tilemap {
    width: u32,
    height: u32,
    symbols: Vec<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TilemapError {
    #[error("tile count mismatch: expected {expected}, got {actual}")]
    TileCountMismatch { expected: usize, actual: usize },
    #[error("map width must be non-zero")]
    ZeroWidth,
    #[error("{len} symbols do not reshape into rows of width {width}")]
    RaggedRows { len: usize, width: u32 },
}

impl Tilemap {
    pub fn new(width: u32, height: u32, symbols: Vec<u32>) -> Result<Self, TilemapError> {
        let expected = width as usize * height as usize;
        let actual = symbols.len();
        if expected != actual {
            return Err(TilemapError::TileCountMismatch { expected, actual });
        }
        Ok(Self {
            width,
            height,
            symbols,
        })
    }

    /// Reshapes a flat symbol sequence into rows of `width` cells.
    pub fn from_flat(symbols: Vec<u32>, width: u32) -> Result<Self, TilemapError> {
        if width == 0 {
            return Err(TilemapError::ZeroWidth);
        }
        let len = symbols.len();
        if len % width as usize != 0 {
            return Err(TilemapError::RaggedRows { len, width });
        }
        let height = (len / width as usize) as u32;
        Self::new(width, height, symbols)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn index_of(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn symbol_at(&self, x: u32, y: u32) -> Option<u32> {
        self.index_of(x, y)
            .and_then(|index| self.symbols.get(index).copied())
    }

    /// Non-empty cells in row-major order as `(x, y, symbol)`.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (u32, u32, u32)> + '_ {
        let width = self.width as usize;
        self.symbols
            .iter()
            .enumerate()
            .filter(|(_, symbol)| **symbol != 0)
            .map(move |(index, symbol)| ((index % width) as u32, (index / width) as u32, *symbol))
    }
}

/// Maps grid cells onto canvas space: cell `(x, y)` has its top-left corner at
/// `origin + (x * cell_width, y * cell_height)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    pub origin: Vec2,
    pub cell_width: f32,
    pub cell_height: f32,
}

impl GridGeometry {
    pub fn cell_position(&self, x: u32, y: u32) -> Vec2 {
        Vec2::new(
            self.origin.x + x as f32 * self.cell_width,
            self.origin.y + y as f32 * self.cell_height,
        )
    }

    pub fn cell_rect(&self, x: u32, y: u32) -> Rect {
        let position = self.cell_position(x, y);
        Rect::new(position.x, position.y, self.cell_width, self.cell_height)
    }
}
