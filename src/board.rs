//! Game board representation, occupancy queries and line clearing
//!
//! The grid carries a permanent one-cell border on every side. Coordinates are
//! `(x, y)` with `y` increasing downward; the playable interior is
//! `[1, width-2] x [1, height-2]`.

use crate::error::ConfigError;
use crate::tetromino::PieceType;

/// Largest accepted width or height, border included
pub const MAX_DIMENSION: usize = 1024;

/// A cell on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Border,
    Filled(PieceType),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn is_filled(&self) -> bool {
        matches!(self, Cell::Filled(_))
    }
}

/// The game board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    /// Row-major cells (y * width + x), border included
    cells: Vec<Cell>,
}

impl Board {
    /// Create a bordered board; `width`/`height` include the border
    pub fn new(width: usize, height: usize) -> Result<Self, ConfigError> {
        if !(3..=MAX_DIMENSION).contains(&width) || !(3..=MAX_DIMENSION).contains(&height) {
            return Err(ConfigError::InvalidDimensions { width, height });
        }
        let mut cells = vec![Cell::Empty; width * height];
        for y in 0..height {
            for x in 0..width {
                if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
                    cells[y * width + x] = Cell::Border;
                }
            }
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn interior_width(&self) -> usize {
        self.width - 2
    }

    pub fn interior_height(&self) -> usize {
        self.height - 2
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }

    fn is_interior(&self, x: i32, y: i32) -> bool {
        x >= 1 && y >= 1 && (x as usize) < self.width - 1 && (y as usize) < self.height - 1
    }

    fn interior_row(&self, row: usize) -> Option<std::ops::Range<usize>> {
        if row == 0 || row >= self.height - 1 {
            return None;
        }
        let start = row * self.width + 1;
        Some(start..start + self.interior_width())
    }

    /// Get the cell at `(x, y)`; None if out of range
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        self.index(x, y).map(|i| self.cells[i])
    }

    /// True for out-of-range, border and locked cells
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        !matches!(self.get(x, y), Some(Cell::Empty))
    }

    /// Mark each given interior cell with `piece_type`
    ///
    /// Callers pass a placement already checked by the validator. Cells outside
    /// the interior are ignored so the border can never be overwritten.
    pub fn lock_cells(&mut self, cells: &[(i32, i32)], piece_type: PieceType) {
        for &(x, y) in cells {
            if !self.is_interior(x, y) {
                continue;
            }
            if let Some(i) = self.index(x, y) {
                self.cells[i] = Cell::Filled(piece_type);
            }
        }
    }

    /// True iff every interior column of `row` is non-empty
    pub fn row_is_filled(&self, row: usize) -> bool {
        match self.interior_row(row) {
            Some(range) => self.cells[range].iter().all(|c| !c.is_empty()),
            None => false,
        }
    }

    /// Empty every interior cell of `row`
    pub fn clear_row(&mut self, row: usize) {
        if let Some(range) = self.interior_row(row) {
            self.cells[range].fill(Cell::Empty);
        }
    }

    /// Shift surviving rows down over the cleared ones
    ///
    /// Each interior row above a cleared row moves down by the number of
    /// cleared rows strictly below it. Rows are visited bottom-up so a row is
    /// always read before anything is written over it.
    pub fn compact(&mut self, cleared_rows: &[usize]) {
        let mut cleared: Vec<usize> = cleared_rows
            .iter()
            .copied()
            .filter(|&r| self.interior_row(r).is_some())
            .collect();
        cleared.sort_unstable();
        cleared.dedup();
        if cleared.is_empty() {
            return;
        }
        for &row in &cleared {
            self.clear_row(row);
        }

        let inner = self.interior_width();
        for row in (1..self.height - 1).rev() {
            if cleared.contains(&row) {
                continue;
            }
            let shift = cleared.iter().filter(|&&c| c > row).count();
            if shift == 0 {
                continue;
            }
            let src = row * self.width + 1;
            let dst = (row + shift) * self.width + 1;
            self.cells.copy_within(src..src + inner, dst);
            self.cells[src..src + inner].fill(Cell::Empty);
        }
    }

    /// Number of locked interior cells
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_filled()).count()
    }

    /// Row-major view of the whole grid, border included
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width)
    }

    /// Check if the interior holds no locked cells
    pub fn is_empty(&self) -> bool {
        self.occupied_count() == 0
    }
}
