//! Active falling piece

use crate::tetromino::{PieceType, RotationDirection};

/// A falling piece: type, rotation index and top-left anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    /// The type of tetromino
    pub piece_type: PieceType,
    /// Index into the type's rotation table, always kept reduced
    pub rotation: usize,
    /// Anchor: top-left corner of the occupancy matrix, in board cells
    pub x: i32,
    pub y: i32,
}

impl Piece {
    /// Create a piece in its spawn orientation at the given anchor
    pub fn new(piece_type: PieceType, x: i32, y: i32) -> Self {
        Self {
            piece_type,
            rotation: 0,
            x,
            y,
        }
    }

    /// Get the absolute positions of all 4 blocks
    pub fn block_positions(&self) -> [(i32, i32); 4] {
        self.piece_type
            .cells(self.rotation)
            .map(|(dx, dy)| (self.x + dx, self.y + dy))
    }

    /// This piece shifted by `(dx, dy)`
    pub fn translated(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// This piece turned once in `direction`, same anchor
    pub fn rotated(&self, direction: RotationDirection) -> Self {
        Self {
            rotation: self.piece_type.rotate_index(self.rotation, direction),
            ..*self
        }
    }

    /// Rows covered by this piece, top to bottom, without duplicates
    pub fn rows(&self) -> Vec<usize> {
        let mut rows: Vec<usize> = self
            .block_positions()
            .iter()
            .filter(|(_, y)| *y >= 0)
            .map(|&(_, y)| y as usize)
            .collect();
        rows.sort_unstable();
        rows.dedup();
        rows
    }
}
