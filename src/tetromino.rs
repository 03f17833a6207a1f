//! Tetromino catalog
//!
//! Each of the 7 piece types owns an ordered list of rotation states. A state
//! is an occupancy matrix read top-to-bottom, left-to-right; its top-left
//! corner is the piece anchor. Rotating walks the list modulo its length.

use ratatui::style::Color;

/// One rotation state: rows of 0 (empty) / 1 (filled) cells
pub type Shape = &'static [&'static [u8]];

/// The 7 tetromino types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceType {
    I, // Cyan - long bar
    J, // Blue
    L, // Orange
    O, // Yellow - square
    S, // Green
    T, // Purple
    Z, // Red
}

// The I box is 4x4 so the bar pivots inside it instead of around the anchor.
const I_STATES: &[Shape] = &[
    &[&[0, 0, 0, 0], &[1, 1, 1, 1], &[0, 0, 0, 0], &[0, 0, 0, 0]],
    &[&[0, 0, 1, 0], &[0, 0, 1, 0], &[0, 0, 1, 0], &[0, 0, 1, 0]],
];

const J_STATES: &[Shape] = &[
    &[&[1, 0, 0], &[1, 1, 1]],
    &[&[1, 1], &[1, 0], &[1, 0]],
    &[&[1, 1, 1], &[0, 0, 1]],
    &[&[0, 1], &[0, 1], &[1, 1]],
];

const L_STATES: &[Shape] = &[
    &[&[0, 0, 1], &[1, 1, 1]],
    &[&[1, 0], &[1, 0], &[1, 1]],
    &[&[1, 1, 1], &[1, 0, 0]],
    &[&[1, 1], &[0, 1], &[0, 1]],
];

const O_STATES: &[Shape] = &[&[&[1, 1], &[1, 1]]];

const S_STATES: &[Shape] = &[
    &[&[0, 1, 1], &[1, 1, 0]],
    &[&[1, 0], &[1, 1], &[0, 1]],
];

const T_STATES: &[Shape] = &[
    &[&[0, 1, 0], &[1, 1, 1]],
    &[&[1, 0], &[1, 1], &[1, 0]],
    &[&[1, 1, 1], &[0, 1, 0]],
    &[&[0, 1], &[1, 1], &[0, 1]],
];

const Z_STATES: &[Shape] = &[
    &[&[1, 1, 0], &[0, 1, 1]],
    &[&[0, 1], &[1, 1], &[1, 0]],
];

impl PieceType {
    /// Get the color for this tetromino
    pub fn color(&self) -> Color {
        match self {
            PieceType::I => Color::Cyan,
            PieceType::J => Color::Blue,
            PieceType::L => Color::Rgb(255, 165, 0), // Orange
            PieceType::O => Color::Yellow,
            PieceType::S => Color::Green,
            PieceType::T => Color::Magenta,
            PieceType::Z => Color::Red,
        }
    }

    /// Get all tetromino types, in catalog order
    pub fn all() -> [PieceType; 7] {
        [
            PieceType::I,
            PieceType::J,
            PieceType::L,
            PieceType::O,
            PieceType::S,
            PieceType::T,
            PieceType::Z,
        ]
    }

    /// Ordered rotation states for this type
    pub fn rotations(&self) -> &'static [Shape] {
        match self {
            PieceType::I => I_STATES,
            PieceType::J => J_STATES,
            PieceType::L => L_STATES,
            PieceType::O => O_STATES,
            PieceType::S => S_STATES,
            PieceType::T => T_STATES,
            PieceType::Z => Z_STATES,
        }
    }

    pub fn rotation_count(&self) -> usize {
        self.rotations().len()
    }

    /// Occupancy matrix for a rotation index (wrapped)
    pub fn shape(&self, rotation: usize) -> Shape {
        let states = self.rotations();
        states[rotation % states.len()]
    }

    /// Filled-cell offsets `(dx, dy)` from the anchor for a rotation index
    pub fn cells(&self, rotation: usize) -> [(i32, i32); 4] {
        let mut out = [(0, 0); 4];
        let filled = self.shape(rotation).iter().enumerate().flat_map(|(dy, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, v)| **v != 0)
                .map(move |(dx, _)| (dx as i32, dy as i32))
        });
        for (slot, cell) in out.iter_mut().zip(filled) {
            *slot = cell;
        }
        out
    }

    /// Rotation index reached by turning once in `direction`
    pub fn rotate_index(&self, rotation: usize, direction: RotationDirection) -> usize {
        let len = self.rotation_count();
        match direction {
            RotationDirection::Clockwise => (rotation + 1) % len,
            RotationDirection::CounterClockwise => (rotation + len - 1) % len,
        }
    }
}

/// Direction for rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationDirection {
    Clockwise,
    CounterClockwise,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_count(shape: Shape) -> usize {
        shape.iter().flat_map(|row| row.iter()).filter(|&&v| v != 0).count()
    }

    #[test]
    fn test_every_rotation_has_four_cells() {
        for piece in PieceType::all() {
            for (i, shape) in piece.rotations().iter().copied().enumerate() {
                assert_eq!(filled_count(shape), 4, "{:?} rotation {}", piece, i);
            }
        }
    }

    #[test]
    fn test_rotation_counts() {
        assert_eq!(PieceType::O.rotation_count(), 1);
        for piece in [PieceType::I, PieceType::S, PieceType::Z] {
            assert_eq!(piece.rotation_count(), 2);
        }
        for piece in [PieceType::J, PieceType::L, PieceType::T] {
            assert_eq!(piece.rotation_count(), 4);
        }
    }

    #[test]
    fn test_shapes_fit_in_four_by_four() {
        for piece in PieceType::all() {
            for shape in piece.rotations() {
                assert!(shape.len() <= 4);
                assert!(shape.iter().all(|row| row.len() <= 4));
            }
        }
    }

    #[test]
    fn test_cells_match_matrix() {
        assert_eq!(PieceType::O.cells(0), [(0, 0), (1, 0), (0, 1), (1, 1)]);
        assert_eq!(PieceType::I.cells(0), [(0, 1), (1, 1), (2, 1), (3, 1)]);
        assert_eq!(PieceType::I.cells(1), [(2, 0), (2, 1), (2, 2), (2, 3)]);
    }

    #[test]
    fn test_rotate_index_wraps() {
        assert_eq!(PieceType::T.rotate_index(3, RotationDirection::Clockwise), 0);
        assert_eq!(PieceType::T.rotate_index(0, RotationDirection::CounterClockwise), 3);
        assert_eq!(PieceType::I.rotate_index(1, RotationDirection::Clockwise), 0);
        assert_eq!(PieceType::O.rotate_index(0, RotationDirection::Clockwise), 0);
        // Out-of-range indices behave as their residue
        assert_eq!(PieceType::S.shape(5), PieceType::S.shape(1));
    }

    #[test]
    fn test_spawn_states_start_on_top_row() {
        for piece in PieceType::all() {
            if piece == PieceType::I {
                continue;
            }
            assert!(piece.shape(0)[0].iter().any(|&v| v != 0), "{:?}", piece);
        }
    }
}
