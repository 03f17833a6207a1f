//! Movement and collision validation
//!
//! Pure predicates: a candidate piece is built by value and tested against the
//! board. Nothing here mutates; callers assign the candidate only on success.

use crate::board::Board;
use crate::piece::Piece;
use crate::tetromino::RotationDirection;

/// True if every block of `piece` lands on an empty interior cell
pub fn fits(board: &Board, piece: &Piece) -> bool {
    piece
        .block_positions()
        .iter()
        .all(|&(x, y)| !board.is_occupied(x, y))
}

/// Whether `piece` could be shifted by `(dx, dy)`
pub fn can_move(board: &Board, piece: &Piece, dx: i32, dy: i32) -> bool {
    fits(board, &piece.translated(dx, dy))
}

/// Whether `piece` could turn once in `direction` at its current anchor
///
/// No kick offsets are tried.
pub fn can_rotate(board: &Board, piece: &Piece, direction: RotationDirection) -> bool {
    fits(board, &piece.rotated(direction))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tetromino::PieceType;

    fn board() -> Board {
        Board::new(10, 12).unwrap()
    }

    #[test]
    fn test_walls_and_floor_reject() {
        let board = board();
        let piece = Piece::new(PieceType::O, 1, 1);
        assert!(fits(&board, &piece));
        assert!(!can_move(&board, &piece, -1, 0));
        assert!(can_move(&board, &piece, 1, 0));

        let right = Piece::new(PieceType::O, 7, 1);
        assert!(!can_move(&board, &right, 1, 0));

        let floor = Piece::new(PieceType::O, 4, 9);
        assert!(!can_move(&board, &floor, 0, 1));
        assert!(can_move(&board, &floor, 0, -1));
    }

    #[test]
    fn test_locked_cells_reject() {
        let mut board = board();
        board.lock_cells(&[(5, 5)], PieceType::Z);
        let piece = Piece::new(PieceType::O, 4, 3);
        assert!(!can_move(&board, &piece, 0, 1));
        assert!(can_move(&board, &piece, -1, 1));
    }

    #[test]
    fn test_probing_never_mutates() {
        let board = board();
        let piece = Piece::new(PieceType::I, 1, 0);
        let before = piece;
        let snapshot = board.clone();
        assert!(!can_move(&board, &piece, -1, 0));
        assert!(!can_move(&board, &piece, 0, -1));
        assert!(!can_rotate(&board, &piece, RotationDirection::Clockwise));
        assert_eq!(piece, before);
        assert_eq!(board, snapshot);
    }

    #[test]
    fn test_horizontal_i_at_top_cannot_stand_up() {
        let board = board();
        // Bar cells sit in the top interior row, flush with the left wall
        let piece = Piece::new(PieceType::I, 1, 0);
        assert!(fits(&board, &piece));
        assert_eq!(piece.block_positions()[0], (1, 1));
        assert!(!can_rotate(&board, &piece, RotationDirection::Clockwise));
        assert!(!can_rotate(&board, &piece, RotationDirection::CounterClockwise));

        // One row lower there is room
        assert!(can_rotate(&board, &piece.translated(0, 1), RotationDirection::Clockwise));
    }

    #[test]
    fn test_rotation_blocked_by_stack() {
        let mut board = board();
        let piece = Piece::new(PieceType::T, 3, 3);
        let turned = piece.rotated(RotationDirection::Clockwise);
        assert!(can_rotate(&board, &piece, RotationDirection::Clockwise));

        // Occupy the one cell the turned piece needs that the current one does not
        let extra = turned
            .block_positions()
            .into_iter()
            .find(|p| !piece.block_positions().contains(p))
            .unwrap();
        board.lock_cells(&[extra], PieceType::L);
        assert!(!can_rotate(&board, &piece, RotationDirection::Clockwise));
    }

    #[test]
    fn test_o_rotation_is_identity() {
        let board = board();
        let piece = Piece::new(PieceType::O, 4, 4);
        assert!(can_rotate(&board, &piece, RotationDirection::Clockwise));
        assert_eq!(piece.rotated(RotationDirection::Clockwise), piece);
    }
}
