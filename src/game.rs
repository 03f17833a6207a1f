//! Core game state and tick logic
//!
//! One call to [`Game::tick`] applies the input gathered since the previous
//! tick, then at most one gravity step. When gravity cannot move the piece it
//! locks on the spot: the piece is written into the board, the rows it covers
//! are checked for clears, and the next piece spawns. There is no lock delay.

use crate::board::Board;
use crate::collision::{can_move, can_rotate, fits};
use crate::error::ConfigError;
use crate::piece::Piece;
use crate::spawner::Spawner;
use crate::tetromino::{PieceType, RotationDirection};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Construction constants for a game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Grid width including the border
    pub board_width: usize,
    /// Grid height including the border
    pub board_height: usize,
    /// Spawn anchor column
    pub spawn_x: i32,
    /// Spawn anchor row
    pub spawn_y: i32,
    /// Gravity period in milliseconds
    pub gravity_ms: u64,
    /// Frame period in milliseconds
    pub frame_ms: u64,
    /// Fixed spawner seed; random when absent
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_width: 12,
            board_height: 22,
            spawn_x: 4,
            spawn_y: 1,
            gravity_ms: 500,
            frame_ms: 50,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Check dimensions, periods and that every piece fits at the spawn anchor
    pub fn validate(&self) -> Result<(), ConfigError> {
        let board = Board::new(self.board_width, self.board_height)?;
        if self.gravity_ms == 0 || self.frame_ms == 0 {
            return Err(ConfigError::InvalidPeriod);
        }
        let spawn_out_of_bounds = ConfigError::SpawnOutOfBounds {
            x: self.spawn_x,
            y: self.spawn_y,
        };
        // Keep the anchor inside the grid so cell offsets cannot overflow
        let in_grid = |v: i32, len: usize| usize::try_from(v).is_ok_and(|v| v < len);
        if !in_grid(self.spawn_x, board.width()) || !in_grid(self.spawn_y, board.height()) {
            return Err(spawn_out_of_bounds);
        }
        let spawn_fits = PieceType::all()
            .iter()
            .all(|&t| fits(&board, &Piece::new(t, self.spawn_x, self.spawn_y)));
        if !spawn_fits {
            return Err(spawn_out_of_bounds);
        }
        Ok(())
    }

    pub fn gravity_period(&self) -> Duration {
        Duration::from_millis(self.gravity_ms)
    }

    pub fn frame_period(&self) -> Duration {
        Duration::from_millis(self.frame_ms)
    }
}

/// Game state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    /// An active piece exists and accepts input
    Falling,
    /// A freshly spawned piece overlapped the stack
    GameOver,
    /// The player asked to quit
    Quit,
}

/// Signals gathered for one tick
///
/// `left`, `right` and `down` are level-triggered (held keys). `rotate`,
/// `force_next` and `quit` are edge-triggered: set at most once per press.
/// `gravity` is set when the gravity timer fired since the last tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub down: bool,
    pub rotate: bool,
    pub force_next: bool,
    pub quit: bool,
    pub gravity: bool,
}

/// What a tick did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing changed
    Idle,
    /// The active piece moved, rotated or was replaced
    Moved,
    /// The piece locked; `cleared_rows` lists the rows removed (pre-compaction indices)
    Locked { cleared_rows: Vec<usize> },
    GameOver,
    Quit,
}

/// Read-only view handed to the renderer
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub board: &'a Board,
    pub active: Option<Piece>,
    pub next: PieceType,
    pub state: GameState,
}

/// The main game struct
pub struct Game {
    config: GameConfig,
    board: Board,
    /// Current falling piece
    active: Option<Piece>,
    spawner: Spawner,
    state: GameState,
}

impl Game {
    /// Create a new game and spawn its first piece
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let board = Board::new(config.board_width, config.board_height)?;
        let spawner = match config.seed {
            Some(seed) => Spawner::with_seed(config.spawn_x, config.spawn_y, seed),
            None => Spawner::new(config.spawn_x, config.spawn_y),
        };
        let mut game = Self {
            config,
            board,
            active: None,
            spawner,
            state: GameState::Falling,
        };
        game.spawn();
        info!(
            "New game: {}x{} interior",
            game.board.interior_width(),
            game.board.interior_height()
        );
        Ok(game)
    }

    /// Start over on an empty board with the same configuration
    pub fn restart(&mut self) -> Result<(), ConfigError> {
        *self = Self::new(self.config.clone())?;
        Ok(())
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn active(&self) -> Option<&Piece> {
        self.active.as_ref()
    }

    /// Type of the previewed piece
    pub fn next_type(&self) -> PieceType {
        self.spawner.peek()
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            board: &self.board,
            active: self.active,
            next: self.spawner.peek(),
            state: self.state,
        }
    }

    /// Advance the game by one tick
    pub fn tick(&mut self, input: &TickInput) -> TickOutcome {
        if self.state != GameState::Falling {
            return TickOutcome::Idle;
        }

        if input.quit {
            info!("Quit requested");
            self.state = GameState::Quit;
            return TickOutcome::Quit;
        }

        let mut moved = false;

        if input.force_next {
            if !self.spawn() {
                return TickOutcome::GameOver;
            }
            moved = true;
        }

        let Some(mut piece) = self.active else {
            return TickOutcome::Idle;
        };

        let dx = match (input.left, input.right) {
            (true, false) => -1,
            (false, true) => 1,
            _ => 0,
        };
        if dx != 0 && can_move(&self.board, &piece, dx, 0) {
            piece = piece.translated(dx, 0);
            moved = true;
        }

        if input.rotate && can_rotate(&self.board, &piece, RotationDirection::Clockwise) {
            piece = piece.rotated(RotationDirection::Clockwise);
            moved = true;
        }

        if input.down && can_move(&self.board, &piece, 0, 1) {
            piece = piece.translated(0, 1);
            moved = true;
        }

        self.active = Some(piece);

        if input.gravity {
            if can_move(&self.board, &piece, 0, 1) {
                self.active = Some(piece.translated(0, 1));
                moved = true;
            } else {
                return self.lock(piece);
            }
        }

        if moved {
            TickOutcome::Moved
        } else {
            TickOutcome::Idle
        }
    }

    /// Write `piece` into the board, clear the rows it completed, spawn the next
    fn lock(&mut self, piece: Piece) -> TickOutcome {
        let positions = piece.block_positions();
        self.board.lock_cells(&positions, piece.piece_type);
        self.active = None;
        debug!(
            "Locked {:?} rotation {} at ({}, {})",
            piece.piece_type, piece.rotation, piece.x, piece.y
        );

        // Only the piece just placed can complete a row
        let cleared_rows: Vec<usize> = piece
            .rows()
            .into_iter()
            .filter(|&row| self.board.row_is_filled(row))
            .collect();
        if !cleared_rows.is_empty() {
            for &row in &cleared_rows {
                self.board.clear_row(row);
            }
            self.board.compact(&cleared_rows);
            info!("Cleared {} row(s): {:?}", cleared_rows.len(), cleared_rows);
        }

        if !self.spawn() {
            return TickOutcome::GameOver;
        }
        TickOutcome::Locked { cleared_rows }
    }

    /// Promote the previewed piece; false (and game over) if it does not fit
    fn spawn(&mut self) -> bool {
        let piece = self.spawner.advance();
        self.active = Some(piece);
        debug!("Spawned {:?}, next {:?}", piece.piece_type, self.spawner.peek());
        if !fits(&self.board, &piece) {
            info!("Game over: {:?} cannot spawn at ({}, {})", piece.piece_type, piece.x, piece.y);
            self.state = GameState::GameOver;
            return false;
        }
        true
    }
}
