//! BLOCKFALL - a falling-block puzzle game
//!
//! The engine (`board`, `tetromino`, `piece`, `collision`, `spawner`, `game`)
//! has no terminal dependency beyond piece colors; `input` and `ui` are the
//! crossterm/ratatui front end driven by the binary.

pub mod board;
pub mod collision;
pub mod error;
pub mod game;
pub mod input;
pub mod piece;
pub mod settings;
pub mod spawner;
pub mod tetromino;
pub mod ui;
