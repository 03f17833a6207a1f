//! Error types for configuration and settings persistence
//!
//! The engine itself never errors: illegal moves are silent no-ops. Only
//! construction parameters and the settings file can be wrong.

use thiserror::Error;

/// Invalid game construction parameters
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("board {width}x{height} out of range (each side must be 3 to 1024 cells, border included)")]
    InvalidDimensions { width: usize, height: usize },
    #[error("spawn anchor ({x}, {y}) lies outside the board")]
    SpawnOutOfBounds { x: i32, y: i32 },
    #[error("gravity and frame periods must be non-zero")]
    InvalidPeriod,
}

/// Failure to persist settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("could not determine config directory")]
    NoConfigDir,
    #[error("failed to write settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}
