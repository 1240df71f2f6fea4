//! Error types for the rules engine, configuration and parsing boundaries.

use thiserror::Error;

use crate::game::Coord;

/// An action that violates a rules precondition.
///
/// Rejection never mutates state; the caller must solicit another action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IllegalAction {
    /// Target lies outside the grid.
    #[error("{0} is outside the board")]
    OutOfBounds(Coord),
    /// Expand target is already claimed.
    #[error("{0} is not empty")]
    NotEmpty(Coord),
    /// Target does not touch any cell owned by the actor.
    #[error("{0} is not adjacent to your territory")]
    NotAdjacent(Coord),
    /// Fortify target is not owned by the actor.
    #[error("{0} is not yours")]
    NotOwned(Coord),
    /// Fortify target already carries a shield.
    #[error("{0} is already shielded")]
    AlreadyShielded(Coord),
    /// Attack target is not held by the opponent.
    #[error("{0} is not held by the enemy")]
    NotEnemy(Coord),
}

/// Malformed coordinate text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordParseError {
    /// Nothing to parse.
    #[error("empty coordinate")]
    Empty,
    /// The coordinate does not match `<row letter><column number>`.
    #[error("malformed coordinate '{0}'")]
    Malformed(String),
    /// Row letter or column number is beyond the grid.
    #[error("coordinate '{0}' is off the board")]
    OutOfRange(String),
}

/// Configuration that cannot describe a playable game.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Grid side length outside `2..=26`.
    #[error("grid size {0} is unsupported (expected 2..=26)")]
    GridSize(u8),
    /// Threshold below 2 (met by a seed cell alone) or above the cell count.
    #[error("victory threshold {threshold} must be in 2..={cells}")]
    VictoryThreshold {
        /// Configured threshold.
        threshold: u16,
        /// Cells on the board.
        cells: u16,
    },
    /// Dice need at least one face.
    #[error("dice must have at least one side")]
    DiceSides,
    /// Settings file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// File path.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Settings file is not valid JSON for [`crate::config::Settings`].
    #[error("invalid settings: {0}")]
    Json(#[from] serde_json::Error),
}

/// A broken game-state invariant. Always a bug; aborts the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invariant violation: {message}")]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl InvariantViolation {
    /// Create a violation with the given description.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
