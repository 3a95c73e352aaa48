//! Board vectors and the game geometry the engine is built for.
//!
//! A board is a flat vector with one small integer ("position value") per
//! cell. The meaning of the values belongs to the game adapter; the engine
//! only needs the cell count, the value range and the player count.

use serde::{Deserialize, Serialize};

use super::PlayerId;
use crate::error::{ConfigError, ValidationError};

/// Position value of a single cell.
pub type Cell = u8;

/// Owned board vector.
pub type Board = Vec<Cell>;

/// Fixed per-game dimensions, validated once at engine construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardGeometry {
    /// Number of cells in a board vector.
    pub num_cells: usize,

    /// Number of distinct position values; every cell lies in `0..num_position_values`.
    pub num_position_values: usize,

    /// Number of players (1-255).
    pub num_players: usize,
}

impl BoardGeometry {
    /// Create a new geometry.
    #[must_use]
    pub const fn new(num_cells: usize, num_position_values: usize, num_players: usize) -> Self {
        Self {
            num_cells,
            num_position_values,
            num_players,
        }
    }

    /// Reject geometries no engine can be built for.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_cells == 0 {
            return Err(ConfigError::NoCells);
        }
        if self.num_position_values == 0 {
            return Err(ConfigError::NoPositionValues);
        }
        if self.num_players == 0 || self.num_players > 255 {
            return Err(ConfigError::NoPlayers);
        }
        Ok(())
    }

    /// Check length and value range of a board vector.
    pub fn validate_board(&self, board: &[Cell]) -> Result<(), ValidationError> {
        if board.len() != self.num_cells {
            return Err(ValidationError::BoardLength {
                expected: self.num_cells,
                actual: board.len(),
            });
        }
        match board
            .iter()
            .position(|&v| usize::from(v) >= self.num_position_values)
        {
            Some(cell) => Err(ValidationError::PositionValueOutOfRange {
                cell,
                value: usize::from(board[cell]),
                limit: self.num_position_values,
            }),
            None => Ok(()),
        }
    }

    /// Check that `player` exists in this game.
    pub fn validate_player(&self, player: PlayerId) -> Result<(), ValidationError> {
        if player.index() >= self.num_players {
            return Err(ValidationError::PlayerOutOfRange {
                player: player.index(),
                num_players: self.num_players,
            });
        }
        Ok(())
    }
}
