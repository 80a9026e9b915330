//! First-class move actions.
//!
//! Moves are domain events, not side effects. They carry the player's
//! intent and can be validated before they touch a board.

use crate::{Coord, Player};
use derive_new::new;
use serde::{Deserialize, Serialize};

/// A player placing their mark on a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, new)]
pub struct Move {
    /// The player making the move.
    pub player: Player,
    /// The cell being claimed.
    pub coord: Coord,
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.player, self.coord)
    }
}

/// Why a move was rejected.
///
/// Callers on the UI side treat every variant as "tap ignored".
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum MoveError {
    /// The cell lies outside the board.
    #[display("Cell {} is outside a {}x{} board", _0, _1, _1)]
    OutOfBounds(Coord, usize),

    /// The cell already holds a mark.
    #[display("Cell {} is already occupied", _0)]
    SquareOccupied(Coord),

    /// The round has already been won or tied.
    #[display("Round is already over")]
    GameOver,

    /// It is the other player's turn.
    #[display("It's not {}'s turn", _0)]
    WrongPlayer(Player),
}

impl std::error::Error for MoveError {}
