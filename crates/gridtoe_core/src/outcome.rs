//! Results of evaluating a board.

use crate::{Coord, Player};
use serde::{Deserialize, Serialize};

/// An unbroken run of same-player cells, in scan order.
///
/// Always exactly `win_length` cells long.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WinningLine(Vec<Coord>);

impl WinningLine {
    pub(crate) fn new(cells: Vec<Coord>) -> Self {
        Self(cells)
    }

    /// Cells of the line from its start outward.
    pub fn cells(&self) -> &[Coord] {
        &self.0
    }

    /// Number of cells in the line.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for a zero-length line (never produced by the detector).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True if `coord` is part of the line.
    pub fn contains(&self, coord: Coord) -> bool {
        self.0.contains(&coord)
    }
}

/// State of a round after the most recent move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GameResult {
    /// Moves remain and nobody has a line.
    #[default]
    InProgress,
    /// `player` completed `line`.
    Won {
        /// The winning player.
        player: Player,
        /// The first winning run found.
        line: WinningLine,
    },
    /// The board filled with no winning line.
    Tie,
}

impl GameResult {
    /// True once the round is won or tied.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GameResult::InProgress)
    }

    /// Returns the winner if there is one.
    pub fn winner(&self) -> Option<Player> {
        match self {
            GameResult::Won { player, .. } => Some(*player),
            _ => None,
        }
    }

    /// Returns the winning line if there is one.
    pub fn line(&self) -> Option<&WinningLine> {
        match self {
            GameResult::Won { line, .. } => Some(line),
            _ => None,
        }
    }
}

impl std::fmt::Display for GameResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameResult::InProgress => write!(f, "In progress"),
            GameResult::Won { player, .. } => write!(f, "{} wins", player),
            GameResult::Tie => write!(f, "Tie"),
        }
    }
}
