//! Game rules for N×N boards.
//!
//! Pure functions over a [`Board`](crate::Board). Rules are kept apart
//! from board storage so the round and the session can share them.

pub mod draw;
pub mod win;

pub use draw::{is_full, is_tie};
pub use win::{Direction, candidate_lines, find_winning_line};

use crate::{Board, GameResult};
use tracing::instrument;

/// Evaluates `board` for a winner or a tie.
///
/// A winning run takes precedence over a full board, so a result is
/// never both won and tied.
#[instrument(skip(board), fields(size = board.size()))]
pub fn evaluate(board: &Board, win_length: usize) -> GameResult {
    if let Some((player, line)) = find_winning_line(board, win_length) {
        return GameResult::Won { player, line };
    }
    if is_full(board) {
        return GameResult::Tie;
    }
    GameResult::InProgress
}
