//! Tie detection.

use super::win::find_winning_line;
use crate::Board;
use tracing::instrument;

/// Checks if every square on the board is taken.
#[instrument(skip(board))]
pub fn is_full(board: &Board) -> bool {
    board.is_full()
}

/// Checks if the round is a tie (full board, no winning line).
#[instrument(skip(board))]
pub fn is_tie(board: &Board, win_length: usize) -> bool {
    is_full(board) && find_winning_line(board, win_length).is_none()
}
