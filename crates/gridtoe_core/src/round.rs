//! A single round: one board played from empty to a win or a tie.

use crate::rules::evaluate;
use crate::{Board, Coord, GameResult, Move, MoveError, Player};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Round engine: board, turn, result, and move history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    board: Board,
    win_length: usize,
    to_move: Player,
    result: GameResult,
    history: Vec<Move>,
}

impl Round {
    /// Creates a round on an empty `size`×`size` board, player one to move.
    #[instrument]
    pub fn new(size: usize, win_length: usize) -> Self {
        Self {
            board: Board::new(size),
            win_length,
            to_move: Player::One,
            result: GameResult::InProgress,
            history: Vec::new(),
        }
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Run length needed to win.
    pub fn win_length(&self) -> usize {
        self.win_length
    }

    /// Player whose turn it is. Frozen once the round is over.
    pub fn to_move(&self) -> Player {
        self.to_move
    }

    /// Result after the latest move.
    pub fn result(&self) -> &GameResult {
        &self.result
    }

    /// Moves played so far.
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// True once the round is won or tied.
    pub fn is_over(&self) -> bool {
        self.result.is_terminal()
    }

    /// Applies a move after checking it against the current state.
    ///
    /// The turn passes to the opponent only when the move leaves the round
    /// in progress.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError::GameOver`] after a terminal result,
    /// [`MoveError::WrongPlayer`] out of turn, and the board's bounds and
    /// occupancy errors. State is untouched on error.
    #[instrument(skip(self), fields(to_move = ?self.to_move))]
    pub fn apply(&mut self, action: Move) -> Result<&GameResult, MoveError> {
        if self.is_over() {
            return Err(MoveError::GameOver);
        }
        if action.player != self.to_move {
            return Err(MoveError::WrongPlayer(action.player));
        }

        self.board.place(action.coord, action.player)?;
        self.history.push(action);
        self.result = evaluate(&self.board, self.win_length);

        if self.result.is_terminal() {
            info!(result = %self.result, moves = self.history.len(), "Round finished");
        } else {
            self.to_move = self.to_move.opponent();
            debug!(next = ?self.to_move, "Turn passed");
        }

        Ok(&self.result)
    }

    /// Places a mark for the player to move.
    ///
    /// # Errors
    ///
    /// Same as [`Round::apply`].
    #[instrument(skip(self))]
    pub fn place(&mut self, coord: Coord) -> Result<&GameResult, MoveError> {
        self.apply(Move::new(self.to_move, coord))
    }

    /// Replays `moves` from an empty board.
    ///
    /// # Errors
    ///
    /// Stops at the first illegal move.
    #[instrument(skip(moves), fields(count = moves.len()))]
    pub fn replay(size: usize, win_length: usize, moves: &[Move]) -> Result<Self, MoveError> {
        let mut round = Self::new(size, win_length);
        for &action in moves {
            round.apply(action)?;
        }
        Ok(round)
    }
}
