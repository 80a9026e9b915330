//! Pure tic-tac-toe rules for configurable N×N boards.
//!
//! # Architecture
//!
//! - **Board**: grid storage and single-cell mutation
//! - **Rules**: win/tie detection for any board size and win length
//! - **Round**: one board played to a result, with turn rotation
//! - **Match**: round counter, score, and match termination
//! - **Leaderboard**: round timing records and the fastest-winners table
//! - **Settings**: validated match configuration
//!
//! Nothing here performs I/O. Persistence and presentation live in the
//! application crate, which feeds moves in and reads plain data out.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod board;
mod leaderboard;
mod match_play;
mod outcome;
mod round;
mod score;
mod settings;
mod turn;
mod types;

pub mod rules;

pub use action::{Move, MoveError};
pub use board::Board;
pub use leaderboard::{
    LEADERBOARD_CAPACITY, Leaderboard, LeaderboardEntry, RecordBook, RoundLog, RoundRecord,
    finalize_match,
};
pub use match_play::{MatchController, MatchError, MatchPhase, MatchResult};
pub use outcome::{GameResult, WinningLine};
pub use round::Round;
pub use score::Score;
pub use settings::{
    CriticalChange, GRID_SIZES, MIN_WIN_LENGTH, ROUND_OPTIONS, Settings, SettingsError,
};
pub use turn::next_turn;
pub use types::{Coord, Player, Square, Symbol};
