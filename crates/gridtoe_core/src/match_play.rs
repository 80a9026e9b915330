//! Round and match bookkeeping.
//!
//! A match is a sequence of rounds. It ends early as soon as one player
//! holds a majority of the scheduled rounds, or after the last scheduled
//! round by comparing scores.
//!
//! ```text
//!  RoundInProgress ──finish_round──▶ RoundJustEnded ──start_next_round──┐
//!        ▲                 │                                            │
//!        │                 └──(majority / rounds exhausted)──▶ Complete │
//!        └──────────────────────────────────────────────────────────────┘
//! ```

use crate::{GameResult, Player, Score};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// How a match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum MatchResult {
    /// A player won the match.
    #[display("{} wins the match", _0)]
    Winner(Player),
    /// Scores were level after the last round.
    #[display("Match tied")]
    Tie,
}

impl MatchResult {
    /// Returns the winner if there is one.
    pub fn winner(&self) -> Option<Player> {
        match self {
            MatchResult::Winner(player) => Some(*player),
            MatchResult::Tie => None,
        }
    }
}

/// Where the match stands between moves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    /// A round is being played.
    RoundInProgress,
    /// A round just finished and another one follows.
    RoundJustEnded {
        /// Result of the round that finished.
        result: GameResult,
    },
    /// No more rounds until the match is reset.
    Complete {
        /// Final match result.
        result: MatchResult,
    },
}

/// Invalid match transition.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum MatchError {
    /// `finish_round` called while no round is in progress.
    #[display("No round is in progress")]
    NoRoundInProgress,
    /// `finish_round` called with a non-terminal result.
    #[display("Round result is not final")]
    RoundNotFinished,
    /// `start_next_round` called when no round just ended.
    #[display("Cannot start a round from the current phase")]
    CannotStartRound,
}

impl std::error::Error for MatchError {}

/// Tracks the round counter, the score, and the match phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchController {
    max_rounds: u32,
    current_round: u32,
    score: Score,
    phase: MatchPhase,
}

impl MatchController {
    /// Starts a match of at most `max_rounds` rounds (at least one).
    #[instrument]
    pub fn new(max_rounds: u32) -> Self {
        Self {
            max_rounds: max_rounds.max(1),
            current_round: 1,
            score: Score::new(),
            phase: MatchPhase::RoundInProgress,
        }
    }

    /// Scheduled number of rounds.
    pub fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    /// One-based number of the round being (or just) played.
    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    /// Cumulative score.
    pub fn score(&self) -> &Score {
        &self.score
    }

    /// Current phase.
    pub fn phase(&self) -> &MatchPhase {
        &self.phase
    }

    /// Final result once the match is complete.
    pub fn result(&self) -> Option<MatchResult> {
        match self.phase {
            MatchPhase::Complete { result } => Some(result),
            _ => None,
        }
    }

    /// True once the match is complete.
    pub fn is_complete(&self) -> bool {
        matches!(self.phase, MatchPhase::Complete { .. })
    }

    /// Round wins needed to take the match early: `ceil(max_rounds / 2)`.
    pub fn majority(&self) -> u32 {
        self.max_rounds.div_ceil(2)
    }

    /// Records a finished round and decides whether the match continues.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::NoRoundInProgress`] outside a round and
    /// [`MatchError::RoundNotFinished`] for an in-progress result.
    #[instrument(skip(self), fields(round = self.current_round))]
    pub fn finish_round(&mut self, result: &GameResult) -> Result<&MatchPhase, MatchError> {
        if self.phase != MatchPhase::RoundInProgress {
            return Err(MatchError::NoRoundInProgress);
        }
        if !result.is_terminal() {
            return Err(MatchError::RoundNotFinished);
        }

        self.score.record(result);

        self.phase = match self.match_decision() {
            Some(outcome) => {
                info!(
                    %outcome,
                    score = %self.score,
                    round = self.current_round,
                    "Match complete"
                );
                MatchPhase::Complete { result: outcome }
            }
            None => MatchPhase::RoundJustEnded {
                result: result.clone(),
            },
        };

        Ok(&self.phase)
    }

    /// Moves on to the next round.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::CannotStartRound`] unless a round just ended.
    #[instrument(skip(self))]
    pub fn start_next_round(&mut self) -> Result<u32, MatchError> {
        if !matches!(self.phase, MatchPhase::RoundJustEnded { .. }) {
            return Err(MatchError::CannotStartRound);
        }
        self.current_round += 1;
        self.phase = MatchPhase::RoundInProgress;
        info!(round = self.current_round, "Round started");
        Ok(self.current_round)
    }

    /// Back to round one with an empty score.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        self.current_round = 1;
        self.score.reset();
        self.phase = MatchPhase::RoundInProgress;
    }

    /// Starts over with a new round limit.
    #[instrument(skip(self))]
    pub fn reset_with(&mut self, max_rounds: u32) {
        self.max_rounds = max_rounds.max(1);
        self.reset();
    }

    fn match_decision(&self) -> Option<MatchResult> {
        let majority = self.majority();
        for player in Player::BOTH {
            if self.score.wins(player) >= majority {
                return Some(MatchResult::Winner(player));
            }
        }
        if self.current_round >= self.max_rounds {
            return Some(match self.score.leader() {
                Some(player) => MatchResult::Winner(player),
                None => MatchResult::Tie,
            });
        }
        None
    }
}
