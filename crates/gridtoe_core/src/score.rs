//! Cumulative round results within a match.

use crate::{GameResult, Player};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Round wins per player and ties, accumulated over one match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    player1_wins: u32,
    player2_wins: u32,
    ties: u32,
}

impl Score {
    /// Creates an empty score.
    pub fn new() -> Self {
        Self::default()
    }

    /// Round wins for `player`.
    pub fn wins(&self, player: Player) -> u32 {
        match player {
            Player::One => self.player1_wins,
            Player::Two => self.player2_wins,
        }
    }

    /// Counts a finished round. In-progress results are ignored.
    #[instrument(skip(self))]
    pub fn record(&mut self, result: &GameResult) {
        match result {
            GameResult::Won { player: Player::One, .. } => self.player1_wins += 1,
            GameResult::Won { player: Player::Two, .. } => self.player2_wins += 1,
            GameResult::Tie => self.ties += 1,
            GameResult::InProgress => {}
        }
    }

    /// Player with strictly more round wins, if any.
    pub fn leader(&self) -> Option<Player> {
        match self.player1_wins.cmp(&self.player2_wins) {
            std::cmp::Ordering::Greater => Some(Player::One),
            std::cmp::Ordering::Less => Some(Player::Two),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Rounds counted so far.
    pub fn rounds_played(&self) -> u32 {
        self.player1_wins + self.player2_wins + self.ties
    }

    /// Zeroes every counter.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} - {} ({} tied)",
            self.player1_wins, self.player2_wins, self.ties
        )
    }
}
