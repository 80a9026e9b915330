//! Round timing records and the fastest-winners leaderboard.
//!
//! While a match runs, every timed round win is appended to a transient
//! [`RoundLog`]. When the match produces a definitive winner, that
//! player's average winning time becomes a [`LeaderboardEntry`]. The
//! leaderboard keeps the [`LEADERBOARD_CAPACITY`] fastest entries.

use crate::{Player, Score, Settings, Symbol};
use chrono::{DateTime, Utc};
use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Maximum number of leaderboard entries kept.
pub const LEADERBOARD_CAPACITY: usize = 10;

/// One timed round win inside the current match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
#[serde(rename_all = "camelCase")]
pub struct RoundRecord {
    player: Player,
    symbol: Symbol,
    elapsed_seconds: u64,
    round: u32,
}

/// Transient per-round records for the match in progress.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoundLog(Vec<RoundRecord>);

impl RoundLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a round win.
    #[instrument(skip(self))]
    pub fn record_round_win(&mut self, player: Player, symbol: Symbol, elapsed_seconds: u64, round: u32) {
        debug!(?player, elapsed_seconds, round, "Round win recorded");
        self.0.push(RoundRecord::new(player, symbol, elapsed_seconds, round));
    }

    /// Records for `player`'s wins.
    pub fn wins_for(&self, player: Player) -> impl Iterator<Item = &RoundRecord> {
        self.0.iter().filter(move |r| r.player == player)
    }

    /// Mean elapsed time over `player`'s recorded wins.
    pub fn average_for(&self, player: Player) -> Option<f64> {
        let (count, total) = self
            .wins_for(player)
            .fold((0u64, 0u64), |(n, sum), r| (n + 1, sum + r.elapsed_seconds));
        (count > 0).then(|| total as f64 / count as f64)
    }

    /// All records in insertion order.
    pub fn records(&self) -> &[RoundRecord] {
        &self.0
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Drops every record.
    pub fn clear(&mut self) {
        self.0.clear();
    }
}

/// A match winner and their average round time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, new)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    player_label: String,
    player_name: String,
    grid_size: usize,
    win_length: usize,
    average_win_time: f64,
    date: DateTime<Utc>,
    symbol: Symbol,
}

/// Fastest match winners, ascending by average win time.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Leaderboard(Vec<LeaderboardEntry>);

impl Leaderboard {
    /// Creates an empty leaderboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a leaderboard from stored entries, restoring order and cap.
    #[instrument(skip(entries), fields(count = entries.len()))]
    pub fn from_entries(entries: Vec<LeaderboardEntry>) -> Self {
        let mut board = Self(entries);
        board.normalize();
        board
    }

    /// Inserts `entry`, keeping the fastest [`LEADERBOARD_CAPACITY`].
    ///
    /// Returns the entry's rank (zero-based) if it survived the cut.
    #[instrument(skip(self, entry), fields(time = entry.average_win_time))]
    pub fn insert(&mut self, entry: LeaderboardEntry) -> Option<usize> {
        let date = entry.date;
        let time = entry.average_win_time;
        self.0.push(entry);
        self.normalize();
        let rank = self
            .0
            .iter()
            .rposition(|e| e.date == date && e.average_win_time == time);
        info!(?rank, size = self.0.len(), "Leaderboard updated");
        rank
    }

    /// Entries, fastest first.
    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.0
    }

    /// Fastest entry.
    pub fn best(&self) -> Option<&LeaderboardEntry> {
        self.0.first()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    fn normalize(&mut self) {
        // stable: equal times keep arrival order
        self.0
            .sort_by(|a, b| a.average_win_time.total_cmp(&b.average_win_time));
        self.0.truncate(LEADERBOARD_CAPACITY);
    }
}

/// Builds the leaderboard entry for a finished match.
///
/// Returns `None` when timing is off, when the score has no strict
/// leader, or when the leader has no timed wins in `log`.
#[instrument(skip(score, settings, log), fields(score = %score))]
pub fn finalize_match(
    score: &Score,
    settings: &Settings,
    log: &RoundLog,
    now: DateTime<Utc>,
) -> Option<LeaderboardEntry> {
    if !settings.enable_timer() {
        debug!("Timer disabled, no leaderboard entry");
        return None;
    }
    let winner = score.leader()?;
    let average = log.average_for(winner)?;
    Some(LeaderboardEntry::new(
        settings.label(winner),
        settings.name(winner).to_string(),
        *settings.grid_size(),
        *settings.win_length(),
        average,
        now,
        settings.symbol(winner).clone(),
    ))
}

/// The leaderboard together with the current match's round log.
#[derive(Debug, Clone, PartialEq, Default, Getters)]
pub struct RecordBook {
    leaderboard: Leaderboard,
    rounds: RoundLog,
}

impl RecordBook {
    /// Wraps loaded records.
    pub fn new(leaderboard: Leaderboard, rounds: RoundLog) -> Self {
        Self { leaderboard, rounds }
    }

    /// Appends a round win for the match in progress.
    pub fn record_round_win(&mut self, player: Player, symbol: Symbol, elapsed_seconds: u64, round: u32) {
        self.rounds
            .record_round_win(player, symbol, elapsed_seconds, round);
    }

    /// Closes the match: inserts the winner's entry (if any) and clears
    /// the round log.
    #[instrument(skip(self, score, settings))]
    pub fn finalize_match(
        &mut self,
        score: &Score,
        settings: &Settings,
        now: DateTime<Utc>,
    ) -> Option<LeaderboardEntry> {
        let entry = finalize_match(score, settings, &self.rounds, now);
        if let Some(entry) = &entry {
            self.leaderboard.insert(entry.clone());
        }
        self.rounds.clear();
        entry
    }

    /// Drops the round log (match reset).
    pub fn clear_rounds(&mut self) {
        self.rounds.clear();
    }

    /// Drops both the leaderboard and the round log.
    pub fn clear_all(&mut self) {
        self.leaderboard.clear();
        self.rounds.clear();
    }
}
