//! The game session: everything a screen needs to run a match.
//!
//! A [`GameSession`] owns the in-memory game state (board, turn, score,
//! round counter, timer, round records, leaderboard) and a
//! [`RecordService`] for persistence. The front end feeds it discrete
//! events (a cell tap, a timer tick, a settings change, focus changes) and
//! reads plain data back.
//!
//! Storage failures never interrupt play. They are logged and the
//! in-memory state stays authoritative.

use chrono::Utc;
use derive_getters::Getters;
use gridtoe_core::{
    Board, Coord, CriticalChange, GameResult, Leaderboard, LeaderboardEntry, MatchController,
    MatchError, MatchPhase, MatchResult, MoveError, Player, RecordBook, Round, RoundLog, Score,
    Settings, SettingsError, Symbol,
};
use tracing::{debug, info, instrument, warn};

use crate::records::RecordService;
use crate::storage::KeyValueStore;
use crate::timer::{RoundTimer, TimerHandle};

/// What the timer did in response to a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerSignal {
    /// First move of a timed round; tick with this handle.
    Started(TimerHandle),
    /// The round's timer continues after a pause; tick with this handle.
    Resumed(TimerHandle),
    /// The round ended and the timer stopped.
    Stopped,
    /// Nothing changed.
    Unchanged,
}

/// Result of an accepted move.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct MoveOutcome {
    /// Round result after the move.
    result: GameResult,
    /// Match phase after the move.
    phase: MatchPhase,
    /// Timer transition caused by the move.
    timer: TimerSignal,
    /// Leaderboard entry created if the move ended the match.
    entry: Option<LeaderboardEntry>,
}

/// How a settings proposal was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsChange {
    /// Settings took effect (and were saved).
    Applied,
    /// A match-critical field changed mid-match. The proposal is held
    /// until [`GameSession::resolve_pending_settings`] is called.
    NeedsConfirmation(CriticalChange),
}

/// What regaining focus changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters)]
pub struct FocusOutcome {
    /// How the stored settings were handled.
    settings: SettingsChange,
    /// Whether the round timer picked up again.
    timer: TimerSignal,
}

/// Rejected session operation.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::From)]
pub enum SessionError {
    /// The move was illegal.
    #[display("Invalid move: {}", _0)]
    Move(MoveError),
    /// The match is not in a phase that allows the operation.
    #[display("Invalid match transition: {}", _0)]
    Match(MatchError),
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Move(e) => Some(e),
            SessionError::Match(e) => Some(e),
        }
    }
}

/// A running match plus its persisted records.
#[derive(Debug)]
pub struct GameSession<S> {
    settings: Settings,
    round: Round,
    matchplay: MatchController,
    timer: RoundTimer,
    // the current round started with timing on and has stayed timed
    timed_round: bool,
    records: RecordBook,
    pending: Option<Settings>,
    service: RecordService<S>,
}

impl<S: KeyValueStore> GameSession<S> {
    /// Opens a session with settings and the leaderboard loaded from
    /// `service`, starting a fresh match.
    ///
    /// Round records left by an unfinished match are discarded.
    #[instrument(skip(service))]
    pub fn new(service: RecordService<S>) -> Self {
        let settings = service.load_settings_or_default();
        let mut records = service.load_record_book_or_default();
        if !records.rounds().is_empty() {
            debug!(count = records.rounds().len(), "Dropping stale round records");
            records.clear_rounds();
        }
        let mut session = Self {
            round: Round::new(*settings.grid_size(), *settings.win_length()),
            matchplay: MatchController::new(*settings.max_rounds()),
            timer: RoundTimer::new(),
            timed_round: false,
            records,
            pending: None,
            settings,
            service,
        };
        session.persist_rounds();
        info!(
            grid = session.settings.grid_size(),
            win = session.settings.win_length(),
            rounds = session.settings.max_rounds(),
            "Session ready"
        );
        session
    }

    // ─────────────────────────────────────────────────────────────
    //  Read side
    // ─────────────────────────────────────────────────────────────

    /// Current board.
    pub fn board(&self) -> &Board {
        self.round.board()
    }

    /// Result of the current round.
    pub fn game_result(&self) -> &GameResult {
        self.round.result()
    }

    /// Cumulative match score.
    pub fn score(&self) -> &Score {
        self.matchplay.score()
    }

    /// One-based round number.
    pub fn round(&self) -> u32 {
        self.matchplay.current_round()
    }

    /// Final match result once complete.
    pub fn match_result(&self) -> Option<MatchResult> {
        self.matchplay.result()
    }

    /// Match phase.
    pub fn phase(&self) -> &MatchPhase {
        self.matchplay.phase()
    }

    /// Player to move (or who made the final move of a finished round).
    pub fn current_player(&self) -> Player {
        self.round.to_move()
    }

    /// Symbol of the player to move.
    pub fn current_symbol(&self) -> &Symbol {
        self.settings.symbol(self.round.to_move())
    }

    /// Active settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Settings proposal awaiting confirmation.
    pub fn pending_settings(&self) -> Option<&Settings> {
        self.pending.as_ref()
    }

    /// Leaderboard as currently held in memory.
    pub fn leaderboard(&self) -> &Leaderboard {
        self.records.leaderboard()
    }

    /// Timed round wins of the current match.
    pub fn round_records(&self) -> &RoundLog {
        self.records.rounds()
    }

    /// Seconds on the round timer.
    pub fn elapsed_seconds(&self) -> u64 {
        self.timer.elapsed_seconds()
    }

    /// Handle of the running timer, if any.
    pub fn timer_handle(&self) -> Option<TimerHandle> {
        self.timer.handle()
    }

    /// The persistence service.
    pub fn service(&self) -> &RecordService<S> {
        &self.service
    }

    // ─────────────────────────────────────────────────────────────
    //  Moves and rounds
    // ─────────────────────────────────────────────────────────────

    /// Places the current player's mark at `coord`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Move`] for an illegal move and
    /// [`SessionError::Match`] when no round is in progress. Nothing
    /// changes on error.
    #[instrument(skip(self), fields(round = self.round(), player = ?self.current_player()))]
    pub fn apply_move(&mut self, coord: Coord) -> Result<MoveOutcome, SessionError> {
        if *self.matchplay.phase() != MatchPhase::RoundInProgress {
            return Err(MatchError::NoRoundInProgress.into());
        }

        let mover = self.round.to_move();
        let first_move = self.round.history().is_empty();
        let result = self.round.place(coord)?.clone();

        let mut timer = TimerSignal::Unchanged;
        if first_move && *self.settings.enable_timer() {
            self.timed_round = true;
            timer = TimerSignal::Started(self.timer.start());
        }

        if !result.is_terminal() {
            return Ok(MoveOutcome {
                result,
                phase: MatchPhase::RoundInProgress,
                timer,
                entry: None,
            });
        }

        let was_running = self.timer.is_active();
        let elapsed = self.timer.stop();
        if was_running {
            timer = TimerSignal::Stopped;
        }

        if let Some(winner) = result.winner() {
            debug_assert_eq!(winner, mover);
            if self.timed_round && *self.settings.enable_timer() {
                let symbol = self.settings.symbol(winner).clone();
                let round = self.matchplay.current_round();
                self.records.record_round_win(winner, symbol, elapsed, round);
                self.persist_rounds();
            }
        }

        let phase = self.matchplay.finish_round(&result)?.clone();
        let mut entry = None;
        if let MatchPhase::Complete { result: outcome } = phase {
            info!(%outcome, score = %self.matchplay.score(), "Match finished");
            entry = self
                .records
                .finalize_match(self.matchplay.score(), &self.settings, Utc::now());
            if entry.is_some() {
                self.persist_leaderboard();
            }
            self.persist_rounds();
        }

        Ok(MoveOutcome {
            result,
            phase,
            timer,
            entry,
        })
    }

    /// Advances a timer tick. Stale handles are ignored.
    pub fn tick(&mut self, handle: TimerHandle) -> bool {
        self.timer.tick(handle)
    }

    /// Starts the next round after one just ended: fresh board, player
    /// one to move.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Match`] unless a round just ended.
    #[instrument(skip(self))]
    pub fn next_round(&mut self) -> Result<u32, SessionError> {
        let round = self.matchplay.start_next_round()?;
        self.fresh_round();
        Ok(round)
    }

    /// Throws away the board of the round in progress.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Match`] when no round is in progress.
    #[instrument(skip(self))]
    pub fn reset_round(&mut self) -> Result<(), SessionError> {
        if *self.matchplay.phase() != MatchPhase::RoundInProgress {
            return Err(MatchError::NoRoundInProgress.into());
        }
        self.fresh_round();
        Ok(())
    }

    /// Starts the match over: round one, zero score, no round records.
    #[instrument(skip(self))]
    pub fn reset_match(&mut self) {
        self.matchplay.reset_with(*self.settings.max_rounds());
        self.records.clear_rounds();
        self.fresh_round();
        self.persist_rounds();
        info!("Match reset");
    }

    /// True once play has started and the match is not yet complete.
    pub fn match_in_progress(&self) -> bool {
        if self.matchplay.is_complete() {
            return false;
        }
        !self.round.history().is_empty() || self.matchplay.score().rounds_played() > 0
    }

    // ─────────────────────────────────────────────────────────────
    //  Settings
    // ─────────────────────────────────────────────────────────────

    /// Proposes new settings.
    ///
    /// Cosmetic changes apply at once. A change to grid size, win length,
    /// or round count while a match is under way is held pending so the
    /// player can choose between finishing with the old settings and
    /// discarding the match.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] for invalid settings; nothing changes.
    #[instrument(skip(self, proposed))]
    pub fn apply_settings(&mut self, proposed: Settings) -> Result<SettingsChange, SettingsError> {
        proposed.validate()?;
        let change = self.settings.critical_change(&proposed);

        if change.any() && self.match_in_progress() {
            info!(?change, "Critical settings change held for confirmation");
            self.pending = Some(proposed);
            return Ok(SettingsChange::NeedsConfirmation(change));
        }

        self.pending = None;
        self.settings = proposed;
        self.persist_settings();
        if change.any() {
            self.reset_match();
        }
        if !*self.settings.enable_timer() && self.timed_round {
            debug!("Timing turned off mid-round, round will not be recorded");
            self.timer.stop();
            self.timed_round = false;
        }
        Ok(SettingsChange::Applied)
    }

    /// Answers a pending settings proposal.
    ///
    /// With `discard_match` the proposal is applied and the match starts
    /// over. Without it the proposal is dropped and the match continues
    /// untouched. Returns whether a proposal was pending.
    #[instrument(skip(self))]
    pub fn resolve_pending_settings(&mut self, discard_match: bool) -> bool {
        let Some(proposed) = self.pending.take() else {
            return false;
        };
        if discard_match {
            self.settings = proposed;
            self.persist_settings();
            self.reset_match();
            info!("Pending settings applied, match discarded");
        } else {
            debug!("Pending settings dropped");
        }
        true
    }

    // ─────────────────────────────────────────────────────────────
    //  Lifecycle and records
    // ─────────────────────────────────────────────────────────────

    /// Screen gained focus: re-read settings from storage and pick the
    /// round timer up again if a blur stopped it.
    ///
    /// A store that cannot be read, or holds no settings, leaves the
    /// in-memory settings as they are. A stored blob that parses but fails
    /// validation is replaced by defaults.
    ///
    /// # Errors
    ///
    /// Propagates [`GameSession::apply_settings`] errors.
    #[instrument(skip(self))]
    pub fn on_focus(&mut self) -> Result<FocusOutcome, SettingsError> {
        let settings = match self.service.load_settings() {
            Ok(Some(stored)) => {
                let stored = match stored.validate() {
                    Ok(()) => stored,
                    Err(e) => {
                        warn!(error = %e, "Stored settings invalid, using defaults");
                        Settings::default()
                    }
                };
                if stored == self.settings {
                    SettingsChange::Applied
                } else {
                    self.apply_settings(stored)?
                }
            }
            Ok(None) => {
                debug!("No stored settings, keeping current");
                SettingsChange::Applied
            }
            Err(e) => {
                warn!(error = %e, "Failed to load settings, keeping current");
                SettingsChange::Applied
            }
        };
        let timer = self.resume_timer();
        Ok(FocusOutcome { settings, timer })
    }

    /// Screen lost focus: stop any running timer.
    #[instrument(skip(self))]
    pub fn on_blur(&mut self) {
        self.timer.stop();
    }

    /// Empties the leaderboard and round records, in memory and in storage.
    #[instrument(skip(self))]
    pub fn clear_leaderboard(&mut self) {
        self.records.clear_all();
        if let Err(e) = self.service.clear_data() {
            warn!(error = %e, "Failed to clear stored records");
        }
    }

    fn fresh_round(&mut self) {
        self.round = Round::new(*self.settings.grid_size(), *self.settings.win_length());
        self.timer.reset();
        self.timed_round = false;
    }

    fn resume_timer(&mut self) -> TimerSignal {
        let resumable = self.timed_round
            && *self.settings.enable_timer()
            && !self.timer.is_active()
            && *self.matchplay.phase() == MatchPhase::RoundInProgress;
        if !resumable {
            return TimerSignal::Unchanged;
        }
        TimerSignal::Resumed(self.timer.resume())
    }

    fn persist_settings(&mut self) {
        if let Err(e) = self.service.save_settings(&self.settings) {
            warn!(error = %e, "Failed to save settings");
        }
    }

    fn persist_rounds(&mut self) {
        if let Err(e) = self.service.save_round_records(self.records.rounds()) {
            warn!(error = %e, "Failed to save round records");
        }
    }

    fn persist_leaderboard(&mut self) {
        if let Err(e) = self.service.save_leaderboard(self.records.leaderboard()) {
            warn!(error = %e, "Failed to save leaderboard");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, SETTINGS_KEY};

    fn session() -> GameSession<MemoryStore> {
        GameSession::new(RecordService::new(MemoryStore::new()))
    }

    #[test]
    fn test_focus_applies_changed_stored_settings() {
        let mut session = session();
        session
            .service
            .store_mut()
            .set(SETTINGS_KEY, r#"{"gridSize":4,"winLength":4}"#.to_string())
            .unwrap();
        let focus = session.on_focus().unwrap();
        assert_eq!(*focus.settings(), SettingsChange::Applied);
        assert_eq!(session.board().size(), 4);
    }

    #[test]
    fn test_focus_with_invalid_stored_settings_uses_defaults() {
        let mut session = session();
        let mut custom = Settings::new();
        custom.set_grid_size(5).unwrap();
        session.apply_settings(custom).unwrap();
        session
            .service
            .store_mut()
            .set(
                SETTINGS_KEY,
                r#"{"player1Symbol":"Q","player2Symbol":"Q"}"#.to_string(),
            )
            .unwrap();

        session.on_focus().unwrap();
        assert_eq!(session.settings(), &Settings::default());
    }

    #[test]
    fn test_focus_with_missing_settings_keeps_current() {
        let mut session = session();
        let mut custom = Settings::new();
        custom.set_name(Player::Two, "Grace");
        session.apply_settings(custom.clone()).unwrap();
        session.service.store_mut().remove(SETTINGS_KEY).unwrap();

        session.on_focus().unwrap();
        assert_eq!(session.settings(), &custom);
    }
}
