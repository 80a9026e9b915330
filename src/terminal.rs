//! Line-oriented terminal front end.
//!
//! Reads one command per line and prints the board after every change.
//! The round timer is driven from wall-clock time: before each command
//! the whole seconds elapsed since the timer started are delivered as
//! ticks, so the session sees exactly one tick per second of play.

use anyhow::Result;
use gridtoe_core::{Coord, GameResult, Leaderboard, MatchPhase, Player, Settings};
use std::io::{BufRead, Write};
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::session::{GameSession, SessionError, SettingsChange, TimerSignal};
use crate::storage::KeyValueStore;
use crate::timer::TimerHandle;

const HELP: &str = "\
Commands:
  <row> <col>   place your mark (zero-based, e.g. `1 2`)
  n             start the next round
  r             restart the current round
  m             start a new match
  s             show the score
  l             show the leaderboard
  o             reload stored settings
  h             show this help
  q             quit";

/// One line of player input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// Place a mark.
    Move(Coord),
    /// Start the next round.
    NextRound,
    /// Restart the round in progress.
    ResetRound,
    /// Start a new match.
    ResetMatch,
    /// Print the score.
    Score,
    /// Print the leaderboard.
    Leaderboard,
    /// Reload settings from storage.
    Reload,
    /// Print help.
    Help,
    /// Leave.
    Quit,
}

impl Input {
    /// Parses a trimmed input line. Returns `None` for anything unknown.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let input = match line.to_ascii_lowercase().as_str() {
            "n" | "next" => Input::NextRound,
            "r" | "restart" => Input::ResetRound,
            "m" | "match" => Input::ResetMatch,
            "s" | "score" => Input::Score,
            "l" | "leaderboard" => Input::Leaderboard,
            "o" | "reload" => Input::Reload,
            "h" | "help" | "?" => Input::Help,
            "q" | "quit" | "exit" => Input::Quit,
            _ => Input::Move(Coord::parse(line)?),
        };
        Some(input)
    }
}

/// Wall-clock anchor for the running round timer.
#[derive(Debug, Clone, Copy)]
struct TickClock {
    handle: TimerHandle,
    started: Instant,
    delivered: u64,
}

/// Interactive game loop over any line reader and writer.
#[derive(Debug)]
pub struct Terminal<R, W> {
    input: R,
    output: W,
    clock: Option<TickClock>,
}

impl<R: BufRead, W: Write> Terminal<R, W> {
    /// Creates a terminal reading from `input` and printing to `output`.
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            clock: None,
        }
    }

    /// Consumes the terminal, returning the writer.
    pub fn into_output(self) -> W {
        self.output
    }

    /// Runs until `q` or end of input.
    ///
    /// # Errors
    ///
    /// Returns an error only if reading or writing fails. Rejected moves
    /// and commands are reported to the player and play continues.
    #[instrument(skip_all)]
    pub fn run<S: KeyValueStore>(&mut self, session: &mut GameSession<S>) -> Result<()> {
        info!("Terminal session started");
        writeln!(self.output, "gridtoe. Type h for help.")?;
        self.print_board(session)?;

        let mut line = String::new();
        loop {
            self.prompt(session)?;
            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                debug!("End of input");
                break;
            }
            self.sync_clock(session);

            let Some(input) = Input::parse(&line) else {
                if !line.trim().is_empty() {
                    writeln!(self.output, "Unknown command '{}'. Type h for help.", line.trim())?;
                }
                continue;
            };
            if input == Input::Quit {
                break;
            }
            self.handle(session, input)?;
        }

        session.on_blur();
        info!("Terminal session ended");
        Ok(())
    }

    fn handle<S: KeyValueStore>(&mut self, session: &mut GameSession<S>, input: Input) -> Result<()> {
        match input {
            Input::Move(coord) => self.play(session, coord)?,
            Input::NextRound => match session.next_round() {
                Ok(round) => {
                    self.clock = None;
                    writeln!(self.output, "Round {} begins.", round)?;
                    self.print_board(session)?;
                }
                Err(e) => self.report(&e)?,
            },
            Input::ResetRound => match session.reset_round() {
                Ok(()) => {
                    self.clock = None;
                    self.print_board(session)?;
                }
                Err(e) => self.report(&e)?,
            },
            Input::ResetMatch => {
                session.reset_match();
                self.clock = None;
                writeln!(self.output, "New match.")?;
                self.print_board(session)?;
            }
            Input::Score => self.print_score(session)?,
            Input::Leaderboard => {
                write!(self.output, "{}", render_leaderboard(session.leaderboard()))?;
            }
            Input::Reload => self.reload(session)?,
            Input::Help => writeln!(self.output, "{}", HELP)?,
            Input::Quit => {}
        }
        Ok(())
    }

    fn play<S: KeyValueStore>(&mut self, session: &mut GameSession<S>, coord: Coord) -> Result<()> {
        let outcome = match session.apply_move(coord) {
            Ok(outcome) => outcome,
            Err(e) => return self.report(&e),
        };

        self.follow_timer(*outcome.timer());

        self.print_board(session)?;
        match outcome.result() {
            GameResult::Won { player, line } => {
                let cells: Vec<String> = line.cells().iter().map(ToString::to_string).collect();
                writeln!(
                    self.output,
                    "{} wins the round! ({})",
                    session.settings().name(*player),
                    cells.join(" ")
                )?;
            }
            GameResult::Tie => writeln!(self.output, "Round tied.")?,
            GameResult::InProgress => {}
        }

        match outcome.phase() {
            MatchPhase::RoundJustEnded { .. } => {
                self.print_score(session)?;
                writeln!(self.output, "Type n for the next round.")?;
            }
            MatchPhase::Complete { result } => {
                self.print_score(session)?;
                match result.winner() {
                    Some(player) => writeln!(
                        self.output,
                        "{} wins the match!",
                        session.settings().name(player)
                    )?,
                    None => writeln!(self.output, "The match is tied.")?,
                }
                if let Some(entry) = outcome.entry() {
                    writeln!(
                        self.output,
                        "Leaderboard: {} averaged {:.1}s per win.",
                        entry.player_name(),
                        entry.average_win_time()
                    )?;
                }
                writeln!(self.output, "Type m for a new match.")?;
            }
            MatchPhase::RoundInProgress => {}
        }
        Ok(())
    }

    fn reload<S: KeyValueStore>(&mut self, session: &mut GameSession<S>) -> Result<()> {
        let focus = match session.on_focus() {
            Ok(focus) => focus,
            Err(e) => {
                warn!(error = %e, "Stored settings rejected");
                writeln!(self.output, "{}", e)?;
                return Ok(());
            }
        };
        self.follow_timer(*focus.timer());

        match focus.settings() {
            SettingsChange::Applied => {
                writeln!(self.output, "Settings loaded.")?;
                self.print_board(session)?;
            }
            SettingsChange::NeedsConfirmation(change) => {
                debug!(?change, "Asking before discarding the match");
                write!(
                    self.output,
                    "New grid, win length, or round count. Discard the current match? [y/N] "
                )?;
                self.output.flush()?;
                let mut answer = String::new();
                self.input.read_line(&mut answer)?;
                let discard = matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes");
                session.resolve_pending_settings(discard);
                if discard {
                    writeln!(self.output, "New match with the new settings.")?;
                    self.print_board(session)?;
                } else {
                    writeln!(self.output, "Keeping the current match.")?;
                }
            }
        }
        Ok(())
    }

    /// Anchors a new wall-clock for a started or resumed timer. A handle
    /// the session no longer honors is dropped by `sync_clock`.
    fn follow_timer(&mut self, signal: TimerSignal) {
        match signal {
            TimerSignal::Started(handle) | TimerSignal::Resumed(handle) => {
                self.clock = Some(TickClock {
                    handle,
                    started: Instant::now(),
                    delivered: 0,
                });
            }
            TimerSignal::Stopped => self.clock = None,
            TimerSignal::Unchanged => {}
        }
    }

    /// Delivers one tick per whole second since the timer started.
    fn sync_clock<S: KeyValueStore>(&mut self, session: &mut GameSession<S>) {
        let Some(clock) = self.clock.as_mut() else {
            return;
        };
        if session.timer_handle() != Some(clock.handle) {
            self.clock = None;
            return;
        }
        let due = clock.started.elapsed().as_secs();
        while clock.delivered < due {
            if !session.tick(clock.handle) {
                break;
            }
            clock.delivered += 1;
        }
    }

    fn prompt<S: KeyValueStore>(&mut self, session: &GameSession<S>) -> Result<()> {
        if *session.phase() == MatchPhase::RoundInProgress {
            let player = session.current_player();
            write!(
                self.output,
                "{} ({}) > ",
                session.settings().name(player),
                session.current_symbol()
            )?;
        } else {
            write!(self.output, "> ")?;
        }
        self.output.flush()?;
        Ok(())
    }

    fn print_board<S: KeyValueStore>(&mut self, session: &GameSession<S>) -> Result<()> {
        let settings = session.settings();
        let mut status = format!(
            "Round {} of {} | {} in a row",
            session.round(),
            settings.max_rounds(),
            settings.win_length()
        );
        if *settings.enable_timer() {
            status.push_str(&format!(" | {}s", session.elapsed_seconds()));
        }
        writeln!(self.output, "{}", status)?;
        let board = session
            .board()
            .render(|p| settings.symbol(p).as_str().to_string());
        write!(self.output, "{}", board)?;
        Ok(())
    }

    fn print_score<S: KeyValueStore>(&mut self, session: &GameSession<S>) -> Result<()> {
        let settings = session.settings();
        let score = session.score();
        writeln!(
            self.output,
            "Score: {} {} - {} {} ({} tied)",
            settings.name(Player::One),
            score.player1_wins(),
            score.player2_wins(),
            settings.name(Player::Two),
            score.ties()
        )?;
        Ok(())
    }

    fn report(&mut self, error: &SessionError) -> Result<()> {
        debug!(%error, "Command rejected");
        writeln!(self.output, "{}", error)?;
        Ok(())
    }
}

/// Formats the leaderboard as a ranked table.
pub fn render_leaderboard(leaderboard: &Leaderboard) -> String {
    if leaderboard.is_empty() {
        return "No leaderboard entries yet.\n".to_string();
    }
    let mut out = String::from("Rank  Player               Grid  Win  Avg (s)  Date\n");
    for (rank, entry) in leaderboard.entries().iter().enumerate() {
        out.push_str(&format!(
            "{:>4}  {:<20} {:>2}x{:<2} {:>3}  {:>7.1}  {}\n",
            rank + 1,
            format!("{} ({})", entry.player_name(), entry.symbol()),
            entry.grid_size(),
            entry.grid_size(),
            entry.win_length(),
            entry.average_win_time(),
            entry.date().format("%Y-%m-%d")
        ));
    }
    out
}

/// Formats settings one field per line.
pub fn render_settings(settings: &Settings) -> String {
    let mut out = String::new();
    out.push_str(&format!("grid size:   {}\n", settings.grid_size()));
    out.push_str(&format!("win length:  {}\n", settings.win_length()));
    out.push_str(&format!("max rounds:  {}\n", settings.max_rounds()));
    for player in Player::BOTH {
        out.push_str(&format!(
            "{}:    {} ({})\n",
            player,
            settings.name(player),
            settings.symbol(player)
        ));
    }
    out.push_str(&format!("timer:       {}\n", settings.enable_timer()));
    out.push_str(&format!("sounds:      {}\n", settings.enable_sounds()));
    out
}
