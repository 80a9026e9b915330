//! Match settings and their validation.
//!
//! Settings are persisted as a JSON object under the `gameSettings` key,
//! so field names follow that blob's camelCase layout.

use crate::{Player, Symbol};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use tracing::{debug, instrument, warn};

/// Allowed board side lengths.
pub const GRID_SIZES: RangeInclusive<usize> = 3..=6;

/// Shortest allowed winning run.
pub const MIN_WIN_LENGTH: usize = 3;

/// Allowed numbers of rounds per match.
pub const ROUND_OPTIONS: [u32; 5] = [1, 3, 5, 7, 10];

/// Rejected settings input. Nothing is changed when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum SettingsError {
    /// Grid size outside [`GRID_SIZES`].
    #[display("Grid size {} is not between 3 and 6", _0)]
    GridSize(usize),

    /// Win length shorter than [`MIN_WIN_LENGTH`] or longer than the grid.
    #[display("Win length {} must be between 3 and the grid size {}", _0, _1)]
    WinLength(usize, usize),

    /// Round count not in [`ROUND_OPTIONS`].
    #[display("{} rounds is not one of 1, 3, 5, 7, 10", _0)]
    MaxRounds(u32),

    /// Blank player symbol.
    #[display("{}'s symbol cannot be blank", _0)]
    BlankSymbol(Player),

    /// Both players would draw with the same symbol.
    #[display("Symbol '{}' is already used by the other player", _0)]
    DuplicateSymbol(Symbol),
}

impl std::error::Error for SettingsError {}

/// Which match-critical fields differ between two settings.
///
/// Grid size, win length, and round count all invalidate a match in
/// progress; names, symbols, timer, and sounds do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CriticalChange {
    /// Grid size differs.
    pub grid_size: bool,
    /// Win length differs.
    pub win_length: bool,
    /// Round count differs.
    pub max_rounds: bool,
}

impl CriticalChange {
    /// True if any match-critical field differs.
    pub fn any(&self) -> bool {
        self.grid_size || self.win_length || self.max_rounds
    }
}

/// User-configurable match settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Board side length.
    grid_size: usize,
    /// Run length needed to win a round.
    win_length: usize,
    /// Rounds scheduled per match.
    max_rounds: u32,
    /// Player one's symbol.
    player1_symbol: Symbol,
    /// Player two's symbol.
    player2_symbol: Symbol,
    /// Player one's display name.
    player1_name: String,
    /// Player two's display name.
    player2_name: String,
    /// Time rounds and record leaderboard entries.
    enable_timer: bool,
    /// Play sound effects (front-end concern).
    enable_sounds: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            grid_size: 3,
            win_length: 3,
            max_rounds: 3,
            player1_symbol: Symbol::new("X"),
            player2_symbol: Symbol::new("O"),
            player1_name: "Player 1".to_string(),
            player2_name: "Player 2".to_string(),
            enable_timer: true,
            enable_sounds: true,
        }
    }
}

impl Settings {
    /// Creates default settings.
    #[instrument]
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks every invariant.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule.
    #[instrument(skip(self))]
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !GRID_SIZES.contains(&self.grid_size) {
            return Err(SettingsError::GridSize(self.grid_size));
        }
        if self.win_length < MIN_WIN_LENGTH || self.win_length > self.grid_size {
            return Err(SettingsError::WinLength(self.win_length, self.grid_size));
        }
        if !ROUND_OPTIONS.contains(&self.max_rounds) {
            return Err(SettingsError::MaxRounds(self.max_rounds));
        }
        for player in Player::BOTH {
            if self.symbol(player).is_blank() {
                return Err(SettingsError::BlankSymbol(player));
            }
        }
        if self.player1_symbol == self.player2_symbol {
            return Err(SettingsError::DuplicateSymbol(self.player2_symbol.clone()));
        }
        Ok(())
    }

    /// Symbol drawn by `player`.
    pub fn symbol(&self, player: Player) -> &Symbol {
        match player {
            Player::One => &self.player1_symbol,
            Player::Two => &self.player2_symbol,
        }
    }

    /// Display name of `player`.
    pub fn name(&self, player: Player) -> &str {
        match player {
            Player::One => &self.player1_name,
            Player::Two => &self.player2_name,
        }
    }

    /// Fixed seat label, independent of the chosen name.
    pub fn label(&self, player: Player) -> String {
        player.to_string()
    }

    /// Which seat draws with `symbol`, if either.
    pub fn player_for(&self, symbol: &Symbol) -> Option<Player> {
        Player::BOTH
            .into_iter()
            .find(|&p| self.symbol(p) == symbol)
    }

    /// Sets the grid size, shrinking the win length to fit.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::GridSize`] outside [`GRID_SIZES`].
    #[instrument(skip(self))]
    pub fn set_grid_size(&mut self, grid_size: usize) -> Result<(), SettingsError> {
        if !GRID_SIZES.contains(&grid_size) {
            return Err(SettingsError::GridSize(grid_size));
        }
        self.grid_size = grid_size;
        if self.win_length > grid_size {
            debug!(from = self.win_length, to = grid_size, "Clamping win length");
            self.win_length = grid_size;
        }
        Ok(())
    }

    /// Sets the win length.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::WinLength`] if shorter than
    /// [`MIN_WIN_LENGTH`] or longer than the grid.
    #[instrument(skip(self))]
    pub fn set_win_length(&mut self, win_length: usize) -> Result<(), SettingsError> {
        if win_length < MIN_WIN_LENGTH || win_length > self.grid_size {
            return Err(SettingsError::WinLength(win_length, self.grid_size));
        }
        self.win_length = win_length;
        Ok(())
    }

    /// Sets the number of rounds per match.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::MaxRounds`] unless listed in [`ROUND_OPTIONS`].
    #[instrument(skip(self))]
    pub fn set_max_rounds(&mut self, max_rounds: u32) -> Result<(), SettingsError> {
        if !ROUND_OPTIONS.contains(&max_rounds) {
            return Err(SettingsError::MaxRounds(max_rounds));
        }
        self.max_rounds = max_rounds;
        Ok(())
    }

    /// Sets `player`'s symbol.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::BlankSymbol`] for blank input and
    /// [`SettingsError::DuplicateSymbol`] if the opponent already uses it.
    #[instrument(skip(self))]
    pub fn set_symbol(&mut self, player: Player, symbol: Symbol) -> Result<(), SettingsError> {
        if symbol.is_blank() {
            return Err(SettingsError::BlankSymbol(player));
        }
        if self.symbol(player.opponent()) == &symbol {
            warn!(%symbol, ?player, "Duplicate symbol rejected");
            return Err(SettingsError::DuplicateSymbol(symbol));
        }
        match player {
            Player::One => self.player1_symbol = symbol,
            Player::Two => self.player2_symbol = symbol,
        }
        Ok(())
    }

    /// Sets both symbols at once, which allows swapping them.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::BlankSymbol`] or
    /// [`SettingsError::DuplicateSymbol`]; neither symbol changes.
    #[instrument(skip(self))]
    pub fn set_symbols(&mut self, first: Symbol, second: Symbol) -> Result<(), SettingsError> {
        if first.is_blank() {
            return Err(SettingsError::BlankSymbol(Player::One));
        }
        if second.is_blank() {
            return Err(SettingsError::BlankSymbol(Player::Two));
        }
        if first == second {
            return Err(SettingsError::DuplicateSymbol(second));
        }
        self.player1_symbol = first;
        self.player2_symbol = second;
        Ok(())
    }

    /// Sets `player`'s display name. Blank input restores the seat label.
    #[instrument(skip(self))]
    pub fn set_name(&mut self, player: Player, name: impl Into<String> + std::fmt::Debug) {
        let name = name.into().trim().to_string();
        let name = if name.is_empty() { player.to_string() } else { name };
        match player {
            Player::One => self.player1_name = name,
            Player::Two => self.player2_name = name,
        }
    }

    /// Turns round timing on or off.
    pub fn set_timer(&mut self, enabled: bool) {
        self.enable_timer = enabled;
    }

    /// Turns sound effects on or off.
    pub fn set_sounds(&mut self, enabled: bool) {
        self.enable_sounds = enabled;
    }

    /// Compares the match-critical fields of `self` and `other`.
    pub fn critical_change(&self, other: &Settings) -> CriticalChange {
        CriticalChange {
            grid_size: self.grid_size != other.grid_size,
            win_length: self.win_length != other.win_length,
            max_rounds: self.max_rounds != other.max_rounds,
        }
    }
}
