//! Command-line interface for gridtoe.

use clap::{Parser, Subcommand};
use gridtoe_core::{Player, Settings, SettingsError, Symbol};
use std::path::PathBuf;
use tracing::instrument;

/// gridtoe - tic-tac-toe on configurable grids
#[derive(Parser, Debug)]
#[command(name = "gridtoe")]
#[command(about = "Tic-tac-toe on 3x3 to 6x6 grids with matches and a leaderboard", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the TOML config file
    #[arg(long, global = true, default_value = "gridtoe.toml")]
    pub config: PathBuf,

    /// Database file (overrides the config file)
    #[arg(long, global = true)]
    pub db_path: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play a match in the terminal
    Play {
        /// Keep everything in memory; nothing is saved
        #[arg(long)]
        ephemeral: bool,
    },

    /// Show the leaderboard
    Leaderboard,

    /// Delete the leaderboard and round records
    Clear,

    /// Show or change game settings
    Settings {
        /// Settings action
        #[command(subcommand)]
        action: SettingsAction,
    },
}

/// Settings subcommands
#[derive(Subcommand, Debug)]
pub enum SettingsAction {
    /// Print the stored settings
    Show,

    /// Change one or more settings
    Set(SettingsArgs),
}

/// Fields accepted by `settings set`
#[derive(clap::Args, Debug, Default)]
pub struct SettingsArgs {
    /// Board side length (3-6)
    #[arg(long)]
    pub grid_size: Option<usize>,

    /// Marks in a row needed to win (3 up to the grid size)
    #[arg(long)]
    pub win_length: Option<usize>,

    /// Rounds per match (1, 3, 5, 7, or 10)
    #[arg(long)]
    pub max_rounds: Option<u32>,

    /// Player one's symbol
    #[arg(long)]
    pub player1_symbol: Option<String>,

    /// Player two's symbol
    #[arg(long)]
    pub player2_symbol: Option<String>,

    /// Player one's name
    #[arg(long)]
    pub player1_name: Option<String>,

    /// Player two's name
    #[arg(long)]
    pub player2_name: Option<String>,

    /// Time rounds and keep a leaderboard
    #[arg(long)]
    pub timer: Option<bool>,

    /// Play sounds
    #[arg(long)]
    pub sounds: Option<bool>,
}

impl SettingsArgs {
    /// Applies the given fields to a copy of `base`.
    ///
    /// # Errors
    ///
    /// Returns the first [`SettingsError`]; `base` is never modified.
    #[instrument(skip(base))]
    pub fn apply(&self, base: &Settings) -> Result<Settings, SettingsError> {
        let mut next = base.clone();
        if let Some(grid_size) = self.grid_size {
            next.set_grid_size(grid_size)?;
        }
        if let Some(win_length) = self.win_length {
            next.set_win_length(win_length)?;
        }
        if let Some(max_rounds) = self.max_rounds {
            next.set_max_rounds(max_rounds)?;
        }
        if self.player1_symbol.is_some() || self.player2_symbol.is_some() {
            let first = self
                .player1_symbol
                .as_deref()
                .map(Symbol::new)
                .unwrap_or_else(|| next.symbol(Player::One).clone());
            let second = self
                .player2_symbol
                .as_deref()
                .map(Symbol::new)
                .unwrap_or_else(|| next.symbol(Player::Two).clone());
            next.set_symbols(first, second)?;
        }
        if let Some(name) = &self.player1_name {
            next.set_name(Player::One, name.as_str());
        }
        if let Some(name) = &self.player2_name {
            next.set_name(Player::Two, name.as_str());
        }
        if let Some(timer) = self.timer {
            next.set_timer(timer);
        }
        if let Some(sounds) = self.sounds {
            next.set_sounds(sounds);
        }
        next.validate()?;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_settings_set() {
        let cli = Cli::try_parse_from([
            "gridtoe",
            "settings",
            "set",
            "--grid-size",
            "5",
            "--win-length",
            "4",
            "--timer",
            "false",
        ])
        .unwrap();
        let Command::Settings {
            action: SettingsAction::Set(args),
        } = cli.command
        else {
            panic!("expected settings set");
        };
        let settings = args.apply(&Settings::new()).unwrap();
        assert_eq!(*settings.grid_size(), 5);
        assert_eq!(*settings.win_length(), 4);
        assert!(!settings.enable_timer());
    }

    #[test]
    fn test_duplicate_symbol_leaves_base_untouched() {
        let base = Settings::new();
        let args = SettingsArgs {
            player2_symbol: Some("X".to_string()),
            ..Default::default()
        };
        assert_eq!(
            args.apply(&base),
            Err(SettingsError::DuplicateSymbol(Symbol::new("X")))
        );
        assert_eq!(base, Settings::new());
    }

    #[test]
    fn test_swap_symbols() {
        let args = SettingsArgs {
            player1_symbol: Some("O".to_string()),
            player2_symbol: Some("X".to_string()),
            ..Default::default()
        };
        let settings = args.apply(&Settings::new()).unwrap();
        assert_eq!(settings.symbol(Player::Two), &Symbol::new("X"));
    }
}
