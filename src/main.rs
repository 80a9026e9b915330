//! gridtoe - command-line entry point

#![warn(missing_docs)]

use anyhow::{Context, Result};
use clap::Parser;
use gridtoe::{
    AppConfig, Cli, Command, GameSession, KeyValueStore, MemoryStore, RecordService,
    SettingsAction, SettingsArgs, SqliteStore, Terminal, render_leaderboard, render_settings,
};
use std::io;
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&cli.config)?;
    if let Some(db_path) = cli.db_path.clone() {
        config = config.with_db_path(db_path);
    }

    // Logs go to stderr so they never interleave with the board
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_filter())),
        )
        .with_writer(io::stderr)
        .init();

    info!(db_path = %config.db_path().display(), "Starting gridtoe");

    match cli.command {
        Command::Play { ephemeral } => run_play(&config, ephemeral),
        Command::Leaderboard => run_leaderboard(&config),
        Command::Clear => run_clear(&config),
        Command::Settings { action } => match action {
            SettingsAction::Show => run_settings_show(&config),
            SettingsAction::Set(args) => run_settings_set(&config, &args),
        },
    }
}

#[instrument(skip(config))]
fn open_store(config: &AppConfig, ephemeral: bool) -> Result<Box<dyn KeyValueStore>> {
    if ephemeral {
        info!("Using in-memory store");
        return Ok(Box::new(MemoryStore::new()));
    }
    let store = SqliteStore::open(config.db_path())
        .with_context(|| format!("opening {}", config.db_path().display()))?;
    Ok(Box::new(store))
}

/// Play matches in the terminal
#[instrument(skip(config))]
fn run_play(config: &AppConfig, ephemeral: bool) -> Result<()> {
    let service = RecordService::new(open_store(config, ephemeral)?);
    let mut session = GameSession::new(service);
    let stdin = io::stdin();
    let mut terminal = Terminal::new(stdin.lock(), io::stdout());
    terminal.run(&mut session)
}

/// Print the leaderboard
#[instrument(skip(config))]
fn run_leaderboard(config: &AppConfig) -> Result<()> {
    let service = RecordService::new(open_store(config, false)?);
    let leaderboard = service.load_leaderboard()?;
    print!("{}", render_leaderboard(&leaderboard));
    Ok(())
}

/// Delete the leaderboard and round records
#[instrument(skip(config))]
fn run_clear(config: &AppConfig) -> Result<()> {
    let mut service = RecordService::new(open_store(config, false)?);
    service.clear_data()?;
    println!("Leaderboard cleared.");
    Ok(())
}

/// Print the stored settings
#[instrument(skip(config))]
fn run_settings_show(config: &AppConfig) -> Result<()> {
    let service = RecordService::new(open_store(config, false)?);
    print!("{}", render_settings(&service.load_settings_or_default()));
    Ok(())
}

/// Validate and store changed settings
#[instrument(skip(config))]
fn run_settings_set(config: &AppConfig, args: &SettingsArgs) -> Result<()> {
    let mut service = RecordService::new(open_store(config, false)?);
    let current = service.load_settings_or_default();
    let updated = args.apply(&current).inspect_err(|e| {
        warn!(error = %e, "Settings rejected");
    })?;
    service.save_settings(&updated)?;
    print!("{}", render_settings(&updated));
    Ok(())
}
