//! gridtoe - tic-tac-toe on configurable grids
//!
//! The rules engine lives in [`gridtoe_core`]. This crate adds what an
//! application needs around it.
//!
//! # Architecture
//!
//! - **Session**: one running match with its timer and records
//! - **Records**: typed load/save of settings, leaderboard, and round logs
//! - **Storage**: key-value persistence (SQLite via diesel, or in memory)
//! - **Terminal**: a line-oriented front end
//!
//! # Example
//!
//! ```no_run
//! use gridtoe::{GameSession, MemoryStore, RecordService};
//! use gridtoe_core::Coord;
//!
//! let mut session = GameSession::new(RecordService::new(MemoryStore::new()));
//! session.apply_move(Coord::new(1, 1))?;
//! # Ok::<(), gridtoe::SessionError>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod cli;
mod config;
mod records;
mod session;
mod storage;
mod terminal;
mod timer;

// Crate-level exports - Command line
pub use cli::{Cli, Command, SettingsAction, SettingsArgs};

// Crate-level exports - Configuration
pub use config::{AppConfig, ConfigError};

// Crate-level exports - Records
pub use records::RecordService;

// Crate-level exports - Session
pub use session::{
    FocusOutcome, GameSession, MoveOutcome, SessionError, SettingsChange, TimerSignal,
};

// Crate-level exports - Storage
pub use storage::{
    KeyValueStore, KvEntry, LEADERBOARD_KEY, MemoryStore, NewKvEntry, ROUNDS_KEY, SETTINGS_KEY,
    SqliteStore, StorageError,
};

// Crate-level exports - Terminal front end
pub use terminal::{Input, Terminal, render_leaderboard, render_settings};

// Crate-level exports - Timer
pub use timer::{RoundTimer, TimerHandle};
