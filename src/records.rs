//! Typed access to persisted settings and records.

use gridtoe_core::{Leaderboard, LeaderboardEntry, RecordBook, RoundLog, Settings};
use tracing::{debug, info, instrument, warn};

use crate::storage::{KeyValueStore, LEADERBOARD_KEY, ROUNDS_KEY, SETTINGS_KEY, StorageError};

/// Service layer over a [`KeyValueStore`].
///
/// Every method is fallible; callers decide whether a failure matters.
/// The `*_or_default` loaders apply the fallback policy: log and carry on
/// with defaults.
#[derive(Debug, Clone)]
pub struct RecordService<S> {
    store: S,
}

impl<S: KeyValueStore> RecordService<S> {
    /// Creates a service backed by `store`.
    #[instrument(skip(store))]
    pub fn new(store: S) -> Self {
        info!("Creating RecordService");
        Self { store }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the underlying store mutably.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Loads stored settings, `None` if never saved.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the store fails or the blob is malformed.
    #[instrument(skip(self))]
    pub fn load_settings(&self) -> Result<Option<Settings>, StorageError> {
        self.load_json(SETTINGS_KEY)
    }

    /// Loads stored settings, falling back to defaults when missing,
    /// unreadable, or invalid.
    #[instrument(skip(self))]
    pub fn load_settings_or_default(&self) -> Settings {
        match self.load_settings() {
            Ok(Some(settings)) => match settings.validate() {
                Ok(()) => settings,
                Err(e) => {
                    warn!(error = %e, "Stored settings invalid, using defaults");
                    Settings::default()
                }
            },
            Ok(None) => {
                debug!("No stored settings, using defaults");
                Settings::default()
            }
            Err(e) => {
                warn!(error = %e, "Failed to load settings, using defaults");
                Settings::default()
            }
        }
    }

    /// Saves settings.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the store fails.
    #[instrument(skip(self, settings))]
    pub fn save_settings(&mut self, settings: &Settings) -> Result<(), StorageError> {
        self.save_json(SETTINGS_KEY, settings)
    }

    /// Loads the leaderboard, empty if never saved.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the store fails or the blob is malformed.
    #[instrument(skip(self))]
    pub fn load_leaderboard(&self) -> Result<Leaderboard, StorageError> {
        let entries: Option<Vec<LeaderboardEntry>> = self.load_json(LEADERBOARD_KEY)?;
        Ok(Leaderboard::from_entries(entries.unwrap_or_default()))
    }

    /// Saves the leaderboard.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the store fails.
    #[instrument(skip(self, leaderboard), fields(count = leaderboard.len()))]
    pub fn save_leaderboard(&mut self, leaderboard: &Leaderboard) -> Result<(), StorageError> {
        self.save_json(LEADERBOARD_KEY, leaderboard)
    }

    /// Loads the current match's round records, empty if never saved.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the store fails or the blob is malformed.
    #[instrument(skip(self))]
    pub fn load_round_records(&self) -> Result<RoundLog, StorageError> {
        Ok(self.load_json(ROUNDS_KEY)?.unwrap_or_default())
    }

    /// Saves the current match's round records.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the store fails.
    #[instrument(skip(self, log), fields(count = log.len()))]
    pub fn save_round_records(&mut self, log: &RoundLog) -> Result<(), StorageError> {
        self.save_json(ROUNDS_KEY, log)
    }

    /// Loads leaderboard and round records, substituting empty ones for
    /// anything unreadable.
    #[instrument(skip(self))]
    pub fn load_record_book_or_default(&self) -> RecordBook {
        let leaderboard = self.load_leaderboard().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load leaderboard, starting empty");
            Leaderboard::new()
        });
        let rounds = self.load_round_records().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load round records, starting empty");
            RoundLog::new()
        });
        RecordBook::new(leaderboard, rounds)
    }

    /// Removes the leaderboard and round records entirely.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the store fails; the first failure stops
    /// the operation.
    #[instrument(skip(self))]
    pub fn clear_data(&mut self) -> Result<(), StorageError> {
        let leaderboard = self.store.remove(LEADERBOARD_KEY)?;
        let rounds = self.store.remove(ROUNDS_KEY)?;
        info!(leaderboard, rounds, "Records cleared");
        Ok(())
    }

    fn load_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.store.get(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn save_json<T: serde::Serialize>(&mut self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value)?;
        self.store.set(key, raw)?;
        debug!(key, "Saved");
        Ok(())
    }
}
