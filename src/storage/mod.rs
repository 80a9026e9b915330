//! Key/value persistence for settings and records.
//!
//! The game persists three JSON blobs under fixed keys. The
//! [`KeyValueStore`] trait is the seam: [`SqliteStore`] for real play,
//! [`MemoryStore`] for tests and throwaway sessions.

mod error;
mod memory;
mod models;
mod repository;
mod schema; // Diesel generated schema - internal use only

pub use error::StorageError;
pub use memory::MemoryStore;
pub use models::{KvEntry, NewKvEntry};
pub use repository::SqliteStore;

/// Key holding the settings blob.
pub const SETTINGS_KEY: &str = "gameSettings";
/// Key holding the leaderboard blob.
pub const LEADERBOARD_KEY: &str = "leaderboard";
/// Key holding the current match's round records.
pub const ROUNDS_KEY: &str = "roundsData";

/// String key/value storage.
pub trait KeyValueStore {
    /// Reads the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend is unavailable.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Writes `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend is unavailable.
    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError>;

    /// Deletes `key`. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend is unavailable.
    fn remove(&mut self, key: &str) -> Result<bool, StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<bool, StorageError> {
        (**self).remove(key)
    }
}
