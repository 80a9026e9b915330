//! SQLite-backed key/value store.

use chrono::Utc;
use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

use crate::storage::{KeyValueStore, KvEntry, NewKvEntry, StorageError, schema};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Key/value store persisted in a SQLite file.
///
/// Each operation opens its own connection, so the path must name a file;
/// `":memory:"` would hand every call a fresh, empty database.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db_path: PathBuf,
}

impl SqliteStore {
    /// Opens (creating if needed) the database at `db_path` and applies
    /// pending migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the file cannot be opened or migrated.
    #[instrument(skip(db_path), fields(db_path = %db_path.as_ref().display()))]
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let store = Self {
            db_path: db_path.as_ref().to_path_buf(),
        };
        let mut conn = store.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| StorageError::new(format!("Migration failed: {}", e)))?;
        info!(path = %store.db_path.display(), migrations = applied.len(), "SqliteStore opened");
        Ok(store)
    }

    /// Path of the database file.
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Lists every stored row, ordered by key.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn entries(&self) -> Result<Vec<KvEntry>, StorageError> {
        let mut conn = self.connection()?;
        let rows = schema::kv_entries::table
            .order(schema::kv_entries::key.asc())
            .select(KvEntry::as_select())
            .load(&mut conn)?;
        debug!(count = rows.len(), "Entries loaded");
        Ok(rows)
    }

    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, StorageError> {
        let url = self.db_path.to_string_lossy();
        debug!(path = %url, "Establishing connection");
        SqliteConnection::establish(&url)
            .map_err(|e| StorageError::new(format!("Failed to connect to '{}': {}", url, e)))
    }
}

impl KeyValueStore for SqliteStore {
    #[instrument(skip(self))]
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut conn = self.connection()?;
        let row = schema::kv_entries::table
            .find(key)
            .select(KvEntry::as_select())
            .first(&mut conn)
            .optional()?;
        debug!(found = row.is_some(), "Key looked up");
        Ok(row.map(KvEntry::into_value))
    }

    #[instrument(skip(self, value), fields(bytes = value.len()))]
    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        use schema::kv_entries::dsl;

        let mut conn = self.connection()?;
        let now = Utc::now().naive_utc();
        let row = NewKvEntry::new(key.to_string(), value.clone(), now);

        diesel::insert_into(dsl::kv_entries)
            .values(&row)
            .on_conflict(dsl::key)
            .do_update()
            .set((dsl::value.eq(value), dsl::updated_at.eq(now)))
            .execute(&mut conn)?;

        debug!("Key written");
        Ok(())
    }

    #[instrument(skip(self))]
    fn remove(&mut self, key: &str) -> Result<bool, StorageError> {
        let mut conn = self.connection()?;
        let deleted = diesel::delete(schema::kv_entries::table.find(key)).execute(&mut conn)?;
        debug!(deleted, "Key removed");
        Ok(deleted > 0)
    }
}
