//! Database models for the key/value table.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;

use crate::storage::schema;

/// Stored key/value row.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::kv_entries)]
#[diesel(primary_key(key))]
pub struct KvEntry {
    key: String,
    value: String,
    updated_at: NaiveDateTime,
}

impl KvEntry {
    /// Consumes the row, returning the stored value.
    pub fn into_value(self) -> String {
        self.value
    }
}

/// Insertable row.
#[derive(Debug, Clone, Insertable, new, Getters)]
#[diesel(table_name = schema::kv_entries)]
pub struct NewKvEntry {
    key: String,
    value: String,
    updated_at: NaiveDateTime,
}
