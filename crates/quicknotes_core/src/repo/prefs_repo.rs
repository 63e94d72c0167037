//! Boolean preference persistence.
//!
//! # Responsibility
//! - Persist small UI flags (layout toggle) next to the notes table.
//!
//! # Invariants
//! - Keys are trimmed and must not be empty.
//! - Values are stored as `0`/`1`; anything else is reported as invalid data.

use crate::repo::note_repo::{table_exists, StoreError, StoreResult};
use rusqlite::{params, Connection, OptionalExtension};

/// Preference key for the list/grid layout toggle.
pub const PREF_IS_GRID: &str = "is_grid";

/// Repository interface for boolean preferences.
pub trait PreferenceRepository {
    /// Returns the stored value, or `None` when the key was never written.
    fn get_bool(&self, key: &str) -> StoreResult<Option<bool>>;
    fn set_bool(&self, key: &str, value: bool) -> StoreResult<()>;
}

/// SQLite-backed preference repository.
pub struct SqlitePreferenceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePreferenceRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        if !table_exists(conn, "preferences")? {
            return Err(StoreError::MissingRequiredTable("preferences"));
        }
        Ok(Self { conn })
    }
}

impl PreferenceRepository for SqlitePreferenceRepository<'_> {
    fn get_bool(&self, key: &str) -> StoreResult<Option<bool>> {
        let key = normalize_key(key)?;
        let value: Option<i64> = self
            .conn
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1;",
                [key],
                |row| row.get(0),
            )
            .optional()?;

        match value {
            None => Ok(None),
            Some(0) => Ok(Some(false)),
            Some(1) => Ok(Some(true)),
            Some(other) => Err(StoreError::InvalidData(format!(
                "invalid boolean `{other}` in preferences.value for key `{key}`"
            ))),
        }
    }

    fn set_bool(&self, key: &str, value: bool) -> StoreResult<()> {
        let key = normalize_key(key)?;
        self.conn.execute(
            "INSERT INTO preferences (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value;",
            params![key, i64::from(value)],
        )?;
        Ok(())
    }
}

fn normalize_key(key: &str) -> StoreResult<&str> {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return Err(StoreError::InvalidData(
            "preference key cannot be empty".to_string(),
        ));
    }
    Ok(trimmed)
}
