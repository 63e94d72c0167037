//! Async access to boolean preferences.

use crate::repo::note_repo::StoreResult;
use crate::repo::prefs_repo::{PreferenceRepository, SqlitePreferenceRepository, PREF_IS_GRID};
use crate::store::{run_blocking, DbHandle};
use log::debug;

/// Preference accessor bound to the note store's connection.
#[derive(Clone)]
pub struct PreferenceStore {
    conn: DbHandle,
}

impl PreferenceStore {
    pub(crate) fn new(conn: DbHandle) -> Self {
        Self { conn }
    }

    /// Reads `key`, falling back to `default` when unset.
    pub async fn get_bool(&self, key: &str, default: bool) -> StoreResult<bool> {
        let conn = self.conn.clone();
        let key = key.to_string();
        run_blocking(move || {
            let conn = conn.lock();
            let value = SqlitePreferenceRepository::try_new(&conn)?.get_bool(&key)?;
            Ok(value.unwrap_or(default))
        })
        .await
    }

    pub async fn set_bool(&self, key: &str, value: bool) -> StoreResult<()> {
        let conn = self.conn.clone();
        let key = key.to_string();
        run_blocking(move || {
            let conn = conn.lock();
            SqlitePreferenceRepository::try_new(&conn)?.set_bool(&key, value)?;
            debug!("event=pref_set module=store status=ok key={key} value={value}");
            Ok(())
        })
        .await
    }

    /// Whether notes are shown as a grid. Defaults to a list.
    pub async fn is_grid(&self) -> StoreResult<bool> {
        self.get_bool(PREF_IS_GRID, false).await
    }

    pub async fn set_grid(&self, value: bool) -> StoreResult<()> {
        self.set_bool(PREF_IS_GRID, value).await
    }
}
