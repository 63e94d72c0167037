//! Note Store: durable CRUD over the `notes` table plus the live feed.

use crate::db::open_db;
use crate::model::note::{Note, NoteId};
use crate::repo::note_repo::{NoteRepository, SqliteNoteRepository, StoreResult};
use crate::store::feed::NoteFeed;
use crate::store::prefs_store::PreferenceStore;
use crate::store::{run_blocking, DbHandle};
use log::{error, info};
use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Single source of truth for persisted notes.
///
/// Cloning is cheap; clones share the connection and the feed.
#[derive(Clone)]
pub struct NoteStore {
    conn: DbHandle,
    feed: Arc<watch::Sender<Vec<Note>>>,
}

impl NoteStore {
    /// Wraps a migrated connection and loads the initial snapshot.
    ///
    /// Runs on the calling thread; prefer [`NoteStore::open`] from async code.
    pub fn from_connection(conn: Connection) -> StoreResult<Self> {
        let initial = SqliteNoteRepository::try_new(&conn)?.list_notes()?;
        let (tx, _rx) = watch::channel(initial);
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            feed: Arc::new(tx),
        })
    }

    /// Opens (and creates if needed) the database file on a blocking worker.
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        run_blocking(move || Self::from_connection(open_db(&path)?)).await
    }

    /// Inserts `note`, or replaces the row with the same id.
    pub async fn insert_or_replace(&self, note: Note) -> StoreResult<()> {
        let id = note.id;
        self.write("note_upsert", id, move |repo| repo.upsert_note(&note))
            .await
    }

    /// Deletes the row for `note.id`. A missing row is a successful no-op.
    pub async fn delete(&self, note: &Note) -> StoreResult<()> {
        self.delete_by_id(note.id).await
    }

    pub async fn delete_by_id(&self, id: NoteId) -> StoreResult<()> {
        let removed = self
            .write("note_delete", id, move |repo| repo.delete_note(id))
            .await?;
        if !removed {
            info!("event=note_delete module=store status=noop note_id={id}");
        }
        Ok(())
    }

    /// Looks up one note; `Ok(None)` when the id is unknown.
    pub async fn get_by_id(&self, id: NoteId) -> StoreResult<Option<Note>> {
        let conn = Arc::clone(&self.conn);
        run_blocking(move || {
            let conn = conn.lock();
            SqliteNoteRepository::new(&conn).get_note(id)
        })
        .await
    }

    /// Reads the ordered collection once, straight from storage.
    pub async fn list_all(&self) -> StoreResult<Vec<Note>> {
        let conn = Arc::clone(&self.conn);
        run_blocking(move || {
            let conn = conn.lock();
            SqliteNoteRepository::new(&conn).list_notes()
        })
        .await
    }

    /// Subscribes to the ordered collection, most recent first.
    pub fn observe_all(&self) -> NoteFeed {
        NoteFeed::new(self.feed.subscribe())
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> Vec<Note> {
        self.feed.borrow().clone()
    }

    /// Preference store sharing this store's connection.
    pub fn preferences(&self) -> PreferenceStore {
        PreferenceStore::new(Arc::clone(&self.conn))
    }

    async fn write<T, F>(&self, event: &'static str, id: NoteId, op: F) -> StoreResult<T>
    where
        F: FnOnce(&SqliteNoteRepository<'_>) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let feed = Arc::clone(&self.feed);
        run_blocking(move || {
            let started_at = Instant::now();
            let conn = conn.lock();
            match write_and_reload(&conn, op) {
                Ok((value, snapshot)) => {
                    let count = snapshot.len();
                    feed.send_replace(snapshot);
                    info!(
                        "event={event} module=store status=ok note_id={id} note_count={count} duration_ms={}",
                        started_at.elapsed().as_millis()
                    );
                    Ok(value)
                }
                Err(err) => {
                    error!(
                        "event={event} module=store status=error note_id={id} duration_ms={} error={err}",
                        started_at.elapsed().as_millis()
                    );
                    Err(err)
                }
            }
        })
        .await
    }
}

/// Applies `op` and reloads the snapshot in one transaction.
///
/// Nothing is committed unless both steps succeed, so a failed write leaves
/// storage and the published snapshot at the last good state.
fn write_and_reload<T>(
    conn: &Connection,
    op: impl FnOnce(&SqliteNoteRepository<'_>) -> StoreResult<T>,
) -> StoreResult<(T, Vec<Note>)> {
    let tx = conn.unchecked_transaction()?;
    let repo = SqliteNoteRepository::new(&tx);
    let value = op(&repo)?;
    let snapshot = repo.list_notes()?;
    tx.commit()?;
    Ok((value, snapshot))
}
