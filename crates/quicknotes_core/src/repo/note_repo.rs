//! Note repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Upsert, delete, fetch and list rows of the `notes` table.
//! - Own the canonical list ordering.
//!
//! # Invariants
//! - Upsert is keyed by `id`; the last writer wins.
//! - Deleting a missing id is not an error.
//! - Lists are sorted by `timestamp DESC, id ASC`.
//! - Rows that fail to decode are reported, never skipped.

use crate::db::DbError;
use crate::model::note::{Note, NoteId};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    title,
    content,
    timestamp
FROM notes";

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence failure, distinct from an absent row.
#[derive(Debug)]
pub enum StoreError {
    /// Storage engine fault (I/O, corruption, full disk, schema).
    Db(DbError),
    /// Persisted row cannot be decoded into a domain value.
    InvalidData(String),
    /// Connection lacks a table the store depends on.
    MissingRequiredTable(&'static str),
    /// Connection table lacks a column the store depends on.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Blocking worker panicked or was shut down before finishing.
    Worker(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted note data: {message}"),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
            Self::Worker(message) => write!(f, "storage worker failed: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for note rows.
pub trait NoteRepository {
    /// Inserts the note or replaces the row with the same id.
    fn upsert_note(&self, note: &Note) -> StoreResult<()>;
    /// Removes the row with `id`; returns whether a row was removed.
    fn delete_note(&self, id: NoteId) -> StoreResult<bool>;
    fn get_note(&self, id: NoteId) -> StoreResult<Option<Note>>;
    /// Returns every note, most recent first.
    fn list_notes(&self) -> StoreResult<Vec<Note>>;
}

/// SQLite-backed note repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    /// Wraps a connection that has already been checked.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Wraps a connection after verifying it carries the `notes` schema.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_note_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn upsert_note(&self, note: &Note) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO notes (id, title, content, timestamp)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                content = excluded.content,
                timestamp = excluded.timestamp;",
            params![
                note.id.to_string(),
                note.title.as_str(),
                note.content.as_str(),
                note.timestamp,
            ],
        )?;
        Ok(())
    }

    fn delete_note(&self, id: NoteId) -> StoreResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM notes WHERE id = ?1;", [id.to_string()])?;
        Ok(changed > 0)
    }

    fn get_note(&self, id: NoteId) -> StoreResult<Option<Note>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTE_SELECT_SQL} WHERE id = ?1;"))?;
        let row = stmt
            .query_row([id.to_string()], RawNoteRow::read)
            .optional()?;
        row.map(RawNoteRow::into_note).transpose()
    }

    fn list_notes(&self) -> StoreResult<Vec<Note>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTE_SELECT_SQL} ORDER BY timestamp DESC, id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(RawNoteRow::read(row)?.into_note()?);
        }
        Ok(notes)
    }
}

struct RawNoteRow {
    id: String,
    title: String,
    content: String,
    timestamp: i64,
}

impl RawNoteRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            content: row.get("content")?,
            timestamp: row.get("timestamp")?,
        })
    }

    fn into_note(self) -> StoreResult<Note> {
        let id = Uuid::parse_str(&self.id).map_err(|_| {
            StoreError::InvalidData(format!("invalid uuid value `{}` in notes.id", self.id))
        })?;
        Ok(Note::with_id(id, self.title, self.content, self.timestamp))
    }
}

fn ensure_note_connection_ready(conn: &Connection) -> StoreResult<()> {
    if !table_exists(conn, "notes")? {
        return Err(StoreError::MissingRequiredTable("notes"));
    }
    for column in ["id", "title", "content", "timestamp"] {
        if !table_has_column(conn, "notes", column)? {
            return Err(StoreError::MissingRequiredColumn {
                table: "notes",
                column,
            });
        }
    }
    Ok(())
}

pub(crate) fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> StoreResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::{NoteRepository, SqliteNoteRepository, StoreError};
    use crate::db::open_db_in_memory;
    use crate::model::note::Note;
    use rusqlite::Connection;

    #[test]
    fn try_new_rejects_connection_without_notes_table() {
        let conn = Connection::open_in_memory().unwrap();
        let err = SqliteNoteRepository::try_new(&conn).err().unwrap();
        assert!(matches!(err, StoreError::MissingRequiredTable("notes")));
    }

    #[test]
    fn upsert_replaces_row_with_same_id() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteNoteRepository::try_new(&conn).unwrap();
        let mut note = Note::new("draft", "body", 10);
        repo.upsert_note(&note).unwrap();

        note.title = "final".to_string();
        note.timestamp = 20;
        repo.upsert_note(&note).unwrap();

        let listed = repo.list_notes().unwrap();
        assert_eq!(listed, vec![note]);
    }

    #[test]
    fn list_breaks_timestamp_ties_by_id() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteNoteRepository::try_new(&conn).unwrap();
        let a = Note::new("a", "", 5);
        let b = Note::new("b", "", 5);
        repo.upsert_note(&a).unwrap();
        repo.upsert_note(&b).unwrap();

        let mut expected = vec![a.id, b.id];
        expected.sort();
        let listed: Vec<_> = repo.list_notes().unwrap().into_iter().map(|n| n.id).collect();
        assert_eq!(listed, expected);
    }

    #[test]
    fn corrupt_id_is_reported_as_invalid_data() {
        let conn = open_db_in_memory().unwrap();
        conn.execute(
            "INSERT INTO notes (id, title, content, timestamp) VALUES ('not-a-uuid', '', '', 1);",
            [],
        )
        .unwrap();
        let repo = SqliteNoteRepository::try_new(&conn).unwrap();
        let err = repo.list_notes().unwrap_err();
        assert!(matches!(err, StoreError::InvalidData(_)));
    }
}
