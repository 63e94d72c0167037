//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level note functions to Dart via FRB.
//! - Keep storage work off the Dart UI isolate.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Note operations return envelopes with `ok` + human-readable `message`.
//! - One store (and one connection) is shared by every call in the process.

use log::warn;
use once_cell::sync::OnceCell;
use quicknotes_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    Note, NoteDraft, NoteId, NoteService, NoteStore,
};
use std::future::Future;
use std::path::PathBuf;
use tokio::runtime::Runtime;

const NOTES_DB_FILE_NAME: &str = "quicknotes.sqlite3";
const NOTES_DB_PATH_ENV: &str = "QUICKNOTES_DB_PATH";

static RUNTIME: OnceCell<Runtime> = OnceCell::new();
static NOTE_SERVICE: OnceCell<NoteService> = OnceCell::new();
static NOTES_DB_PATH: OnceCell<PathBuf> = OnceCell::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Sync call; may create the log directory.
/// - Idempotent for the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Note fields as seen by Dart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteItem {
    /// Stable note ID in string form.
    pub id: String,
    pub title: String,
    pub content: String,
    /// Last-modified time in epoch milliseconds.
    pub timestamp: i64,
}

impl From<Note> for NoteItem {
    fn from(note: Note) -> Self {
        Self {
            id: note.id.to_string(),
            title: note.title,
            content: note.content,
            timestamp: note.timestamp,
        }
    }
}

/// Envelope for single-note commands and lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Affected note, when there is one.
    pub note: Option<NoteItem>,
    pub message: String,
}

impl NoteActionResponse {
    fn success(message: impl Into<String>, note: Option<Note>) -> Self {
        Self {
            ok: true,
            note: note.map(NoteItem::from),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            note: None,
            message: message.into(),
        }
    }
}

/// Envelope for the ordered note list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesListResponse {
    pub ok: bool,
    /// Most recent first.
    pub items: Vec<NoteItem>,
    pub message: String,
}

/// Envelope for the list/grid layout preference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutResponse {
    pub ok: bool,
    pub is_grid: bool,
    pub message: String,
}

/// Creates a note from editor input.
///
/// # FFI contract
/// - Async call from Dart; storage runs on a Rust worker.
/// - Rejects a note whose title and content are both blank.
pub fn notes_add(title: String, content: String) -> NoteActionResponse {
    let draft = NoteDraft::new(title, content);
    match with_note_service(|service| service.save_draft(None, draft)) {
        Ok(Ok(note)) => NoteActionResponse::success("Note created.", Some(note)),
        Ok(Err(err)) => NoteActionResponse::failure(format!("notes_add failed: {err}")),
        Err(err) => NoteActionResponse::failure(format!("notes_add failed: {err}")),
    }
}

/// Replaces title/content of an existing note and re-stamps it.
pub fn notes_update(note_id: String, title: String, content: String) -> NoteActionResponse {
    let id = match parse_note_id(&note_id) {
        Ok(id) => id,
        Err(message) => return NoteActionResponse::failure(message),
    };
    let draft = NoteDraft::new(title, content);
    match with_note_service(|service| service.save_draft(Some(id), draft)) {
        Ok(Ok(note)) => NoteActionResponse::success("Note updated.", Some(note)),
        Ok(Err(err)) => NoteActionResponse::failure(format!("notes_update failed: {err}")),
        Err(err) => NoteActionResponse::failure(format!("notes_update failed: {err}")),
    }
}

/// Deletes a note by id. Unknown ids succeed as a no-op.
pub fn notes_delete(note_id: String) -> NoteActionResponse {
    let id = match parse_note_id(&note_id) {
        Ok(id) => id,
        Err(message) => return NoteActionResponse::failure(message),
    };
    match with_note_service(|service| service.store().delete_by_id(id)) {
        Ok(Ok(())) => NoteActionResponse::success("Note deleted.", None),
        Ok(Err(err)) => NoteActionResponse::failure(format!("notes_delete failed: {err}")),
        Err(err) => NoteActionResponse::failure(format!("notes_delete failed: {err}")),
    }
}

/// Fetches one note. A missing note is `ok` with `note = None`.
pub fn notes_get(note_id: String) -> NoteActionResponse {
    let id = match parse_note_id(&note_id) {
        Ok(id) => id,
        Err(message) => return NoteActionResponse::failure(message),
    };
    match with_note_service(|service| service.get_note(id)) {
        Ok(Ok(Some(note))) => NoteActionResponse::success("Note found.", Some(note)),
        Ok(Ok(None)) => NoteActionResponse::success("Note not found.", None),
        Ok(Err(err)) => NoteActionResponse::failure(format!("notes_get failed: {err}")),
        Err(err) => NoteActionResponse::failure(format!("notes_get failed: {err}")),
    }
}

/// Returns the latest published snapshot, most recent first.
pub fn notes_list() -> NotesListResponse {
    match note_service() {
        Ok(service) => {
            let items = service
                .notes()
                .current()
                .into_iter()
                .map(NoteItem::from)
                .collect::<Vec<_>>();
            let message = format!("{} note(s).", items.len());
            NotesListResponse {
                ok: true,
                items,
                message,
            }
        }
        Err(err) => NotesListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("notes_list failed: {err}"),
        },
    }
}

/// Reads the list/grid layout preference (defaults to list).
pub fn layout_is_grid() -> LayoutResponse {
    match with_note_service(|service| async move {
        service.store().preferences().is_grid().await
    }) {
        Ok(Ok(is_grid)) => LayoutResponse {
            ok: true,
            is_grid,
            message: String::new(),
        },
        Ok(Err(err)) => layout_failure(format!("layout_is_grid failed: {err}")),
        Err(err) => layout_failure(format!("layout_is_grid failed: {err}")),
    }
}

/// Persists the list/grid layout preference.
pub fn layout_set_grid(is_grid: bool) -> LayoutResponse {
    match with_note_service(|service| async move {
        service.store().preferences().set_grid(is_grid).await
    }) {
        Ok(Ok(())) => LayoutResponse {
            ok: true,
            is_grid,
            message: String::new(),
        },
        Ok(Err(err)) => layout_failure(format!("layout_set_grid failed: {err}")),
        Err(err) => layout_failure(format!("layout_set_grid failed: {err}")),
    }
}

fn layout_failure(message: String) -> LayoutResponse {
    LayoutResponse {
        ok: false,
        is_grid: false,
        message,
    }
}

fn parse_note_id(raw: &str) -> Result<NoteId, String> {
    NoteId::parse_str(raw.trim()).map_err(|_| format!("invalid note id `{raw}`"))
}

fn runtime() -> Result<&'static Runtime, String> {
    RUNTIME.get_or_try_init(|| {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("quicknotes-ffi")
            .build()
            .map_err(|err| format!("runtime start failed: {err}"))
    })
}

fn note_service() -> Result<&'static NoteService, String> {
    NOTE_SERVICE.get_or_try_init(|| {
        let db_path = resolve_notes_db_path();
        let store = runtime()?
            .block_on(NoteStore::open(db_path))
            .map_err(|err| {
                warn!("event=ffi_store_open module=ffi status=error error={err}");
                format!("notes DB open failed: {err}")
            })?;
        Ok(NoteService::new(store))
    })
}

fn with_note_service<T, Fut>(f: impl FnOnce(&'static NoteService) -> Fut) -> Result<T, String>
where
    Fut: Future<Output = T>,
{
    let service = note_service()?;
    Ok(runtime()?.block_on(f(service)))
}

fn resolve_notes_db_path() -> PathBuf {
    NOTES_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(NOTES_DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(NOTES_DB_FILE_NAME)
        })
        .clone()
}
