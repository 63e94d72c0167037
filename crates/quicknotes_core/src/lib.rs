//! Core note persistence for QuickNotes.
//! This crate is the single source of truth for note invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::note::{Note, NoteDraft, NoteId, NoteValidationError};
pub use repo::note_repo::{NoteRepository, SqliteNoteRepository, StoreError, StoreResult};
pub use repo::prefs_repo::{PreferenceRepository, SqlitePreferenceRepository, PREF_IS_GRID};
pub use service::note_service::{Clock, NoteService, NoteServiceError, SystemClock};
pub use store::feed::NoteFeed;
pub use store::note_store::NoteStore;
pub use store::prefs_store::PreferenceStore;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
