//! Note domain model.
//!
//! # Responsibility
//! - Define the persisted note record.
//! - Provide caller-side draft validation for UI collaborators.
//!
//! # Invariants
//! - `id` is assigned once at creation and never reused.
//! - `timestamp` is the epoch-millisecond time of the latest create/update.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a note.
pub type NoteId = Uuid;

/// Persisted note record.
///
/// Values handed out by the store are owned copies; editing them does not
/// touch storage until they go back through the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    /// May be empty at the storage layer.
    pub title: String,
    /// May be empty at the storage layer.
    pub content: String,
    /// Last-modified time in Unix epoch milliseconds.
    pub timestamp: i64,
}

impl Note {
    /// Builds a note with a fresh random id.
    pub fn new(title: impl Into<String>, content: impl Into<String>, timestamp: i64) -> Self {
        Self::with_id(Uuid::new_v4(), title, content, timestamp)
    }

    /// Builds a note for an existing id.
    pub fn with_id(
        id: NoteId,
        title: impl Into<String>,
        content: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            content: content.into(),
            timestamp,
        }
    }
}

/// Unsaved title/content pair coming from an editor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
}

/// Rejection reason for a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteValidationError {
    /// Title and content are both blank.
    EmptyNote,
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyNote => write!(f, "note title and content cannot both be empty"),
        }
    }
}

impl Error for NoteValidationError {}

impl NoteDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// Checks whether the draft is worth saving.
    ///
    /// The store accepts empty fields; this gate belongs to editors that
    /// should not persist a note with nothing in it.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        if self.title.trim().is_empty() && self.content.trim().is_empty() {
            return Err(NoteValidationError::EmptyNote);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Note, NoteDraft, NoteValidationError};

    #[test]
    fn new_notes_get_distinct_ids() {
        let first = Note::new("a", "b", 1);
        let second = Note::new("a", "b", 1);
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn draft_with_only_whitespace_is_rejected() {
        let draft = NoteDraft::new("  ", "\n\t");
        assert_eq!(draft.validate(), Err(NoteValidationError::EmptyNote));
    }

    #[test]
    fn draft_with_title_only_is_accepted() {
        assert!(NoteDraft::new("Title", "").validate().is_ok());
        assert!(NoteDraft::new("", "body").validate().is_ok());
    }
}
