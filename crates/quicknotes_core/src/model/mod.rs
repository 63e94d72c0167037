//! Domain model for notes.
//!
//! # Invariants
//! - Every note is identified by a stable `NoteId`.
//! - Deletion removes the row; there are no tombstones.

pub mod note;
