//! Synchronous repository layer over a ready SQLite connection.
//!
//! # Responsibility
//! - Keep SQL details inside the persistence boundary.
//! - Report absent rows as `None`, and engine failures as `StoreError`.
//!
//! Callers on an async runtime go through `crate::store`, which moves these
//! calls onto blocking workers.

pub mod note_repo;
pub mod prefs_repo;
