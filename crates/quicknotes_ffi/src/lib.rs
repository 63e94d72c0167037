//! Flutter-facing bindings for QuickNotes core.

pub mod api;
