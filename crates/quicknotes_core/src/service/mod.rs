//! Core use-case services.
//!
//! # Responsibility
//! - Apply field-assignment rules (ids, timestamps) on top of the store.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod note_service;
