//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `quicknotes_core` linkage without the Flutter/FFI runtime.
//! - Run one add/update/delete cycle against an in-memory store.

use quicknotes_core::db::open_db_in_memory;
use quicknotes_core::{NoteService, NoteStore};
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    println!("quicknotes_core ping={}", quicknotes_core::ping());
    println!("quicknotes_core version={}", quicknotes_core::core_version());

    let store = NoteStore::from_connection(open_db_in_memory()?)?;
    let service = NoteService::new(store);
    let mut feed = service.notes();

    let groceries = service.add_note("Groceries", "Milk, eggs").await?;
    let todo = service.add_note("Todo", "Call Alice").await?;
    service
        .update_note(todo.id, "Todo", "Call Alice, then Bob")
        .await?;
    service.delete_note(&groceries).await?;

    let snapshot = feed.next().await.unwrap_or_default();
    println!("quicknotes_core notes={}", snapshot.len());
    for note in snapshot {
        println!("  {} ts={} title={}", note.id, note.timestamp, note.title);
    }
    Ok(())
}
