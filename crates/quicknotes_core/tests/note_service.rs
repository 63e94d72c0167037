use quicknotes_core::db::open_db_in_memory;
use quicknotes_core::{
    Clock, NoteDraft, NoteService, NoteServiceError, NoteStore, NoteValidationError,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::time::timeout;
use uuid::Uuid;

const FEED_WAIT: Duration = Duration::from_secs(5);

#[derive(Clone)]
struct ManualClock(Arc<AtomicI64>);

impl ManualClock {
    fn at(now: i64) -> Self {
        Self(Arc::new(AtomicI64::new(now)))
    }

    fn set(&self, now: i64) {
        self.0.store(now, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

fn memory_store() -> NoteStore {
    NoteStore::from_connection(open_db_in_memory().unwrap()).unwrap()
}

fn epoch_ms() -> i64 {
    i64::try_from(
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_millis(),
    )
    .unwrap()
}

#[tokio::test]
async fn add_note_assigns_id_and_current_timestamp() {
    let service = NoteService::new(memory_store());

    let before = epoch_ms();
    let note = service.add_note("T", "C").await.unwrap();
    let after = epoch_ms();

    assert_eq!(note.title, "T");
    assert_eq!(note.content, "C");
    assert!(note.timestamp >= before && note.timestamp <= after + 1);
    assert!(!note.id.is_nil());
}

#[tokio::test]
async fn add_then_get_matches_every_field() {
    let service = NoteService::new(memory_store());
    let added = service.add_note("Round", "trip").await.unwrap();

    let loaded = service.get_note(added.id).await.unwrap();
    assert_eq!(loaded, Some(added));
}

#[tokio::test]
async fn added_notes_get_distinct_ids() {
    let service = NoteService::new(memory_store());
    let first = service.add_note("same", "same").await.unwrap();
    let second = service.add_note("same", "same").await.unwrap();
    assert_ne!(first.id, second.id);
    assert_eq!(service.notes().current().len(), 2);
}

#[tokio::test]
async fn update_keeps_id_and_advances_timestamp() {
    let clock = ManualClock::at(1_000);
    let service = NoteService::with_clock(memory_store(), clock.clone());
    let created = service.add_note("T", "C").await.unwrap();

    clock.set(2_000);
    let updated = service.update_note(created.id, "T2", "C2").await.unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.title, "T2");
    assert_eq!(updated.content, "C2");
    assert_eq!(updated.timestamp, 2_000);
    assert_eq!(service.get_note(created.id).await.unwrap(), Some(updated));
}

#[tokio::test]
async fn repeated_identical_updates_still_advance_timestamp() {
    let clock = ManualClock::at(5_000);
    let service = NoteService::with_clock(memory_store(), clock);
    let created = service.add_note("T", "C").await.unwrap();

    let first = service.update_note(created.id, "T2", "C2").await.unwrap();
    let second = service.update_note(created.id, "T2", "C2").await.unwrap();

    assert!(first.timestamp > created.timestamp);
    assert!(second.timestamp > first.timestamp);
    assert_eq!(second.title, first.title);
    assert_eq!(second.content, first.content);
}

#[tokio::test]
async fn new_service_stamps_above_existing_notes() {
    let store = memory_store();
    let early = NoteService::with_clock(store.clone(), ManualClock::at(10_000));
    let note = early.add_note("from the future", "").await.unwrap();

    let late = NoteService::with_clock(store, ManualClock::at(50));
    let updated = late.update_note(note.id, "edited", "").await.unwrap();
    assert!(updated.timestamp > note.timestamp);
}

#[tokio::test]
async fn update_advances_past_a_sibling_service_sharing_the_store() {
    let store = memory_store();
    let lagging = NoteService::with_clock(store.clone(), ManualClock::at(50));
    let leading = NoteService::with_clock(store, ManualClock::at(10_000));

    let note = leading.add_note("written ahead", "").await.unwrap();
    let updated = lagging.update_note(note.id, "edited", "").await.unwrap();

    assert!(updated.timestamp > note.timestamp);
    assert_eq!(lagging.get_note(note.id).await.unwrap(), Some(updated));
}

#[tokio::test]
async fn get_deleted_or_unknown_id_is_not_found() {
    let service = NoteService::new(memory_store());
    let note = service.add_note("gone", "").await.unwrap();
    service.delete_note(&note).await.unwrap();

    assert_eq!(service.get_note(note.id).await.unwrap(), None);
    assert_eq!(service.get_note(Uuid::new_v4()).await.unwrap(), None);
}

#[tokio::test]
async fn deleting_twice_is_a_noop() {
    let service = NoteService::new(memory_store());
    let keep = service.add_note("keep", "").await.unwrap();
    let drop_me = service.add_note("drop", "").await.unwrap();

    service.delete_note(&drop_me).await.unwrap();
    service.delete_note(&drop_me).await.unwrap();

    assert_eq!(service.notes().current(), vec![keep]);
}

#[tokio::test]
async fn groceries_todo_scenario_leaves_only_todo() {
    let service = NoteService::new(memory_store());
    let mut feed = service.notes();
    assert_eq!(timeout(FEED_WAIT, feed.next()).await.unwrap(), Some(vec![]));

    let groceries = service.add_note("Groceries", "Milk, eggs").await.unwrap();
    let todo = service.add_note("Todo", "Call Alice").await.unwrap();
    service.delete_note(&groceries).await.unwrap();

    let emitted = timeout(FEED_WAIT, feed.next()).await.unwrap().unwrap();
    assert_eq!(emitted, vec![todo]);
}

#[tokio::test]
async fn feed_tracks_a_model_through_mixed_operations() {
    let service = NoteService::new(memory_store());
    let mut model = HashMap::new();
    let mut ids = Vec::new();

    for step in 0..40u32 {
        match step % 5 {
            0 | 1 | 3 => {
                let note = service
                    .add_note(format!("title {step}"), format!("body {step}"))
                    .await
                    .unwrap();
                ids.push(note.id);
                model.insert(note.id, note);
            }
            2 => {
                let id = ids[(step as usize * 7) % ids.len()];
                let note = service
                    .update_note(id, format!("edited {step}"), String::new())
                    .await
                    .unwrap();
                model.insert(id, note);
            }
            _ => {
                let id = ids[(step as usize * 3) % ids.len()];
                if let Some(note) = model.remove(&id) {
                    service.delete_note(&note).await.unwrap();
                }
            }
        }

        let snapshot = service.notes().current();
        assert_eq!(snapshot.len(), model.len(), "step {step}");
        for note in &snapshot {
            assert_eq!(model.get(&note.id), Some(note), "step {step}");
        }
        assert!(snapshot
            .windows(2)
            .all(|pair| pair[0].timestamp >= pair[1].timestamp));
    }
}

#[tokio::test]
async fn concurrent_updates_to_same_id_resolve_to_one_writer() {
    let service = Arc::new(NoteService::new(memory_store()));
    let id = service.add_note("base", "").await.unwrap().id;

    let mut handles = Vec::new();
    for writer in 0..8 {
        let service = Arc::clone(&service);
        handles.push(tokio::spawn(async move {
            service
                .update_note(id, format!("writer {writer}"), String::new())
                .await
                .unwrap()
        }));
    }
    let mut written = Vec::new();
    for handle in handles {
        written.push(handle.await.unwrap());
    }

    let stored = service.get_note(id).await.unwrap().unwrap();
    assert!(written.contains(&stored));
    assert_eq!(service.notes().current(), vec![stored]);
}

#[tokio::test]
async fn save_draft_rejects_empty_note_without_writing() {
    let service = NoteService::new(memory_store());

    let err = service
        .save_draft(None, NoteDraft::new(" ", ""))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        NoteServiceError::Validation(NoteValidationError::EmptyNote)
    ));
    assert!(service.notes().current().is_empty());
}

#[tokio::test]
async fn save_draft_creates_then_updates() {
    let service = NoteService::new(memory_store());
    let created = service
        .save_draft(None, NoteDraft::new("draft", ""))
        .await
        .unwrap();
    let updated = service
        .save_draft(Some(created.id), NoteDraft::new("draft", "with body"))
        .await
        .unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(service.notes().current(), vec![updated]);
}
