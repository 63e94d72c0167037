//! Note Service: the façade UI collaborators call.
//!
//! # Responsibility
//! - Generate ids and stamp timestamps on create/update.
//! - Delegate persistence to [`NoteStore`] and re-expose its live feed.
//!
//! # Invariants
//! - Callers never supply timestamps.
//! - Timestamps issued by one service are strictly increasing, even when the
//!   wall clock stalls or steps backwards.
//! - Storage faults are returned unchanged; nothing is retried.

use crate::model::note::{Note, NoteDraft, NoteId, NoteValidationError};
use crate::repo::note_repo::{StoreError, StoreResult};
use crate::store::feed::NoteFeed;
use crate::store::note_store::NoteStore;
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of wall-clock time in epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// Clock backed by `SystemTime`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| {
                i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
            })
    }
}

/// Service error for draft-based saves.
#[derive(Debug)]
pub enum NoteServiceError {
    Validation(NoteValidationError),
    Store(StoreError),
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<NoteValidationError> for NoteServiceError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for NoteServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Note service façade over [`NoteStore`].
pub struct NoteService<C: Clock = SystemClock> {
    store: NoteStore,
    clock: C,
    last_stamp: AtomicI64,
}

impl NoteService<SystemClock> {
    pub fn new(store: NoteStore) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<C: Clock> NoteService<C> {
    /// Creates a service with a custom clock.
    ///
    /// Issued timestamps start above the newest note already in the store.
    pub fn with_clock(store: NoteStore, clock: C) -> Self {
        let newest = store
            .snapshot()
            .iter()
            .map(|note| note.timestamp)
            .max()
            .unwrap_or(i64::MIN);
        Self {
            store,
            clock,
            last_stamp: AtomicI64::new(newest),
        }
    }

    /// Creates a note with a fresh id, stamped now.
    pub async fn add_note(
        &self,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> StoreResult<Note> {
        let note = Note::new(title, content, self.next_stamp());
        self.store.insert_or_replace(note.clone()).await?;
        Ok(note)
    }

    /// Replaces title and content of `id`, stamped now.
    ///
    /// The new timestamp is also above the stored row's, so updates advance
    /// even when another service shares the store.
    ///
    /// Upsert semantics: if `id` was deleted concurrently the note is
    /// written back rather than reported missing.
    pub async fn update_note(
        &self,
        id: NoteId,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> StoreResult<Note> {
        let stored_stamp = self
            .store
            .get_by_id(id)
            .await?
            .map(|current| current.timestamp);
        let note = Note::with_id(id, title, content, self.next_stamp_after(stored_stamp));
        self.store.insert_or_replace(note.clone()).await?;
        Ok(note)
    }

    pub async fn delete_note(&self, note: &Note) -> StoreResult<()> {
        self.store.delete(note).await
    }

    pub async fn get_note(&self, id: NoteId) -> StoreResult<Option<Note>> {
        self.store.get_by_id(id).await
    }

    /// Live feed of all notes, most recent first.
    pub fn notes(&self) -> NoteFeed {
        self.store.observe_all()
    }

    /// Saves an editor draft: creates when `existing` is `None`, updates otherwise.
    ///
    /// Drafts with nothing in them are rejected before touching storage.
    pub async fn save_draft(
        &self,
        existing: Option<NoteId>,
        draft: NoteDraft,
    ) -> Result<Note, NoteServiceError> {
        if let Err(err) = draft.validate() {
            warn!("event=note_save module=service status=rejected reason={err}");
            return Err(err.into());
        }
        let note = match existing {
            Some(id) => self.update_note(id, draft.title, draft.content).await?,
            None => self.add_note(draft.title, draft.content).await?,
        };
        Ok(note)
    }

    pub fn store(&self) -> &NoteStore {
        &self.store
    }

    fn next_stamp(&self) -> i64 {
        self.next_stamp_after(None)
    }

    /// Issues a stamp above both this service's last stamp and `floor`.
    fn next_stamp_after(&self, floor: Option<i64>) -> i64 {
        let now = self.clock.now_ms();
        let floor = floor.map_or(i64::MIN, |value| value.saturating_add(1));
        let stamp_after = |last: i64| now.max(last.saturating_add(1)).max(floor);
        let previous = self
            .last_stamp
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(stamp_after(last))
            })
            .unwrap_or(now);
        stamp_after(previous)
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, NoteService};
    use crate::db::open_db_in_memory;
    use crate::store::note_store::NoteStore;
    use std::sync::atomic::{AtomicI64, Ordering};

    struct FrozenClock(AtomicI64);

    impl Clock for FrozenClock {
        fn now_ms(&self) -> i64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    fn service_at(now: i64) -> NoteService<FrozenClock> {
        let store = NoteStore::from_connection(open_db_in_memory().unwrap()).unwrap();
        NoteService::with_clock(store, FrozenClock(AtomicI64::new(now)))
    }

    #[test]
    fn stamps_advance_while_clock_is_frozen() {
        let service = service_at(1_000);
        assert_eq!(service.next_stamp(), 1_000);
        assert_eq!(service.next_stamp(), 1_001);
        assert_eq!(service.next_stamp(), 1_002);
    }

    #[test]
    fn stamps_follow_clock_when_it_moves_ahead() {
        let service = service_at(1_000);
        assert_eq!(service.next_stamp(), 1_000);
        service.clock.0.store(5_000, Ordering::SeqCst);
        assert_eq!(service.next_stamp(), 5_000);
    }

    #[test]
    fn stamps_clear_the_given_floor() {
        let service = service_at(100);
        assert_eq!(service.next_stamp_after(Some(7_000)), 7_001);
        assert_eq!(service.next_stamp(), 7_002);
    }

    #[test]
    fn stamps_never_step_back_with_clock() {
        let service = service_at(9_000);
        assert_eq!(service.next_stamp(), 9_000);
        service.clock.0.store(100, Ordering::SeqCst);
        assert_eq!(service.next_stamp(), 9_001);
    }
}
