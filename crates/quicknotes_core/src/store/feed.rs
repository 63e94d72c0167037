//! Live subscription to the ordered note collection.

use crate::model::note::Note;
use futures_util::stream::{self, Stream};
use tokio::sync::watch;

/// Subscriber handle for note snapshots.
///
/// A new feed yields the latest snapshot first, then one snapshot per
/// observed change. Bursts of writes may coalesce into the newest snapshot.
/// Dropping the feed cancels the subscription.
#[derive(Debug, Clone)]
pub struct NoteFeed {
    rx: watch::Receiver<Vec<Note>>,
}

impl NoteFeed {
    pub(crate) fn new(mut rx: watch::Receiver<Vec<Note>>) -> Self {
        rx.mark_changed();
        Self { rx }
    }

    /// Returns a copy of the latest snapshot without waiting.
    pub fn current(&self) -> Vec<Note> {
        self.rx.borrow().clone()
    }

    /// Waits for the next snapshot.
    ///
    /// Returns `None` once the owning store has been dropped.
    pub async fn next(&mut self) -> Option<Vec<Note>> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Adapts the feed into a `Stream` of snapshots.
    pub fn into_stream(self) -> impl Stream<Item = Vec<Note>> + Send {
        stream::unfold(self, |mut feed| async move {
            let snapshot = feed.next().await?;
            Some((snapshot, feed))
        })
    }
}
