//! Snapshot subscriptions over the store's watch channels

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use timesheet_core::models::TimeEntry;

/// Complete, immutable copy of a collection at one point in time.
pub type Snapshot<T> = Arc<[T]>;

/// Projection applied to every snapshot a subscription delivers.
pub trait SnapshotQuery<T>: Send + Sync + 'static {
    fn apply(&self, snapshot: &Snapshot<T>) -> Snapshot<T>;
}

/// The whole collection, in stored order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllDocuments;

impl<T: Send + Sync + 'static> SnapshotQuery<T> for AllDocuments {
    fn apply(&self, snapshot: &Snapshot<T>) -> Snapshot<T> {
        Arc::clone(snapshot)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EntryOrder {
    /// Latest work date first; entries on the same date by latest write.
    #[default]
    NewestFirst,
    /// Write order.
    Stored,
}

/// Filter and ordering for entry subscriptions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryQuery {
    pub user_id: Option<String>,
    pub order: EntryOrder,
}

impl EntryQuery {
    /// Every user's entries, newest first.
    pub fn all() -> Self {
        Self::default()
    }

    /// One user's entries, newest first.
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            order: EntryOrder::NewestFirst,
        }
    }

    pub fn with_order(mut self, order: EntryOrder) -> Self {
        self.order = order;
        self
    }
}

impl SnapshotQuery<TimeEntry> for EntryQuery {
    fn apply(&self, snapshot: &Snapshot<TimeEntry>) -> Snapshot<TimeEntry> {
        if self.user_id.is_none() && self.order == EntryOrder::Stored {
            return Arc::clone(snapshot);
        }

        let mut entries: Vec<TimeEntry> = snapshot
            .iter()
            .filter(|e| self.user_id.as_deref().is_none_or(|id| e.user_id == id))
            .cloned()
            .collect();

        if self.order == EntryOrder::NewestFirst {
            entries.sort_by(|a, b| {
                b.date
                    .cmp(&a.date)
                    .then_with(|| b.created_at.cmp(&a.created_at))
            });
        }

        entries.into()
    }
}

/// A live view of one collection.
///
/// Only the latest snapshot is kept: a slow consumer skips intermediate
/// versions and always sees the most recent one.
pub struct Subscription<T, Q> {
    rx: watch::Receiver<Snapshot<T>>,
    query: Q,
}

impl<T, Q> Subscription<T, Q>
where
    T: Send + Sync + 'static,
    Q: SnapshotQuery<T>,
{
    pub(crate) fn new(rx: watch::Receiver<Snapshot<T>>, query: Q) -> Self {
        Self { rx, query }
    }

    pub fn query(&self) -> &Q {
        &self.query
    }

    /// Latest snapshot, marking it as seen.
    pub fn current(&mut self) -> Snapshot<T> {
        let raw = Arc::clone(&*self.rx.borrow_and_update());
        self.query.apply(&raw)
    }

    /// Wait for a snapshot newer than the last one seen.
    ///
    /// Returns `None` once the store has shut down.
    pub async fn next(&mut self) -> Option<Snapshot<T>> {
        self.rx.changed().await.ok()?;
        Some(self.current())
    }

    /// Release the subscription.
    pub fn unsubscribe(self) {}
}

fn lock(flag: &Mutex<bool>) -> MutexGuard<'_, bool> {
    flag.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Background task feeding every snapshot of a subscription to a callback.
///
/// The callback first receives the current snapshot, then each newer one.
/// Once `unsubscribe` returns (or the listener is dropped) the callback is
/// never invoked again. The callback must not release its own listener.
pub struct SnapshotListener {
    active: Arc<Mutex<bool>>,
    handle: Option<JoinHandle<()>>,
}

impl SnapshotListener {
    pub fn spawn<T, Q, F>(mut subscription: Subscription<T, Q>, mut callback: F) -> Self
    where
        T: Send + Sync + 'static,
        Q: SnapshotQuery<T>,
        F: FnMut(Snapshot<T>) + Send + 'static,
    {
        let active = Arc::new(Mutex::new(true));
        let flag = Arc::clone(&active);

        let handle = tokio::spawn(async move {
            let mut next = Some(subscription.current());
            while let Some(snapshot) = next {
                {
                    let guard = lock(&flag);
                    if !*guard {
                        break;
                    }
                    callback(snapshot);
                }
                next = subscription.next().await;
            }
            tracing::debug!("Snapshot listener finished");
        });

        Self {
            active,
            handle: Some(handle),
        }
    }

    pub fn is_active(&self) -> bool {
        *lock(&self.active)
    }

    /// Stop delivery. Waits for a callback already in progress.
    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        *lock(&self.active) = false;
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for SnapshotListener {
    fn drop(&mut self) {
        self.release();
    }
}
