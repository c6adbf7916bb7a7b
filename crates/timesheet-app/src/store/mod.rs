//! Local document store with live snapshot subscriptions

pub mod backend;
pub mod live;
pub mod manager;

pub use backend::{FileBackend, MemoryBackend, StorageBackend};
pub use live::{AllDocuments, EntryOrder, EntryQuery, Snapshot, SnapshotListener, SnapshotQuery, Subscription};
pub use manager::{DocumentStore, StoreError};
