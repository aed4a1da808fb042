// Traits for persistence; sqlite and in-memory implementations below

#[cfg(test)]
pub mod memory;
pub mod sqlite;

#[cfg(test)]
pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

use crate::domain::models::{PendingUpdateItem, Track, TrackId};

/// Durable queue of progress updates that still need to reach their tracker.
///
/// Holds at most one item per track: adding an update for a track that is
/// already queued replaces the queued value.
#[async_trait::async_trait]
pub trait PendingUpdateStore: Send + Sync {
    /// Point-in-time snapshot of every queued item.
    async fn get_all(&self) -> anyhow::Result<Vec<PendingUpdateItem>>;
    async fn add(&self, track_id: TrackId, last_chapter_read: f64) -> anyhow::Result<()>;
    async fn remove(&self, track_id: TrackId) -> anyhow::Result<()>;
    /// Removes the track's item only while it still carries the value seen in
    /// `item`. Returns false when the item is gone or was replaced since.
    async fn remove_if_unchanged(&self, item: &PendingUpdateItem) -> anyhow::Result<bool>;
    async fn len(&self) -> anyhow::Result<usize>;
}

#[async_trait::async_trait]
pub trait TrackRepository: Send + Sync {
    async fn get_by_id(&self, track_id: TrackId) -> anyhow::Result<Option<Track>>;
}

#[async_trait::async_trait]
pub trait TrackWriter: Send + Sync {
    async fn upsert(&self, track: &Track) -> anyhow::Result<()>;
}
