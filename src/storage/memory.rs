//! In-memory storage implementation backing the drain job tests

use std::collections::HashMap;

use tokio::sync::RwLock;

use super::{PendingUpdateStore, TrackRepository, TrackWriter};
use crate::domain::models::{PendingUpdateItem, Track, TrackId};

#[derive(Default)]
pub struct InMemoryStore {
    tracks: RwLock<HashMap<TrackId, Track>>,
    /// Queue in insertion order; replacing an item keeps its slot
    pending: RwLock<Vec<PendingUpdateItem>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_track(&self, track: Track) {
        self.tracks.write().await.insert(track.id, track);
    }

    pub async fn track(&self, track_id: TrackId) -> Option<Track> {
        self.tracks.read().await.get(&track_id).cloned()
    }
}

#[async_trait::async_trait]
impl PendingUpdateStore for InMemoryStore {
    async fn get_all(&self) -> anyhow::Result<Vec<PendingUpdateItem>> {
        Ok(self.pending.read().await.clone())
    }

    async fn add(&self, track_id: TrackId, last_chapter_read: f64) -> anyhow::Result<()> {
        let mut pending = self.pending.write().await;
        let item = PendingUpdateItem::new(track_id, last_chapter_read);
        match pending.iter_mut().find(|i| i.track_id == track_id) {
            Some(existing) => *existing = item,
            None => pending.push(item),
        }
        Ok(())
    }

    async fn remove(&self, track_id: TrackId) -> anyhow::Result<()> {
        self.pending.write().await.retain(|i| i.track_id != track_id);
        Ok(())
    }

    async fn remove_if_unchanged(&self, item: &PendingUpdateItem) -> anyhow::Result<bool> {
        let mut pending = self.pending.write().await;
        let before = pending.len();
        pending.retain(|i| {
            !(i.track_id == item.track_id && i.last_chapter_read == item.last_chapter_read)
        });
        Ok(pending.len() != before)
    }

    async fn len(&self) -> anyhow::Result<usize> {
        Ok(self.pending.read().await.len())
    }
}

#[async_trait::async_trait]
impl TrackRepository for InMemoryStore {
    async fn get_by_id(&self, track_id: TrackId) -> anyhow::Result<Option<Track>> {
        Ok(self.track(track_id).await)
    }
}

#[async_trait::async_trait]
impl TrackWriter for InMemoryStore {
    async fn upsert(&self, track: &Track) -> anyhow::Result<()> {
        self.insert_track(track.clone()).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn add_replaces_queued_value_for_same_track() {
        let store = InMemoryStore::new();
        store.add(1, 4.0).await.unwrap();
        store.add(2, 8.0).await.unwrap();
        store.add(1, 6.0).await.unwrap();

        let items = store.get_all().await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].track_id, 1);
        assert_eq!(items[0].last_chapter_read, 6.0);
        assert_eq!(items[1].track_id, 2);
    }

    #[tokio::test]
    async fn snapshot_is_not_affected_by_later_writes() {
        let store = InMemoryStore::new();
        store.add(1, 1.0).await.unwrap();
        let snapshot = store.get_all().await.unwrap();
        store.add(2, 2.0).await.unwrap();
        store.remove(1).await.unwrap();

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].track_id, 1);
        assert_eq!(store.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn conditional_remove_keeps_replaced_value() {
        let store = InMemoryStore::new();
        store.add(1, 4.0).await.unwrap();
        let seen = store.get_all().await.unwrap().remove(0);
        store.add(1, 9.0).await.unwrap();

        assert!(!store.remove_if_unchanged(&seen).await.unwrap());
        let items = store.get_all().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].last_chapter_read, 9.0);

        let current = items[0].clone();
        assert!(store.remove_if_unchanged(&current).await.unwrap());
        assert_eq!(store.len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn removing_unknown_track_is_a_noop() {
        let store = InMemoryStore::new();
        store.add(1, 1.0).await.unwrap();
        store.remove(42).await.unwrap();
        assert_eq!(store.len().await.unwrap(), 1);
    }
}
