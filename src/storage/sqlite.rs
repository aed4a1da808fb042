use anyhow::Context;
use entities::{pending_update, track};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    sea_query::OnConflict,
};

use super::{PendingUpdateStore, TrackRepository, TrackWriter};
use crate::domain::{
    mapping::{map_pending, map_track, pending_to_active, track_to_active},
    models::{PendingUpdateItem, Track, TrackId},
};

/// sea-orm backed store for tracks and the pending update queue.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    db: DatabaseConnection,
}

impl SqliteStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl PendingUpdateStore for SqliteStore {
    #[tracing::instrument(level = "debug", skip(self))]
    async fn get_all(&self) -> anyhow::Result<Vec<PendingUpdateItem>> {
        let rows = pending_update::Entity::find()
            .order_by_asc(pending_update::Column::QueuedAt)
            .all(&self.db)
            .await
            .context("Failed to read pending updates")?;
        Ok(rows.into_iter().map(map_pending).collect())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn add(&self, track_id: TrackId, last_chapter_read: f64) -> anyhow::Result<()> {
        let item = PendingUpdateItem::new(track_id, last_chapter_read);
        pending_update::Entity::insert(pending_to_active(&item))
            .on_conflict(
                OnConflict::column(pending_update::Column::TrackId)
                    .update_columns([
                        pending_update::Column::LastChapterRead,
                        pending_update::Column::QueuedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .with_context(|| format!("Failed to queue update for track {}", track_id))?;
        Ok(())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn remove(&self, track_id: TrackId) -> anyhow::Result<()> {
        pending_update::Entity::delete_by_id(track_id)
            .exec(&self.db)
            .await
            .with_context(|| format!("Failed to remove pending update for track {}", track_id))?;
        Ok(())
    }

    #[tracing::instrument(level = "debug", skip(self, item), fields(track_id = item.track_id))]
    async fn remove_if_unchanged(&self, item: &PendingUpdateItem) -> anyhow::Result<bool> {
        let result = pending_update::Entity::delete_many()
            .filter(pending_update::Column::TrackId.eq(item.track_id))
            .filter(pending_update::Column::LastChapterRead.eq(item.last_chapter_read))
            .exec(&self.db)
            .await
            .with_context(|| {
                format!("Failed to remove pending update for track {}", item.track_id)
            })?;
        Ok(result.rows_affected > 0)
    }

    async fn len(&self) -> anyhow::Result<usize> {
        let count = pending_update::Entity::find().count(&self.db).await?;
        Ok(count as usize)
    }
}

#[async_trait::async_trait]
impl TrackRepository for SqliteStore {
    #[tracing::instrument(level = "debug", skip(self))]
    async fn get_by_id(&self, track_id: TrackId) -> anyhow::Result<Option<Track>> {
        let row = track::Entity::find_by_id(track_id)
            .one(&self.db)
            .await
            .with_context(|| format!("Failed to load track {}", track_id))?;
        Ok(row.map(map_track))
    }
}

#[async_trait::async_trait]
impl TrackWriter for SqliteStore {
    #[tracing::instrument(level = "debug", skip(self, track), fields(track_id = track.id))]
    async fn upsert(&self, track: &Track) -> anyhow::Result<()> {
        track::Entity::insert(track_to_active(track))
            .on_conflict(
                OnConflict::column(track::Column::Id)
                    .update_columns([
                        track::Column::MangaId,
                        track::Column::SyncId,
                        track::Column::RemoteId,
                        track::Column::Title,
                        track::Column::LastChapterRead,
                        track::Column::TotalChapters,
                        track::Column::Status,
                        track::Column::Score,
                        track::Column::RemoteUrl,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .with_context(|| format!("Failed to save track {}", track.id))?;
        Ok(())
    }
}
