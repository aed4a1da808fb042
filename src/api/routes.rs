use std::sync::Arc;

use poem_openapi::{OpenApi, param::Path, payload::Json};

use super::models::{
    DiscardUpdateResponseDto, PendingListResponseDto, QueueUpdateRequestDto, QueueUpdateResponseDto, StatusResponseDto,
    SyncResponseDto,
};
use super::services::{health::HealthService, pending::PendingService};
use crate::{job::NetworkMonitor, storage::PendingUpdateStore, sync::DelayedSyncScheduler};

pub struct TrackingApi {
    pub store: Arc<dyn PendingUpdateStore>,
    pub scheduler: Arc<DelayedSyncScheduler>,
    pub network: Arc<NetworkMonitor>,
}

#[OpenApi]
impl TrackingApi {
    /// Queue size, connectivity and the state of the drain job
    #[oai(path = "/status", method = "get")]
    #[tracing::instrument(level = "debug", skip(self))]
    async fn status(&self) -> StatusResponseDto {
        HealthService::new(self.store.as_ref(), &self.scheduler, &self.network)
            .status()
            .await
    }

    /// List queued progress updates
    #[oai(path = "/v1/pending", method = "get")]
    #[tracing::instrument(level = "debug", skip(self))]
    async fn list_pending(&self) -> PendingListResponseDto {
        PendingService::new(self.store.as_ref(), &self.scheduler)
            .list()
            .await
    }

    /// Queue a progress update for a track, replacing any queued one
    #[oai(path = "/v1/pending/:track_id", method = "put")]
    #[tracing::instrument(level = "debug", skip(self, track_id, body))]
    async fn queue_update(
        &self,
        track_id: Path<i64>,
        body: Json<QueueUpdateRequestDto>,
    ) -> QueueUpdateResponseDto {
        PendingService::new(self.store.as_ref(), &self.scheduler)
            .queue(track_id.0, body.0)
            .await
    }

    /// Drop the queued update for a track without sending it
    #[oai(path = "/v1/pending/:track_id", method = "delete")]
    #[tracing::instrument(level = "debug", skip(self, track_id))]
    async fn discard_update(&self, track_id: Path<i64>) -> DiscardUpdateResponseDto {
        PendingService::new(self.store.as_ref(), &self.scheduler)
            .discard(track_id.0)
            .await
    }

    /// Schedule a drain pass
    #[oai(path = "/v1/sync", method = "post")]
    #[tracing::instrument(level = "debug", skip(self))]
    async fn sync(&self) -> SyncResponseDto {
        PendingService::new(self.store.as_ref(), &self.scheduler).sync()
    }
}
