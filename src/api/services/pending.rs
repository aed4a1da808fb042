use poem_openapi::payload::Json;

use crate::{
    api::models::{
        DiscardUpdateResponseDto, ErrorDto, PendingListResponseDto, QueueUpdateRequestDto,
        QueueUpdateResponseDto, SyncResponseDto, SyncScheduledDto,
    },
    domain::models::TrackId,
    storage::PendingUpdateStore,
    sync::DelayedSyncScheduler,
};

pub struct PendingService<'a> {
    pub store: &'a dyn PendingUpdateStore,
    pub scheduler: &'a DelayedSyncScheduler,
}

impl<'a> PendingService<'a> {
    pub fn new(store: &'a dyn PendingUpdateStore, scheduler: &'a DelayedSyncScheduler) -> Self {
        Self { store, scheduler }
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn list(&self) -> PendingListResponseDto {
        match self.store.get_all().await {
            Ok(items) => {
                PendingListResponseDto::Ok(Json(items.into_iter().map(Into::into).collect()))
            }
            Err(e) => {
                tracing::error!(error = %format!("{:?}", e), "failed to list pending updates");
                PendingListResponseDto::InternalError(Json(ErrorDto {
                    message: format!("storage error: {}", e),
                }))
            }
        }
    }

    /// Queue a progress update that could not be sent and schedule a drain pass.
    #[tracing::instrument(level = "debug", skip(self, req))]
    pub async fn queue(&self, track_id: TrackId, req: QueueUpdateRequestDto) -> QueueUpdateResponseDto {
        if !req.last_chapter_read.is_finite() || req.last_chapter_read < 0.0 {
            return QueueUpdateResponseDto::BadRequest(Json(ErrorDto {
                message: "last_chapter_read must be a non-negative number".into(),
            }));
        }
        if let Err(e) = self.store.add(track_id, req.last_chapter_read).await {
            tracing::error!(error = %format!("{:?}", e), track_id, "failed to queue update");
            return QueueUpdateResponseDto::InternalError(Json(ErrorDto {
                message: format!("storage error: {}", e),
            }));
        }
        tracing::info!(track_id, last_chapter_read = req.last_chapter_read, "queued delayed track update");
        let request_id = self.scheduler.schedule();
        QueueUpdateResponseDto::Accepted(Json(SyncScheduledDto { request_id }))
    }

    /// Drop the queued update for a track without sending it.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn discard(&self, track_id: TrackId) -> DiscardUpdateResponseDto {
        match self.store.remove(track_id).await {
            Ok(()) => {
                tracing::info!(track_id, "discarded delayed track update");
                DiscardUpdateResponseDto::NoContent
            }
            Err(e) => {
                tracing::error!(error = %format!("{:?}", e), track_id, "failed to discard update");
                DiscardUpdateResponseDto::InternalError(Json(ErrorDto {
                    message: format!("storage error: {}", e),
                }))
            }
        }
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub fn sync(&self) -> SyncResponseDto {
        let request_id = self.scheduler.schedule();
        SyncResponseDto::Accepted(Json(SyncScheduledDto { request_id }))
    }
}

