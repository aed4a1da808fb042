use poem_openapi::payload::Json;

use crate::{
    api::models::{ErrorDto, StatusDto, StatusResponseDto},
    job::NetworkMonitor,
    storage::PendingUpdateStore,
    sync::DelayedSyncScheduler,
};

pub struct HealthService<'a> {
    pub store: &'a dyn PendingUpdateStore,
    pub scheduler: &'a DelayedSyncScheduler,
    pub network: &'a NetworkMonitor,
}

impl<'a> HealthService<'a> {
    pub fn new(
        store: &'a dyn PendingUpdateStore,
        scheduler: &'a DelayedSyncScheduler,
        network: &'a NetworkMonitor,
    ) -> Self {
        Self {
            store,
            scheduler,
            network,
        }
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn status(&self) -> StatusResponseDto {
        match self.store.len().await {
            Ok(pending) => StatusResponseDto::Ok(Json(StatusDto {
                pending: pending as u64,
                online: self.network.is_online(),
                job_state: self.scheduler.state().map(Into::into),
                request_id: self.scheduler.request_id(),
            })),
            Err(e) => {
                tracing::error!(error = %format!("{:?}", e), "failed to count pending updates");
                StatusResponseDto::InternalError(Json(ErrorDto {
                    message: format!("storage error: {}", e),
                }))
            }
        }
    }
}
